use crate::foundation::core::Vec3;

/// Area-weighted smooth vertex normals.
///
/// `out` must have one slot per position. Vertices that touch no (non-degenerate) triangle fall
/// back to their radial direction, then to +Y, so the result is identical for identical input
/// and never NaN.
pub(crate) fn compute_normals(positions: &[Vec3], indices: &[u32], out: &mut [Vec3]) {
    debug_assert_eq!(positions.len(), out.len());
    out.iter_mut().for_each(|n| *n = Vec3::ZERO);

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        out[a] += face;
        out[b] += face;
        out[c] += face;
    }

    for (n, p) in out.iter_mut().zip(positions) {
        *n = n
            .try_normalize()
            .or_else(|| p.try_normalize())
            .unwrap_or(Vec3::Y);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/normals.rs"]
mod tests;
