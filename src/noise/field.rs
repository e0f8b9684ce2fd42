use crate::foundation::{core::Vec3, math::Rng64};

const F3: f32 = 1.0 / 3.0;
const G3: f32 = 1.0 / 6.0;

// A corner's influence must vanish on the far faces of its simplex or the field jumps at cell
// boundaries; 0.5 is the largest squared radius that keeps it inside.
const KERNEL_RADIUS_SQ: f32 = 0.5;
// Peak raw sum for this kernel and gradient set is about 0.013.
const OUTPUT_SCALE: f32 = 76.0;

const GRAD3: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Deterministic 3D simplex gradient noise.
///
/// The permutation table is derived from `seed` with a SplitMix64 shuffle, so two fields built
/// from the same seed produce bit-identical output. Time scrolls the sample point along +Z.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("perm_head", &&self.perm[..8])
            .finish()
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl NoiseField {
    /// Seed used by [`NoiseField::default`].
    pub const DEFAULT_SEED: u64 = 0x5EED_F1E1_D000_0001;

    /// Build a field whose lattice hashing is shuffled from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut base = [0u8; 256];
        for (i, v) in base.iter_mut().enumerate() {
            *v = i as u8;
        }
        let mut rng = Rng64::new(seed);
        for i in (1..base.len()).rev() {
            let j = rng.next_below(i as u64 + 1) as usize;
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, v) in perm.iter_mut().enumerate() {
            *v = base[i & 255];
        }
        Self { perm }
    }

    /// Sample the field at `position` and `time`. Output lies in `[-1, 1]`.
    pub fn evaluate(&self, position: Vec3, time: f32) -> f32 {
        self.simplex3(position.x, position.y, position.z + time)
    }

    fn hash(&self, i: usize, j: usize, k: usize) -> usize {
        let pk = self.perm[k] as usize;
        let pj = self.perm[j + pk] as usize;
        self.perm[i + pj] as usize % GRAD3.len()
    }

    fn simplex3(&self, x: f32, y: f32, z: f32) -> f32 {
        let s = (x + y + z) * F3;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();

        let t = (i + j + k) * G3;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);

        // Which of the six tetrahedra of the skewed cube we are in.
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let offsets = [
            (x0, y0, z0),
            (
                x0 - i1 as f32 + G3,
                y0 - j1 as f32 + G3,
                z0 - k1 as f32 + G3,
            ),
            (
                x0 - i2 as f32 + 2.0 * G3,
                y0 - j2 as f32 + 2.0 * G3,
                z0 - k2 as f32 + 2.0 * G3,
            ),
            (x0 - 1.0 + 3.0 * G3, y0 - 1.0 + 3.0 * G3, z0 - 1.0 + 3.0 * G3),
        ];

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let kk = (k as i64 & 255) as usize;
        let corners = [
            (0, 0, 0),
            (i1, j1, k1),
            (i2, j2, k2),
            (1, 1, 1),
        ];

        let mut sum = 0.0f32;
        for ((ci, cj, ck), (dx, dy, dz)) in corners.into_iter().zip(offsets) {
            let falloff = KERNEL_RADIUS_SQ - dx * dx - dy * dy - dz * dz;
            if falloff <= 0.0 {
                continue;
            }
            let g = GRAD3[self.hash(ii + ci, jj + cj, kk + ck)];
            let f2 = falloff * falloff;
            sum += f2 * f2 * (g[0] * dx + g[1] * dy + g[2] * dz);
        }

        (OUTPUT_SCALE * sum).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/noise/field.rs"]
mod tests;
