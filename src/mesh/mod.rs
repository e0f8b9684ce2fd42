pub(crate) mod base;
pub(crate) mod normals;
pub(crate) mod shapes;
