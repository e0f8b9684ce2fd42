pub(crate) mod ease;
pub(crate) mod step;
pub(crate) mod target;
pub(crate) mod timeline;
