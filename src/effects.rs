pub(crate) mod composite;
pub(crate) mod melt;
pub(crate) mod orbital;
pub(crate) mod preset;
pub(crate) mod scanline;
pub(crate) mod slices;
pub(crate) mod vignette;
pub(crate) mod warp;
