//! Pixel-level segmentation primitives shared by the detector, the fusion
//! collaborators and the layer extractor.
pub mod components;
pub mod foreground;
pub mod morph;

pub use components::{
    band_components_in, components_in_band, connected_components, label_components, Component,
    Connectivity, Labeling,
};
pub use foreground::foreground_mask;
pub use morph::{ElementShape, MorphOp, StructuringElement};
