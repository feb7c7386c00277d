mod layer;

pub use layer::{planar_length, VectorLayer};
