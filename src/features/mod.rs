mod descriptor;
mod enrich;
mod fix;
mod raster_layer;
mod vector_layer;

pub use descriptor::{FeatureKind, FeatureSpec, Fix, NoValue};
pub use enrich::{add_features, Enrichment, FeatureFailure, POP_COLUMN};
pub use fix::{fix_column, round_column};
pub use raster_layer::add_raster_layer;
pub use vector_layer::{add_vector_layer, VectorOperation};
