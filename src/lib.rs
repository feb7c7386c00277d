#![doc = "Spider public API"]
mod cells;
mod common;
mod features;
mod geom;
mod grid;
mod models;
mod raster;
mod vector;

#[doc(inline)]
pub use cells::{Cells, ColumnValues};

#[doc(inline)]
pub use common::{expand_user, INDEX_COLUMN};

#[doc(inline)]
pub use geom::{reproject, Crs, Geometries, Neighbors};

#[doc(inline)]
pub use raster::{distance_transform_edt, rasterize, zonal_stats, GeoTransform, Raster, RasterMeta, Stat};

#[doc(inline)]
pub use vector::{planar_length, VectorLayer};

#[doc(inline)]
pub use features::{
    add_features, add_raster_layer, add_vector_layer, fix_column, round_column, Enrichment,
    FeatureFailure, FeatureKind, FeatureSpec, Fix, NoValue, VectorOperation, POP_COLUMN,
};

#[doc(inline)]
pub use models::{
    apply_model, apply_objective, filter_mask, objective, Filter, FilterOp, GridDistanceModel,
    GridTown, HouseholdModel, HouseholdTown, Model, ModelKind, ModelResult, ObjectiveInputs,
    ObjectiveWeights, Pars, TestModel, TestTown, PROFIT_COLUMN,
};

#[doc(inline)]
pub use grid::{cells_crossing, extend_grid};
