mod csv;
mod geojson;
mod properties;
mod shp;

pub(crate) use csv::*;
pub(crate) use self::geojson::*;
pub use properties::INDEX_COLUMN;
pub(crate) use properties::{properties_to_dataframe, row_to_json};
pub(crate) use shp::*;
