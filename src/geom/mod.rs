mod adjacency;
mod bbox;
mod crs;
mod geom;
mod proj;

pub(crate) use bbox::BoundingBox;
pub use adjacency::Neighbors;
pub use crs::Crs;
pub use geom::Geometries;
pub use proj::reproject;
pub(crate) use proj::Reprojector;
