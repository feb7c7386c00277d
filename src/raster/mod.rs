mod distance;
mod raster;
mod rasterize;
mod read;
mod zonal;

pub use distance::distance_transform_edt;
pub use raster::{GeoTransform, Raster, RasterMeta, Stat};
pub(crate) use raster::median;
pub use rasterize::rasterize;
pub use zonal::zonal_stats;
