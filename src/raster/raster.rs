use std::{fmt, str::FromStr};

use anyhow::{bail, ensure, Result};
use geo::{Coord, Rect};
use ndarray::Array2;

use crate::geom::Crs;

/// Affine pixel -> world transform, laid out like GDAL/rasterio:
/// `x = a*col + b*row + c`, `y = d*col + e*row + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// North-up transform from the upper-left corner and pixel size.
    pub fn from_origin(west: f64, north: f64, xsize: f64, ysize: f64) -> Self {
        Self { a: xsize, b: 0.0, c: west, d: 0.0, e: -ysize, f: north }
    }

    /// Pixel width in CRS units.
    #[inline] pub fn pixel_width(&self) -> f64 { self.a }

    #[inline] pub fn is_north_up(&self) -> bool { self.b == 0.0 && self.d == 0.0 }

    /// World coordinate of the given fractional pixel position.
    #[inline]
    pub fn to_world(&self, col: f64, row: f64) -> Coord<f64> {
        Coord {
            x: self.a * col + self.b * row + self.c,
            y: self.d * col + self.e * row + self.f,
        }
    }

    /// World coordinate of the centre of pixel (col, row).
    #[inline]
    pub fn pixel_center(&self, col: usize, row: usize) -> Coord<f64> {
        self.to_world(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Fractional (col, row) of a world coordinate. North-up only.
    #[inline]
    pub fn to_pixel(&self, coord: Coord<f64>) -> (f64, f64) {
        ((coord.x - self.c) / self.a, (coord.y - self.f) / self.e)
    }

    /// Clamp a world rectangle to the pixel window `[col0, col1) x [row0, row1)` of a
    /// `rows x cols` grid, rounding outward. Returns None when it misses the grid.
    pub(crate) fn window(&self, rect: &Rect<f64>, rows: usize, cols: usize) -> Option<(usize, usize, usize, usize)> {
        let (c0, r0) = self.to_pixel(rect.min());
        let (c1, r1) = self.to_pixel(rect.max());

        let (cmin, cmax) = (c0.min(c1).floor(), c0.max(c1).ceil());
        let (rmin, rmax) = (r0.min(r1).floor(), r0.max(r1).ceil());

        let col0 = cmin.max(0.0) as usize;
        let row0 = rmin.max(0.0) as usize;
        let col1 = (cmax.min(cols as f64)).max(0.0) as usize;
        let row1 = (rmax.min(rows as f64)).max(0.0) as usize;

        (col0 < col1 && row0 < row1).then_some((col0, col1, row0, row1))
    }

    pub(crate) fn ensure_north_up(&self) -> Result<()> {
        ensure!(self.is_north_up(), "rotated rasters are not supported: {self:?}");
        ensure!(self.a != 0.0 && self.e != 0.0, "degenerate raster transform: {self:?}");
        Ok(())
    }
}

/// Grid reference shared by a raster and anything rasterized onto it.
#[derive(Debug, Clone)]
pub struct RasterMeta {
    pub crs: Option<Crs>,
    pub transform: GeoTransform,
    pub rows: usize,
    pub cols: usize,
    pub nodata: Option<f64>,
}

impl RasterMeta {
    #[inline] pub fn shape(&self) -> (usize, usize) { (self.rows, self.cols) }
}

/// A single-band raster held in memory as `(rows, cols)`.
#[derive(Debug, Clone)]
pub struct Raster {
    pub data: Array2<f64>,
    pub meta: RasterMeta,
}

impl Raster {
    pub fn new(data: Array2<f64>, transform: GeoTransform, crs: Option<Crs>, nodata: Option<f64>) -> Self {
        let (rows, cols) = data.dim();
        Self { data, meta: RasterMeta { crs, transform, rows, cols, nodata } }
    }

    #[inline] pub fn transform(&self) -> &GeoTransform { &self.meta.transform }

    #[inline] pub fn crs(&self) -> Option<&Crs> { self.meta.crs.as_ref() }

    #[inline] pub fn nodata(&self) -> Option<f64> { self.meta.nodata }

    /// Whether a cell value counts towards statistics.
    #[inline]
    pub fn is_valid(&self, value: f64) -> bool {
        !value.is_nan() && self.meta.nodata.is_none_or(|nodata| value != nodata)
    }
}

/// Aggregate computed over the cells of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Sum,
    Mean,
    Max,
    Min,
    Count,
    Median,
}

impl Stat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Sum => "sum",
            Stat::Mean => "mean",
            Stat::Max => "max",
            Stat::Min => "min",
            Stat::Count => "count",
            Stat::Median => "median",
        }
    }

    /// Reduce a list of valid values. An empty zone counts 0 and has no other statistic.
    pub(crate) fn reduce(&self, values: &mut [f64]) -> Option<f64> {
        if values.is_empty() {
            return (*self == Stat::Count).then_some(0.0);
        }
        Some(match self {
            Stat::Sum => values.iter().sum(),
            Stat::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Stat::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Stat::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Stat::Count => values.len() as f64,
            Stat::Median => median(values)?,
        })
    }
}

impl FromStr for Stat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "sum" => Stat::Sum,
            "mean" => Stat::Mean,
            "max" => Stat::Max,
            "min" => Stat::Min,
            "count" => Stat::Count,
            "median" => Stat::Median,
            other => bail!("unsupported raster operation: '{other}'"),
        })
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Median of a list of non-NaN values (sorts in place).
pub(crate) fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() { return None }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 { (values[mid - 1] + values[mid]) / 2.0 } else { values[mid] })
}
