use std::{fs::File, io::{BufReader, Read, Seek}, path::Path};

use anyhow::{bail, ensure, Context, Result};
use ndarray::Array2;
use tiff::{decoder::{Decoder, DecodingResult}, tags::Tag};
use tracing::{debug, warn};

use crate::geom::Crs;
use crate::raster::{GeoTransform, Raster, RasterMeta};

// GeoTIFF tag IDs
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// GeoKey IDs
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
const USER_DEFINED: u16 = 32767;

fn open(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open raster: {}", path.display()))?;
    Decoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to decode TIFF header: {}", path.display()))
}

fn f64_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: u16) -> Result<Option<Vec<f64>>> {
    decoder.find_tag(Tag::from_u16_exhaustive(tag))?
        .map(|value| value.into_f64_vec())
        .transpose()
        .with_context(|| format!("invalid GeoTIFF tag {tag}"))
}

/// Read the affine transform from ModelTransformation or ModelPixelScale + ModelTiepoint.
fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    if let Some(m) = f64_tag(decoder, MODEL_TRANSFORMATION)? {
        ensure!(m.len() >= 8, "ModelTransformation must have 16 values, found {}", m.len());
        return Ok(GeoTransform { a: m[0], b: m[1], c: m[3], d: m[4], e: m[5], f: m[7] });
    }

    let scale = f64_tag(decoder, MODEL_PIXEL_SCALE)?;
    let tiepoint = f64_tag(decoder, MODEL_TIEPOINT)?;
    match (scale, tiepoint) {
        (Some(scale), Some(tie)) => {
            ensure!(scale.len() >= 2 && tie.len() >= 6, "malformed ModelPixelScale/ModelTiepoint");
            // Tiepoint (i, j, k, x, y, z) maps pixel (i, j) to world (x, y)
            let (sx, sy) = (scale[0], scale[1]);
            Ok(GeoTransform {
                a: sx, b: 0.0, c: tie[3] - tie[0] * sx,
                d: 0.0, e: -sy, f: tie[4] + tie[1] * sy,
            })
        }
        _ => bail!("raster has no georeferencing (ModelTransformation or ModelPixelScale + ModelTiepoint)"),
    }
}

/// Read the EPSG code from the GeoKey directory, if one is declared.
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<Crs>> {
    let Some(keys) = decoder.find_tag(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY))? else { return Ok(None) };
    let keys = keys.into_u16_vec().context("invalid GeoKeyDirectory")?;

    // [version, revision, minor, count, (key, location, count, value)*]
    let declared = keys.get(3).copied().unwrap_or(0) as usize;
    let mut projected = None;
    let mut geographic = None;
    for entry in keys.get(4..).unwrap_or_default().chunks_exact(4).take(declared) {
        let (key, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 { continue } // value stored in another tag
        match key {
            PROJECTED_CS_TYPE_GEO_KEY => projected = Some(value),
            GEOGRAPHIC_TYPE_GEO_KEY => geographic = Some(value),
            _ => {}
        }
    }

    match projected.or(geographic) {
        Some(USER_DEFINED) | None => {
            warn!("[raster] GeoTIFF declares no EPSG code; pass a CRS override");
            Ok(None)
        }
        Some(code) => Ok(Some(Crs::from_epsg(code as u32)?)),
    }
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::from_u16_exhaustive(GDAL_NODATA))? else { return Ok(None) };
    let text = value.into_string().context("invalid GDAL_NODATA tag")?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    Ok(text.parse::<f64>().ok())
}

fn read_meta<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<RasterMeta> {
    let (width, height) = decoder.dimensions()?;
    let transform = read_transform(decoder)?;
    transform.ensure_north_up()?;

    Ok(RasterMeta {
        crs: read_crs(decoder)?,
        transform,
        rows: height as usize,
        cols: width as usize,
        nodata: read_nodata(decoder)?,
    })
}

impl RasterMeta {
    /// Read the grid reference (CRS, transform, shape, nodata) without decoding pixels.
    pub fn read(path: &Path) -> Result<Self> {
        let mut decoder = open(path)?;
        read_meta(&mut decoder)
            .with_context(|| format!("Failed to read raster metadata: {}", path.display()))
    }
}

impl Raster {
    /// Decode the first band of a GeoTIFF as f64.
    pub fn read(path: &Path) -> Result<Self> {
        let mut decoder = open(path)?;
        let meta = read_meta(&mut decoder)
            .with_context(|| format!("Failed to read raster metadata: {}", path.display()))?;

        let samples = decoder.find_tag(Tag::SamplesPerPixel)?
            .map(|value| value.into_u32())
            .transpose()?
            .unwrap_or(1) as usize;

        let pixels: Vec<f64> = match decoder.read_image()
            .with_context(|| format!("Failed to decode raster pixels: {}", path.display()))?
        {
            DecodingResult::U8(buf) => buf.into_iter().step_by(samples).map(f64::from).collect(),
            DecodingResult::U16(buf) => buf.into_iter().step_by(samples).map(f64::from).collect(),
            DecodingResult::U32(buf) => buf.into_iter().step_by(samples).map(f64::from).collect(),
            DecodingResult::U64(buf) => buf.into_iter().step_by(samples).map(|v| v as f64).collect(),
            DecodingResult::I8(buf) => buf.into_iter().step_by(samples).map(f64::from).collect(),
            DecodingResult::I16(buf) => buf.into_iter().step_by(samples).map(f64::from).collect(),
            DecodingResult::I32(buf) => buf.into_iter().step_by(samples).map(f64::from).collect(),
            DecodingResult::I64(buf) => buf.into_iter().step_by(samples).map(|v| v as f64).collect(),
            DecodingResult::F32(buf) => buf.into_iter().step_by(samples).map(f64::from).collect(),
            DecodingResult::F64(buf) => buf.into_iter().step_by(samples).collect(),
            #[allow(unreachable_patterns)]
            _ => bail!("unsupported pixel format in {}", path.display()),
        };

        debug!("[raster] read {}x{} from {}", meta.cols, meta.rows, path.display());
        let data = Array2::from_shape_vec((meta.rows, meta.cols), pixels)
            .with_context(|| format!("pixel count does not match raster shape in {}", path.display()))?;

        Ok(Raster { data, meta })
    }
}
