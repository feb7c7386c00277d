use std::fmt;

use anyhow::{anyhow, bail, Context, Result};
use proj4rs::proj::Proj;

/// A coordinate reference system, stored as a PROJ.4 definition.
#[derive(Debug, Clone)]
pub struct Crs {
    epsg: Option<u32>,
    proj4: String,
}

impl Crs {
    /// WGS84 lon/lat (EPSG:4326).
    pub fn wgs84() -> Self {
        Self { epsg: Some(4326), proj4: "+proj=longlat +datum=WGS84 +no_defs".into() }
    }

    /// Look up an EPSG code in the bundled definitions database.
    pub fn from_epsg(code: u32) -> Result<Self> {
        if code == 4326 { return Ok(Self::wgs84()) }

        let proj4 = u16::try_from(code).ok()
            .and_then(crs_definitions::from_code)
            .map(|def| def.proj4.trim().to_string())
            .ok_or_else(|| anyhow!("unknown EPSG code: {code}"))?;

        Ok(Self { epsg: Some(code), proj4 })
    }

    /// Wrap a raw PROJ.4 string, validating that proj4rs accepts it.
    pub fn from_proj4(proj4: &str) -> Result<Self> {
        Proj::from_proj_string(proj4)
            .with_context(|| format!("invalid PROJ.4 string: {proj4}"))?;
        Ok(Self { epsg: None, proj4: proj4.trim().to_string() })
    }

    /// Parse "EPSG:xxxx", a bare code, an OGC URN or a PROJ.4 string.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with("+proj=") { return Self::from_proj4(s) }

        let upper = s.to_ascii_uppercase();
        if upper.ends_with("CRS84") { return Ok(Self::wgs84()) }

        let code = match upper.rsplit_once("EPSG::") {
            Some((_, code)) => code,
            None => upper.strip_prefix("EPSG:").unwrap_or(&upper),
        };

        match code.parse::<u32>() {
            Ok(code) => Self::from_epsg(code),
            Err(_) => bail!("unrecognised CRS: {s}"),
        }
    }

    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    #[inline] pub fn proj4(&self) -> &str { &self.proj4 }

    /// Geographic CRSs take degrees in and out; proj4rs works in radians for them.
    #[inline] pub fn is_geographic(&self) -> bool { self.proj4.contains("+proj=longlat") }

    pub(crate) fn to_proj(&self) -> Result<Proj> {
        Proj::from_proj_string(&self.proj4)
            .with_context(|| format!("failed to build PROJ.4: {}", self.proj4))
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            _ => self.proj4 == other.proj4,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epsg {
            Some(code) => write!(f, "EPSG:{code}"),
            None => f.write_str(&self.proj4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!(Crs::parse("EPSG:4326").unwrap(), Crs::wgs84());
        assert_eq!(Crs::parse("4326").unwrap(), Crs::wgs84());
        assert_eq!(Crs::parse("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(), Crs::wgs84());
        assert_eq!(Crs::parse("urn:ogc:def:crs:EPSG::3857").unwrap().epsg(), Some(3857));
    }

    #[test]
    fn utm_is_projected() {
        let utm = Crs::from_epsg(32735).unwrap();
        assert!(!utm.is_geographic());
        assert!(Crs::wgs84().is_geographic());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Crs::parse("not a crs").is_err());
    }
}
