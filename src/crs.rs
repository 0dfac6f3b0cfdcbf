use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CoordGeomError;

/// A coordinate reference system identified in the form `AUTHORITY:CODE`, such as
/// `EPSG:4326`.
///
/// Coordinates are never reprojected; the CRS is only recorded on the layer so that
/// other tools interpret the numbers correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs {
    authority: String,
    code: String,
}

impl Crs {
    /// Construct from an authority:code string.
    pub fn from_authority_code(value: &str) -> Result<Self, CoordGeomError> {
        // Also accept OGC URNs as written by older GeoJSON producers.
        let value = value.trim();
        let value = value
            .strip_prefix("urn:ogc:def:crs:")
            .map(|rest| rest.replacen("::", ":", 1))
            .unwrap_or_else(|| value.to_string());

        let (authority, code) = value
            .split_once(':')
            .ok_or_else(|| CoordGeomError::Crs(format!("expected AUTHORITY:CODE, got '{value}'")))?;
        let (authority, code) = (authority.trim(), code.trim());
        if authority.is_empty() || code.is_empty() || code.contains(':') {
            return Err(CoordGeomError::Crs(format!(
                "expected AUTHORITY:CODE, got '{value}'"
            )));
        }

        Ok(Self {
            authority: authority.to_ascii_uppercase(),
            code: code.to_string(),
        })
    }

    pub fn wgs84() -> Self {
        Self {
            authority: "EPSG".to_string(),
            code: "4326".to_string(),
        }
    }

    pub fn web_mercator() -> Self {
        Self {
            authority: "EPSG".to_string(),
            code: "3857".to_string(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The CRS as a GeoJSON named CRS member.
    pub(crate) fn to_geojson_member(&self) -> Value {
        json!({
            "type": "name",
            "properties": {
                "name": format!("urn:ogc:def:crs:{}::{}", self.authority, self.code),
            }
        })
    }

    /// Read a GeoJSON named CRS member.
    pub(crate) fn from_geojson_member(value: &Value) -> Option<Self> {
        let name = value.get("properties")?.get("name")?.as_str()?;
        Self::from_authority_code(name).ok()
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

impl FromStr for Crs {
    type Err = CoordGeomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_authority_code(s)
    }
}

impl TryFrom<String> for Crs {
    type Error = CoordGeomError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_authority_code(&value)
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn crs_authority_code() {
        let crs = Crs::from_authority_code("epsg:3857").unwrap();
        assert_eq!(crs.authority(), "EPSG");
        assert_eq!(crs.code(), "3857");
        assert_eq!(crs, Crs::web_mercator());
        assert_eq!(crs.to_string(), "EPSG:3857");
    }

    #[test]
    fn crs_rejects_garbage() {
        assert!(Crs::from_authority_code("4326").is_err());
        assert!(Crs::from_authority_code("EPSG:").is_err());
        assert!(Crs::from_authority_code(":4326").is_err());
    }

    #[test]
    fn crs_geojson_member() {
        let crs = Crs::wgs84();
        let member = crs.to_geojson_member();
        assert_eq!(
            member["properties"]["name"],
            Value::String("urn:ogc:def:crs:EPSG::4326".to_string())
        );
        assert_eq!(Crs::from_geojson_member(&member), Some(crs));
    }

    #[test]
    fn crs_serde() {
        let crs = Crs::wgs84();
        assert_eq!(serde_json::to_string(&crs).unwrap(), r#""EPSG:4326""#);
        let parsed: Crs = serde_json::from_str(r#""EPSG:2056""#).unwrap();
        assert_eq!(parsed.code(), "2056");
        assert!(serde_json::from_str::<Crs>(r#""nonsense""#).is_err());
    }
}
