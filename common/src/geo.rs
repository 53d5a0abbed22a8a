//! Geographic points and their `"lat,lng"` wire encoding.
//!
//! Callers exchange coordinates as a single `"lat,lng"` string. It is parsed
//! into a [`GeoPoint`] at the boundary and only rendered back to a string on
//! serialization, so the query layer only ever sees two `f64` values.
//!
//! The geography constructor in PostGIS takes `(x, y)`, i.e. longitude first.
//! [`GeoPoint::sql_params`] returns the pair in that order.

use crate::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting NaN and infinities.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() {
            return Err(ValidationError::invalid("location", "latitude is not finite"));
        }
        if !longitude.is_finite() {
            return Err(ValidationError::invalid("location", "longitude is not finite"));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// `(longitude, latitude)`, the bind order for `ST_MakePoint`.
    pub fn sql_params(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }

    /// Whether both components are within the WGS-84 ranges.
    pub fn is_within_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn approx_eq(&self, other: &GeoPoint, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() <= tolerance
            && (self.longitude - other.longitude).abs() <= tolerance
    }
}

impl FromStr for GeoPoint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let (lat, lng) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lng), None) => (lat.trim(), lng.trim()),
            _ => {
                return Err(ValidationError::invalid(
                    "location",
                    "expected exactly two comma separated values",
                ))
            }
        };

        let latitude = lat
            .parse::<f64>()
            .map_err(|_| ValidationError::invalid("location", "latitude is not a number"))?;
        let longitude = lng
            .parse::<f64>()
            .map_err(|_| ValidationError::invalid("location", "longitude is not a number"))?;

        GeoPoint::new(latitude, longitude)
    }
}

// f64's Display is the shortest representation that parses back to the same
// value, which keeps render -> parse lossless.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl Serialize for GeoPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GeoPoint::from_str(&s).map_err(serde::de::Error::custom)
    }
}
