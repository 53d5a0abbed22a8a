// Request validation for the event endpoints
// Raw query/body values are checked here; the repository trusts what it receives

use chrono::{DateTime, Utc};
use common::errors::ValidationError;
use common::geo::GeoPoint;
use common::models::CreateEventData;
use common::sanitize::MAX_SLUG_LEN;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

pub const MIN_RADIUS_METERS: f64 = 100.0;
pub const MAX_RADIUS_METERS: f64 = 50_000.0;
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;
pub const MAX_ADDRESS_LEN: usize = 2048;
pub const MAX_LOCALE_LEN: usize = 10;
pub const MAX_TITLE_LEN: usize = 50;

lazy_static! {
    static ref LOCATION_PATTERN: Regex =
        Regex::new(r"^-?\d{1,3}(\.\d+)?,-?\d{1,3}(\.\d+)?$").expect("valid location regex");
    static ref LOCALE_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]{2,8})*$").expect("valid locale regex");
    static ref SLUG_PATTERN: Regex =
        Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid slug regex");
}

/// Query string of a nearby search, as received
///
/// Every value is taken as text so that malformed numbers surface as
/// validation errors rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub location: Option<String>,
    pub radius: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
}

/// Validated nearby search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub location: GeoPoint,
    pub radius: f64,
    pub skip: i64,
    pub limit: i64,
}

impl SearchQuery {
    pub fn validate(self) -> Result<SearchParams, ValidationError> {
        let location = self
            .location
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("location".to_string()))
            .and_then(parse_location)?;

        let radius = self
            .radius
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("radius".to_string()))
            .and_then(parse_radius)?;

        let skip = match self.skip.as_deref() {
            None => 0,
            Some(raw) => parse_integer("skip", raw)?,
        };
        if skip < 0 {
            return Err(ValidationError::invalid("skip", "must be greater than or equal to 0"));
        }

        let limit = match self.limit.as_deref() {
            None => DEFAULT_LIMIT,
            Some(raw) => parse_integer("limit", raw)?,
        };
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::invalid(
                "limit",
                format!("must be between 1 and {}", MAX_LIMIT),
            ));
        }

        Ok(SearchParams {
            location,
            radius,
            skip,
            limit,
        })
    }
}

/// Body of `POST /events`
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub location: String,
    pub address: String,
    pub locale: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publisher_id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CreateEventRequest {
    pub fn validate(self) -> Result<CreateEventData, ValidationError> {
        let location = parse_location(&self.location)?;

        if self.address.chars().count() > MAX_ADDRESS_LEN {
            return Err(ValidationError::invalid(
                "address",
                format!("must be at most {} characters", MAX_ADDRESS_LEN),
            ));
        }

        if self.locale.len() > MAX_LOCALE_LEN || !LOCALE_PATTERN.is_match(&self.locale) {
            return Err(ValidationError::invalid(
                "locale",
                "must be a language tag such as es-MX",
            ));
        }

        let title_len = self.title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_LEN {
            return Err(ValidationError::invalid(
                "title",
                format!("must be between 1 and {} characters", MAX_TITLE_LEN),
            ));
        }

        if let Some(slug) = &self.slug {
            if slug.len() > MAX_SLUG_LEN || !SLUG_PATTERN.is_match(slug) {
                return Err(ValidationError::invalid(
                    "slug",
                    format!(
                        "must be at most {} lowercase letters, digits and single dashes",
                        MAX_SLUG_LEN
                    ),
                ));
            }
        }

        Ok(CreateEventData {
            id: self.id,
            location,
            address: self.address,
            locale: self.locale,
            title: self.title,
            description: self.description,
            slug: self.slug,
            tags: self.tags,
            publisher_id: self.publisher_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// `"lat,lng"` with latitude in [-90, 90] and longitude in [-180, 180]
pub fn parse_location(raw: &str) -> Result<GeoPoint, ValidationError> {
    if !LOCATION_PATTERN.is_match(raw) {
        return Err(ValidationError::invalid(
            "location",
            "expected \"latitude,longitude\"",
        ));
    }

    let point: GeoPoint = raw.parse()?;
    if !point.is_within_bounds() {
        return Err(ValidationError::invalid(
            "location",
            "latitude must be within [-90, 90] and longitude within [-180, 180]",
        ));
    }
    Ok(point)
}

fn parse_radius(raw: &str) -> Result<f64, ValidationError> {
    let radius: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::invalid("radius", "must be a number of meters"))?;

    if !radius.is_finite() || !(MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(&radius) {
        return Err(ValidationError::invalid(
            "radius",
            format!(
                "must be between {} and {} meters",
                MIN_RADIUS_METERS, MAX_RADIUS_METERS
            ),
        ));
    }
    Ok(radius)
}

fn parse_integer(field: &str, raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::invalid(field, "must be an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn query(location: Option<&str>, radius: Option<&str>) -> SearchQuery {
        SearchQuery {
            location: location.map(str::to_string),
            radius: radius.map(str::to_string),
            ..Default::default()
        }
    }

    fn request() -> CreateEventRequest {
        CreateEventRequest {
            id: None,
            location: "19.4248097,-99.1961895".to_string(),
            address: "Av. P.º de la Reforma 50, Polanco V Secc".to_string(),
            locale: "es-MX".to_string(),
            title: "El sol regresa".to_string(),
            description: "Luis Miguel en vivo".to_string(),
            slug: None,
            tags: vec![],
            publisher_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_search_rejects_bad_parameters() {
        let cases = [
            (None, None),
            (Some("19.4248097,-99.1961895"), None),
            (None, Some("650.0")),
            (Some("not an coordinate"), Some("650.0")),
            (Some("19.4248097,-99.1961895"), Some("not a radius")),
            (Some("19.4248097,-99.1961895"), Some("1000000000")),
            (Some("19.4248097,-99.1961895"), Some("50.0")),
            (Some("91.0,-99.1961895"), Some("650.0")),
            (Some("19.4,-181.0"), Some("650.0")),
            (Some("19.4 ,-99.1"), Some("650.0")),
            (Some("19.4248097,-99.1961895"), Some("NaN")),
        ];
        for (location, radius) in cases {
            assert!(
                query(location, radius).validate().is_err(),
                "expected rejection for {:?} / {:?}",
                location,
                radius
            );
        }
    }

    #[test]
    fn test_search_accepts_valid_parameters_with_defaults() {
        let params = query(Some("19.4295155,-99.1933465"), Some("1000.0"))
            .validate()
            .unwrap();
        assert_eq!(params.location, GeoPoint::new(19.4295155, -99.1933465).unwrap());
        assert_eq!(params.radius, 1000.0);
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_search_radius_bounds_are_inclusive() {
        assert!(query(Some("0,0"), Some("100")).validate().is_ok());
        assert!(query(Some("0,0"), Some("50000")).validate().is_ok());
        assert!(query(Some("0,0"), Some("99.9")).validate().is_err());
    }

    #[test]
    fn test_search_pagination_bounds() {
        let mut q = query(Some("0,0"), Some("500"));
        q.skip = Some("-1".to_string());
        assert_eq!(
            q.validate().unwrap_err(),
            ValidationError::invalid("skip", "must be greater than or equal to 0")
        );

        let mut q = query(Some("0,0"), Some("500"));
        q.limit = Some("0".to_string());
        assert!(q.validate().is_err());

        let mut q = query(Some("0,0"), Some("500"));
        q.limit = Some("101".to_string());
        assert!(q.validate().is_err());

        let mut q = query(Some("0,0"), Some("500"));
        q.skip = Some("20".to_string());
        q.limit = Some("50".to_string());
        let params = q.validate().unwrap();
        assert_eq!((params.skip, params.limit), (20, 50));
    }

    #[test]
    fn test_missing_location_reports_field() {
        let err = query(None, Some("500")).validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("location".to_string()));
    }

    #[test]
    fn test_create_request_valid() {
        let data = request().validate().unwrap();
        assert_eq!(data.location, GeoPoint::new(19.4248097, -99.1961895).unwrap());
        assert_eq!(data.locale, "es-MX");
        assert!(data.slug.is_none());
    }

    #[test]
    fn test_create_request_rejects_long_title() {
        let mut req = request();
        req.title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(req.validate().is_err());

        let mut req = request();
        req.title = "ñ".repeat(MAX_TITLE_LEN);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_title() {
        let mut req = request();
        req.title = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_locale_rules() {
        for locale in ["es", "es-MX", "zh-Hant-TW"] {
            let mut req = request();
            req.locale = locale.to_string();
            assert!(req.validate().is_ok(), "{} should be accepted", locale);
        }
        for locale in ["", "e", "es_MX", "es-MX-extra-long", "12-MX"] {
            let mut req = request();
            req.locale = locale.to_string();
            assert!(req.validate().is_err(), "{} should be rejected", locale);
        }
    }

    #[test]
    fn test_create_request_slug_rules() {
        let mut req = request();
        req.slug = Some("el-sol-regresa-2026".to_string());
        assert_eq!(req.validate().unwrap().slug.as_deref(), Some("el-sol-regresa-2026"));

        for slug in ["", "<b>Hola Mundo!</b>", "Hola", "-sol", "sol-", "el--sol", "el sol"] {
            let mut req = request();
            req.slug = Some(slug.to_string());
            assert!(req.validate().is_err(), "{:?} should be rejected", slug);
        }

        let mut req = request();
        req.slug = Some("a".repeat(MAX_SLUG_LEN + 1));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_long_address() {
        let mut req = request();
        req.address = "a".repeat(MAX_ADDRESS_LEN + 1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_bad_location() {
        let mut req = request();
        req.location = "19.4248097;-99.1961895".to_string();
        assert!(req.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_in_range_coordinates_are_accepted(
            lat in -90.0f64..=90.0,
            lng in -180.0f64..=180.0,
        ) {
            let raw = format!("{:.6},{:.6}", lat, lng);
            let point = parse_location(&raw).unwrap();
            prop_assert!(point.approx_eq(&GeoPoint::new(lat, lng).unwrap(), 1e-6));
        }

        #[test]
        fn prop_out_of_range_radius_is_rejected(radius in 50_000.001f64..1e9) {
            prop_assert!(parse_radius(&radius.to_string()).is_err());
        }
    }
}
