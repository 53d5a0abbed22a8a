use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::geo::GeoPoint;

// ============================================================================
// Event Models
// ============================================================================

/// Event as exposed to callers (the EventView wire shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub location: GeoPoint,
    pub address: String,
    pub locale: String,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub publisher_id: Option<Uuid>,
    pub publisher_display_name: Option<String>,
    pub publisher_display_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape produced by `event_queries::SELECT_COLUMNS`
///
/// Column names and order must match the projection constant; the location
/// is read as two plain floats extracted from the stored geography.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub locale: String,
    pub title: String,
    pub description: String,
    pub slug: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub publisher_id: Option<Uuid>,
    pub publisher_display_name: Option<String>,
    pub publisher_display_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            location: GeoPoint {
                latitude: row.latitude,
                longitude: row.longitude,
            },
            address: row.address,
            locale: row.locale,
            title: row.title,
            description: row.description,
            slug: row.slug,
            tags: row.tags,
            publisher_id: row.publisher_id,
            publisher_display_name: row.publisher_display_name,
            publisher_display_image: row.publisher_display_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Creation payload, already validated by the caller
///
/// Optional fields are filled in by [`crate::sanitize::sanitize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventData {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub location: GeoPoint,
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

/// Sanitized, fully populated insert value
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub id: Uuid,
    pub location: GeoPoint,
    pub address: String,
    pub locale: String,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub publisher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> EventRow {
        let now = Utc::now();
        EventRow {
            id: Uuid::new_v4(),
            latitude: 19.4248097,
            longitude: -99.1961895,
            address: "Av. P.º de la Reforma 50".to_string(),
            locale: "es-MX".to_string(),
            title: "El sol regresa".to_string(),
            description: "Luis Miguel en vivo".to_string(),
            slug: "el-sol-regresa".to_string(),
            tags: vec!["musica".to_string()],
            publisher_id: None,
            publisher_display_name: None,
            publisher_display_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_maps_coordinates_into_location() {
        let event = Event::from(sample_row());
        assert_eq!(event.location.to_string(), "19.4248097,-99.1961895");
    }

    #[test]
    fn test_event_view_wire_shape() {
        let event = Event::from(sample_row());
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["location"], "19.4248097,-99.1961895");
        assert_eq!(value["tags"], serde_json::json!(["musica"]));
        assert!(value["publisher_id"].is_null());
        assert!(value["publisher_display_name"].is_null());
        assert!(value["publisher_display_image"].is_null());
        for key in ["id", "address", "locale", "title", "description", "slug", "created_at", "updated_at"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_create_payload_defaults_optional_fields() {
        let payload: CreateEventData = serde_json::from_value(serde_json::json!({
            "location": "19.428909,-99.1692604",
            "address": "El Ángel de la Independencia",
            "locale": "es-MX",
            "title": "Porra de la selección",
            "description": "Celebramos",
        }))
        .unwrap();

        assert!(payload.id.is_none());
        assert!(payload.slug.is_none());
        assert!(payload.tags.is_empty());
        assert!(payload.created_at.is_none());
        assert_eq!(payload.location.latitude, 19.428909);
    }
}
