// Event repository implementation
// Nearby search, sanitized creation, and deletion over a Session

use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use super::queries::event_queries;
use crate::db::Session;
use crate::errors::SessionError;
use crate::geo::GeoPoint;
use crate::models::{CreateEventData, Event, EventRow};
use crate::sanitize::sanitize;

/// Repository for event-related database operations
///
/// The facade the HTTP layer calls. Inputs are expected to be validated
/// already; nothing here re-checks bounds on radius, skip or limit.
#[derive(Debug)]
pub struct EventRepository {
    session: Session,
}

impl EventRepository {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Hand the session back, e.g. to release a pinned connection
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Find events strictly closer than `radius` meters to `location`
    ///
    /// Results are ordered by creation time, then id, and paginated with
    /// `limit`/`skip`.
    #[instrument(skip(self), fields(location = %location))]
    pub async fn search_events(
        &self,
        location: GeoPoint,
        radius: f64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Event>, SessionError> {
        let (lng, lat) = location.sql_params();
        let rows = self
            .session
            .fetch_rows(
                sqlx::query_as::<_, EventRow>(&event_queries::SEARCH_NEARBY)
                    .bind(lng)
                    .bind(lat)
                    .bind(radius)
                    .bind(limit)
                    .bind(skip),
            )
            .await?;

        tracing::debug!(count = rows.len(), "Found nearby events");
        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Sanitize `data` and persist it, returning the stored event
    ///
    /// # Panics
    /// If the insert succeeds but yields no row. That can only be a defect in
    /// the statement, never a runtime condition.
    #[instrument(skip(self, data), fields(title_len = data.title.len()))]
    pub async fn create_event(&self, data: &CreateEventData) -> Result<Event, SessionError> {
        let clean = sanitize(data);
        let (lng, lat) = clean.location.sql_params();

        let row = self
            .session
            .fetch_first(
                sqlx::query_as::<_, EventRow>(&event_queries::INSERT_RETURNING)
                    .bind(lng)
                    .bind(lat)
                    .bind(clean.id)
                    .bind(&clean.address)
                    .bind(&clean.locale)
                    .bind(&clean.title)
                    .bind(&clean.description)
                    .bind(&clean.slug)
                    .bind(Json(&clean.tags))
                    .bind(clean.publisher_id)
                    .bind(clean.created_at)
                    .bind(clean.updated_at),
            )
            .await?;

        let Some(row) = row else {
            tracing::error!(event_id = %clean.id, "Insert returned no row");
            panic!("insert into events returned no row for id {}", clean.id);
        };

        tracing::info!(event_id = %row.id, slug = %row.slug, "Event created");
        Ok(Event::from(row))
    }

    /// Delete an event; `Ok(false)` when no such id exists
    #[instrument(skip(self))]
    pub async fn delete_event_by_id(&self, id: Uuid) -> Result<bool, SessionError> {
        let status = self
            .session
            .execute(sqlx::query(event_queries::DELETE_BY_ID).bind(id))
            .await?;

        let deleted = status.affected_exactly_one();
        tracing::info!(event_id = %id, status = %status, deleted, "Event delete executed");
        Ok(deleted)
    }
}
