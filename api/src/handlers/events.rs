use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::handlers::ErrorResponse;
use crate::state::AppState;
use crate::validation::{CreateEventRequest, SearchQuery};
use common::models::Event;

/// Events strictly within `radius` meters of `location`
#[tracing::instrument(skip(state))]
pub async fn search_nearby(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Event>>, ErrorResponse> {
    let params = query.validate().map_err(|e| {
        tracing::debug!(error = %e, "Rejected search parameters");
        ErrorResponse::from(e)
    })?;

    let events = state
        .events()
        .search_events(params.location, params.radius, params.skip, params.limit)
        .await?;

    tracing::info!(
        location = %params.location,
        radius = params.radius,
        count = events.len(),
        "Nearby search completed"
    );
    Ok(Json(events))
}

/// Create an event from a validated payload
#[tracing::instrument(skip(state, req))]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ErrorResponse> {
    let data = req.validate().map_err(|e| {
        tracing::debug!(error = %e, "Rejected event payload");
        ErrorResponse::from(e)
    })?;

    let event = state.events().create_event(&data).await?;

    tracing::info!(event_id = %event.id, slug = %event.slug, "Event created via API");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Delete an event by id
#[tracing::instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ErrorResponse> {
    if state.events().delete_event_by_id(id).await? {
        tracing::info!(event_id = %id, "Event deleted via API");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ErrorResponse::new(
            "not_found",
            format!("Event {} not found", id),
        ))
    }
}
