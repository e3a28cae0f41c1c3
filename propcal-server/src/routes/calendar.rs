//! Calendar endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::NaiveDate;
use propcal_core::date_range::parse_date;
use propcal_core::grid;
use propcal_core::{RawEventRecord, RenderedCalendar, load_calendar};
use serde::{Deserialize, Serialize};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/properties/{id}/calendar", get(get_calendar))
        .route("/properties/{id}/events/{event_id}", get(get_event))
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Deserialize)]
pub struct WindowQuery {
    /// YYYY-MM-DD; defaults to today.
    pub anchor: Option<String>,
}

impl WindowQuery {
    fn anchor(&self) -> Result<NaiveDate, AppError> {
        match &self.anchor {
            Some(s) => Ok(parse_date("anchor", s)?),
            None => Ok(grid::today()),
        }
    }
}

/// GET /health
async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// GET /properties/:id/calendar - Populated seven-month window
async fn get_calendar(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<RenderedCalendar>, AppError> {
    let anchor = query.anchor()?;

    let rendered = load_calendar(
        state.source.as_ref(),
        &property_id,
        anchor,
        grid::today(),
        state.config.fetch_timeout(),
    )
    .await?;

    Ok(Json(rendered))
}

/// GET /properties/:id/events/:event_id - The record behind a grid event, exactly as fetched
async fn get_event(
    State(state): State<AppState>,
    Path((property_id, event_id)): Path<(String, String)>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<RawEventRecord>, AppError> {
    let anchor = query.anchor()?;

    let rendered = load_calendar(
        state.source.as_ref(),
        &property_id,
        anchor,
        grid::today(),
        state.config.fetch_timeout(),
    )
    .await?;

    rendered
        .event_detail(&event_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", event_id)))
}
