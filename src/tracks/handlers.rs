use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{response::ApiResponse, state::AppState, tracks::repo};

use super::dto::{CreateTrackRequest, PatchTrackRequest, TrackDetails, TrackSummary};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/tracks", get(list_tracks))
        .route("/tracks/:id", get(get_track))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/tracks", post(create_track))
        .route(
            "/tracks/:id",
            put(update_track).patch(patch_track).delete(delete_track),
        )
}

// --- handlers ---

type TrackError = (StatusCode, Json<ApiResponse<()>>);

#[instrument(skip(state))]
pub async fn list_tracks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TrackSummary>>>, TrackError> {
    let tracks = repo::list(&state.db).await.map_err(internal)?;
    let items = tracks.into_iter().map(TrackSummary::from).collect();
    Ok(Json(ApiResponse::ok(items)))
}

#[instrument(skip(state))]
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TrackDetails>>, TrackError> {
    match repo::find_by_id(&state.db, id).await.map_err(internal)? {
        Some(track) => Ok(Json(ApiResponse::ok(track.into()))),
        None => Err(not_found()),
    }
}

#[instrument(skip(state, payload))]
pub async fn create_track(
    State(state): State<AppState>,
    Json(payload): Json<CreateTrackRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<TrackDetails>>), TrackError> {
    let duplicate = repo::exists_duplicate(
        &state.db,
        None,
        &payload.name,
        &payload.location,
        &payload.country,
    )
    .await
    .map_err(internal)?;
    if duplicate {
        return Err(conflict("Track already exists!"));
    }

    let track = payload.into_track(Uuid::new_v4());
    repo::insert(&state.db, &track).await.map_err(internal)?;
    info!(track_id = %track.id, name = %track.name, "track created");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/api/tracks/{}", track.id).parse().unwrap(),
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(ApiResponse::ok_with(
            track.into(),
            "Track created successfully!",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTrackRequest>,
) -> Result<Json<ApiResponse<TrackDetails>>, TrackError> {
    if repo::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .is_none()
    {
        return Err(not_found());
    }

    let duplicate = repo::exists_duplicate(
        &state.db,
        Some(id),
        &payload.name,
        &payload.location,
        &payload.country,
    )
    .await
    .map_err(internal)?;
    if duplicate {
        return Err(conflict(
            "Track with the same name, location, and country already exists!",
        ));
    }

    let track = payload.into_track(id);
    repo::update(&state.db, &track).await.map_err(internal)?;
    info!(track_id = %track.id, "track replaced");

    Ok(Json(ApiResponse::ok_with(
        track.into(),
        "Track updated successfully!",
    )))
}

#[instrument(skip(state, payload))]
pub async fn patch_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PatchTrackRequest>,
) -> Result<Json<ApiResponse<TrackDetails>>, TrackError> {
    let Some(mut track) = repo::find_by_id(&state.db, id).await.map_err(internal)? else {
        return Err(not_found());
    };

    payload.apply(&mut track);

    // The merged row must stay unique including its layout version.
    let duplicate = repo::exists_duplicate_layout(
        &state.db,
        Some(id),
        &track.name,
        &track.location,
        &track.country,
        &track.layout_version,
    )
    .await
    .map_err(internal)?;
    if duplicate {
        return Err(conflict(
            "Track with the same name, location, and country already exists!",
        ));
    }

    repo::update(&state.db, &track).await.map_err(internal)?;
    info!(track_id = %track.id, "track patched");

    Ok(Json(ApiResponse::ok_with(
        track.into(),
        "Track updated successfully!",
    )))
}

#[instrument(skip(state))]
pub async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, TrackError> {
    if !repo::delete(&state.db, id).await.map_err(internal)? {
        return Err(not_found());
    }
    info!(track_id = %id, "track deleted");
    Ok(Json(ApiResponse::message("Track deleted successfully!")))
}

// --- error helpers ---

fn not_found() -> TrackError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::fail("Track not found")),
    )
}

fn conflict(message: &str) -> TrackError {
    (StatusCode::CONFLICT, Json(ApiResponse::fail(message)))
}

fn internal(e: anyhow::Error) -> TrackError {
    error!(error = %e, "track storage failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::fail("Internal server error")),
    )
}
