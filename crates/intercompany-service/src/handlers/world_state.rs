//! Raw world-state lookup.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use intercompany_store::KvStore;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Return the bytes stored at `key` as JSON.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    _caller: ServiceAuth,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state
        .store
        .get(&key)?
        .ok_or_else(|| ApiError::NotFound(format!("key not found: {key}")))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], value))
}
