//! Chaincode invocation handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use intercompany_chaincode::Function;
use intercompany_store::StagedTransaction;
use serde::{Deserialize, Serialize};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Invocation request.
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    /// Function name, e.g. `create_account`.
    pub function: String,
    /// Positional string arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Invocation response.
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    /// The function that ran.
    pub function: String,
    /// Returned bytes as UTF-8 text; `null` when the function returns nothing.
    pub payload: Option<String>,
}

/// Run one chaincode function.
///
/// Invocations are serialized. Each runs against its own staged transaction:
/// on success every write is committed in one batch, on failure none are.
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    caller: ServiceAuth,
    Json(request): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, ApiError> {
    let _guard = state.invoke_lock.lock().await;

    let staged = StagedTransaction::new(state.store.as_ref());
    let result = state
        .chaincode
        .invoke(&staged, &request.function, &request.args);

    let payload = match result {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(
                function = %request.function,
                service = %caller.service_name,
                error = %err,
                "Invocation failed; staged writes discarded"
            );
            return Err(err.into());
        }
    };

    let read_only = request
        .function
        .parse::<Function>()
        .is_ok_and(Function::is_read_only);
    if !read_only {
        let writes = staged.pending()?;
        staged.commit()?;
        tracing::info!(
            function = %request.function,
            service = %caller.service_name,
            writes,
            "Invocation committed"
        );
    }

    Ok(Json(InvokeResponse {
        function: request.function,
        payload: payload.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
    }))
}
