//! Service authentication.
//!
//! Callers present the configured service API key in the `x-api-key` header.
//! With no key configured every caller is accepted.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// A caller allowed to invoke the ledger.
#[derive(Debug, Clone)]
pub struct ServiceAuth {
    /// The service name or identifier, from `x-service-name`.
    pub service_name: String,
}

impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            if let Some(expected_key) = state.config.service_api_key.as_ref() {
                let api_key = parts
                    .headers
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .ok_or(ApiError::Unauthorized)?;

                if api_key != expected_key {
                    tracing::warn!("Rejected invoke with wrong service API key");
                    return Err(ApiError::Unauthorized);
                }
            }

            let service_name = parts
                .headers
                .get("x-service-name")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();

            Ok(ServiceAuth { service_name })
        })
    }
}
