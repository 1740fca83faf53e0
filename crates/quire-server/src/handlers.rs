// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handlers for the `/__quire` introspection routes.

use std::sync::Arc;

use axum::{extract::State, Json};
use quire_plugin::EntryStatus;
use serde::Serialize;

use crate::app::App;

/// Response body for GET /__quire/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Framework version extensions are gated against.
    pub version: String,
}

/// Response body for GET /__quire/extensions.
#[derive(Debug, Serialize)]
pub struct ExtensionsResponse {
    pub registered: Vec<EntryStatus>,
    pub activated: Vec<String>,
}

pub async fn get_health(State(app): State<Arc<App>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: app.registry().framework_version().to_string(),
    })
}

pub async fn get_extensions(State(app): State<Arc<App>>) -> Json<ExtensionsResponse> {
    Json(ExtensionsResponse {
        registered: app.registry().statuses(),
        activated: app.activated(),
    })
}
