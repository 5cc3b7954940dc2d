// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{models::RegisterRequest, state::AppState};

pub mod health;
pub mod registry;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/balance", get(registry::get_balance))
        .route("/ethaddr", get(registry::get_eth_address))
        .route("/reg", post(registry::register_eth_address))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        registry::get_balance,
        registry::get_eth_address,
        registry::register_eth_address,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            RegisterRequest,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Registry", description = "Account balances and ERC-20 address registration"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
