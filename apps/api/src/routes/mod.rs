pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::analytics::handlers as analytics_handlers;
use crate::ledger::handlers as ledger_handlers;
use crate::locked::handlers as locked_handlers;
use crate::public::handlers as public_handlers;
use crate::render::handlers as render_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Authenticated resume API (owner id supplied by the auth layer)
        .route(
            "/resume/version",
            post(ledger_handlers::handle_create_version),
        )
        .route(
            "/resume/versions",
            get(ledger_handlers::handle_list_versions),
        )
        .route(
            "/resume/version/:id/archive",
            put(ledger_handlers::handle_archive_version),
        )
        .route(
            "/resume/version/:id/set-live",
            post(ledger_handlers::handle_set_live),
        )
        // Locked profiles
        .route(
            "/locked-profiles",
            post(locked_handlers::handle_create_profile).get(locked_handlers::handle_list_profiles),
        )
        .route(
            "/locked-profiles/:profile_name/version",
            post(locked_handlers::handle_refresh_profile),
        )
        .route(
            "/locked-profiles/:profile_name/versions",
            get(locked_handlers::handle_list_profile_versions),
        )
        // Public resolver — segment order is load-bearing for permanent links
        .route("/public/:username", get(public_handlers::handle_master))
        .route(
            "/public/:username/:version",
            get(public_handlers::handle_version),
        )
        .route(
            "/public/:username/v/:profile_name",
            get(public_handlers::handle_locked_master),
        )
        .route(
            "/public/:username/v/:profile_name/:version",
            get(public_handlers::handle_locked_version),
        )
        // Export
        .route(
            "/export/master",
            post(render_handlers::handle_export_master),
        )
        .route(
            "/export/locked/:profile_name",
            post(render_handlers::handle_export_locked),
        )
        // Analytics
        .route(
            "/analytics/summary",
            get(analytics_handlers::handle_summary),
        )
        .route(
            "/analytics/timeline",
            get(analytics_handlers::handle_timeline),
        )
        .route(
            "/analytics/details",
            get(analytics_handlers::handle_details),
        )
        .with_state(state)
}
