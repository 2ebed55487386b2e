#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod catalog;
mod classify;
mod error;
mod server;
mod types;

use std::sync::Arc;

use axum::{Router, routing::get};

pub use catalog::{VoiceCatalog, VoiceFilters, dedupe_and_enrich, sort_by_quality};
pub use classify::{category_for, gender_for_name, quality_for_engine};
pub use error::CatalogError;
pub use types::{CatalogStats, Gender, Quality, RawVoice, Voice};

/// Create the endpoint router for the public voice listing
pub fn endpoint_router() -> Router<Arc<VoiceCatalog>> {
    Router::new()
        .route("/v1/voices", get(server::list_voices))
        .route("/v1/voices/{id}", get(server::get_voice))
}
