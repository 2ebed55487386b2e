use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::catalog::{VoiceCatalog, VoiceFilters};
use crate::error::CatalogError;
use crate::types::Voice;

/// Query parameters for the public voice listing
#[derive(Debug, Deserialize)]
pub struct VoicesQuery {
    pub language: Option<String>,
    pub engine: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

const fn default_limit() -> usize {
    50
}

/// Voice object in the OpenAI-compatible wire shape
///
/// `id` is the bare voice name for client compatibility; the full
/// `name-language-engine` id stays internal.
#[derive(Debug, Serialize)]
pub struct VoiceObject {
    pub id: String,
    pub name: String,
    pub language: String,
    pub engine: String,
    pub gender: crate::types::Gender,
    pub category: String,
    pub quality: crate::types::Quality,
}

impl From<Voice> for VoiceObject {
    fn from(voice: Voice) -> Self {
        Self {
            id: voice.name.clone(),
            name: voice.name,
            language: voice.language,
            engine: voice.engine,
            gender: voice.gender,
            category: voice.category,
            quality: voice.quality,
        }
    }
}

#[derive(Debug, Serialize)]
struct Pagination {
    total: usize,
    limit: usize,
    offset: usize,
    #[serde(rename = "hasMore")]
    has_more: bool,
}

#[derive(Debug, Serialize)]
struct VoiceListResponse {
    data: Vec<VoiceObject>,
    pagination: Pagination,
}

#[derive(Debug, Serialize)]
struct VoiceDetailResponse {
    data: VoiceObject,
}

impl From<VoicesQuery> for VoiceFilters {
    fn from(query: VoicesQuery) -> Self {
        Self {
            language: query.language,
            engine: query.engine,
            gender: query.gender,
            category: query.category,
            search: query.search,
        }
    }
}

/// `GET /v1/voices`
pub async fn list_voices(
    State(catalog): State<Arc<VoiceCatalog>>,
    Query(query): Query<VoicesQuery>,
) -> Json<impl Serialize> {
    let (limit, offset) = (query.limit, query.offset);
    let voices = catalog.query(&query.into()).await;
    let total = voices.len();

    let data: Vec<VoiceObject> = voices.into_iter().skip(offset).take(limit).map(Into::into).collect();

    Json(VoiceListResponse {
        data,
        pagination: Pagination {
            total,
            limit,
            offset,
            has_more: offset + limit < total,
        },
    })
}

/// `GET /v1/voices/{id}`
pub async fn get_voice(
    State(catalog): State<Arc<VoiceCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<impl Serialize>, CatalogError> {
    let voice = catalog
        .resolve(&id)
        .await
        .ok_or_else(|| CatalogError::VoiceNotFound(id))?;

    Ok(Json(VoiceDetailResponse { data: voice.into() }))
}
