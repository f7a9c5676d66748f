use axum::extract::{rejection::QueryRejection, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AccessGuard;
use crate::error::{AppError, AppResult};
use crate::models::OgPreviewDto;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OgQuery {
    pub url: Option<String>,
}

/// GET /api/og?url=<encoded-url>
///
/// Returns Open Graph metadata for the given URL. Missing fields are empty
/// strings; a failed fetch is a 500 with `details`.
pub async fn get_og(
    State(state): State<AppState>,
    _guard: AccessGuard,
    query: Result<Query<OgQuery>, QueryRejection>,
) -> AppResult<Json<OgPreviewDto>> {
    let Query(params) = query?;
    let url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing url parameter".into()))?;

    let meta = state.og.resolve(&url).await?;
    Ok(Json(meta.into()))
}
