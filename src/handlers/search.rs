// region:    --- Imports
use super::extract::AppQuery;
use crate::error::AppResult;
use crate::i18n;
use crate::pagination::Page;
use crate::query::search;
use crate::resource::model::Resource;
use crate::search::{choose_strategy, normalize_query, SearchParams};
use crate::service::model::Service;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub lang: String,
    pub page: i64,
    pub limit: i64,
    pub resources: Vec<Resource>,
    pub services: Vec<Service>,
}

/// 통합 검색
pub async fn handle_search(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let query = normalize_query(params.q.as_deref().unwrap_or_default())?;
    let lang = params
        .lang
        .as_deref()
        .map(i18n::normalize_tag)
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| state.config.default_language.clone());
    let page = Page::new(params.page, params.limit);
    let strategy = choose_strategy(&query, Some(&lang));
    info!(
        "{:<12} --> 검색: {:?} ({}, {:?})",
        "Handler", query, lang, params.target
    );

    let resources = if params.target.includes_resources() {
        search::search_resources(&state.db, &strategy, page).await?
    } else {
        Vec::new()
    };
    let services = if params.target.includes_services() {
        search::search_services(&state.db, &strategy, page).await?
    } else {
        Vec::new()
    };

    Ok(Json(SearchResponse {
        query,
        lang,
        page: page.page,
        limit: page.limit,
        resources,
        services,
    }))
}
