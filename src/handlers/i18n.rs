// region:    --- Imports
use super::extract::AppPath;
use crate::error::{AppError, AppResult, ErrorBody, ErrorCode};
use crate::i18n;
use crate::state::AppState;
use axum::extract::{Query, Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, CONTENT_LENGTH};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// endregion: --- Imports

#[derive(Debug, Deserialize)]
struct LangParam {
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
    pub default_language: String,
}

/// 요청 언어: `?lang=` -> Accept-Language -> 기본 언어
pub fn request_language(req: &Request, default_lang: &str) -> String {
    let catalog = i18n::catalog();
    let from_query = Query::<LangParam>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(param)| param.lang)
        .filter(|lang| catalog.supports(lang));
    if let Some(lang) = from_query {
        return i18n::normalize_tag(&lang);
    }

    req.headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(i18n::negotiate)
        .unwrap_or_else(|| default_lang.to_string())
}

/// 에러 응답 본문을 요청 언어로 번역한다.
pub async fn localize_errors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let default_lang = state.config.default_language.as_str();
    let lang = request_language(&req, default_lang);
    let response = next.run(req).await;

    let Some(ErrorCode(code)) = response.extensions().get::<ErrorCode>().copied() else {
        return response;
    };
    let key = format!("errors.{code}");
    let message = i18n::catalog().resolve(&lang, default_lang, &key);
    if message == key {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    (
        parts,
        Json(ErrorBody {
            error: message,
            code,
        }),
    )
        .into_response()
}

/// 지원 언어 목록
pub async fn handle_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: i18n::catalog()
            .languages()
            .into_iter()
            .map(str::to_string)
            .collect(),
        default_language: state.config.default_language.clone(),
    })
}

/// 언어 번들 (기본 언어 위에 요청 언어를 덮어쓴 값)
pub async fn handle_bundle(
    State(state): State<AppState>,
    AppPath(lang): AppPath<String>,
) -> AppResult<Json<Value>> {
    let catalog = i18n::catalog();
    if !catalog.supports(&lang) {
        return Err(AppError::NotFound("language"));
    }
    Ok(Json(
        catalog.merged_bundle(&lang, &state.config.default_language),
    ))
}
