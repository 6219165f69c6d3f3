/// 다국어 검색어 정리와 검색 방식 선택
use crate::error::AppError;
use serde::Deserialize;

/// 트라이그램 검색에 필요한 최소 글자 수
pub const TRIGRAM_MIN_CHARS: usize = 3;

const CJK_LANGUAGES: [&str; 3] = ["ko", "ja", "zh"];

/// 검색 대상
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTarget {
    #[default]
    All,
    Resources,
    Services,
}

impl SearchTarget {
    pub fn includes_resources(&self) -> bool {
        matches!(self, SearchTarget::All | SearchTarget::Resources)
    }

    pub fn includes_services(&self) -> bool {
        matches!(self, SearchTarget::All | SearchTarget::Services)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub lang: Option<String>,
    #[serde(rename = "type", default)]
    pub target: SearchTarget,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// SQL 검색 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    /// pg_trgm 유사도 (`%`, `<%`)
    Trigram(String),
    /// 부분 문자열 (`LIKE '%q%'`, 와일드카드 이스케이프)
    Substring(String),
}

/// 앞뒤 공백 제거, 연속 공백 하나로, 소문자
pub fn normalize_query(raw: &str) -> Result<String, AppError> {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if normalized.is_empty() {
        Err(AppError::bad_request("EMPTY_QUERY", "search query is empty"))
    } else {
        Ok(normalized)
    }
}

fn is_cjk_language(lang: &str) -> bool {
    let primary = lang.split(['-', '_']).next().unwrap_or_default();
    CJK_LANGUAGES
        .iter()
        .any(|cjk| cjk.eq_ignore_ascii_case(primary))
}

/// 정리된 검색어로 방식 선택
/// 3글자 미만이면 트라이그램이 만들어지지 않으므로 부분 문자열 검색을 쓴다.
pub fn choose_strategy(query: &str, lang: Option<&str>) -> SearchStrategy {
    let chars = query.chars().count();
    let short_cjk = lang.is_some_and(is_cjk_language) && chars < TRIGRAM_MIN_CHARS;
    if chars < TRIGRAM_MIN_CHARS || short_cjk {
        SearchStrategy::Substring(like_pattern(query))
    } else {
        SearchStrategy::Trigram(query.to_string())
    }
}

/// `%q%` 패턴. `\`, `%`, `_`는 이스케이프한다.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
