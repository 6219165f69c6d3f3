/// 다국어 번역 번들
/// 번들은 컴파일 시 포함되며, 키는 점(.)으로 구분된 경로이다. (예: `errors.NOT_FOUND`)
/// 조회 순서: 요청 언어 태그 -> 기본 서브태그 -> 기본 언어 -> 키 자체
// region:    --- Imports
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;

// endregion: --- Imports

// region:    --- Catalog
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["en", "ko", "ja", "zh"];

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_sources(&[
        ("en", include_str!("../locales/en.json")),
        ("ko", include_str!("../locales/ko.json")),
        ("ja", include_str!("../locales/ja.json")),
        ("zh", include_str!("../locales/zh.json")),
    ])
});

/// 전역 번역 카탈로그
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

pub struct Catalog {
    bundles: HashMap<String, Value>,
}

impl Catalog {
    pub fn from_sources(sources: &[(&str, &str)]) -> Self {
        let mut bundles = HashMap::new();
        for (lang, raw) in sources {
            match serde_json::from_str::<Value>(raw) {
                Ok(bundle) => {
                    bundles.insert(lang.to_string(), bundle);
                }
                Err(e) => warn!("{:<12} --> 번역 번들 파싱 실패 {}: {}", "I18n", lang, e),
            }
        }
        Self { bundles }
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.bundles.contains_key(&normalize_tag(lang))
            || self.bundles.contains_key(primary_subtag(lang))
    }

    /// 단일 번들에서 키 조회
    pub fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        let mut node = self.bundles.get(lang)?;
        for part in key.split('.') {
            node = node.get(part)?;
        }
        node.as_str()
    }

    /// 폴백 체인을 따라 번역 문자열 조회. 어디에도 없으면 키를 그대로 돌려준다.
    pub fn resolve(&self, lang: &str, default_lang: &str, key: &str) -> String {
        fallback_chain(lang, default_lang)
            .iter()
            .find_map(|candidate| self.lookup(candidate, key))
            .unwrap_or(key)
            .to_string()
    }

    /// 기본 언어 번들 위에 요청 언어 번들을 덮어쓴 전체 번들
    pub fn merged_bundle(&self, lang: &str, default_lang: &str) -> Value {
        let mut merged = Value::Object(Default::default());
        for candidate in fallback_chain(lang, default_lang).iter().rev() {
            if let Some(bundle) = self.bundles.get(candidate) {
                deep_merge(&mut merged, bundle);
            }
        }
        merged
    }
}

// endregion: --- Catalog

// region:    --- Language Negotiation

/// `ko_KR`, `KO-kr` 같은 표기를 `ko-kr` 형태로 정리
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

fn primary_subtag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// 조회할 언어 후보 목록 (중복 제거, 우선순위 순)
pub fn fallback_chain(lang: &str, default_lang: &str) -> Vec<String> {
    let mut chain: Vec<String> = Vec::with_capacity(3);
    for candidate in [
        normalize_tag(lang),
        primary_subtag(lang).to_ascii_lowercase(),
        normalize_tag(default_lang),
    ] {
        if !candidate.is_empty() && !chain.contains(&candidate) {
            chain.push(candidate);
        }
    }
    chain
}

/// Accept-Language 헤더에서 지원 언어 선택 (q 값 내림차순)
pub fn negotiate(header: &str) -> Option<String> {
    let mut ranges: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((tag.to_string(), quality))
        })
        .filter(|(_, q)| *q > 0.0)
        .collect();

    // 안정 정렬이므로 동일 q 값은 헤더 순서를 유지한다.
    ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    ranges.into_iter().find_map(|(tag, _)| {
        let primary = primary_subtag(&tag).to_ascii_lowercase();
        SUPPORTED_LANGUAGES
            .contains(&primary.as_str())
            .then_some(primary)
    })
}

fn deep_merge(target: &mut Value, overlay: &Value) {
    match (target, overlay) {
        (Value::Object(target), Value::Object(overlay)) => {
            for (key, value) in overlay {
                deep_merge(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, overlay) => *target = overlay.clone(),
    }
}

// endregion: --- Language Negotiation

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Catalog {
        Catalog::from_sources(&[
            ("en", r#"{"greet":"Hello","errors":{"NOT_FOUND":"Not found","ONLY_EN":"English only"}}"#),
            ("ko", r#"{"greet":"안녕하세요","errors":{"NOT_FOUND":"없음"}}"#),
            ("pt-br", r#"{"greet":"Olá"}"#),
        ])
    }

    #[test]
    fn resolves_exact_language() {
        assert_eq!(sample().resolve("ko", "en", "greet"), "안녕하세요");
    }

    #[test]
    fn falls_back_from_region_to_primary_subtag() {
        assert_eq!(sample().resolve("ko-KR", "en", "errors.NOT_FOUND"), "없음");
        assert_eq!(sample().resolve("pt_BR", "en", "greet"), "Olá");
    }

    #[test]
    fn falls_back_to_default_language_then_key() {
        let catalog = sample();
        assert_eq!(catalog.resolve("ko", "en", "errors.ONLY_EN"), "English only");
        assert_eq!(catalog.resolve("fr", "en", "greet"), "Hello");
        assert_eq!(catalog.resolve("ko", "en", "errors.MISSING"), "errors.MISSING");
    }

    #[test]
    fn non_string_nodes_are_not_translations() {
        assert_eq!(sample().resolve("en", "en", "errors"), "errors");
    }

    #[test]
    fn merged_bundle_overlays_requested_language() {
        let merged = sample().merged_bundle("ko", "en");
        assert_eq!(merged["greet"], json!("안녕하세요"));
        assert_eq!(merged["errors"]["NOT_FOUND"], json!("없음"));
        assert_eq!(merged["errors"]["ONLY_EN"], json!("English only"));
    }

    #[test]
    fn negotiates_by_quality() {
        assert_eq!(negotiate("fr-CH, ko;q=0.9, en;q=0.8").as_deref(), Some("ko"));
        assert_eq!(negotiate("en;q=0.2, ja-JP;q=0.7").as_deref(), Some("ja"));
        assert_eq!(negotiate("fr, de;q=0.5"), None);
        assert_eq!(negotiate("ko;q=0, zh").as_deref(), Some("zh"));
    }

    #[test]
    fn embedded_bundles_cover_every_supported_language() {
        let catalog = catalog();
        for lang in SUPPORTED_LANGUAGES {
            assert!(catalog.supports(lang), "missing bundle {lang}");
        }
        assert!(catalog.lookup("en", "errors.INTERNAL_ERROR").is_some());
        assert_eq!(
            catalog.resolve("zh-TW", "en", "errors.PAYMENT_NOT_PENDING"),
            catalog.resolve("en", "en", "errors.PAYMENT_NOT_PENDING")
        );
    }
}
