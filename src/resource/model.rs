use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    HardwareDesign,
    Software,
    #[serde(rename = "3d_model")]
    ThreeDModel,
    FreeContent,
    AiModel,
    FlashGame,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::HardwareDesign => "hardware_design",
            ResourceCategory::Software => "software",
            ResourceCategory::ThreeDModel => "3d_model",
            ResourceCategory::FreeContent => "free_content",
            ResourceCategory::AiModel => "ai_model",
            ResourceCategory::FlashGame => "flash_game",
        }
    }
}

// 자료 모델
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub download_url: Option<String>,
    pub download_file: Option<String>,
    pub download_count: i64,
    pub how_to_use: Option<String>,
    pub assembly_instructions: Option<serde_json::Value>,
    pub is_featured: bool,
    pub is_crawled: bool,
    pub source_site: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// 다운로드 링크: 외부 URL 우선, 없으면 업로드 파일 경로
    pub fn download_target(&self) -> Option<String> {
        self.download_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| {
                self.download_file
                    .as_ref()
                    .map(|file| format!("/uploads/{}", file.trim_start_matches('/')))
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: ResourceCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub download_url: Option<String>,
    pub download_file: Option<String>,
    pub how_to_use: Option<String>,
    pub assembly_instructions: Option<serde_json::Value>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_crawled: bool,
    pub source_site: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ResourceCategory>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub download_url: Option<String>,
    pub download_file: Option<String>,
    pub how_to_use: Option<String>,
    pub assembly_instructions: Option<serde_json::Value>,
    pub source_site: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceFilter {
    pub category: Option<ResourceCategory>,
    /// 이 태그를 가진 자료
    pub tag: Option<String>,
    /// 쉼표로 구분, 모든 태그를 가진 자료
    pub tags: Option<String>,
    pub featured: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ResourceFilter {
    /// `tag`와 `tags`를 합친 필수 태그 목록 (없으면 None)
    pub fn required_tags(&self) -> Option<Vec<String>> {
        let tags: Vec<String> = self
            .tag
            .iter()
            .flat_map(|t| t.split(','))
            .chain(self.tags.iter().flat_map(|t| t.split(',')))
            .map(normalize_tag)
            .filter(|t| !t.is_empty())
            .collect();
        (!tags.is_empty()).then_some(tags)
    }
}

#[derive(Debug, Deserialize)]
pub struct FeatureRequest {
    pub featured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub download_url: Option<String>,
    pub download_count: i64,
}

/// 태그 정리: 앞뒤 공백 제거, 소문자
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// 태그 목록 정리 (빈 값/중복 제거, 입력 순서 유지)
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| normalize_tag(t)) {
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_tags_merge_single_and_list() {
        let filter = ResourceFilter {
            tag: Some(" Arduino ".to_string()),
            tags: Some("pcb,,KiCad".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.required_tags(),
            Some(vec!["arduino".to_string(), "pcb".to_string(), "kicad".to_string()])
        );
        assert_eq!(ResourceFilter::default().required_tags(), None);
    }

    #[test]
    fn normalize_tags_dedups() {
        let tags = vec!["CNC".to_string(), "cnc".to_string(), " ".to_string(), "Laser".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["cnc", "laser"]);
    }

    #[test]
    fn category_names_match_storage() {
        let parsed: ResourceCategory = serde_json::from_str("\"3d_model\"").unwrap();
        assert_eq!(parsed, ResourceCategory::ThreeDModel);
        let parsed: ResourceCategory = serde_json::from_str("\"ai_model\"").unwrap();
        assert_eq!(parsed.as_str(), "ai_model");
    }

    #[test]
    fn download_target_prefers_url() {
        let mut resource = Resource {
            id: 1,
            title: "t".into(),
            description: String::new(),
            category: "software".into(),
            tags: vec![],
            image_url: None,
            download_url: Some("https://example.com/a.zip".into()),
            download_file: Some("b.zip".into()),
            download_count: 0,
            how_to_use: None,
            assembly_instructions: None,
            is_featured: false,
            is_crawled: false,
            source_site: None,
            created_at: Utc::now(),
        };
        assert_eq!(resource.download_target().as_deref(), Some("https://example.com/a.zip"));
        resource.download_url = None;
        assert_eq!(resource.download_target().as_deref(), Some("/uploads/b.zip"));
    }
}
