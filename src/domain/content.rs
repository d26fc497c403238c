//! 콘텐츠 도메인 모델
//!
//! 뉴스/ESG 게시물은 구조적으로 동일한 스키마를 사용하므로
//! 하나의 `Post` 엔티티로 표현하고, 컬렉션 이름과 분류 집합만
//! `ContentKind`로 매개변수화합니다.

use std::collections::HashMap;

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// 콘텐츠 종류 (뉴스 / ESG)
///
/// 컬렉션 이름과 허용 분류 집합을 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    News,
    Esg,
}

/// 뉴스 게시물의 닫힌 분류 집합
const NEWS_CATEGORIES: &[&str] = &[
    "company",
    "award",
    "partnership",
    "product",
    "media",
    "event",
    "other",
];

/// ESG 게시물의 닫힌 분류 집합
const ESG_CATEGORIES: &[&str] = &[
    "environment",
    "social",
    "governance",
    "csr",
    "sustainability",
    "esg_management",
    "other",
];

impl ContentKind {
    /// URL 세그먼트에서 콘텐츠 종류를 파싱합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "news" => Some(ContentKind::News),
            "esg" => Some(ContentKind::Esg),
            _ => None,
        }
    }

    /// URL/로그에 쓰이는 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::News => "news",
            ContentKind::Esg => "esg",
        }
    }

    /// MongoDB 컬렉션 이름
    pub fn collection_name(&self) -> &'static str {
        match self {
            ContentKind::News => "news_posts",
            ContentKind::Esg => "esg_posts",
        }
    }

    /// 이 콘텐츠 종류에서 허용되는 분류 집합
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            ContentKind::News => NEWS_CATEGORIES,
            ContentKind::Esg => ESG_CATEGORIES,
        }
    }

    /// 분류 값이 허용 집합에 속하는지 확인합니다.
    pub fn is_valid_category(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}

/// 다국어 텍스트 필드
///
/// 한국어(`ko`)는 필수, 영어(`en`)는 선택이며 필요 시
/// 번역으로 나중에 채워질 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub ko: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
}

impl LocalizedText {
    pub fn ko(text: &str) -> Self {
        Self {
            ko: text.to_string(),
            en: None,
        }
    }
}

/// 게시물 작성자
///
/// 시스템이 임베디드 객체에서 사용자 참조로 진화했기 때문에
/// 두 형태 모두를 허용해야 합니다. 표시용 해석은 경계(핸들러)에서만
/// 수행합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    /// 사용자 레코드 참조 (신규 형태)
    Reference {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// 임베디드 작성자 정보 (구 형태)
    Embedded {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        department: Option<String>,
    },
}

/// 게시물 엔티티 (뉴스/ESG 공용)
///
/// 영속 필드명은 원본 문서 레이아웃을 따라 camelCase입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 제목 (ko 필수)
    pub title: LocalizedText,
    /// 요약
    #[serde(default)]
    pub summary: LocalizedText,
    /// 본문 (ko 필수)
    pub content: LocalizedText,
    /// 분류 (콘텐츠 종류별 닫힌 집합)
    pub category: String,
    /// URL-safe 식별자, 컬렉션 내 유일
    pub slug: String,
    /// 작성자 (임베디드 또는 참조)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// 공개 사이트 노출 여부
    pub is_published: bool,
    /// 메인 노출 여부 (공개 여부와 독립)
    pub is_main_featured: bool,
    /// 게시일 (미래 날짜 허용)
    pub publish_date: DateTime,
    /// 조회수 (단조 증가)
    pub view_count: i64,
    /// 태그 목록
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// 대표 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 원문/외부 링크 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    /// 생성 시간 (한 번만 설정)
    pub created_at: DateTime,
    /// 수정 시간 (모든 변경에서 갱신)
    pub updated_at: DateTime,
}

impl Post {
    /// ID 문자열로 변환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }
}

/// 게시물 목록 조회 필터
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// 분류 필터
    pub category: Option<String>,
    /// 공개 상태 필터 (None이면 전체)
    pub published: Option<bool>,
    /// 최대 반환 개수
    pub limit: Option<i64>,
}

impl PostFilter {
    /// 공개된 게시물만 조회하는 필터
    pub fn published_only() -> Self {
        Self {
            published: Some(true),
            ..Self::default()
        }
    }
}

/// 콘텐츠 종류별 집계 통계
///
/// 매 요청 시 즉석 계산되며 캐시되지 않습니다.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub total: u64,
    pub published: u64,
    pub unpublished: u64,
    pub by_category: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_parse() {
        assert_eq!(ContentKind::parse("news"), Some(ContentKind::News));
        assert_eq!(ContentKind::parse("esg"), Some(ContentKind::Esg));
        assert_eq!(ContentKind::parse("blog"), None);
        assert_eq!(ContentKind::parse("NEWS"), None);
    }

    #[test]
    fn test_category_sets_are_disjoint_per_kind() {
        assert!(ContentKind::News.is_valid_category("award"));
        assert!(!ContentKind::News.is_valid_category("governance"));

        assert!(ContentKind::Esg.is_valid_category("governance"));
        assert!(!ContentKind::Esg.is_valid_category("award"));

        // other는 양쪽 모두 허용
        assert!(ContentKind::News.is_valid_category("other"));
        assert!(ContentKind::Esg.is_valid_category("other"));
    }

    #[test]
    fn test_author_embedded_shape() {
        let json = serde_json::json!({
            "name": "홍보팀",
            "department": "커뮤니케이션실"
        });

        let author: Author = serde_json::from_value(json).unwrap();
        assert_eq!(
            author,
            Author::Embedded {
                name: "홍보팀".to_string(),
                department: Some("커뮤니케이션실".to_string()),
            }
        );
    }

    #[test]
    fn test_author_reference_shape() {
        let json = serde_json::json!({ "userId": "507f1f77bcf86cd799439011" });

        let author: Author = serde_json::from_value(json).unwrap();
        assert_eq!(
            author,
            Author::Reference {
                user_id: "507f1f77bcf86cd799439011".to_string(),
            }
        );
    }

    #[test]
    fn test_localized_text_default() {
        let text: LocalizedText = serde_json::from_value(serde_json::json!({ "ko": "안녕" })).unwrap();
        assert_eq!(text.ko, "안녕");
        assert_eq!(text.en, None);
    }
}
