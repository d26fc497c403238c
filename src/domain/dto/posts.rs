//! 게시물 요청/응답 DTO

use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::content::{Author, LocalizedText, Post, PostFilter};

/// 게시물 생성 요청
///
/// `slug`가 없으면 한국어 제목에서 파생됩니다.
/// 필수 다국어 필드(`title.ko`, `content.ko`)와 분류는
/// 리포지토리에서 필드 단위로 검증됩니다.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: LocalizedText,
    #[serde(default)]
    pub summary: LocalizedText,
    pub content: LocalizedText,
    pub category: String,
    pub slug: Option<String>,
    pub author: Option<Author>,
    pub is_published: Option<bool>,
    pub is_main_featured: Option<bool>,
    pub publish_date: Option<chrono::DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(url(message = "유효한 URL 형식이 아닙니다"))]
    pub image_url: Option<String>,
    #[validate(url(message = "유효한 URL 형식이 아닙니다"))]
    pub original_url: Option<String>,
}

/// 게시물 부분 수정 요청
///
/// 존재하는 필드만 `$set`으로 반영됩니다. 제목이 바뀌어도
/// `regenerateSlug: true`를 명시하지 않는 한 슬러그는 유지됩니다
/// (이미 공개된 URL의 안정성이 우선).
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<LocalizedText>,
    pub summary: Option<LocalizedText>,
    pub content: Option<LocalizedText>,
    pub category: Option<String>,
    pub author: Option<Author>,
    pub is_published: Option<bool>,
    pub is_main_featured: Option<bool>,
    pub publish_date: Option<chrono::DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    #[validate(url(message = "유효한 URL 형식이 아닙니다"))]
    pub image_url: Option<String>,
    #[validate(url(message = "유효한 URL 형식이 아닙니다"))]
    pub original_url: Option<String>,
    /// 명시적 슬러그 재생성 요청
    pub regenerate_slug: Option<bool>,
}

/// 게시물 목록 조회 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub category: Option<String>,
    pub published: Option<bool>,
    pub limit: Option<i64>,
}

impl PostListQuery {
    pub fn into_filter(self) -> PostFilter {
        PostFilter {
            category: self.category,
            published: self.published,
            limit: self.limit,
        }
    }

    /// 공개 엔드포인트용: 공개 상태 필터를 강제로 고정
    pub fn into_published_filter(self) -> PostFilter {
        PostFilter {
            category: self.category,
            published: Some(true),
            limit: self.limit,
        }
    }
}

/// 표시용으로 해석된 작성자 정보
///
/// 참조 형태의 작성자는 사용자 레코드를 조회해 이 형태로 변환됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDisplay {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// 게시물 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: LocalizedText,
    pub summary: LocalizedText,
    pub content: LocalizedText,
    pub category: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorDisplay>,
    pub is_published: bool,
    pub is_main_featured: bool,
    pub publish_date: String,
    pub view_count: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PostResponse {
    /// 엔티티와 해석된 작성자 정보로 응답을 구성합니다.
    pub fn from_post(post: Post, author: Option<AuthorDisplay>) -> Self {
        Self {
            id: post.id_string().unwrap_or_default(),
            title: post.title,
            summary: post.summary,
            content: post.content,
            category: post.category,
            slug: post.slug,
            author,
            is_published: post.is_published,
            is_main_featured: post.is_main_featured,
            publish_date: post
                .publish_date
                .try_to_rfc3339_string()
                .unwrap_or_default(),
            view_count: post.view_count,
            tags: post.tags,
            image_url: post.image_url,
            original_url: post.original_url,
            created_at: post.created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: post.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

/// 대시보드용 게시물 요약
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    /// 한국어 제목
    pub title: String,
    pub category: String,
    pub is_main_featured: bool,
    pub view_count: i64,
    pub publish_date: String,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id_string().unwrap_or_default(),
            slug: post.slug.clone(),
            title: post.title.ko.clone(),
            category: post.category.clone(),
            is_main_featured: post.is_main_featured,
            view_count: post.view_count,
            publish_date: post
                .publish_date
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        }
    }
}
