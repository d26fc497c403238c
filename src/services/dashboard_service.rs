//! 대시보드 스냅샷 집계 서비스
//!
//! 두 콘텐츠 컬렉션에서 집계 통계, 최근 게시물, 조회수 상위 게시물을
//! 모아 하나의 스냅샷으로 구성합니다. 전달 방식은 단발성 조회이며,
//! 스냅샷에는 서버 타임스탬프가 함께 실립니다.

use chrono::Utc;
use serde::Serialize;

use crate::domain::content::{ContentStats, Post, PostFilter};
use crate::domain::dto::posts::PostSummary;
use crate::state::AppState;

/// 섹션당 포함할 최근/상위 게시물 개수
const SECTION_ITEM_LIMIT: i64 = 5;

/// 콘텐츠 종류별 대시보드 섹션
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSnapshot {
    pub stats: ContentStats,
    pub recent: Vec<PostSummary>,
    pub top_viewed: Vec<PostSummary>,
}

impl SectionSnapshot {
    /// 조회 결과에서 섹션을 구성합니다.
    pub fn build(stats: ContentStats, recent: &[Post], top_viewed: &[Post]) -> Self {
        Self {
            stats,
            recent: recent.iter().map(PostSummary::from).collect(),
            top_viewed: top_viewed.iter().map(PostSummary::from).collect(),
        }
    }
}

/// 대시보드 복합 스냅샷
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub news: SectionSnapshot,
    pub esg: SectionSnapshot,
    /// 스냅샷 생성 시각 (RFC3339)
    pub generated_at: String,
}

/// 두 컬렉션에서 대시보드 스냅샷을 구성합니다.
///
/// 리포지토리의 강등 정책 덕분에 저장소 장애 시에도 스냅샷은
/// 0값/빈 목록으로 완성됩니다 — 대시보드가 통째로 죽는 일은 없습니다.
pub async fn build_snapshot(state: &AppState) -> DashboardSnapshot {
    let recent_filter = PostFilter {
        limit: Some(SECTION_ITEM_LIMIT),
        ..PostFilter::default()
    };

    let news_stats = state.news.stats().await;
    let news_recent = state.news.list(&recent_filter).await;
    let news_top = state.news.top_viewed(SECTION_ITEM_LIMIT).await;

    let esg_stats = state.esg.stats().await;
    let esg_recent = state.esg.list(&recent_filter).await;
    let esg_top = state.esg.top_viewed(SECTION_ITEM_LIMIT).await;

    DashboardSnapshot {
        news: SectionSnapshot::build(news_stats, &news_recent, &news_top),
        esg: SectionSnapshot::build(esg_stats, &esg_recent, &esg_top),
        generated_at: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::LocalizedText;
    use mongodb::bson::{DateTime, oid::ObjectId};

    fn sample_post(title: &str, views: i64) -> Post {
        Post {
            id: Some(ObjectId::new()),
            title: LocalizedText::ko(title),
            summary: LocalizedText::default(),
            content: LocalizedText::ko("본문"),
            category: "company".to_string(),
            slug: title.to_string(),
            author: None,
            is_published: true,
            is_main_featured: false,
            publish_date: DateTime::now(),
            view_count: views,
            tags: Vec::new(),
            image_url: None,
            original_url: None,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn test_section_build_produces_summaries() {
        let recent = vec![sample_post("첫번째", 10), sample_post("두번째", 3)];
        let top = vec![sample_post("첫번째", 10)];

        let section = SectionSnapshot::build(ContentStats::default(), &recent, &top);

        assert_eq!(section.recent.len(), 2);
        assert_eq!(section.top_viewed.len(), 1);
        assert_eq!(section.recent[0].title, "첫번째");
        assert_eq!(section.top_viewed[0].view_count, 10);
    }

    #[test]
    fn test_empty_sections_serialize() {
        let section = SectionSnapshot::build(ContentStats::default(), &[], &[]);
        let json = serde_json::to_value(&section).unwrap();

        assert_eq!(json["stats"]["total"], 0);
        assert!(json["recent"].as_array().unwrap().is_empty());
        assert!(json["topViewed"].as_array().unwrap().is_empty());
    }
}
