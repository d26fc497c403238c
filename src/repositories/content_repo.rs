//! # 콘텐츠 리포지토리 구현
//!
//! 뉴스/ESG 게시물의 데이터 액세스 계층입니다. 두 콘텐츠 종류는
//! 스키마가 동일하므로 복사된 매니저 두 벌 대신 `ContentKind`로
//! 매개변수화된 리포지토리 하나를 두 번 인스턴스화합니다.
//!
//! ## 실패 정책
//!
//! 콘텐츠 사이트의 가용성을 우선하는 의도적인 트레이드오프입니다:
//!
//! - **조회 계열** (`list`, `get_by_id`, `get_by_slug`, `stats`,
//!   `top_viewed`, `delete`): 저장소 연결 실패 시 빈 결과 / `None` /
//!   `false` / 0값 통계로 강등됩니다. UI는 "데이터 없음" 상태를
//!   렌더링하고, 실패는 연산 이름과 대상과 함께 서버 로그로 남습니다.
//! - **쓰기 계열** (`create`, `update`): 검증 실패, 슬러그 충돌,
//!   저장소 오류를 타입 있는 에러로 그대로 표면화합니다.
//!
//! ## 슬러그 유일성
//!
//! 슬러그는 저장 계층의 유니크 인덱스로 강제됩니다. 생성 시 충돌하면
//! 순번(`-2`, `-3`, ...)으로 구분하며, 조용히 덮어쓰는 일은 없습니다.

use futures_util::TryStreamExt;
use log::{error, warn};
use mongodb::bson::{self, Bson, DateTime, Document, doc, oid::ObjectId};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::domain::content::{ContentKind, ContentStats, Post, PostFilter};
use crate::domain::dto::posts::{CreatePostRequest, UpdatePostRequest};
use crate::errors::{AppError, FieldError};
use crate::services::slug::{slugify, with_suffix};

/// 슬러그 구분 순번 상한. 이 이상 충돌하면 충돌 에러로 처리합니다.
const MAX_SLUG_ATTEMPTS: u32 = 100;

/// 콘텐츠 종류별 게시물 리포지토리
///
/// `ContentKind`가 컬렉션 이름과 허용 분류 집합을 결정합니다.
#[derive(Clone)]
pub struct ContentRepository {
    kind: ContentKind,
    collection: Collection<Post>,
}

impl ContentRepository {
    /// 지정한 콘텐츠 종류의 리포지토리를 생성합니다.
    pub fn new(db: &Database, kind: ContentKind) -> Self {
        let collection = db.get_database().collection::<Post>(kind.collection_name());
        Self { kind, collection }
    }

    /// 이 리포지토리의 콘텐츠 종류
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// 게시물 목록 조회
    ///
    /// 분류와 공개 상태로 필터링할 수 있으며, 기본 정렬은
    /// 게시일 내림차순입니다. 저장소 오류는 빈 목록으로 강등됩니다.
    pub async fn list(&self, filter: &PostFilter) -> Vec<Post> {
        let query = build_filter_query(filter);

        let options = FindOptions::builder()
            .sort(doc! { "publishDate": -1 })
            .limit(filter.limit)
            .build();

        let cursor = match self.collection.find(query).with_options(options).await {
            Ok(cursor) => cursor,
            Err(e) => {
                error!("[{}] list 실패 (filter: {:?}): {}", self.kind.as_str(), filter, e);
                return Vec::new();
            }
        };

        match cursor.try_collect().await {
            Ok(posts) => posts,
            Err(e) => {
                error!("[{}] list 커서 수집 실패: {}", self.kind.as_str(), e);
                Vec::new()
            }
        }
    }

    /// ID로 게시물 조회
    ///
    /// 잘못된 ID 형식이나 저장소 오류는 `None`으로 강등됩니다.
    pub async fn get_by_id(&self, id: &str) -> Option<Post> {
        let object_id = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return None,
        };

        match self.collection.find_one(doc! { "_id": object_id }).await {
            Ok(post) => post,
            Err(e) => {
                error!("[{}] get_by_id 실패 (id: {}): {}", self.kind.as_str(), id, e);
                None
            }
        }
    }

    /// 슬러그로 게시물 조회
    pub async fn get_by_slug(&self, slug: &str) -> Option<Post> {
        match self.collection.find_one(doc! { "slug": slug }).await {
            Ok(post) => post,
            Err(e) => {
                error!("[{}] get_by_slug 실패 (slug: {}): {}", self.kind.as_str(), slug, e);
                None
            }
        }
    }

    /// 새 게시물 생성
    ///
    /// 필수 다국어 필드와 분류를 검증하고, 슬러그가 없으면 한국어
    /// 제목에서 파생하며, 기본값(공개 상태, 조회수 0, 타임스탬프)을
    /// 채워 저장합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::FieldValidation` - 필수 필드 누락 또는 잘못된 분류
    /// * `AppError::ConflictError` - 슬러그 유니크 인덱스 충돌
    /// * `AppError::DatabaseError` - 저장소 오류
    pub async fn create(&self, req: CreatePostRequest) -> Result<Post, AppError> {
        let mut fields = Vec::new();

        if req.title.ko.trim().is_empty() {
            fields.push(FieldError::new("title.ko", "한국어 제목은 필수입니다"));
        }
        if req.content.ko.trim().is_empty() {
            fields.push(FieldError::new("content.ko", "한국어 본문은 필수입니다"));
        }
        if !self.kind.is_valid_category(&req.category) {
            fields.push(FieldError::new("category", "지원하지 않는 분류입니다"));
        }

        let base_slug = match req.slug.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(supplied) => slugify(supplied),
            None => slugify(&req.title.ko),
        };
        if base_slug.is_empty() && fields.is_empty() {
            fields.push(FieldError::new("slug", "제목에서 슬러그를 파생할 수 없습니다"));
        }

        if !fields.is_empty() {
            return Err(AppError::FieldValidation(fields));
        }

        let slug = self.unique_slug(&base_slug, None).await?;
        let mut post = build_new_post(req, slug);

        let result = self.collection.insert_one(&post).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::ConflictError("이미 사용 중인 슬러그입니다".to_string())
            } else {
                AppError::DatabaseError(e.to_string())
            }
        })?;

        post.id = result.inserted_id.as_object_id();

        Ok(post)
    }

    /// 게시물 부분 수정
    ///
    /// 요청에 존재하는 필드만 `$set`으로 병합하고 `updatedAt`을
    /// 갱신합니다. 제목이 바뀌어도 `regenerateSlug: true`가 명시되지
    /// 않는 한 슬러그는 유지됩니다 (공개 URL의 안정성 우선).
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Post))` - 수정된 최신 게시물
    /// * `Ok(None)` - 해당 ID의 게시물 없음
    pub async fn update(
        &self,
        id: &str,
        req: &UpdatePostRequest,
    ) -> Result<Option<Post>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        let mut set_doc = build_set_document(req, self.kind)?;

        if req.regenerate_slug.unwrap_or(false)
            && let Some(title) = &req.title
        {
            let base = slugify(&title.ko);
            if base.is_empty() {
                return Err(AppError::FieldValidation(vec![FieldError::new(
                    "slug",
                    "제목에서 슬러그를 파생할 수 없습니다",
                )]));
            }
            let slug = self.unique_slug(&base, Some(&object_id)).await?;
            set_doc.insert("slug", slug);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set_doc })
            .with_options(options)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::ConflictError("이미 사용 중인 슬러그입니다".to_string())
                } else {
                    AppError::DatabaseError(e.to_string())
                }
            })
    }

    /// 게시물 삭제
    ///
    /// 실제로 문서가 제거된 경우에만 `true`를 반환합니다.
    /// 없는 ID나 저장소 오류는 `false`이며, 두 번째 삭제 호출도
    /// 에러 없이 `false`를 돌려줍니다.
    pub async fn delete(&self, id: &str) -> bool {
        let object_id = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return false,
        };

        match self.collection.delete_one(doc! { "_id": object_id }).await {
            Ok(result) => result.deleted_count > 0,
            Err(e) => {
                error!("[{}] delete 실패 (id: {}): {}", self.kind.as_str(), id, e);
                false
            }
        }
    }

    /// 공개 조회 시 조회수 증가
    ///
    /// 공개된 게시물에 한해 `viewCount`를 원자적으로 1 올리고
    /// 갱신된 문서를 반환합니다. 인증이 필요 없는 경로에서 호출됩니다.
    pub async fn increment_view(&self, slug: &str) -> Option<Post> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        match self
            .collection
            .find_one_and_update(
                doc! { "slug": slug, "isPublished": true },
                doc! { "$inc": { "viewCount": 1 } },
            )
            .with_options(options)
            .await
        {
            Ok(post) => post,
            Err(e) => {
                error!("[{}] increment_view 실패 (slug: {}): {}", self.kind.as_str(), slug, e);
                None
            }
        }
    }

    /// 조회수 상위 게시물 (공개분만)
    pub async fn top_viewed(&self, limit: i64) -> Vec<Post> {
        let options = FindOptions::builder()
            .sort(doc! { "viewCount": -1 })
            .limit(limit)
            .build();

        let cursor = match self
            .collection
            .find(doc! { "isPublished": true })
            .with_options(options)
            .await
        {
            Ok(cursor) => cursor,
            Err(e) => {
                error!("[{}] top_viewed 실패: {}", self.kind.as_str(), e);
                return Vec::new();
            }
        };

        cursor.try_collect().await.unwrap_or_else(|e| {
            error!("[{}] top_viewed 커서 수집 실패: {}", self.kind.as_str(), e);
            Vec::new()
        })
    }

    /// 집계 통계 (전체/공개/비공개/분류별)
    ///
    /// 매 호출 시 즉석 계산됩니다. 저장소 오류는 0값 통계로 강등됩니다.
    pub async fn stats(&self) -> ContentStats {
        let total = match self.collection.count_documents(doc! {}).await {
            Ok(n) => n,
            Err(e) => {
                error!("[{}] stats total 집계 실패: {}", self.kind.as_str(), e);
                return ContentStats::default();
            }
        };

        let published = match self
            .collection
            .count_documents(doc! { "isPublished": true })
            .await
        {
            Ok(n) => n,
            Err(e) => {
                error!("[{}] stats published 집계 실패: {}", self.kind.as_str(), e);
                return ContentStats::default();
            }
        };

        let mut stats = ContentStats {
            total,
            published,
            unpublished: total.saturating_sub(published),
            ..ContentStats::default()
        };

        let pipeline = vec![doc! {
            "$group": { "_id": "$category", "count": { "$sum": 1 } }
        }];

        let mut cursor = match self.collection.aggregate(pipeline).await {
            Ok(cursor) => cursor,
            Err(e) => {
                error!("[{}] stats 분류별 집계 실패: {}", self.kind.as_str(), e);
                return stats;
            }
        };

        loop {
            match cursor.try_next().await {
                Ok(Some(doc)) => {
                    let category = doc.get_str("_id").unwrap_or("other").to_string();
                    let count = match doc.get("count") {
                        Some(Bson::Int32(n)) => *n as u64,
                        Some(Bson::Int64(n)) => *n as u64,
                        _ => 0,
                    };
                    stats.by_category.insert(category, count);
                }
                Ok(None) => break,
                Err(e) => {
                    error!("[{}] stats 집계 커서 실패: {}", self.kind.as_str(), e);
                    break;
                }
            }
        }

        stats
    }

    /// 데이터베이스 인덱스 생성
    ///
    /// 슬러그 유니크 인덱스와 게시일 내림차순 인덱스를 생성합니다.
    /// 애플리케이션 초기화 시점에 한 번 실행됩니다.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let slug_index = IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("slug_unique".to_string())
                    .build(),
            )
            .build();

        let publish_date_index = IndexModel::builder()
            .keys(doc! { "publishDate": -1 })
            .options(
                IndexOptions::builder()
                    .name("publish_date_desc".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([slug_index, publish_date_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// 사용 가능한 슬러그를 찾습니다.
    ///
    /// 기본 슬러그가 이미 쓰이고 있으면 순번을 붙여가며 빈 자리를
    /// 찾습니다. `exclude`는 수정 중인 문서 자신을 충돌 검사에서
    /// 제외할 때 사용합니다.
    async fn unique_slug(
        &self,
        base: &str,
        exclude: Option<&ObjectId>,
    ) -> Result<String, AppError> {
        let mut candidate = base.to_string();
        let mut attempt = 1u32;

        loop {
            let mut query = doc! { "slug": &candidate };
            if let Some(oid) = exclude {
                query.insert("_id", doc! { "$ne": *oid });
            }

            let existing = self
                .collection
                .find_one(query)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

            if existing.is_none() {
                return Ok(candidate);
            }

            attempt += 1;
            if attempt > MAX_SLUG_ATTEMPTS {
                warn!(
                    "[{}] 슬러그 구분 시도 한도 초과 (base: {})",
                    self.kind.as_str(),
                    base
                );
                return Err(AppError::ConflictError(
                    "사용 가능한 슬러그를 찾지 못했습니다".to_string(),
                ));
            }
            candidate = with_suffix(base, attempt);
        }
    }
}

/// 검증이 끝난 생성 요청에서 새 게시물을 구성합니다.
///
/// 기본값 채움이 모두 여기서 일어납니다: 공개 상태 true, 조회수 0,
/// 게시일 미지정 시 현재 시각, 생성/수정 타임스탬프 동일 시작.
fn build_new_post(req: CreatePostRequest, slug: String) -> Post {
    let now = DateTime::now();

    Post {
        id: None,
        title: req.title,
        summary: req.summary,
        content: req.content,
        category: req.category,
        slug,
        author: req.author,
        is_published: req.is_published.unwrap_or(true),
        is_main_featured: req.is_main_featured.unwrap_or(false),
        publish_date: req.publish_date.map(DateTime::from_chrono).unwrap_or(now),
        view_count: 0,
        tags: req.tags,
        image_url: req.image_url,
        original_url: req.original_url,
        created_at: now,
        updated_at: now,
    }
}

/// 목록 조회 필터를 MongoDB 쿼리로 변환합니다.
fn build_filter_query(filter: &PostFilter) -> Document {
    let mut query = doc! {};

    if let Some(category) = &filter.category {
        query.insert("category", category);
    }
    if let Some(published) = filter.published {
        query.insert("isPublished", published);
    }

    query
}

/// 부분 수정 요청에서 `$set` 문서를 구성합니다.
///
/// 요청에 존재하는 필드만 포함하며 `updatedAt`은 항상 갱신합니다.
/// 슬러그는 여기서 건드리지 않습니다 — 재생성은 명시적 요청이 있을
/// 때만 별도 경로로 처리됩니다.
fn build_set_document(req: &UpdatePostRequest, kind: ContentKind) -> Result<Document, AppError> {
    let mut fields = Vec::new();

    if let Some(title) = &req.title
        && title.ko.trim().is_empty()
    {
        fields.push(FieldError::new("title.ko", "한국어 제목은 필수입니다"));
    }
    if let Some(content) = &req.content
        && content.ko.trim().is_empty()
    {
        fields.push(FieldError::new("content.ko", "한국어 본문은 필수입니다"));
    }
    if let Some(category) = &req.category
        && !kind.is_valid_category(category)
    {
        fields.push(FieldError::new("category", "지원하지 않는 분류입니다"));
    }

    if !fields.is_empty() {
        return Err(AppError::FieldValidation(fields));
    }

    let mut set_doc = doc! { "updatedAt": DateTime::now() };

    if let Some(title) = &req.title {
        set_doc.insert("title", to_bson(title)?);
    }
    if let Some(summary) = &req.summary {
        set_doc.insert("summary", to_bson(summary)?);
    }
    if let Some(content) = &req.content {
        set_doc.insert("content", to_bson(content)?);
    }
    if let Some(category) = &req.category {
        set_doc.insert("category", category);
    }
    if let Some(author) = &req.author {
        set_doc.insert("author", to_bson(author)?);
    }
    if let Some(is_published) = req.is_published {
        set_doc.insert("isPublished", is_published);
    }
    if let Some(is_main_featured) = req.is_main_featured {
        set_doc.insert("isMainFeatured", is_main_featured);
    }
    if let Some(publish_date) = req.publish_date {
        set_doc.insert("publishDate", DateTime::from_chrono(publish_date));
    }
    if let Some(tags) = &req.tags {
        set_doc.insert("tags", to_bson(tags)?);
    }
    if let Some(image_url) = &req.image_url {
        set_doc.insert("imageUrl", image_url);
    }
    if let Some(original_url) = &req.original_url {
        set_doc.insert("originalUrl", original_url);
    }

    Ok(set_doc)
}

fn to_bson<T: serde::Serialize>(value: &T) -> Result<Bson, AppError> {
    bson::to_bson(value).map_err(|e| AppError::InternalError(format!("BSON 변환 실패: {}", e)))
}

/// MongoDB 유니크 인덱스 충돌(E11000) 여부를 판별합니다.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we))
            if we.code == 11000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::LocalizedText;

    #[test]
    fn test_new_post_default_population() {
        let req = CreatePostRequest {
            title: LocalizedText::ko("테스트 뉴스"),
            summary: LocalizedText::default(),
            content: LocalizedText::ko("본문"),
            category: "company".to_string(),
            slug: None,
            author: None,
            is_published: None,
            is_main_featured: None,
            publish_date: None,
            tags: Vec::new(),
            image_url: None,
            original_url: None,
        };

        let post = build_new_post(req, slugify("테스트 뉴스"));

        assert_eq!(post.slug, "테스트-뉴스");
        assert!(post.is_published);
        assert!(!post.is_main_featured);
        assert_eq!(post.view_count, 0);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_new_post_respects_explicit_flags() {
        let req = CreatePostRequest {
            title: LocalizedText::ko("비공개 초안"),
            summary: LocalizedText::default(),
            content: LocalizedText::ko("본문"),
            category: "other".to_string(),
            slug: None,
            author: None,
            is_published: Some(false),
            is_main_featured: Some(true),
            publish_date: None,
            tags: vec!["태그".to_string()],
            image_url: None,
            original_url: None,
        };

        let post = build_new_post(req, "비공개-초안".to_string());

        assert!(!post.is_published);
        assert!(post.is_main_featured);
        assert_eq!(post.tags, vec!["태그".to_string()]);
    }

    #[test]
    fn test_filter_query_empty() {
        let query = build_filter_query(&PostFilter::default());
        assert!(query.is_empty());
    }

    #[test]
    fn test_filter_query_with_category_and_state() {
        let filter = PostFilter {
            category: Some("award".to_string()),
            published: Some(true),
            limit: None,
        };

        let query = build_filter_query(&filter);
        assert_eq!(query.get_str("category").unwrap(), "award");
        assert!(query.get_bool("isPublished").unwrap());
    }

    #[test]
    fn test_set_document_only_present_fields() {
        let req = UpdatePostRequest {
            title: Some(LocalizedText::ko("새 제목")),
            is_published: Some(false),
            ..UpdatePostRequest::default()
        };

        let set_doc = build_set_document(&req, ContentKind::News).unwrap();

        assert!(set_doc.contains_key("title"));
        assert!(set_doc.contains_key("isPublished"));
        assert!(set_doc.contains_key("updatedAt"));
        // 요청에 없는 필드는 건드리지 않는다
        assert!(!set_doc.contains_key("content"));
        assert!(!set_doc.contains_key("category"));
        assert!(!set_doc.contains_key("viewCount"));
    }

    #[test]
    fn test_set_document_never_touches_slug() {
        // 제목이 바뀌어도 $set 문서에는 slug가 포함되지 않는다
        let req = UpdatePostRequest {
            title: Some(LocalizedText::ko("완전히 다른 제목")),
            regenerate_slug: Some(true),
            ..UpdatePostRequest::default()
        };

        let set_doc = build_set_document(&req, ContentKind::News).unwrap();
        assert!(!set_doc.contains_key("slug"));
    }

    #[test]
    fn test_set_document_rejects_empty_korean_title() {
        let req = UpdatePostRequest {
            title: Some(LocalizedText::ko("   ")),
            ..UpdatePostRequest::default()
        };

        match build_set_document(&req, ContentKind::News) {
            Err(AppError::FieldValidation(fields)) => {
                assert_eq!(fields[0].field, "title.ko");
            }
            other => panic!("FieldValidation이 아님: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_set_document_rejects_foreign_category() {
        let req = UpdatePostRequest {
            category: Some("governance".to_string()),
            ..UpdatePostRequest::default()
        };

        // governance는 ESG 분류이므로 뉴스에서는 거부된다
        assert!(build_set_document(&req, ContentKind::News).is_err());
        assert!(build_set_document(&req, ContentKind::Esg).is_ok());
    }
}
