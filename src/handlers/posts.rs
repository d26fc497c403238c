//! # 게시물 HTTP 핸들러
//!
//! 뉴스/ESG 게시물의 관리용 CRUD와 공개 조회 엔드포인트입니다.
//! 콘텐츠 종류는 경로 세그먼트(`news` | `esg`)로 들어와
//! `ContentKind`로 파싱되고, 해당 리포지토리가 선택됩니다.
//!
//! ## 권한 모델
//!
//! 관리 네임스페이스는 역할 가드를 통과한 요청만 도달합니다.
//! 그 위에 작업별 허용 목록이 적용됩니다:
//!
//! | 작업 | 허용 역할 |
//! |------|-----------|
//! | 목록/조회/통계 | admin, editor, viewer |
//! | 생성/수정 | admin, editor |
//! | 삭제 | admin |
//!
//! 공개 조회(`published` 네임스페이스)는 인증이 필요 없으며,
//! 단건 조회 시 조회수가 증가합니다.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use log::info;
use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::content::{Author, ContentKind, Post};
use crate::domain::dto::posts::{
    AuthorDisplay, CreatePostRequest, PostListQuery, PostResponse, UpdatePostRequest,
};
use crate::domain::user::Role;
use crate::errors::AppError;
use crate::state::AppState;

/// 경로 세그먼트를 콘텐츠 종류로 파싱합니다.
fn parse_kind(kind: &str) -> Result<ContentKind, AppError> {
    ContentKind::parse(kind)
        .ok_or_else(|| AppError::NotFound(format!("지원하지 않는 콘텐츠 종류입니다: {}", kind)))
}

/// 작성자를 표시용 형태로 해석합니다.
///
/// 참조 형태는 사용자 레코드를 조회해 변환하고, 삭제된 계정을
/// 가리키면 자리 표시자를 씁니다. 임베디드 형태는 그대로 통과합니다.
async fn resolve_author(state: &AppState, author: &Option<Author>) -> Option<AuthorDisplay> {
    match author {
        None => None,
        Some(Author::Embedded { name, department }) => Some(AuthorDisplay {
            name: name.clone(),
            department: department.clone(),
        }),
        Some(Author::Reference { user_id }) => match state.users.find_by_id(user_id).await {
            Ok(Some(user)) => Some(AuthorDisplay {
                name: user.display_name,
                department: user.department,
            }),
            _ => Some(AuthorDisplay {
                name: "알 수 없음".to_string(),
                department: None,
            }),
        },
    }
}

async fn to_response(state: &AppState, post: Post) -> PostResponse {
    let author = resolve_author(state, &post.author).await;
    PostResponse::from_post(post, author)
}

async fn to_responses(state: &AppState, posts: Vec<Post>) -> Vec<PostResponse> {
    let mut responses = Vec::with_capacity(posts.len());
    for post in posts {
        responses.push(to_response(state, post).await);
    }
    responses
}

// ---- 관리 네임스페이스 (/api/v1/admin/{kind}) ----

/// 게시물 목록 조회 (전체 상태)
#[get("")]
pub async fn list_posts(
    state: web::Data<AppState>,
    kind: web::Path<String>,
    query: web::Query<PostListQuery>,
) -> Result<HttpResponse, AppError> {
    let repo = state.content_repo(parse_kind(&kind)?);
    let posts = repo.list(&query.into_inner().into_filter()).await;

    Ok(HttpResponse::Ok().json(to_responses(&state, posts).await))
}

/// 게시물 생성
///
/// 작성자가 지정되지 않으면 현재 로그인한 계정에 대한 참조가
/// 작성자로 기록됩니다.
#[post("")]
pub async fn create_post(
    state: web::Data<AppState>,
    kind: web::Path<String>,
    auth: AuthenticatedUser,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require(&[Role::Admin, Role::Editor])?;
    payload.validate().map_err(AppError::from)?;

    let repo = state.content_repo(parse_kind(&kind)?);

    let mut req = payload.into_inner();
    if req.author.is_none() {
        req.author = Some(Author::Reference {
            user_id: auth.user_id.clone(),
        });
    }

    let post = repo.create(req).await?;
    info!(
        "[{}] 게시물 생성: {} (slug: {}, by: {})",
        repo.kind().as_str(),
        post.title.ko,
        post.slug,
        auth.username
    );

    let response = to_response(&state, post).await;
    Ok(HttpResponse::Created().json(response))
}

/// 콘텐츠 종류별 집계 통계
#[get("/stats")]
pub async fn post_stats(
    state: web::Data<AppState>,
    kind: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let repo = state.content_repo(parse_kind(&kind)?);
    Ok(HttpResponse::Ok().json(repo.stats().await))
}

/// 게시물 단건 조회
#[get("/{id}")]
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (kind, id) = path.into_inner();
    let repo = state.content_repo(parse_kind(&kind)?);

    let post = repo
        .get_by_id(&id)
        .await
        .ok_or_else(|| AppError::NotFound("게시물을 찾을 수 없습니다".to_string()))?;

    let response = to_response(&state, post).await;
    Ok(HttpResponse::Ok().json(response))
}

/// 게시물 부분 수정
#[patch("/{id}")]
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
    payload: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require(&[Role::Admin, Role::Editor])?;
    payload.validate().map_err(AppError::from)?;

    let (kind, id) = path.into_inner();
    let repo = state.content_repo(parse_kind(&kind)?);

    let post = repo
        .update(&id, &payload.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("게시물을 찾을 수 없습니다".to_string()))?;

    let response = to_response(&state, post).await;
    Ok(HttpResponse::Ok().json(response))
}

/// 게시물 삭제 (관리자 전용)
#[delete("/{id}")]
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[Role::Admin])?;

    let (kind, id) = path.into_inner();
    let repo = state.content_repo(parse_kind(&kind)?);

    if repo.delete(&id).await {
        info!("[{}] 게시물 삭제: {} (by: {})", repo.kind().as_str(), id, auth.username);
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("게시물을 찾을 수 없습니다".to_string()))
    }
}

// ---- 공개 네임스페이스 (/api/v1/{kind}/published) ----

/// 공개 게시물 목록 조회
///
/// 인증이 필요 없으며 공개 상태 필터가 강제됩니다.
#[get("")]
pub async fn public_list(
    state: web::Data<AppState>,
    kind: web::Path<String>,
    query: web::Query<PostListQuery>,
) -> Result<HttpResponse, AppError> {
    let repo = state.content_repo(parse_kind(&kind)?);
    let posts = repo
        .list(&query.into_inner().into_published_filter())
        .await;

    Ok(HttpResponse::Ok().json(to_responses(&state, posts).await))
}

/// 공개 게시물 단건 조회 (슬러그)
///
/// 조회수가 원자적으로 1 증가한 뒤의 문서를 반환합니다.
#[get("/{slug}")]
pub async fn public_get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (kind, slug) = path.into_inner();
    let repo = state.content_repo(parse_kind(&kind)?);

    let post = repo
        .increment_view(&slug)
        .await
        .ok_or_else(|| AppError::NotFound("게시물을 찾을 수 없습니다".to_string()))?;

    let response = to_response(&state, post).await;
    Ok(HttpResponse::Ok().json(response))
}
