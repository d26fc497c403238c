//! 대시보드 HTTP 핸들러

use actix_web::{HttpResponse, get, web};

use crate::errors::AppError;
use crate::services::dashboard_service;
use crate::state::AppState;

/// 대시보드 복합 스냅샷 조회
///
/// `GET /api/v1/dashboard` — 두 콘텐츠 종류의 통계, 최근 게시물,
/// 조회수 상위 게시물과 서버 타임스탬프를 한 번에 반환합니다.
/// 인증된 모든 역할이 읽을 수 있습니다.
#[get("")]
pub async fn snapshot(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let snapshot = dashboard_service::build_snapshot(&state).await;
    Ok(HttpResponse::Ok().json(snapshot))
}
