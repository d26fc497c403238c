//! API 라우트 설정 모듈
//!
//! RESTful API 엔드포인트들을 기능별로 그룹화하여 제공합니다.
//! 네임스페이스별 보안 레벨:
//!
//! - **Public**: `/health`, `/api/v1/auth/login`, `/api/v1/auth/token`,
//!   `/api/v1/{news|esg}/published`
//! - **인증 필요 (모든 역할)**: `/api/v1/auth/me`, `/api/v1/dashboard`,
//!   `/api/v1/admin/{news|esg}` (생성/수정/삭제는 핸들러에서 역할 추가 확인)
//! - **관리자 전용**: `/api/v1/users`
//!
//! 등록 순서가 중요합니다: 콘텐츠 종류가 동적 세그먼트(`{kind}`)이므로
//! 리터럴 접두사를 가진 스코프(`auth`, `users`, `dashboard`)를 먼저
//! 등록해야 동적 스코프에 가로채이지 않습니다.

use actix_web::web;
use serde_json::json;

use crate::handlers;
use crate::middlewares::RoleGuard;

/// 모든 라우트를 설정합니다
///
/// # Examples
///
/// ```rust,ignore
/// use actix_web::App;
///
/// let app = App::new().configure(configure_all_routes);
/// ```
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    // Health check endpoint
    cfg.service(health_check);

    configure_auth_routes(cfg);
    configure_user_routes(cfg);
    configure_dashboard_routes(cfg);
    configure_content_routes(cfg);
}

/// 인증 관련 라우트를 설정합니다
///
/// - `POST /api/v1/auth/login` - 로그인 (Public)
/// - `POST /api/v1/auth/token` - 리프레시 토큰으로 토큰 쌍 갱신 (Public)
/// - `GET  /api/v1/auth/me` - 현재 사용자 정보 (인증 필요)
fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .service(handlers::auth::login)
            .service(handlers::auth::refresh_token)
            .service(
                web::resource("/me")
                    .wrap(RoleGuard::any_role())
                    .route(web::get().to(handlers::auth::me)),
            ),
    );
}

/// 사용자 관리 라우트를 설정합니다 (관리자 전용)
///
/// - `GET/POST /api/v1/users`
/// - `GET/PATCH/DELETE /api/v1/users/{id}`
fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(RoleGuard::admin_only())
            .service(handlers::users::list_users)
            .service(handlers::users::create_user)
            .service(handlers::users::get_user)
            .service(handlers::users::update_user)
            .service(handlers::users::delete_user),
    );
}

/// 대시보드 라우트를 설정합니다 (인증된 모든 역할)
fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/dashboard")
            .wrap(RoleGuard::any_role())
            .service(handlers::dashboard::snapshot),
    );
}

/// 콘텐츠 라우트를 설정합니다
///
/// 관리 네임스페이스와 공개 네임스페이스로 나뉩니다. `{kind}`는
/// `news` 또는 `esg`이며, 그 외 값은 404로 처리됩니다.
/// `/stats`가 `/{id}`보다 먼저 등록되어야 합니다.
fn configure_content_routes(cfg: &mut web::ServiceConfig) {
    // 관리 네임스페이스: 역할 가드 통과 후 작업별 역할 확인
    cfg.service(
        web::scope("/api/v1/admin/{kind}")
            .wrap(RoleGuard::any_role())
            .service(handlers::posts::list_posts)
            .service(handlers::posts::create_post)
            .service(handlers::posts::post_stats)
            .service(handlers::posts::get_post)
            .service(handlers::posts::update_post)
            .service(handlers::posts::delete_post),
    );

    // 공개 네임스페이스: 인증 불필요
    cfg.service(
        web::scope("/api/v1/{kind}/published")
            .service(handlers::posts::public_list)
            .service(handlers::posts::public_get_by_slug),
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// 로드밸런서나 모니터링 시스템에서 서비스 상태를 확인하는 데
/// 사용됩니다.
///
/// # Examples
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "cms_admin_backend",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
