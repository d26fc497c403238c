//! # 인증 HTTP 핸들러
//!
//! 로그인, 토큰 갱신, 현재 사용자 조회 엔드포인트를 처리합니다.
//!
//! ## 토큰 흐름
//!
//! 1. `POST /login` — 자격 증명 검증 후 액세스/리프레시 토큰 쌍 발급
//! 2. 액세스 토큰 만료 시 `POST /token` — 리프레시 토큰을 새 쌍으로 교환
//! 3. 리프레시 토큰까지 만료되면 재로그인
//!
//! 로그인 실패 시 "사용자 없음"과 "비밀번호 불일치"는 같은 메시지로
//! 응답합니다. 계정 존재 여부가 응답으로 드러나지 않아야 합니다.

use actix_web::{HttpResponse, post, web};
use log::{info, warn};
use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::dto::auth::{LoginRequest, RefreshRequest, TokenResponse};
use crate::domain::dto::users::UserResponse;
use crate::domain::token::TokenType;
use crate::domain::user::User;
use crate::errors::AppError;
use crate::services::TokenService;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "사용자명 또는 비밀번호가 올바르지 않습니다";

/// 로그인 핸들러
///
/// # 엔드포인트
///
/// `POST /api/v1/auth/login`
///
/// # 요청 본문
///
/// ```json
/// { "username": "editor1", "password": "secret" }
/// ```
///
/// `username` 자리에는 이메일도 허용됩니다.
///
/// # 응답
///
/// 성공 시 토큰 쌍과 사용자 정보를 반환하고 `lastLoginAt`을 갱신합니다.
/// 비활성화된 계정은 자격 증명이 맞아도 403으로 거부됩니다.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate().map_err(AppError::from)?;
    let req = payload.into_inner();

    // 사용자명 우선, 실패하면 이메일로 조회
    let user = match state.users.find_by_username(&req.username).await? {
        Some(user) => Some(user),
        None => state.users.find_by_email(&req.username).await?,
    };

    let user = user
        .ok_or_else(|| AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()))?;

    let password_ok = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("비밀번호 검증 실패: {}", e)))?;

    if !password_ok {
        warn!("로그인 실패: {}", req.username);
        return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
    }

    if !user.is_active {
        return Err(AppError::AuthorizationError(
            "비활성화된 계정입니다".to_string(),
        ));
    }

    let pair = TokenService::issue_pair(&user)?;

    if let Some(id) = &user.id {
        // 로그인 자체는 성공이므로 기록 실패는 로그만 남긴다
        if let Err(e) = state.users.record_login(id).await {
            warn!("lastLoginAt 기록 실패 (user: {}): {}", user.username, e);
        }
    }

    info!("로그인 성공: {}", user.username);

    Ok(HttpResponse::Ok().json(TokenResponse::from_pair(
        pair,
        Some(UserResponse::from(user)),
    )))
}

/// 토큰 갱신 핸들러
///
/// # 엔드포인트
///
/// `POST /api/v1/auth/token`
///
/// 리프레시 토큰을 새 토큰 쌍으로 교환합니다. 액세스 토큰을 여기에
/// 제시하면 종류 불일치로 거부됩니다. 토큰이 유효해도 계정이 삭제
/// 또는 비활성화되었으면 갱신은 실패합니다.
#[post("/token")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate().map_err(AppError::from)?;

    let claims = TokenService::verify(&payload.refresh_token, TokenType::Refresh)?;

    let user = load_token_user(&state, &claims.sub).await?;

    if !user.is_active {
        return Err(AppError::AuthorizationError(
            "비활성화된 계정입니다".to_string(),
        ));
    }

    let pair = TokenService::issue_pair(&user)?;

    Ok(HttpResponse::Ok().json(TokenResponse::from_pair(pair, None)))
}

/// 현재 사용자 조회 핸들러
///
/// `GET /api/v1/auth/me` — 역할 가드 통과 후 전체 사용자 정보를
/// 반환합니다. 매크로 대신 라우트 설정에서 가드와 함께 등록됩니다.
pub async fn me(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// 토큰 클레임의 사용자 ID로 계정을 로드합니다.
///
/// 계정이 없거나 ID가 깨져 있으면 균일한 인증 에러로 수렴합니다.
async fn load_token_user(state: &AppState, user_id: &str) -> Result<User, AppError> {
    state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|e| match e {
            AppError::ValidationError(_) => {
                AppError::AuthenticationError("유효하지 않거나 만료된 토큰입니다".to_string())
            }
            other => other,
        })?
        .ok_or_else(|| AppError::AuthenticationError("계정을 찾을 수 없습니다".to_string()))
}
