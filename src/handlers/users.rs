//! # 사용자 관리 HTTP 핸들러
//!
//! 계정 관리 엔드포인트입니다. 전체가 관리자 전용 네임스페이스에
//! 등록되므로 핸들러에 도달한 요청은 이미 관리자입니다.
//!
//! 비밀번호는 평문으로 받아 bcrypt로 해시한 뒤에만 저장됩니다.
//! 응답에는 해시를 포함한 어떤 비밀번호 관련 필드도 실리지 않습니다.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use log::info;
use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::dto::users::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::domain::user::{Role, User};
use crate::errors::AppError;
use crate::state::AppState;

fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("비밀번호 해시 실패: {}", e)))
}

/// 사용자 목록 조회
#[get("")]
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = state.users.list().await?;
    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// 사용자 생성
///
/// 역할 미지정 시 열람자로 생성됩니다.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate().map_err(AppError::from)?;
    let req = payload.into_inner();

    let user = User::new(
        req.username,
        req.email,
        hash_password(&req.password)?,
        req.display_name,
        req.department,
        req.role.unwrap_or(Role::Viewer),
    );

    let created = state.users.create(user).await?;
    info!("사용자 생성: {} (by: {})", created.username, auth.username);

    Ok(HttpResponse::Created().json(UserResponse::from(created)))
}

/// 사용자 단건 조회
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// 사용자 부분 수정
#[patch("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate().map_err(AppError::from)?;
    let req = payload.into_inner();

    let password_hash = match &req.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = state
        .users
        .update(&id, &req, password_hash)
        .await?
        .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

    info!("사용자 수정: {} (by: {})", user.username, auth.username);

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// 사용자 삭제
///
/// 자기 자신의 계정은 삭제할 수 없습니다 — 마지막 관리자가
/// 스스로를 잠그는 사고를 막기 위한 최소한의 안전장치입니다.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    if *id == auth.user_id {
        return Err(AppError::ValidationError(
            "자기 자신의 계정은 삭제할 수 없습니다".to_string(),
        ));
    }

    if state.users.delete(&id).await? {
        info!("사용자 삭제: {} (by: {})", id, auth.username);
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))
    }
}
