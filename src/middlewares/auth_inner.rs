//! RoleGuard 인증 로직의 핵심적인 기능

use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, forward_ready};
use actix_web::{Error, HttpMessage, HttpResponse, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::token::TokenType;
use crate::domain::user::Role;
use crate::errors::AppError;
use crate::services::TokenService;
use crate::state::AppState;

/// 실제 인증/인가 로직을 수행하는 서비스
pub struct RoleGuardService<S> {
    pub service: Rc<S>,
    pub allowed_roles: Vec<Role>,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            match authorize(&req, &allowed_roles).await {
                Ok(user) => {
                    log::debug!("인증 성공: 사용자 {} ({})", user.username, user.role.as_str());
                    req.extensions_mut().insert(user);

                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    let response = match &err {
                        AppError::AuthenticationError(_) => {
                            log::warn!("인증 실패: {}", err);
                            HttpResponse::Unauthorized().json(serde_json::json!({
                                "error": "authentication_required",
                                "message": "유효한 인증 토큰이 필요합니다"
                            }))
                        }
                        AppError::AuthorizationError(message) => {
                            log::warn!("권한 부족: {}", err);
                            HttpResponse::Forbidden().json(serde_json::json!({
                                "error": "insufficient_permissions",
                                "message": message
                            }))
                        }
                        _ => {
                            log::error!("인가 처리 중 오류: {}", err);
                            HttpResponse::InternalServerError().json(serde_json::json!({
                                "error": "internal_error",
                                "message": "요청을 처리할 수 없습니다"
                            }))
                        }
                    };

                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, response).map_into_right_body();
                    Ok(res)
                }
            }
        })
    }
}

/// 요청을 인증/인가합니다.
///
/// 단계: Bearer 토큰 추출 → 액세스 토큰 검증 → 사용자 레코드 로드
/// → 활성 상태 확인 → 유효 역할이 허용 목록에 속하는지 확인.
async fn authorize(
    req: &ServiceRequest,
    allowed_roles: &[Role],
) -> Result<AuthenticatedUser, AppError> {
    // Authorization 헤더 추출
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError::AuthenticationError("Authorization 헤더가 없습니다".to_string())
        })?;

    let token = TokenService::extract_bearer_token(auth_header)?;

    // 리프레시 토큰은 여기서 절대 통과할 수 없다
    let claims = TokenService::verify(token, TokenType::Access)?;

    // 토큰이 가리키는 사용자를 저장소에서 로드
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("AppState가 등록되지 않았습니다".to_string()))?;

    let user = state
        .users
        .find_by_id(&claims.sub)
        .await
        .map_err(|e| match e {
            // 토큰 안의 ID가 깨진 경우: 신원을 알 수 없음
            AppError::ValidationError(_) => {
                AppError::AuthenticationError("유효하지 않거나 만료된 토큰입니다".to_string())
            }
            other => other,
        })?
        .ok_or_else(|| {
            AppError::AuthenticationError("계정을 찾을 수 없습니다".to_string())
        })?;

    if !user.is_active {
        return Err(AppError::AuthorizationError(
            "비활성화된 계정입니다".to_string(),
        ));
    }

    let role = user.effective_role();
    if !allowed_roles.contains(&role) {
        return Err(AppError::AuthorizationError(
            "접근 권한이 부족합니다".to_string(),
        ));
    }

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        username: user.username,
        role,
    })
}
