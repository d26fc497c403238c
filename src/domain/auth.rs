//! 인증된 요청 주체 모델
//!
//! 역할 가드를 통과한 요청에는 이 구조체가 Request Extensions에
//! 삽입되며, 핸들러는 extractor로 꺼내 씁니다.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};

use crate::domain::user::Role;
use crate::errors::AppError;

/// 인증이 끝난 요청 주체
///
/// `role`은 해석이 끝난 유효 역할입니다 (슈퍼유저/레거시 규칙 반영).
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 허용 역할 목록에 속하는지 확인합니다.
    ///
    /// 가드가 이미 신원을 확인한 뒤이므로 실패는 403입니다.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::AuthorizationError(
                "접근 권한이 부족합니다".to_string(),
            ))
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| {
                    AppError::AuthenticationError("유효한 인증 토큰이 필요합니다".to_string())
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_passes_for_allowed_role() {
        let user = AuthenticatedUser {
            user_id: "id".to_string(),
            username: "editor1".to_string(),
            role: Role::Editor,
        };

        assert!(user.require(&[Role::Admin, Role::Editor]).is_ok());
    }

    #[test]
    fn test_require_rejects_with_authorization_error() {
        let user = AuthenticatedUser {
            user_id: "id".to_string(),
            username: "viewer1".to_string(),
            role: Role::Viewer,
        };

        match user.require(&[Role::Admin]) {
            Err(AppError::AuthorizationError(_)) => {}
            other => panic!("403 계열 에러가 아님: {:?}", other.map(|_| ())),
        }
    }
}
