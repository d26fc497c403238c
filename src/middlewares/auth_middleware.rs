//! 역할 기반 접근 제어 미들웨어
//!
//! ActixWeb 요청 파이프라인에서 액세스 토큰을 검증하고, 토큰이
//! 가리키는 사용자 레코드를 저장소에서 로드한 뒤, 유효 역할이
//! 허용 목록에 속하는지 확인합니다.
//!
//! 401과 403의 구분이 핵심 계약입니다:
//! - 401 — 토큰이 없거나 무효 / 토큰이 가리키는 계정이 존재하지 않음
//! - 403 — 신원은 확인됐지만 역할이 부족하거나 계정이 비활성화됨

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};

use crate::domain::user::Role;
use crate::middlewares::auth_inner::RoleGuardService;

/// 역할 기반 접근 제어 가드
pub struct RoleGuard {
    /// 접근을 허용할 유효 역할 목록
    allowed_roles: Vec<Role>,
}

impl RoleGuard {
    /// 지정한 역할들에게만 접근을 허용하는 가드 생성
    pub fn required_with_roles(roles: &[Role]) -> Self {
        Self {
            allowed_roles: roles.to_vec(),
        }
    }

    /// 관리자 전용 가드
    pub fn admin_only() -> Self {
        Self::required_with_roles(&[Role::Admin])
    }

    /// 인증된 모든 역할을 허용하는 가드
    pub fn any_role() -> Self {
        Self::required_with_roles(&[Role::Admin, Role::Editor, Role::Viewer])
    }
}

/// ActixWeb Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RoleGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardService {
            service: Rc::new(service),
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_only_allow_list() {
        let guard = RoleGuard::admin_only();
        assert_eq!(guard.allowed_roles, vec![Role::Admin]);
    }

    #[test]
    fn test_any_role_covers_all_roles() {
        let guard = RoleGuard::any_role();
        assert!(guard.allowed_roles.contains(&Role::Admin));
        assert!(guard.allowed_roles.contains(&Role::Editor));
        assert!(guard.allowed_roles.contains(&Role::Viewer));
    }
}
