//! 요청 파이프라인 미들웨어 모듈

mod auth_inner;
mod auth_middleware;

pub use auth_middleware::RoleGuard;
