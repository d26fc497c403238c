//! HTTP 핸들러 모듈
//!
//! 기능별로 분리된 엔드포인트 핸들러들입니다.
//! 모든 핸들러는 `Result<HttpResponse, AppError>`를 반환하며,
//! 에러는 `ResponseError` 구현을 통해 자동으로 HTTP 응답이 됩니다.

pub mod auth;
pub mod dashboard;
pub mod posts;
pub mod users;
