//! 요청/응답 DTO 모듈
//!
//! HTTP 경계에서 쓰이는 타입들입니다. 엔티티를 그대로 노출하지 않고
//! ID를 16진수 문자열로, 시각을 RFC3339 문자열로 변환해 전달합니다.

pub mod auth;
pub mod posts;
pub mod users;
