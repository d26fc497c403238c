//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 타입 안전하고
//! 일관된 에러 처리를 제공합니다. 모든 핸들러는 `Result<_, AppError>`를
//! 반환하며, 에러는 자동으로 적절한 HTTP 상태 코드와 JSON 응답으로
//! 변환됩니다.
//!
//! ## HTTP 상태 코드 매핑
//!
//! | 에러 | 상태 코드 |
//! |------|-----------|
//! | `ValidationError` / `FieldValidation` | 400 Bad Request |
//! | `AuthenticationError` | 401 Unauthorized |
//! | `AuthorizationError` | 403 Forbidden |
//! | `NotFound` | 404 Not Found |
//! | `ConflictError` | 409 Conflict |
//! | 그 외 | 500 Internal Server Error |
//!
//! 401과 403의 구분은 엄격하게 유지됩니다: 401은 "누구인지 모른다",
//! 403은 "누구인지 알지만 허용되지 않는다"를 의미합니다.

use serde::Serialize;
use thiserror::Error;

/// 필드 단위 검증 실패 항목
///
/// UI가 각 입력 필드를 개별적으로 강조할 수 있도록
/// 필드 경로와 메시지를 함께 전달합니다.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// 실패한 필드 경로 (예: `title.ko`)
    pub field: String,
    /// 사용자에게 표시할 메시지
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// 애플리케이션 전역 에러 타입
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 관련 에러 (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 필드 단위 검증 에러 (400 Bad Request)
    ///
    /// 각 항목이 어떤 필드에서 왜 실패했는지 담고 있어
    /// UI가 필드별로 메시지를 표시할 수 있습니다.
    #[error("입력값이 유효하지 않습니다")]
    FieldValidation(Vec<FieldError>),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 충돌/중복 에러 (409 Conflict)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 인증 실패 에러 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 권한 부족 에러 (403 Forbidden)
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::ValidationError(_) | AppError::FieldValidation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            AppError::FieldValidation(fields) => actix_web::HttpResponse::build(status)
                .json(serde_json::json!({
                    "error": "validation_error",
                    "message": self.to_string(),
                    "fields": fields,
                })),
            _ => actix_web::HttpResponse::build(status)
                .json(serde_json::json!({
                    "error": self.to_string()
                })),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    /// `validator` 크레이트의 검증 결과를 필드 단위 에러로 변환합니다.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();

        for (field, items) in errors.field_errors() {
            for item in items {
                let message = item
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| item.code.to_string());
                fields.push(FieldError::new(&field, &message));
            }
        }

        AppError::FieldValidation(fields)
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("제목은 필수입니다".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_field_validation_error_response() {
        let error = AppError::FieldValidation(vec![
            FieldError::new("title.ko", "한국어 제목은 필수입니다"),
            FieldError::new("category", "지원하지 않는 분류입니다"),
        ]);
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("게시물을 찾을 수 없습니다".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_authentication_error_response() {
        let error = AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authorization_error_response() {
        let error = AppError::AuthorizationError("접근 권한이 부족합니다".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_conflict_error_response() {
        let error = AppError::ConflictError("이미 사용 중인 슬러그입니다".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_error_response() {
        let error = AppError::InternalError("something went wrong".to_string());
        let response = error.error_response();

        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
