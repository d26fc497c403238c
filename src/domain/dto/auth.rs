//! 인증 요청/응답 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::dto::users::UserResponse;
use crate::domain::token::TokenPair;

/// 로그인 요청
///
/// `username`에는 사용자명 또는 이메일을 넣을 수 있습니다.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "사용자명을 입력해주세요"))]
    pub username: String,
    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 토큰 갱신 요청
///
/// 리프레시 토큰을 새 토큰 쌍으로 교환합니다.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "리프레시 토큰이 필요합니다"))]
    pub refresh_token: String,
}

/// 토큰 발급 응답
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// 액세스 토큰 만료까지 남은 시간 (초)
    pub expires_in: i64,
    /// 로그인 응답에만 포함되는 사용자 정보
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl TokenResponse {
    pub fn from_pair(pair: TokenPair, user: Option<UserResponse>) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
            user,
        }
    }
}
