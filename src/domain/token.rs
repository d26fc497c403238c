//! 토큰 도메인 모델
//!
//! JWT 클레임과 토큰 쌍을 정의합니다. 사용자 ID는 하위 호환을 위해
//! 현재 키(`sub`)와 레거시 키(`userId`) 양쪽에 모두 실립니다.

use serde::{Deserialize, Serialize};

use crate::domain::user::Role;

/// 토큰 종류 구분자
///
/// 액세스 토큰이 리프레시 토큰 자리에 (또는 그 반대로) 쓰이는 것을
/// 막기 위해 모든 토큰은 `type` 클레임을 가지며, 검증 시 기대 종류와
/// 일치해야 합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT 클레임
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 사용자 ID (현재 키)
    pub sub: String,
    /// 사용자 ID (레거시 키, 하위 호환용 중복)
    #[serde(rename = "userId")]
    pub user_id: String,
    /// 사용자 이름
    pub username: String,
    /// 이메일
    pub email: String,
    /// 유효 역할
    pub role: Role,
    /// 레거시 역할 목록 (존재하는 경우에만)
    #[serde(rename = "legacyRoles", skip_serializing_if = "Option::is_none")]
    pub legacy_roles: Option<Vec<String>>,
    /// 토큰 종류 구분자
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// 발급 시각 (unix seconds)
    pub iat: i64,
    /// 만료 시각 (unix seconds)
    pub exp: i64,
}

/// 액세스/리프레시 토큰 쌍
///
/// 로그인과 토큰 갱신 시 함께 발급됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 액세스 토큰 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TokenType::Access).unwrap(),
            "\"access\""
        );
        assert_eq!(
            serde_json::to_string(&TokenType::Refresh).unwrap(),
            "\"refresh\""
        );
    }

    #[test]
    fn test_claims_carry_both_user_id_keys() {
        let claims = TokenClaims {
            sub: "507f1f77bcf86cd799439011".to_string(),
            user_id: "507f1f77bcf86cd799439011".to_string(),
            username: "editor1".to_string(),
            email: "editor1@example.com".to_string(),
            role: Role::Editor,
            legacy_roles: None,
            token_type: TokenType::Access,
            iat: 0,
            exp: 0,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], json["userId"]);
        assert_eq!(json["type"], "access");
    }
}
