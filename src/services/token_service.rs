//! JWT 토큰 관리 서비스 구현
//!
//! JSON Web Token 기반의 인증 시스템을 제공합니다.
//! 액세스 토큰과 리프레시 토큰의 생성과 검증을 담당하며,
//! 두 토큰은 `type` 클레임으로 엄격히 구분됩니다.
//!
//! 검증 실패는 원인(서명 불일치 / 만료 / 종류 불일치 / ID 누락)과
//! 무관하게 항상 동일한 인증 에러로 수렴합니다. 호출자는 성공/실패만
//! 분기할 수 있고, 실패 원인으로 서명 체계에 대한 정보가 새어 나가지
//! 않습니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::JwtConfig;
use crate::domain::token::{TokenClaims, TokenPair, TokenType};
use crate::domain::user::User;
use crate::errors::AppError;

/// 모든 검증 실패에 공통으로 쓰이는 메시지
const INVALID_TOKEN_MESSAGE: &str = "유효하지 않거나 만료된 토큰입니다";

/// JWT 토큰 관리 서비스
///
/// HMAC-SHA256 서명을 사용하며, 서명 비밀키는 `JwtConfig`에서
/// 프로세스 전역 설정으로 읽습니다.
pub struct TokenService;

impl TokenService {
    /// 사용자를 위한 토큰 한 개를 생성합니다.
    fn issue(user: &User, token_type: TokenType) -> Result<String, AppError> {
        let user_id = user
            .id_string()
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;

        let now = Utc::now();
        let expiration = match token_type {
            TokenType::Access => now + Duration::hours(JwtConfig::expiration_hours()),
            TokenType::Refresh => now + Duration::days(JwtConfig::refresh_expiration_days()),
        };

        let claims = TokenClaims {
            sub: user_id.clone(),
            user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.effective_role(),
            legacy_roles: user.legacy_roles.clone(),
            token_type,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let secret = JwtConfig::secret();
        let encoding_key = EncodingKey::from_secret(secret.as_ref());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| AppError::InternalError(format!("JWT 토큰 생성 실패: {}", e)))
    }

    /// 액세스 토큰 생성
    pub fn issue_access(user: &User) -> Result<String, AppError> {
        Self::issue(user, TokenType::Access)
    }

    /// 리프레시 토큰 생성
    pub fn issue_refresh(user: &User) -> Result<String, AppError> {
        Self::issue(user, TokenType::Refresh)
    }

    /// 토큰 쌍 생성 (액세스 + 리프레시)
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let pair = TokenService::issue_pair(&user)?;
    /// println!("expires in {} seconds", pair.expires_in);
    /// ```
    pub fn issue_pair(user: &User) -> Result<TokenPair, AppError> {
        let access_token = Self::issue_access(user)?;
        let refresh_token = Self::issue_refresh(user)?;
        let expires_in = JwtConfig::expiration_hours() * 3600;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in,
        })
    }

    /// JWT 토큰 검증 및 클레임 추출
    ///
    /// 서명/만료 검증에 더해 `type` 클레임이 기대 종류와 일치하는지,
    /// 사용자 ID 클레임이 존재하는지 확인합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::AuthenticationError` - 모든 검증 실패. 원인별로
    ///   다른 메시지를 내지 않습니다.
    pub fn verify(token: &str, expected_type: TokenType) -> Result<TokenClaims, AppError> {
        let secret = JwtConfig::secret();
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        let claims = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::AuthenticationError(INVALID_TOKEN_MESSAGE.to_string()))?;

        if claims.token_type != expected_type {
            return Err(AppError::AuthenticationError(
                INVALID_TOKEN_MESSAGE.to_string(),
            ));
        }

        if claims.sub.is_empty() {
            return Err(AppError::AuthenticationError(
                INVALID_TOKEN_MESSAGE.to_string(),
            ));
        }

        Ok(claims)
    }

    /// Bearer 토큰에서 실제 토큰 부분 추출
    ///
    /// HTTP Authorization 헤더의 "Bearer {token}" 형식에서
    /// 토큰 부분만을 추출합니다.
    pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AppError> {
        auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::AuthenticationError("유효하지 않은 인증 헤더 형식입니다".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Role;
    use mongodb::bson::oid::ObjectId;
    use serial_test::serial;

    fn test_user() -> User {
        let mut user = User::new(
            "editor1".to_string(),
            "editor1@example.com".to_string(),
            "hash".to_string(),
            "편집자".to_string(),
            Some("홍보팀".to_string()),
            Role::Editor,
        );
        user.id = Some(ObjectId::new());
        user
    }

    fn set_secret(value: &str) {
        unsafe {
            std::env::set_var("JWT_SECRET", value);
        }
    }

    #[test]
    #[serial]
    fn test_issue_and_verify_roundtrip() {
        set_secret("test-secret-for-roundtrip");
        let user = test_user();

        let pair = TokenService::issue_pair(&user).unwrap();
        let claims = TokenService::verify(&pair.access_token, TokenType::Access).unwrap();

        assert_eq!(claims.sub, user.id_string().unwrap());
        assert_eq!(claims.user_id, claims.sub);
        assert_eq!(claims.username, "editor1");
        assert_eq!(claims.role, Role::Editor);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    #[serial]
    fn test_token_type_discrimination() {
        set_secret("test-secret-for-types");
        let user = test_user();
        let pair = TokenService::issue_pair(&user).unwrap();

        // 정상적으로 서명된 토큰이라도 종류가 다르면 거부된다
        assert!(TokenService::verify(&pair.refresh_token, TokenType::Access).is_err());
        assert!(TokenService::verify(&pair.access_token, TokenType::Refresh).is_err());

        // 올바른 종류는 통과
        assert!(TokenService::verify(&pair.refresh_token, TokenType::Refresh).is_ok());
    }

    #[test]
    #[serial]
    fn test_tampered_token_rejected() {
        set_secret("test-secret-for-tamper");
        let user = test_user();
        let token = TokenService::issue_access(&user).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');

        assert!(TokenService::verify(&tampered, TokenType::Access).is_err());
    }

    #[test]
    #[serial]
    fn test_wrong_secret_rejected() {
        set_secret("first-secret");
        let user = test_user();
        let token = TokenService::issue_access(&user).unwrap();

        set_secret("second-secret");
        assert!(TokenService::verify(&token, TokenType::Access).is_err());
    }

    #[test]
    #[serial]
    fn test_rejection_is_uniform() {
        set_secret("test-secret-uniform");
        let user = test_user();
        let pair = TokenService::issue_pair(&user).unwrap();

        // 종류 불일치와 서명 불일치가 동일한 에러 변형과 메시지로 수렴한다
        let type_mismatch = TokenService::verify(&pair.refresh_token, TokenType::Access)
            .unwrap_err();
        let tampered = TokenService::verify("not-a-jwt", TokenType::Access).unwrap_err();

        match (&type_mismatch, &tampered) {
            (
                AppError::AuthenticationError(a),
                AppError::AuthenticationError(b),
            ) => assert_eq!(a, b),
            _ => panic!("인증 에러 변형이 아님"),
        }
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            TokenService::extract_bearer_token("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert!(TokenService::extract_bearer_token("Basic abc").is_err());
        assert!(TokenService::extract_bearer_token("bearer abc").is_err());
    }
}
