//! # Authentication Configuration Module
//!
//! JWT 토큰 서명과 만료 시간 관련 설정을 관리하는 모듈입니다.
//! 서명 비밀키는 모든 인가의 단일 실패 지점이므로, 미설정 상태나
//! 기본값 사용은 기동 시점에 경고로 표면화됩니다 — 조용한 폴백은
//! 허용되지 않습니다.
//!
//! ## 환경 변수 설정
//!
//! ```bash
//! export JWT_SECRET="your-super-secret-256-bit-key"
//! export JWT_EXPIRATION_HOURS="24"
//! export JWT_REFRESH_EXPIRATION_DAYS="7"
//! ```
//!
//! ## 키 생성 예제
//!
//! ```bash
//! openssl rand -base64 32
//! ```

use std::env;

/// JSON Web Token (JWT) 관련 설정을 관리하는 구조체
///
/// 액세스 토큰은 짧게(시간 단위), 리프레시 토큰은 길게(일 단위)
/// 유지하는 표준적인 이중 토큰 정책을 따릅니다.
pub struct JwtConfig;

/// 환경변수 미설정 시 사용되는 개발용 비밀키.
/// 운영 환경에서 이 값이 그대로 쓰이면 안 됩니다.
const INSECURE_DEFAULT_SECRET: &str = "dev-secret-key";

impl JwtConfig {
    /// JWT 서명에 사용할 비밀키를 반환합니다.
    ///
    /// `JWT_SECRET` 환경변수가 없으면 개발용 기본값을 사용하며,
    /// 그 사실을 경고 로그로 남깁니다.
    pub fn secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using default (not secure for production!)");
            INSECURE_DEFAULT_SECRET.to_string()
        })
    }

    /// 서명 비밀키 상태를 점검하고 문제가 있으면 경고를 출력합니다.
    ///
    /// 서버 기동 시 한 번 호출됩니다. 비밀키가 없거나 기본값이면
    /// 모든 토큰 검증이 알려진 키로 가능해지므로 반드시 표면화합니다.
    pub fn warn_if_insecure() {
        match env::var("JWT_SECRET") {
            Ok(secret) if secret == INSECURE_DEFAULT_SECRET => {
                log::warn!("⚠️ JWT_SECRET이 개발용 기본값입니다. 운영 환경에서는 반드시 교체하세요");
            }
            Ok(secret) if secret.len() < 32 => {
                log::warn!("⚠️ JWT_SECRET이 32바이트 미만입니다. 더 긴 키 사용을 권장합니다");
            }
            Ok(_) => {}
            Err(_) => {
                log::warn!("⚠️ JWT_SECRET이 설정되지 않았습니다. 개발용 기본값으로 동작합니다");
            }
        }
    }

    /// JWT 액세스 토큰의 만료 시간을 시간 단위로 반환합니다.
    ///
    /// 기본값은 24시간입니다.
    pub fn expiration_hours() -> i64 {
        env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24)
    }

    /// JWT 리프레시 토큰의 만료 시간을 일 단위로 반환합니다.
    ///
    /// 기본값은 7일입니다.
    pub fn refresh_expiration_days() -> i64 {
        env::var("JWT_REFRESH_EXPIRATION_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .unwrap_or(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_expiration_defaults() {
        unsafe {
            env::remove_var("JWT_EXPIRATION_HOURS");
            env::remove_var("JWT_REFRESH_EXPIRATION_DAYS");
        }

        assert_eq!(JwtConfig::expiration_hours(), 24);
        assert_eq!(JwtConfig::refresh_expiration_days(), 7);
    }

    #[test]
    #[serial]
    fn test_expiration_from_env() {
        unsafe {
            env::set_var("JWT_EXPIRATION_HOURS", "1");
            env::set_var("JWT_REFRESH_EXPIRATION_DAYS", "30");
        }

        assert_eq!(JwtConfig::expiration_hours(), 1);
        assert_eq!(JwtConfig::refresh_expiration_days(), 30);

        unsafe {
            env::remove_var("JWT_EXPIRATION_HOURS");
            env::remove_var("JWT_REFRESH_EXPIRATION_DAYS");
        }
    }
}
