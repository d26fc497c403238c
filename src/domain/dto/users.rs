//! 사용자 관리 요청/응답 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::user::{Role, User};

/// 사용자 생성 요청 (관리자 전용)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 30, message = "사용자명은 3-30자 사이여야 합니다"))]
    pub username: String,
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,
    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    pub password: String,
    #[validate(length(min = 1, message = "표시 이름을 입력해주세요"))]
    pub display_name: String,
    pub department: Option<String>,
    /// 미지정 시 열람자로 생성
    pub role: Option<Role>,
}

/// 사용자 부분 수정 요청 (관리자 전용)
///
/// 존재하는 필드만 반영됩니다. 비밀번호는 평문으로 받아
/// 저장 전에 해시됩니다.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// 사용자 응답
///
/// 비밀번호 해시는 절대 포함되지 않으며, `role`은 해석이 끝난
/// 유효 역할입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub role: Role,
    pub is_superuser: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let role = user.effective_role();

        Self {
            id: user.id_string().unwrap_or_default(),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            department: user.department,
            role,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            last_login_at: user
                .last_login_at
                .and_then(|dt| dt.try_to_rfc3339_string().ok()),
            created_at: user
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
            updated_at: user
                .updated_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_hides_password_and_resolves_role() {
        let user = User::new(
            "admin".to_string(),
            "admin@example.com".to_string(),
            "secret-hash".to_string(),
            "관리자".to_string(),
            None,
            Role::Viewer,
        );

        let response = UserResponse::from(user);

        // admin 사용자명 오버라이드가 응답에도 반영된다
        assert_eq!(response.role, Role::Admin);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
