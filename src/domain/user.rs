//! User Entity Implementation
//!
//! 사용자 엔티티와 역할 모델의 핵심 구현체입니다.
//! 단일 `role` 필드와 레거시 역할 문자열 목록을 모두 지원하며,
//! 유효 역할 해석 규칙을 한 곳에 모아둡니다.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// 사용자 역할
///
/// 관리자 > 편집자 > 열람자 순으로 권한이 좁아지는 닫힌 집합입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자: 모든 작업 + 계정 관리
    Admin,
    /// 편집자: 콘텐츠 생성/수정
    Editor,
    /// 열람자: 관리 화면 읽기 전용
    Viewer,
}

impl Role {
    /// 문자열에서 역할을 파싱합니다 (대소문자 무관).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// 역할의 소문자 문자열 표현을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

/// 사용자 엔티티
///
/// 관리 패널에 접근하는 모든 계정을 표현합니다.
/// 영속 필드명은 원본 문서 레이아웃을 따라 camelCase입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 사용자 이름 (unique)
    pub username: String,
    /// 사용자 이메일 (unique)
    pub email: String,
    /// bcrypt 해시된 비밀번호
    pub password_hash: String,
    /// 표시 이름
    pub display_name: String,
    /// 소속 부서
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// 단일 역할 값 (레거시 레코드에는 없을 수 있음)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// 레거시 역할 문자열 목록 (하위 호환용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_roles: Option<Vec<String>>,
    /// 감사 가능한 슈퍼유저 플래그
    #[serde(default)]
    pub is_superuser: bool,
    /// 계정 활성화 여부 (소프트 비활성화)
    pub is_active: bool,
    /// 마지막 로그인 시간
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime>,
    /// 생성 시간
    pub created_at: DateTime,
    /// 수정 시간
    pub updated_at: DateTime,
}

impl User {
    /// 새 사용자 생성
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        display_name: String,
        department: Option<String>,
        role: Role,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            username,
            email,
            password_hash,
            display_name,
            department,
            role: Some(role),
            legacy_roles: None,
            is_superuser: false,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// ID 문자열로 변환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 유효 역할을 해석합니다.
    ///
    /// 해석 순서:
    /// 1. 슈퍼유저 플래그 또는 사용자명 `admin` → 관리자
    /// 2. 저장된 `role` 값
    /// 3. 레거시 역할 목록의 첫 항목 (파싱 가능한 경우)
    /// 4. 그 외 → 열람자
    pub fn effective_role(&self) -> Role {
        if self.is_superuser || self.username == "admin" {
            return Role::Admin;
        }

        if let Some(role) = self.role {
            return role;
        }

        if let Some(legacy) = &self.legacy_roles
            && let Some(first) = legacy.first()
            && let Some(role) = Role::parse(first)
        {
            return role;
        }

        Role::Viewer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(username: &str, role: Option<Role>, legacy: Option<Vec<String>>) -> User {
        User {
            id: None,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "hash".to_string(),
            display_name: username.to_string(),
            department: None,
            role,
            legacy_roles: legacy,
            is_superuser: false,
            is_active: true,
            last_login_at: None,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("EDITOR"), Some(Role::Editor));
        assert_eq!(Role::parse("Viewer"), Some(Role::Viewer));
        assert_eq!(Role::parse("moderator"), None);
    }

    #[test]
    fn test_effective_role_from_stored_role() {
        let user = user_with("editor1", Some(Role::Editor), None);
        assert_eq!(user.effective_role(), Role::Editor);
    }

    #[test]
    fn test_admin_username_override() {
        // 사용자명 admin은 저장된 역할이 viewer라도 관리자로 해석된다
        let user = user_with("admin", Some(Role::Viewer), None);
        assert_eq!(user.effective_role(), Role::Admin);
    }

    #[test]
    fn test_superuser_flag_override() {
        let mut user = user_with("ceo", Some(Role::Viewer), None);
        user.is_superuser = true;
        assert_eq!(user.effective_role(), Role::Admin);
    }

    #[test]
    fn test_legacy_roles_fallback() {
        let user = user_with(
            "legacy1",
            None,
            Some(vec!["editor".to_string(), "viewer".to_string()]),
        );
        assert_eq!(user.effective_role(), Role::Editor);
    }

    #[test]
    fn test_default_role_is_viewer() {
        let user = user_with("nobody", None, None);
        assert_eq!(user.effective_role(), Role::Viewer);

        // 파싱 불가능한 레거시 항목도 열람자로 수렴한다
        let user = user_with("odd", None, Some(vec!["superstar".to_string()]));
        assert_eq!(user.effective_role(), Role::Viewer);
    }

    #[test]
    fn test_user_serde_roundtrip() {
        let user = User::new(
            "writer".to_string(),
            "writer@example.com".to_string(),
            "hashed".to_string(),
            "작성자".to_string(),
            Some("홍보팀".to_string()),
            Role::Editor,
        );

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "writer");
        assert_eq!(json["displayName"], "작성자");
        assert_eq!(json["role"], "editor");
        assert_eq!(json["isActive"], true);

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back.effective_role(), Role::Editor);
    }
}
