//! 클라이언트 세션 저장소
//!
//! 토큰 쌍과 **절대** 만료 시각을 JSON 파일로 보관합니다. 상대 TTL이
//! 아니라 절대 시각을 저장하므로 만료 판정이 타이머에 의존하지
//! 않으며, 프로세스를 재시작해도 세션이 유지됩니다.
//!
//! `load()`는 절반만 유효한 쌍을 절대 돌려주지 않습니다: 두 토큰 중
//! 하나라도 없거나 만료 시각이 지났으면 `None`입니다.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};

/// 저장되는 세션 형태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    /// 절대 만료 시각 (unix seconds)
    pub expires_at: i64,
}

/// 파일 기반 세션 저장소
///
/// 빈번한 조회를 위해 메모리 사본을 잠금 뒤에 유지하고,
/// 변경 시마다 파일로 내립니다.
pub struct SessionStore {
    path: PathBuf,
    cached: RwLock<Option<StoredSession>>,
}

impl SessionStore {
    /// 지정한 경로의 세션 저장소를 엽니다.
    ///
    /// 파일이 이미 있으면 읽어서 메모리 사본을 채웁니다.
    /// 깨진 파일은 빈 세션으로 취급합니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = read_session_file(&path);

        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    /// 토큰 쌍을 저장합니다.
    ///
    /// 만료 시각은 `now + ttl`의 절대값으로 기록됩니다.
    pub fn save(&self, access_token: &str, refresh_token: &str, ttl_secs: i64) {
        let session = StoredSession {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at: Utc::now().timestamp() + ttl_secs,
        };

        if let Ok(json) = serde_json::to_string_pretty(&session)
            && let Err(e) = fs::write(&self.path, json)
        {
            // 파일 저장 실패 시에도 메모리 사본은 유지된다
            warn!("세션 파일 저장 실패 ({}): {}", self.path.display(), e);
        }

        *self.cached.write().unwrap() = Some(session);
    }

    /// 유효한 세션을 반환합니다.
    ///
    /// 두 토큰이 모두 존재하고 만료 전일 때만 `Some`입니다.
    pub fn load(&self) -> Option<StoredSession> {
        let guard = self.cached.read().unwrap();
        let session = guard.as_ref()?;

        if session.access_token.is_empty() || session.refresh_token.is_empty() {
            return None;
        }
        if session.expires_at <= Utc::now().timestamp() {
            return None;
        }

        Some(session.clone())
    }

    /// 세션을 제거합니다 (로그아웃 / 복구 불가능한 갱신 실패).
    pub fn clear(&self) {
        *self.cached.write().unwrap() = None;

        if self.path.exists()
            && let Err(e) = fs::remove_file(&self.path)
        {
            warn!("세션 파일 삭제 실패 ({}): {}", self.path.display(), e);
        }
    }

    /// 세션이 없거나 만료되었는지 확인합니다.
    pub fn is_expired(&self) -> bool {
        self.load().is_none()
    }
}

/// 세션 파일을 읽습니다. 없거나 깨졌으면 `None`입니다.
fn read_session_file(path: &Path) -> Option<StoredSession> {
    let contents = fs::read_to_string(path).ok()?;

    match serde_json::from_str(&contents) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("세션 파일 파싱 실패 ({}): {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session.json"))
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load().is_none());
        assert!(store.is_expired());

        store.save("access-1", "refresh-1", 3600);

        let session = store.load().unwrap();
        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.refresh_token, "refresh-1");
        assert!(!store.is_expired());

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        SessionStore::new(&path).save("access-1", "refresh-1", 3600);

        // 새 인스턴스가 파일에서 세션을 복원한다
        let reopened = SessionStore::new(&path);
        assert_eq!(reopened.load().unwrap().access_token, "access-1");
    }

    #[test]
    fn test_expired_session_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        // 음수 TTL로 이미 만료된 세션을 기록
        store.save("access-1", "refresh-1", -10);

        assert!(store.load().is_none());
        assert!(store.is_expired());
    }

    #[test]
    fn test_half_valid_pair_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("access-only", "", 3600);
        assert!(store.load().is_none());

        store.save("", "refresh-only", 3600);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not-json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load().is_none());
    }
}
