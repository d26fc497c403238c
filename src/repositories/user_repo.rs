//! # 사용자 리포지토리 구현
//!
//! 사용자 엔티티의 데이터 액세스 계층입니다. 사용자명과 이메일의
//! 유니크 제약은 저장 계층의 인덱스로 강제됩니다.
//!
//! 콘텐츠 리포지토리와 달리 강등 정책을 쓰지 않습니다 — 계정 조회
//! 실패를 "계정 없음"으로 눙치면 인증 결정이 왜곡되므로, 모든
//! 메서드는 `Result`로 오류를 그대로 표면화합니다.

use std::env;

use futures_util::TryStreamExt;
use log::{info, warn};
use mongodb::bson::{self, DateTime, Document, doc, oid::ObjectId};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::domain::dto::users::UpdateUserRequest;
use crate::domain::user::{Role, User};
use crate::errors::AppError;

/// 사용자 데이터 액세스 리포지토리
#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.get_database().collection::<User>("users"),
        }
    }

    /// ID로 사용자 조회
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - 잘못된 ObjectId 형식
    /// * `AppError::DatabaseError` - 저장소 오류
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        self.collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 사용자명으로 조회
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.collection
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 이메일로 조회
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.collection
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 전체 사용자 목록 (생성일 내림차순)
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 새 사용자 생성
    ///
    /// 이메일과 사용자명의 중복 여부를 사전에 검증합니다.
    /// 경합은 유니크 인덱스가 최종적으로 막습니다.
    pub async fn create(&self, mut user: User) -> Result<User, AppError> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::ConflictError(
                "이미 사용 중인 사용자명입니다".to_string(),
            ));
        }

        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::ConflictError(
                "이미 사용 중인 이메일입니다".to_string(),
            ));
        }

        let result = self
            .collection
            .insert_one(&user)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        user.id = result.inserted_id.as_object_id();

        Ok(user)
    }

    /// 사용자 부분 수정
    ///
    /// 요청에 존재하는 필드만 `$set`으로 반영하고 `updatedAt`을
    /// 갱신합니다. 비밀번호는 호출 전에 해시된 값으로 전달됩니다.
    pub async fn update(
        &self,
        id: &str,
        req: &UpdateUserRequest,
        password_hash: Option<String>,
    ) -> Result<Option<User>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        let set_doc = build_user_set_document(req, password_hash)?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set_doc })
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 사용자 삭제
    ///
    /// * `Ok(true)` - 삭제됨
    /// * `Ok(false)` - 해당 ID 없음 (에러 아님)
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        let result = self
            .collection
            .delete_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }

    /// 로그인 시각 기록
    pub async fn record_login(&self, id: &ObjectId) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": { "lastLoginAt": DateTime::now() } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// 데이터베이스 인덱스 생성
    ///
    /// 사용자명/이메일 유니크 인덱스를 생성합니다.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            )
            .build();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([username_index, email_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// 초기 관리자 계정 시드
    ///
    /// `admin` 계정이 없으면 슈퍼유저 플래그가 켜진 관리자 계정을
    /// 생성합니다. 초기 비밀번호는 `ADMIN_INITIAL_PASSWORD` 환경변수로
    /// 지정하며, 미설정 시 기본값 사용 사실이 경고로 남습니다.
    pub async fn seed_admin(&self) -> Result<(), AppError> {
        if self.find_by_username("admin").await?.is_some() {
            return Ok(());
        }

        let password = env::var("ADMIN_INITIAL_PASSWORD").unwrap_or_else(|_| {
            warn!("⚠️ ADMIN_INITIAL_PASSWORD가 설정되지 않아 기본값을 사용합니다. 즉시 변경하세요");
            "changeme!".to_string()
        });

        let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::InternalError(format!("비밀번호 해시 실패: {}", e)))?;

        let email =
            env::var("ADMIN_INITIAL_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());

        let mut admin = User::new(
            "admin".to_string(),
            email,
            password_hash,
            "관리자".to_string(),
            None,
            Role::Admin,
        );
        admin.is_superuser = true;

        self.create(admin).await?;
        info!("✅ 초기 관리자 계정이 생성되었습니다 (username: admin)");

        Ok(())
    }
}

/// 사용자 부분 수정 요청에서 `$set` 문서를 구성합니다.
fn build_user_set_document(
    req: &UpdateUserRequest,
    password_hash: Option<String>,
) -> Result<Document, AppError> {
    let mut set_doc = doc! { "updatedAt": DateTime::now() };

    if let Some(email) = &req.email {
        set_doc.insert("email", email);
    }
    if let Some(display_name) = &req.display_name {
        set_doc.insert("displayName", display_name);
    }
    if let Some(department) = &req.department {
        set_doc.insert("department", department);
    }
    if let Some(role) = &req.role {
        let value = bson::to_bson(role)
            .map_err(|e| AppError::InternalError(format!("BSON 변환 실패: {}", e)))?;
        set_doc.insert("role", value);
    }
    if let Some(is_active) = req.is_active {
        set_doc.insert("isActive", is_active);
    }
    if let Some(hash) = password_hash {
        set_doc.insert("passwordHash", hash);
    }

    Ok(set_doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_set_document_only_present_fields() {
        let req = UpdateUserRequest {
            display_name: Some("새 이름".to_string()),
            is_active: Some(false),
            ..UpdateUserRequest::default()
        };

        let set_doc = build_user_set_document(&req, None).unwrap();

        assert_eq!(set_doc.get_str("displayName").unwrap(), "새 이름");
        assert!(!set_doc.get_bool("isActive").unwrap());
        assert!(set_doc.contains_key("updatedAt"));
        assert!(!set_doc.contains_key("email"));
        assert!(!set_doc.contains_key("passwordHash"));
        assert!(!set_doc.contains_key("role"));
    }

    #[test]
    fn test_user_set_document_with_password_hash() {
        let req = UpdateUserRequest::default();
        let set_doc = build_user_set_document(&req, Some("new-hash".to_string())).unwrap();

        assert_eq!(set_doc.get_str("passwordHash").unwrap(), "new-hash");
    }

    #[test]
    fn test_user_set_document_role_serialization() {
        let req = UpdateUserRequest {
            role: Some(Role::Editor),
            ..UpdateUserRequest::default()
        };

        let set_doc = build_user_set_document(&req, None).unwrap();
        assert_eq!(set_doc.get_str("role").unwrap(), "editor");
    }
}
