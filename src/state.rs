//! 애플리케이션 공유 상태
//!
//! 리포지토리 인스턴스들을 묶어 `web::Data`로 핸들러와 미들웨어에
//! 주입합니다. MongoDB 클라이언트는 내부적으로 연결 풀을 공유하므로
//! 리포지토리는 값으로 복제해도 가볍습니다.

use crate::db::Database;
use crate::domain::content::ContentKind;
use crate::repositories::{ContentRepository, UserRepository};

/// 핸들러/미들웨어가 공유하는 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub news: ContentRepository,
    pub esg: ContentRepository,
}

impl AppState {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserRepository::new(db),
            news: ContentRepository::new(db, ContentKind::News),
            esg: ContentRepository::new(db, ContentKind::Esg),
        }
    }

    /// 콘텐츠 종류에 해당하는 리포지토리를 선택합니다.
    pub fn content_repo(&self, kind: ContentKind) -> &ContentRepository {
        match kind {
            ContentKind::News => &self.news,
            ContentKind::Esg => &self.esg,
        }
    }
}
