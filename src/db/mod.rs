//! Database Connection Management Module
//!
//! MongoDB 데이터베이스 연결 관리를 담당하는 모듈입니다.
//! 연결은 기동 시점에 `ping`으로 검증되며, 실패하면 서버가 시작되지
//! 않습니다 (첫 요청에서의 지연 실패 대신 빠른 실패).
//!
//! # 기본 사용법
//!
//! ```rust,ignore
//! use cms_admin_backend::config::AppConfig;
//! use cms_admin_backend::db::Database;
//!
//! let config = AppConfig::from_env()?;
//! let database = Database::new(&config).await?;
//! let posts = database.get_database().collection::<Post>("news_posts");
//! ```

use log::info;
use mongodb::{Client, options::ClientOptions};

use crate::config::AppConfig;
use crate::errors::AppError;

/// MongoDB 데이터베이스 연결 래퍼
///
/// MongoDB 클라이언트와 데이터베이스 연결을 관리하며,
/// 리포지토리 계층에서 데이터베이스 작업을 위한 기본 인터페이스를 제공합니다.
#[derive(Clone)]
pub struct Database {
    /// MongoDB 클라이언트 인스턴스
    client: Client,
    /// 사용할 데이터베이스 이름
    database_name: String,
}

impl Database {
    /// 새 MongoDB 데이터베이스 연결을 생성합니다.
    ///
    /// 검증된 `AppConfig`에서 연결 정보를 받아 클라이언트를 초기화하고,
    /// `ping` 명령으로 연결 상태를 확인한 후 인스턴스를 반환합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::DatabaseError` - URI 파싱 실패, 연결 실패
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(&config.mongodb_uri)
            .await
            .map_err(|e| AppError::DatabaseError(format!("MongoDB URI 파싱 실패: {}", e)))?;

        // 애플리케이션 이름 설정 (모니터링 및 로깅에 유용)
        client_options.app_name = Some("cms_admin_backend".to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| AppError::DatabaseError(format!("MongoDB 클라이언트 생성 실패: {}", e)))?;

        // 연결 테스트
        client
            .database(&config.database_name)
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::DatabaseError(format!("MongoDB 연결 실패: {}", e)))?;

        info!("✅ MongoDB 연결 성공: {}", config.database_name);

        Ok(Self {
            client,
            database_name: config.database_name.clone(),
        })
    }

    /// MongoDB 데이터베이스 인스턴스를 반환합니다.
    ///
    /// 리포지토리에서 컬렉션에 접근할 때 사용됩니다.
    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }

    /// MongoDB 클라이언트 인스턴스를 반환합니다.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// 데이터베이스 이름을 반환합니다.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}
