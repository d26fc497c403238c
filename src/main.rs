//! CMS 관리 백엔드 메인 애플리케이션
//!
//! Actix-web 기반의 HTTP 서버를 구동합니다. MongoDB 연결과 필수
//! 설정을 기동 시점에 검증하고, 인덱스 생성과 초기 관리자 시드를
//! 마친 뒤 REST API를 제공합니다.

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{App, HttpServer, middleware, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use cms_admin_backend::config::{AppConfig, JwtConfig};
use cms_admin_backend::db::Database;
use cms_admin_backend::routes::configure_all_routes;
use cms_admin_backend::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 CMS 관리 백엔드 시작중...");

    // 필수 설정 검증 (빠른 실패)
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ 설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    // 서명 비밀키 상태 점검 — 기본값 사용은 조용히 넘어가지 않는다
    JwtConfig::warn_if_insecure();

    // 데이터 스토어 초기화
    info!("📡 데이터베이스 연결 중...");
    let database = match Database::new(&config).await {
        Ok(database) => database,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(&database);

    // 인덱스 생성 및 초기 관리자 시드
    initialize_storage(&state).await;

    info!("✅ 초기화 완료");

    // HTTP 서버 시작
    start_http_server(config, state).await
}

/// 인덱스 생성과 관리자 시드를 수행합니다
///
/// 슬러그/사용자명/이메일 유니크 제약은 저장 계층 인덱스로 강제되므로
/// 서버 기동 시점에 보장합니다. 실패는 경고로 남기고 기동은 계속합니다
/// (이미 존재하는 인덱스와의 충돌 등 비치명적 상황이 대부분).
async fn initialize_storage(state: &AppState) {
    if let Err(e) = state.users.ensure_indexes().await {
        warn!("사용자 인덱스 생성 실패: {}", e);
    }
    if let Err(e) = state.news.ensure_indexes().await {
        warn!("뉴스 인덱스 생성 실패: {}", e);
    }
    if let Err(e) = state.esg.ensure_indexes().await {
        warn!("ESG 인덱스 생성 실패: {}", e);
    }

    if let Err(e) = state.users.seed_admin().await {
        warn!("초기 관리자 시드 실패: {}", e);
    }
}

/// HTTP 서버를 구성하고 실행합니다
///
/// CORS, 로깅, 경로 정규화, Rate Limiting 미들웨어를 포함합니다.
async fn start_http_server(config: AppConfig, state: AppState) -> std::io::Result<()> {
    let bind_address = config.bind_address.clone();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    // Rate Limiting 설정
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(config.rate_limit.per_second)
        .burst_size(config.rate_limit.burst_size)
        .use_headers()
        .finish()
        .unwrap();

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        config.rate_limit.per_second, config.rate_limit.burst_size
    );

    let data = web::Data::new(state);

    HttpServer::new(move || {
        let cors = configure_cors();

        App::new()
            .app_data(data.clone())
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .workers(4)
    .run()
    .await
}

/// 환경별 설정 파일을 로드합니다
///
/// `PROFILE` 환경변수에 따라 적절한 .env 파일을 로드합니다.
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// 환경변수 `RUST_LOG`를 기반으로 로깅 레벨을 설정합니다.
/// 기본값은 info 레벨이며, actix_web은 debug 레벨로 설정됩니다.
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// CORS 설정을 구성합니다
///
/// 관리 프론트엔드와의 통신을 위한 CORS 설정입니다.
/// 개발환경에서 로컬호스트 간 통신을 허용합니다.
fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}
