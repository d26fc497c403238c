//! # 인증 요청 클라이언트
//!
//! 관리 API 호출을 감싸는 클라이언트입니다. 호출마다 저장된 액세스
//! 토큰을 붙이고, 401 응답을 받으면 리프레시 토큰으로 조용히 토큰을
//! 갱신한 뒤 원래 요청을 **정확히 한 번** 재시도합니다.
//!
//! ## 단일 비행 갱신
//!
//! 동시에 여러 호출이 401을 받아도 갱신 호출은 한 번만 나갑니다.
//! 갱신은 뮤텍스로 직렬화되며, 잠금을 얻은 호출자는 먼저 저장된
//! 액세스 토큰이 자신이 실패했던 토큰과 달라졌는지 확인합니다 —
//! 달라졌다면 다른 호출자가 이미 갱신을 끝낸 것이므로 그 토큰으로
//! 바로 재시도합니다.
//!
//! ## 타임아웃
//!
//! 일반 요청과 갱신 요청의 타임아웃이 분리되어 있습니다. 갱신은
//! 재시도되는 모든 요청의 임계 경로에 놓이므로 더 짧은 예산을 갖고,
//! 갱신이 멈추면 전체 체인을 붙들지 않고 빠르게 "세션 만료"로
//! 넘어갑니다.
//!
//! ## 보장
//!
//! 호출자는 유효한 응답, 갱신 후 한 번의 깔끔한 재시도 결과, 또는
//! 명시적인 세션 만료 에러 중 하나만 받습니다. 무한 재시도 루프는
//! 없습니다.

use std::time::Duration;

use log::{debug, warn};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::client::session_store::SessionStore;
use crate::domain::dto::auth::TokenResponse;

/// 일반 요청 타임아웃
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// 갱신 요청 타임아웃 (임계 경로이므로 더 짧게)
const REFRESH_TIMEOUT: Duration = Duration::from_secs(5);

/// 클라이언트 에러
#[derive(Error, Debug)]
pub enum ClientError {
    /// 복구 불가능한 세션 만료. 호출자는 로그인 화면으로 보내야 합니다.
    #[error("세션이 만료되었습니다. 다시 로그인해주세요")]
    SessionExpired,

    /// 서버가 돌려준 에러 응답 (403 포함, 그대로 전달)
    #[error("API 오류 ({status}): {message}")]
    Api { status: u16, message: String },

    /// 전송 계층 실패 (타임아웃 포함)
    #[error("요청 실패: {0}")]
    Http(#[from] reqwest::Error),
}

/// 관리 API 클라이언트
pub struct AdminApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    /// 단일 비행 갱신 직렬화 잠금
    refresh_lock: Mutex<()>,
}

impl AdminApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            http,
            base_url: base_url.into(),
            session,
            refresh_lock: Mutex::new(()),
        }
    }

    /// 로그인하고 발급받은 토큰 쌍을 세션에 저장합니다.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self
            .send(Method::POST, "/api/v1/auth/login", Some(&body), None, REQUEST_TIMEOUT)
            .await?;
        let response = check_status(response).await?;

        let token: TokenResponse = response.json().await?;
        self.session
            .save(&token.access_token, &token.refresh_token, token.expires_in);

        Ok(token)
    }

    /// 세션을 비웁니다.
    pub fn logout(&self) {
        self.session.clear();
    }

    /// 인증 헤더를 붙여 요청을 보내고, 401이면 갱신 후 한 번 재시도합니다.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let token_before = self.session.load().map(|s| s.access_token);

        let response = self
            .send(
                method.clone(),
                path,
                body.as_ref(),
                token_before.as_deref(),
                REQUEST_TIMEOUT,
            )
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        // 401: 단일 비행 갱신 후 새 토큰으로 정확히 한 번 재시도
        debug!("401 수신, 토큰 갱신 시도: {}", path);
        let fresh_token = self.refresh_single_flight(token_before.as_deref()).await?;

        let retry = self
            .send(method, path, body.as_ref(), Some(&fresh_token), REQUEST_TIMEOUT)
            .await?;

        if retry.status() == StatusCode::UNAUTHORIZED {
            // 갱신 직후에도 거부되면 더 시도하지 않는다
            self.session.clear();
            return Err(ClientError::SessionExpired);
        }

        check_status(retry).await
    }

    /// GET 요청 후 JSON 본문 반환
    pub async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let response = self.request(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    /// POST 요청 후 JSON 본문 반환
    pub async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, ClientError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::Api {
                status: 0,
                message: format!("요청 직렬화 실패: {}", e),
            })?;
        let response = self.request(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// PATCH 요청 후 JSON 본문 반환
    pub async fn patch_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, ClientError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::Api {
                status: 0,
                message: format!("요청 직렬화 실패: {}", e),
            })?;
        let response = self.request(Method::PATCH, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE 요청 (본문 없음)
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// 대시보드 스냅샷 단발성 조회
    pub async fn dashboard(&self) -> Result<Value, ClientError> {
        self.get_json("/api/v1/dashboard").await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .timeout(timeout);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// 단일 비행 토큰 갱신.
    ///
    /// `stale`은 호출자가 401을 받았을 때 쓰고 있던 액세스 토큰입니다.
    /// 잠금을 얻은 뒤 저장된 토큰이 이미 달라져 있으면 (다른 호출자가
    /// 갱신을 끝냄) 그 토큰을 그대로 반환하고, 아니면 직접 갱신합니다.
    ///
    /// 갱신 실패는 어떤 경우든 세션을 비우고 `SessionExpired`로
    /// 끝납니다 — 조용히 삼켜지지 않습니다.
    async fn refresh_single_flight(&self, stale: Option<&str>) -> Result<String, ClientError> {
        let _guard = self.refresh_lock.lock().await;

        let session = match self.session.load() {
            Some(session) => session,
            None => {
                self.session.clear();
                return Err(ClientError::SessionExpired);
            }
        };

        if Some(session.access_token.as_str()) != stale {
            debug!("대기 중 다른 호출자가 토큰을 갱신함");
            return Ok(session.access_token);
        }

        let url = format!("{}/api/v1/auth/token", self.base_url);
        let result = self
            .http
            .post(&url)
            .timeout(REFRESH_TIMEOUT)
            .json(&serde_json::json!({ "refreshToken": session.refresh_token }))
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("토큰 갱신 거부됨 (status: {})", response.status());
                self.session.clear();
                return Err(ClientError::SessionExpired);
            }
            Err(e) => {
                warn!("토큰 갱신 요청 실패: {}", e);
                self.session.clear();
                return Err(ClientError::SessionExpired);
            }
        };

        let token: TokenResponse = match response.json().await {
            Ok(token) => token,
            Err(e) => {
                warn!("토큰 갱신 응답 파싱 실패: {}", e);
                self.session.clear();
                return Err(ClientError::SessionExpired);
            }
        };

        self.session
            .save(&token.access_token, &token.refresh_token, token.expires_in);
        debug!("토큰 갱신 완료");

        Ok(token.access_token)
    }
}

/// 에러 상태 코드를 `ClientError::Api`로 변환합니다.
///
/// 403은 재시도 없이 그대로 전달됩니다 — 권한 부족은 토큰 갱신으로
/// 해결되지 않습니다.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
