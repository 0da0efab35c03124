//! Typed REST client for the questionnaire API.
//!
//! Every call goes through `retry_with_backoff`. Reads retry on transport
//! failures, 429 and 5xx; writes retry only when the request never reached
//! the server, so a flaky 5xx cannot store the same result twice.

use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub mod retry;

use crate::models::company::CollaboratorRow;
use crate::models::report::{ReportKind, ReportStatus};
use crate::models::result::ResultRow;
use crate::reports::handlers::{ReportRequest, ReportStatusResponse};
use crate::results::handlers::SubmitResultRequest;
use crate::scoring::instrument::InstrumentSummary;
use retry::{retry_when, retry_with_backoff, RetryPolicy, Retryable};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Result {0} is missing metadata.dimension_scores")]
    MalformedResult(Uuid),

    #[error("Report job {job_id} failed: {message}")]
    ReportFailed { job_id: Uuid, message: String },

    #[error("Report job {job_id} still pending after {waited:?}")]
    ReportTimeout { job_id: Uuid, waited: Duration },
}

impl ClientError {
    /// True when the request never reached the server.
    fn is_connect_failure(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_connect())
    }
}

impl Retryable for ClientError {
    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout(),
            ClientError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Pulls `{"error": {"code", "message"}}` out of an error body, falling back to the raw text.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (Some(env.error.code), env.error.message),
        Err(_) => (None, body.to_string()),
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let (code, message) = parse_error_body(&body);
    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check_status(response).await?.json::<T>().await?)
}

/// Older backends stored results without per-dimension scores; nothing can be
/// displayed from those, so they are rejected up front.
fn ensure_dimension_scores(result: &ResultRow) -> Result<(), ClientError> {
    match result.metadata.get("dimension_scores") {
        Some(Value::Array(_)) => Ok(()),
        _ => Err(ClientError::MalformedResult(result.id)),
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let (client, url) = (&self.client, &url);
        debug!("GET {url}");
        retry_with_backoff(&self.retry, || async move {
            decode(client.get(url).send().await?).await
        })
        .await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let (client, url) = (&self.client, &url);
        debug!("POST {url}");
        retry_when(&self.retry, ClientError::is_connect_failure, || async move {
            decode(client.post(url).json(body).send().await?).await
        })
        .await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get_json("/health").await
    }

    pub async fn list_instruments(&self) -> Result<Vec<InstrumentSummary>, ClientError> {
        self.get_json("/api/v1/instruments").await
    }

    /// Batch-submits answers; the server scores and stores them.
    pub async fn submit_result(&self, request: &SubmitResultRequest) -> Result<ResultRow, ClientError> {
        self.post_json("/api/v1/results", request).await
    }

    pub async fn get_result(&self, id: Uuid) -> Result<ResultRow, ClientError> {
        let result: ResultRow = self.get_json(&format!("/api/v1/results/{id}")).await?;
        ensure_dimension_scores(&result)?;
        Ok(result)
    }

    pub async fn list_collaborators(&self, company_id: Uuid) -> Result<Vec<CollaboratorRow>, ClientError> {
        self.get_json(&format!("/api/v1/companies/{company_id}/collaborators"))
            .await
    }

    pub async fn request_report(
        &self,
        result_id: Uuid,
        kind: ReportKind,
    ) -> Result<ReportStatusResponse, ClientError> {
        self.post_json(
            &format!("/api/v1/results/{result_id}/reports"),
            &ReportRequest { kind },
        )
        .await
    }

    pub async fn report_status(&self, job_id: Uuid) -> Result<ReportStatusResponse, ClientError> {
        self.get_json(&format!("/api/v1/reports/{job_id}/status")).await
    }

    /// Polls the job status every `interval` until it is done, failed, or `timeout` elapses.
    pub async fn wait_for_report(
        &self,
        job_id: Uuid,
        interval: Duration,
        timeout: Duration,
    ) -> Result<ReportStatusResponse, ClientError> {
        let started = Instant::now();
        loop {
            let status = self.report_status(job_id).await?;
            match ReportStatus::parse(&status.status) {
                Some(ReportStatus::Failed) => {
                    return Err(ClientError::ReportFailed {
                        job_id,
                        message: status.error_message.unwrap_or_default(),
                    })
                }
                Some(s) if s.is_terminal() => return Ok(status),
                _ => {}
            }
            if started.elapsed() >= timeout {
                return Err(ClientError::ReportTimeout {
                    job_id,
                    waited: started.elapsed(),
                });
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Downloads the rendered HTML of a finished job.
    pub async fn fetch_report(&self, job_id: Uuid) -> Result<String, ClientError> {
        let url = self.url(&format!("/api/v1/reports/{job_id}"));
        let (client, url) = (&self.client, &url);
        retry_with_backoff(&self.retry, || async move {
            let response = check_status(client.get(url).send().await?).await?;
            Ok::<_, ClientError>(response.text().await?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
    use chrono::Utc;
    use serde_json::json;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        }
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_parse_error_body_envelope() {
        let (code, message) =
            parse_error_body(r#"{"error":{"code":"NOT_FOUND","message":"Result x not found"}}"#);
        assert_eq!(code.as_deref(), Some("NOT_FOUND"));
        assert_eq!(message, "Result x not found");
    }

    #[test]
    fn test_parse_error_body_plain_text() {
        let (code, message) = parse_error_body("bad gateway");
        assert!(code.is_none());
        assert_eq!(message, "bad gateway");
    }

    #[test]
    fn test_api_status_retry_classification() {
        let api = |status| ClientError::Api {
            status,
            code: None,
            message: String::new(),
        };
        assert!(api(503).is_retryable());
        assert!(api(429).is_retryable());
        assert!(!api(404).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!ClientError::MalformedResult(Uuid::nil()).is_retryable());
    }

    #[test]
    fn test_result_without_dimension_scores_is_malformed() {
        let mut row = ResultRow {
            id: Uuid::new_v4(),
            instrument_id: "percepcao-assedio".to_string(),
            collaborator_id: None,
            company_id: None,
            total_score: 150,
            time_spent_seconds: None,
            metadata: json!({"interpretation": "..."}),
            created_at: Utc::now(),
        };
        assert!(matches!(
            ensure_dimension_scores(&row),
            Err(ClientError::MalformedResult(_))
        ));
        row.metadata = json!({"dimension_scores": []});
        assert!(ensure_dimension_scores(&row).is_ok());
    }

    #[tokio::test]
    async fn test_get_retries_through_server_errors() {
        let hits = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route(
                "/health",
                get(|State(hits): State<Arc<AtomicU32>>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(StatusCode::SERVICE_UNAVAILABLE)
                    } else {
                        Ok(Json(json!({"status": "ok"})))
                    }
                }),
            )
            .with_state(hits.clone());
        let base = serve(router).await;

        let client = ApiClient::new(&base).unwrap().with_retry_policy(fast_retry());
        let health = client.health().await.unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route(
                "/api/v1/instruments",
                get(|State(hits): State<Arc<AtomicU32>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({"error": {"code": "NOT_FOUND", "message": "nope"}})),
                    )
                }),
            )
            .with_state(hits.clone());
        let base = serve(router).await;

        let client = ApiClient::new(&base).unwrap().with_retry_policy(fast_retry());
        let err = client.list_instruments().await.unwrap_err();
        match err {
            ClientError::Api { status, code, .. } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("NOT_FOUND"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_post_is_not_retried_on_server_error() {
        let hits = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route(
                "/api/v1/results",
                axum::routing::post(|State(hits): State<Arc<AtomicU32>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::INTERNAL_SERVER_ERROR
                }),
            )
            .with_state(hits.clone());
        let base = serve(router).await;

        let client = ApiClient::new(&base).unwrap().with_retry_policy(fast_retry());
        let request = SubmitResultRequest {
            instrument_id: "clima-organizacional".to_string(),
            answers: [(1, 4)].into_iter().collect(),
            collaborator_id: None,
            company_id: None,
            time_spent_seconds: Some(60),
        };
        assert!(client.submit_result(&request).await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_collaborators_decodes_rows() {
        let company_id = Uuid::new_v4();
        let router = Router::new().route(
            "/api/v1/companies/:id/collaborators",
            get(move || async move {
                Json(json!([{
                    "id": Uuid::new_v4(),
                    "company_id": company_id,
                    "name": "Ana Souza",
                    "email": "ana@empresa.com.br",
                    "department": "RH",
                    "created_at": Utc::now()
                }]))
            }),
        );
        let base = serve(router).await;

        let client = ApiClient::new(&base).unwrap().with_retry_policy(fast_retry());
        let rows = client.list_collaborators(company_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company_id, company_id);
        assert_eq!(rows[0].email, "ana@empresa.com.br");
    }

    #[tokio::test]
    async fn test_wait_for_report_polls_until_done() {
        let job_id = Uuid::new_v4();
        let polls = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route(
                "/api/v1/reports/:job_id/status",
                get(
                    move |State(polls): State<Arc<AtomicU32>>| async move {
                        let n = polls.fetch_add(1, Ordering::SeqCst);
                        let status = if n < 2 { "processing" } else { "done" };
                        Json(json!({
                            "job_id": job_id,
                            "result_id": Uuid::nil(),
                            "kind": "certificate",
                            "status": status,
                            "error_message": null
                        }))
                    },
                ),
            )
            .with_state(polls.clone());
        let base = serve(router).await;

        let client = ApiClient::new(&base).unwrap().with_retry_policy(fast_retry());
        let done = client
            .wait_for_report(job_id, Duration::from_millis(10), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(done.status, "done");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_for_report_surfaces_failure() {
        let job_id = Uuid::new_v4();
        let router = Router::new().route(
            "/api/v1/reports/:job_id/status",
            get(move || async move {
                Json(json!({
                    "job_id": job_id,
                    "result_id": Uuid::nil(),
                    "kind": "result",
                    "status": "failed",
                    "error_message": "Result has no readable dimension scores"
                }))
            }),
        );
        let base = serve(router).await;

        let client = ApiClient::new(&base).unwrap().with_retry_policy(fast_retry());
        let err = client
            .wait_for_report(job_id, Duration::from_millis(10), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ReportFailed { .. }));
    }
}
