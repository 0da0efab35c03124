//! Report render queue.
//!
//! `enqueue_report` writes a `queued` row and LPUSHes its id onto Redis.
//! If the push fails the row is marked `failed` right away.
//! A single worker BRPOPs ids, renders, uploads through the artifact store
//! and records the terminal status. Clients poll the status route.

use std::future::Future;
use std::time::Duration;

use redis::AsyncCommands;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::companies::repository::{get_collaborator, get_company};
use crate::errors::AppError;
use crate::models::report::{ReportJobRow, ReportKind, ReportStatus};
use crate::reports::render::{render_certificate, render_result_report, CertificateSubject};
use crate::reports::store::report_key;
use crate::results::repository::get_result;
use crate::state::AppState;

pub const REPORT_QUEUE: &str = "report_jobs";
/// BRPOP timeout; the worker loops back after this even when idle.
const POLL_TIMEOUT_SECS: u64 = 5;
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub async fn enqueue_report(
    state: &AppState,
    result_id: Uuid,
    kind: ReportKind,
) -> Result<ReportJobRow, AppError> {
    get_result(&state.db, result_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Result {result_id} not found")))?;

    let job = sqlx::query_as::<_, ReportJobRow>(
        r#"
        INSERT INTO report_jobs (id, result_id, kind, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(result_id)
    .bind(kind.as_str())
    .bind(ReportStatus::Queued.as_str())
    .fetch_one(&state.db)
    .await?;

    let job_id = job.id;
    dispatch(job_id, push_job(&state.redis, job_id), |message| async move {
        set_status(&state.db, job_id, ReportStatus::Failed, None, Some(&message)).await
    })
    .await?;

    info!("Queued {} report job {} for result {result_id}", kind.as_str(), job.id);
    Ok(job)
}

async fn push_job(redis: &redis::Client, job_id: Uuid) -> Result<(), redis::RedisError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    conn.lpush::<_, _, ()>(REPORT_QUEUE, job_id.to_string()).await
}

/// Awaits `push`. On failure the job is handed to `mark_failed` so pollers
/// see a terminal status instead of waiting on a job nobody will pop.
async fn dispatch<P, F, Fut>(job_id: Uuid, push: P, mark_failed: F) -> Result<(), AppError>
where
    P: Future<Output = Result<(), redis::RedisError>>,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<(), sqlx::Error>>,
{
    let Err(e) = push.await else {
        return Ok(());
    };
    warn!("Could not queue report job {job_id}: {e}");
    if let Err(db_err) = mark_failed(format!("Could not queue report job: {e}")).await {
        error!("Could not mark report job {job_id} as failed: {db_err}");
    }
    Err(AppError::Queue(e))
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<ReportJobRow, AppError> {
    sqlx::query_as::<_, ReportJobRow>("SELECT * FROM report_jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report job {job_id} not found")))
}

async fn set_status(
    pool: &PgPool,
    job_id: Uuid,
    status: ReportStatus,
    artifact_key: Option<&str>,
    error_message: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE report_jobs
        SET status = $1,
            artifact_key = COALESCE($2, artifact_key),
            error_message = $3,
            updated_at = now()
        WHERE id = $4
        "#,
    )
    .bind(status.as_str())
    .bind(artifact_key)
    .bind(error_message)
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Renders one job and stores the artifact. Returns the artifact key.
pub async fn process_job(state: &AppState, job_id: Uuid) -> Result<String, AppError> {
    let job = get_job(&state.db, job_id).await?;
    let kind = ReportKind::parse(&job.kind)
        .ok_or_else(|| AppError::Validation(format!("unknown report kind '{}'", job.kind)))?;

    set_status(&state.db, job_id, ReportStatus::Processing, None, None).await?;

    let result = get_result(&state.db, job.result_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Result {} not found", job.result_id)))?;
    let instrument = state.catalog.get(&result.instrument_id)?;

    let html = match kind {
        ReportKind::Result => {
            let card = result.score_card().ok_or_else(|| {
                AppError::UnprocessableEntity(format!(
                    "Result {} has no readable dimension scores",
                    result.id
                ))
            })?;
            render_result_report(instrument, &result, &card)
        }
        ReportKind::Certificate => {
            let mut subject = CertificateSubject::default();
            if let Some(id) = result.collaborator_id {
                subject.participant = get_collaborator(&state.db, id).await?.map(|c| c.name);
            }
            if let Some(id) = result.company_id {
                subject.company = get_company(&state.db, id).await?.map(|c| c.name);
            }
            render_certificate(instrument, &result, &subject)
        }
    };

    let key = report_key(result.id, job_id);
    state
        .artifacts
        .put(&key, html.into_bytes(), "text/html; charset=utf-8")
        .await?;

    set_status(&state.db, job_id, ReportStatus::Done, Some(&key), None).await?;
    Ok(key)
}

pub fn spawn_worker(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move { worker_loop(state).await })
}

async fn worker_loop(state: AppState) {
    info!("Report worker started (queue: {REPORT_QUEUE})");
    loop {
        let mut conn = match state.redis.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Report worker cannot reach Redis: {e}; retrying in {RECONNECT_DELAY:?}");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        loop {
            let popped: Option<(String, String)> = match redis::cmd("BRPOP")
                .arg(REPORT_QUEUE)
                .arg(POLL_TIMEOUT_SECS)
                .query_async(&mut conn)
                .await
            {
                Ok(popped) => popped,
                Err(e) => {
                    warn!("BRPOP on {REPORT_QUEUE} failed: {e}; reconnecting");
                    break;
                }
            };

            let Some((_, raw_id)) = popped else {
                continue;
            };
            let Ok(job_id) = Uuid::parse_str(&raw_id) else {
                warn!("Discarding malformed report job id '{raw_id}'");
                continue;
            };

            match process_job(&state, job_id).await {
                Ok(key) => info!("Report job {job_id} done → {key}"),
                Err(e) => {
                    error!("Report job {job_id} failed: {e}");
                    if let Err(db_err) = set_status(
                        &state.db,
                        job_id,
                        ReportStatus::Failed,
                        None,
                        Some(&e.to_string()),
                    )
                    .await
                    {
                        error!("Could not mark report job {job_id} as failed: {db_err}");
                    }
                }
            }
        }

        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
