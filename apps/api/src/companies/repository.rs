use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::company::{CollaboratorRow, CompanyRow};

pub async fn insert_company(
    pool: &PgPool,
    name: &str,
    cnpj: Option<&str>,
) -> Result<CompanyRow, sqlx::Error> {
    let company = sqlx::query_as::<_, CompanyRow>(
        "INSERT INTO companies (id, name, cnpj) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(cnpj)
    .fetch_one(pool)
    .await?;

    info!("Created company {} ({})", company.id, company.name);
    Ok(company)
}

pub async fn get_company(pool: &PgPool, id: Uuid) -> Result<Option<CompanyRow>, sqlx::Error> {
    sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewCollaborator<'a> {
    pub company_id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub department: Option<&'a str>,
}

pub async fn insert_collaborator(
    pool: &PgPool,
    new: NewCollaborator<'_>,
) -> Result<CollaboratorRow, sqlx::Error> {
    sqlx::query_as::<_, CollaboratorRow>(
        r#"
        INSERT INTO collaborators (id, company_id, name, email, department)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.company_id)
    .bind(new.name)
    .bind(new.email)
    .bind(new.department)
    .fetch_one(pool)
    .await
}

pub async fn get_collaborator(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<CollaboratorRow>, sqlx::Error> {
    sqlx::query_as::<_, CollaboratorRow>("SELECT * FROM collaborators WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_collaborators(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Vec<CollaboratorRow>, sqlx::Error> {
    sqlx::query_as::<_, CollaboratorRow>(
        "SELECT * FROM collaborators WHERE company_id = $1 ORDER BY name ASC",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn count_collaborators(pool: &PgPool, company_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM collaborators WHERE company_id = $1")
        .bind(company_id)
        .fetch_one(pool)
        .await
}
