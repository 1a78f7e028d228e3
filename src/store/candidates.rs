//! Candidate persistence operations.

use super::StoreError;
use crate::models::{Candidate, CandidatePayload, NewCandidate};
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, new: &NewCandidate) -> Result<Candidate, StoreError> {
    let candidate = sqlx::query_as::<_, Candidate>(
        r#"INSERT INTO candidates (first_name, last_name, district, office)
           VALUES ($1, $2, $3, $4)
           RETURNING id, first_name, last_name, district, office, created_at"#,
    )
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.district)
    .bind(&new.office)
    .fetch_one(pool)
    .await?;

    Ok(candidate)
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<Candidate>, StoreError> {
    let candidate = sqlx::query_as::<_, Candidate>(
        r#"SELECT id, first_name, last_name, district, office, created_at
           FROM candidates
           WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(candidate)
}

/// List candidates filtered by exact office/district match, ordered by
/// office then district in the given direction with id as the final
/// tie-break.
pub async fn list(
    pool: &PgPool,
    office: Option<&str>,
    district: Option<&str>,
    dir: &str,
) -> Result<Vec<Candidate>, StoreError> {
    let query = format!(
        r#"SELECT id, first_name, last_name, district, office, created_at
           FROM candidates
           WHERE ($1::text IS NULL OR office = $1)
             AND ($2::text IS NULL OR district = $2)
           ORDER BY office {dir}, district {dir}, id ASC"#
    );

    let candidates = sqlx::query_as::<_, Candidate>(&query)
        .bind(office)
        .bind(district)
        .fetch_all(pool)
        .await?;

    Ok(candidates)
}

/// Partial update: absent payload fields keep their stored values.
pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: &CandidatePayload,
) -> Result<Option<Candidate>, StoreError> {
    let candidate = sqlx::query_as::<_, Candidate>(
        r#"UPDATE candidates
           SET first_name = COALESCE($2, first_name),
               last_name = COALESCE($3, last_name),
               district = COALESCE($4, district),
               office = COALESCE($5, office)
           WHERE id = $1
           RETURNING id, first_name, last_name, district, office, created_at"#,
    )
    .bind(id)
    .bind(changes.first_name.as_deref())
    .bind(changes.last_name.as_deref())
    .bind(changes.district.as_deref())
    .bind(changes.office.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(candidate)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch the candidates whose ids appear in `ids`; ids without a matching
/// row are skipped.
pub async fn fetch_batch(pool: &PgPool, ids: &[i32]) -> Result<Vec<Candidate>, StoreError> {
    let candidates = sqlx::query_as::<_, Candidate>(
        r#"SELECT id, first_name, last_name, district, office, created_at
           FROM candidates
           WHERE id = ANY($1)
           ORDER BY id ASC"#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(candidates)
}
