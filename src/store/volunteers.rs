//! Volunteer persistence operations, including the candidate and role
//! association tables.

use super::StoreError;
use crate::models::{Candidate, NewVolunteer, Role, Volunteer, VolunteerPayload};
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, new: &NewVolunteer) -> Result<Volunteer, StoreError> {
    let volunteer = sqlx::query_as::<_, Volunteer>(
        r#"INSERT INTO volunteers (name)
           VALUES ($1)
           RETURNING id, name, created_at"#,
    )
    .bind(&new.name)
    .fetch_one(pool)
    .await?;

    Ok(volunteer)
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<Volunteer>, StoreError> {
    let volunteer =
        sqlx::query_as::<_, Volunteer>("SELECT id, name, created_at FROM volunteers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(volunteer)
}

/// List volunteers with an optional exact name filter, ordered by name in
/// the given direction with id as the tie-break.
pub async fn list(
    pool: &PgPool,
    name: Option<&str>,
    dir: &str,
) -> Result<Vec<Volunteer>, StoreError> {
    let query = format!(
        r#"SELECT id, name, created_at
           FROM volunteers
           WHERE ($1::text IS NULL OR name = $1)
           ORDER BY name {dir}, id ASC"#
    );

    let volunteers = sqlx::query_as::<_, Volunteer>(&query)
        .bind(name)
        .fetch_all(pool)
        .await?;

    Ok(volunteers)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: &VolunteerPayload,
) -> Result<Option<Volunteer>, StoreError> {
    let volunteer = sqlx::query_as::<_, Volunteer>(
        r#"UPDATE volunteers
           SET name = COALESCE($2, name)
           WHERE id = $1
           RETURNING id, name, created_at"#,
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(volunteer)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM volunteers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record a volunteer-candidate link; recording the same pair twice is a
/// no-op.
pub async fn link_candidate(
    pool: &PgPool,
    volunteer_id: i32,
    candidate_id: i32,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"INSERT INTO volunteer_candidates (volunteer_id, candidate_id)
           VALUES ($1, $2)
           ON CONFLICT DO NOTHING"#,
    )
    .bind(volunteer_id)
    .bind(candidate_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn link_role(pool: &PgPool, volunteer_id: i32, role_id: i32) -> Result<(), StoreError> {
    sqlx::query(
        r#"INSERT INTO volunteer_roles (volunteer_id, role_id)
           VALUES ($1, $2)
           ON CONFLICT DO NOTHING"#,
    )
    .bind(volunteer_id)
    .bind(role_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn candidates_for(pool: &PgPool, volunteer_id: i32) -> Result<Vec<Candidate>, StoreError> {
    let candidates = sqlx::query_as::<_, Candidate>(
        r#"SELECT c.id, c.first_name, c.last_name, c.district, c.office, c.created_at
           FROM candidates c
           JOIN volunteer_candidates vc ON vc.candidate_id = c.id
           WHERE vc.volunteer_id = $1
           ORDER BY c.id ASC"#,
    )
    .bind(volunteer_id)
    .fetch_all(pool)
    .await?;

    Ok(candidates)
}

pub async fn roles_for(pool: &PgPool, volunteer_id: i32) -> Result<Vec<Role>, StoreError> {
    let roles = sqlx::query_as::<_, Role>(
        r#"SELECT r.id, r.name, r.description, r.created_at
           FROM roles r
           JOIN volunteer_roles vr ON vr.role_id = r.id
           WHERE vr.volunteer_id = $1
           ORDER BY r.id ASC"#,
    )
    .bind(volunteer_id)
    .fetch_all(pool)
    .await?;

    Ok(roles)
}
