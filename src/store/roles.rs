//! Role persistence operations.

use super::StoreError;
use crate::models::{NewRole, Role, RolePayload};
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, new: &NewRole) -> Result<Role, StoreError> {
    let role = sqlx::query_as::<_, Role>(
        r#"INSERT INTO roles (name, description)
           VALUES ($1, $2)
           RETURNING id, name, description, created_at"#,
    )
    .bind(&new.name)
    .bind(new.description.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(role)
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<Role>, StoreError> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, created_at FROM roles WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(role)
}

pub async fn list(pool: &PgPool) -> Result<Vec<Role>, StoreError> {
    let roles = sqlx::query_as::<_, Role>(
        r#"SELECT id, name, description, created_at
           FROM roles
           ORDER BY name ASC, id ASC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(roles)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: &RolePayload,
) -> Result<Option<Role>, StoreError> {
    let role = sqlx::query_as::<_, Role>(
        r#"UPDATE roles
           SET name = COALESCE($2, name),
               description = COALESCE($3, description)
           WHERE id = $1
           RETURNING id, name, description, created_at"#,
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.description.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(role)
}
