//! Attendance persistence operations, including the event association
//! table.

use super::StoreError;
use crate::models::{Attendance, AttendancePayload, NewAttendance};
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, new: &NewAttendance) -> Result<Attendance, StoreError> {
    let attendance = sqlx::query_as::<_, Attendance>(
        r#"INSERT INTO attendances
               (name, contact_info, is_interested_in_volunteering, donation_amount,
                interested_volunteer_role)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id, name, contact_info, is_interested_in_volunteering,
                     donation_amount, interested_volunteer_role, created_at"#,
    )
    .bind(&new.name)
    .bind(&new.contact_info)
    .bind(new.is_interested_in_volunteering)
    .bind(new.donation_amount)
    .bind(new.interested_volunteer_role.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(attendance)
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<Attendance>, StoreError> {
    let attendance = sqlx::query_as::<_, Attendance>(
        r#"SELECT id, name, contact_info, is_interested_in_volunteering,
                  donation_amount, interested_volunteer_role, created_at
           FROM attendances
           WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(attendance)
}

pub async fn list(pool: &PgPool) -> Result<Vec<Attendance>, StoreError> {
    let attendances = sqlx::query_as::<_, Attendance>(
        r#"SELECT id, name, contact_info, is_interested_in_volunteering,
                  donation_amount, interested_volunteer_role, created_at
           FROM attendances
           ORDER BY name ASC, id ASC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(attendances)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: &AttendancePayload,
) -> Result<Option<Attendance>, StoreError> {
    let attendance = sqlx::query_as::<_, Attendance>(
        r#"UPDATE attendances
           SET name = COALESCE($2, name),
               contact_info = COALESCE($3, contact_info),
               is_interested_in_volunteering = COALESCE($4, is_interested_in_volunteering),
               donation_amount = COALESCE($5, donation_amount),
               interested_volunteer_role = COALESCE($6, interested_volunteer_role)
           WHERE id = $1
           RETURNING id, name, contact_info, is_interested_in_volunteering,
                     donation_amount, interested_volunteer_role, created_at"#,
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.contact_info.as_deref())
    .bind(changes.is_interested_in_volunteering)
    .bind(changes.donation_amount)
    .bind(changes.interested_volunteer_role.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(attendance)
}

/// Record an attendance-event link; recording the same pair twice is a
/// no-op.
pub async fn link_event(pool: &PgPool, attendance_id: i32, event_id: i32) -> Result<(), StoreError> {
    sqlx::query(
        r#"INSERT INTO event_attendances (event_id, attendance_id)
           VALUES ($1, $2)
           ON CONFLICT DO NOTHING"#,
    )
    .bind(event_id)
    .bind(attendance_id)
    .execute(pool)
    .await?;

    Ok(())
}
