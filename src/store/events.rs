//! Event persistence operations, including the staff association table.

use super::StoreError;
use crate::models::{Event, EventPayload, EventWithLinks, NewEvent};
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, new: &NewEvent) -> Result<Event, StoreError> {
    let event = sqlx::query_as::<_, Event>(
        r#"INSERT INTO events (name, money_raised, date, start_time, end_time)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id, name, money_raised, date, start_time, end_time, created_at"#,
    )
    .bind(new.name.as_deref())
    .bind(new.money_raised)
    .bind(new.date)
    .bind(new.start_time)
    .bind(new.end_time)
    .fetch_one(pool)
    .await?;

    Ok(event)
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<Event>, StoreError> {
    let event = sqlx::query_as::<_, Event>(
        r#"SELECT id, name, money_raised, date, start_time, end_time, created_at
           FROM events
           WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

pub async fn find_with_links(
    pool: &PgPool,
    id: i32,
) -> Result<Option<EventWithLinks>, StoreError> {
    let event = sqlx::query_as::<_, EventWithLinks>(
        r#"SELECT e.id, e.name, e.money_raised, e.date, e.start_time, e.end_time, e.created_at,
                  COALESCE((SELECT array_agg(ev.volunteer_id ORDER BY ev.volunteer_id)
                            FROM event_volunteers ev WHERE ev.event_id = e.id),
                           ARRAY[]::INTEGER[]) AS volunteer_ids,
                  COALESCE((SELECT array_agg(ea.attendance_id ORDER BY ea.attendance_id)
                            FROM event_attendances ea WHERE ea.event_id = e.id),
                           ARRAY[]::INTEGER[]) AS attendance_ids
           FROM events e
           WHERE e.id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

pub async fn list_with_links(pool: &PgPool) -> Result<Vec<EventWithLinks>, StoreError> {
    let events = sqlx::query_as::<_, EventWithLinks>(
        r#"SELECT e.id, e.name, e.money_raised, e.date, e.start_time, e.end_time, e.created_at,
                  COALESCE((SELECT array_agg(ev.volunteer_id ORDER BY ev.volunteer_id)
                            FROM event_volunteers ev WHERE ev.event_id = e.id),
                           ARRAY[]::INTEGER[]) AS volunteer_ids,
                  COALESCE((SELECT array_agg(ea.attendance_id ORDER BY ea.attendance_id)
                            FROM event_attendances ea WHERE ea.event_id = e.id),
                           ARRAY[]::INTEGER[]) AS attendance_ids
           FROM events e
           ORDER BY e.date ASC, e.start_time ASC, e.id ASC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: &EventPayload,
) -> Result<Option<Event>, StoreError> {
    let event = sqlx::query_as::<_, Event>(
        r#"UPDATE events
           SET name = COALESCE($2, name),
               money_raised = COALESCE($3, money_raised),
               date = COALESCE($4, date),
               start_time = COALESCE($5, start_time),
               end_time = COALESCE($6, end_time)
           WHERE id = $1
           RETURNING id, name, money_raised, date, start_time, end_time, created_at"#,
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.money_raised)
    .bind(changes.date)
    .bind(changes.start_time)
    .bind(changes.end_time)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Record the given volunteers as event staff. Ids without a volunteer row
/// are skipped, and already-linked pairs stay linked.
pub async fn link_staff(
    pool: &PgPool,
    event_id: i32,
    volunteer_ids: &[i32],
) -> Result<u64, StoreError> {
    let result = sqlx::query(
        r#"INSERT INTO event_volunteers (event_id, volunteer_id)
           SELECT $1, v.id FROM volunteers v WHERE v.id = ANY($2)
           ON CONFLICT DO NOTHING"#,
    )
    .bind(event_id)
    .bind(volunteer_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
