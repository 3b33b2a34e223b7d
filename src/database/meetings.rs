// file: src/database/meetings.rs
use std::collections::HashMap;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{Attendee, Meeting, MeetingRow, Role, Session};
use crate::utils::logging::log_database_operation;

const MEETING_COLUMNS: &str =
    "m.id, m.name, m.meeting_date, m.tutor_id, m.program, m.level_lesson, m.notes";

/// Half-open UTC range covering one calendar date.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = date
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(start);
    (start, end)
}

pub async fn get_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<Vec<Meeting>> {
    let started = Instant::now();
    let rows = sqlx::query_as::<_, MeetingRow>(&format!(
        "SELECT {} FROM meetings m WHERE m.tutor_id = ? ORDER BY m.meeting_date ASC",
        MEETING_COLUMNS
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let meetings = with_attendees(pool, rows).await?;
    log_database_operation("get_by_owner", "meetings", started.elapsed().as_millis() as u64);
    Ok(meetings)
}

/// Tutors get their own meetings on `date`; admins get every meeting on
/// `date` run by a tutor of their school.
pub async fn get_by_role_and_date(
    pool: &SqlitePool,
    session: &Session,
    date: NaiveDate,
) -> Result<Vec<Meeting>> {
    let started = Instant::now();
    let (start, end) = day_bounds(date);

    let rows = match session.role {
        Role::Tutor => {
            sqlx::query_as::<_, MeetingRow>(&format!(
                r#"
                SELECT {}
                FROM meetings m
                WHERE m.tutor_id = ?
                    AND m.meeting_date >= ?
                    AND m.meeting_date < ?
                ORDER BY m.meeting_date ASC
                "#,
                MEETING_COLUMNS
            ))
            .bind(session.user_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?
        }
        Role::Admin => {
            sqlx::query_as::<_, MeetingRow>(&format!(
                r#"
                SELECT {}
                FROM meetings m
                JOIN users u ON u.id = m.tutor_id
                WHERE u.school = ?
                    AND m.meeting_date >= ?
                    AND m.meeting_date < ?
                ORDER BY m.meeting_date ASC
                "#,
                MEETING_COLUMNS
            ))
            .bind(&session.school)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?
        }
    };

    let meetings = with_attendees(pool, rows).await?;
    log_database_operation(
        "get_by_role_and_date",
        "meetings",
        started.elapsed().as_millis() as u64,
    );
    Ok(meetings)
}

async fn with_attendees(pool: &SqlitePool, rows: Vec<MeetingRow>) -> Result<Vec<Meeting>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, meeting_id, student_id, name FROM meeting_attendees WHERE meeting_id IN (",
    );
    let mut separated = query.separated(", ");
    for row in &rows {
        separated.push_bind(row.id);
    }
    separated.push_unseparated(") ORDER BY id ASC");

    let attendees = query
        .build_query_as::<Attendee>()
        .fetch_all(pool)
        .await
        .context("Failed to load meeting attendees")?;

    let mut by_meeting: HashMap<i64, Vec<Attendee>> = HashMap::new();
    for attendee in attendees {
        by_meeting.entry(attendee.meeting_id).or_default().push(attendee);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let attendees = by_meeting.remove(&row.id).unwrap_or_default();
            row.into_meeting(attendees)
        })
        .collect())
}

/// Inserts a meeting with its attendees in one transaction.
pub async fn create(pool: &SqlitePool, meeting: &Meeting) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let meeting_id = sqlx::query(
        "INSERT INTO meetings (name, meeting_date, tutor_id, program, level_lesson, notes) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&meeting.name)
    .bind(meeting.meeting_date)
    .bind(meeting.tutor_id)
    .bind(&meeting.program)
    .bind(&meeting.level_lesson)
    .bind(&meeting.notes)
    .execute(&mut *tx)
    .await
    .context("Failed to insert meeting")?
    .last_insert_rowid();

    for attendee in &meeting.attendees {
        sqlx::query("INSERT INTO meeting_attendees (meeting_id, student_id, name) VALUES (?, ?, ?)")
            .bind(meeting_id)
            .bind(attendee.student_id)
            .bind(&attendee.name)
            .execute(&mut *tx)
            .await
            .context("Failed to insert meeting attendee")?;
    }

    tx.commit().await?;
    Ok(meeting_id)
}
