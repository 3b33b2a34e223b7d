// file: src/database/students.rs
use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::{Role, Session, Student};

pub async fn add(pool: &SqlitePool, student: &Student) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO students (first_name, last_name, school, grade, tutor_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&student.first_name)
    .bind(&student.last_name)
    .bind(&student.school)
    .bind(student.grade)
    .bind(student.tutor_id)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Tutors see the students assigned to them, admins the whole school.
pub async fn for_role(pool: &SqlitePool, session: &Session) -> Result<Vec<Student>> {
    let students = match session.role {
        Role::Tutor => {
            sqlx::query_as::<_, Student>(
                r#"
                SELECT id, first_name, last_name, school, grade, tutor_id
                FROM students
                WHERE tutor_id = ?
                ORDER BY last_name, first_name
                "#,
            )
            .bind(session.user_id)
            .fetch_all(pool)
            .await?
        }
        Role::Admin => {
            sqlx::query_as::<_, Student>(
                r#"
                SELECT id, first_name, last_name, school, grade, tutor_id
                FROM students
                WHERE school = ?
                ORDER BY last_name, first_name
                "#,
            )
            .bind(&session.school)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(students)
}
