// file: src/database/users.rs
use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::User;

pub async fn add(pool: &SqlitePool, user: &User) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO users (first_name, last_name, role, school, email) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.role)
    .bind(&user.school)
    .bind(&user.email)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, role, school, email FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, role, school, email FROM users ORDER BY last_name, first_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}
