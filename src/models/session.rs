// file: src/session.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tutor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "tutor" => Ok(Role::Tutor),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", value)),
        }
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub school: String,
    pub email: Option<String>,
}

impl User {
    pub fn new_tutor(first_name: String, last_name: String, school: String) -> Self {
        Self {
            id: None,
            first_name,
            last_name,
            role: Role::Tutor.as_str().to_string(),
            school,
            email: None,
        }
    }

    pub fn new_admin(first_name: String, last_name: String, school: String) -> Self {
        Self {
            id: None,
            first_name,
            last_name,
            role: Role::Admin.as_str().to_string(),
            school,
            email: None,
        }
    }

    pub fn role(&self) -> Result<Role, String> {
        Role::parse(&self.role)
    }
}

/// The acting user, as resolved once per dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub role: Role,
    pub school: String,
    pub display_name: String,
    pub email: Option<String>,
}

impl Session {
    pub fn from_user(user: &User) -> Result<Self, String> {
        let user_id = user.id.ok_or_else(|| "User has no id".to_string())?;
        Ok(Self {
            user_id,
            role: user.role()?,
            school: user.school.clone(),
            display_name: format!("{} {}", user.first_name, user.last_name),
            email: user.email.clone(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
