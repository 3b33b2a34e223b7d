// file: src/student.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub school: String,
    pub grade: Option<i32>,
    pub tutor_id: Option<i64>,
}

impl Student {
    pub fn new(first_name: String, last_name: String, school: String) -> Self {
        Self {
            id: None,
            first_name,
            last_name,
            school,
            grade: None,
            tutor_id: None,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}
