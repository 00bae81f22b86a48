use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `users` table
///
/// `id` is assigned by the database on insert and never changes afterwards.
/// The table's `active` column is not read by any operation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} | {} | {}", self.id, self.name, self.email)
    }
}

/// Data for inserting a user; the database assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_line() {
        let user = User {
            id: 7,
            name: "Test User 1".to_string(),
            email: "test1@example.com".to_string(),
        };
        assert_eq!(user.to_string(), "7 | Test User 1 | test1@example.com");
    }

    #[test]
    fn test_json_shape() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("active").is_none());
    }
}
