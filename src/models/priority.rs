use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    // "#RRGGBB"
    static ref COLOR_REGEX: regex::Regex = regex::Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// A priority level. `user_id` is `None` for the seeded shared defaults and
/// set for per-user additions.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Priority {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    /// Display order / sort weight.
    pub value: i32,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Priority {
    pub fn new(input: PriorityInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            name: input.name,
            value: input.value,
            color: input.color,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PriorityInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub value: i32,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be in #RRGGBB form"))]
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct PriorityPatch {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub value: Option<i32>,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be in #RRGGBB form"))]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_input_validation() {
        let valid = PriorityInput {
            name: "Someday".to_string(),
            value: 0,
            color: "#a0B1c2".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_color = PriorityInput {
            name: "Someday".to_string(),
            value: 0,
            color: "red".to_string(),
        };
        assert!(bad_color.validate().is_err());

        let empty_name = PriorityInput {
            name: "".to_string(),
            value: 0,
            color: "#ffffff".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_new_priority_is_user_owned() {
        let user_id = Uuid::new_v4();
        let priority = Priority::new(
            PriorityInput {
                name: "Backlog".to_string(),
                value: 0,
                color: "#cccccc".to_string(),
            },
            user_id,
        );
        assert_eq!(priority.user_id, Some(user_id));
    }
}
