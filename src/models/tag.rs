use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref COLOR_REGEX: regex::Regex = regex::Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// A user-owned label, attached to tasks through the `task_tags` join table.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(input: TagInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: input.name,
            color: input.color,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TagInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be in #RRGGBB form"))]
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct TagPatch {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be in #RRGGBB form"))]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_input_validation() {
        let valid = TagInput {
            name: "errands".to_string(),
            color: "#00ff00".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_color = TagInput {
            name: "errands".to_string(),
            color: "#00ff0".to_string(),
        };
        assert!(bad_color.validate().is_err());

        let long_name = TagInput {
            name: "x".repeat(51),
            color: "#00ff00".to_string(),
        };
        assert!(long_name.validate().is_err());
    }
}
