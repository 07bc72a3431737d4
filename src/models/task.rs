use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A task row, owned by exactly one user.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub priority_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(input: TaskInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            completed: false,
            due_date: input.due_date,
            priority_id: input.priority_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// Must reference a shared default or a priority owned by the caller.
    pub priority_id: Option<Uuid>,
}

/// Partial update; fields omitted from the patch are left unchanged.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority_id: Option<Uuid>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority_id.is_none()
            && self.completed.is_none()
    }
}

/// Body of the dedicated completion toggle.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub completed: bool,
}

/// Sort keys accepted by the list endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    DueDate,
    CreatedAt,
}

impl TaskSort {
    pub fn column(self) -> &'static str {
        match self {
            TaskSort::DueDate => "due_date",
            TaskSort::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters for listing tasks.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct TaskQuery {
    /// Filter by completion state.
    pub completed: Option<bool>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
    pub sort: Option<TaskSort>,
    pub order: Option<SortOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

impl TaskQuery {
    /// Effective page size, defaulted and capped.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn sort(&self) -> TaskSort {
        self.sort.unwrap_or(TaskSort::CreatedAt)
    }

    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or(SortOrder::Desc)
    }
}

/// One page of tasks. `total` is the size of the full filtered set, not the
/// length of `items`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub items: Vec<Task>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation_starts_incomplete() {
        let input = TaskInput {
            title: "Write report".to_string(),
            description: Some("quarterly numbers".to_string()),
            due_date: Some(Utc::now()),
            priority_id: None,
        };

        let user_id = Uuid::new_v4();
        let task = Task::new(input, user_id);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.user_id, user_id);
        assert!(!task.completed);
    }

    #[test]
    fn test_task_input_validation() {
        let empty_title = TaskInput {
            title: "".to_string(),
            description: None,
            due_date: None,
            priority_id: None,
        };
        assert!(empty_title.validate().is_err());

        let long_title = TaskInput {
            title: "a".repeat(201),
            description: None,
            due_date: None,
            priority_id: None,
        };
        assert!(long_title.validate().is_err());

        let valid = TaskInput {
            title: "Valid".to_string(),
            description: Some("b".repeat(2000)),
            due_date: None,
            priority_id: None,
        };
        assert!(valid.validate().is_ok());

        let long_description = TaskInput {
            title: "Valid".to_string(),
            description: Some("b".repeat(2001)),
            due_date: None,
            priority_id: None,
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_patch_emptiness() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            completed: Some(true),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_query_defaults_and_caps() {
        let query = TaskQuery::default();
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.sort(), TaskSort::CreatedAt);
        assert_eq!(query.order(), SortOrder::Desc);

        let query = TaskQuery {
            limit: Some(10_000),
            offset: Some(-3),
            sort: Some(TaskSort::DueDate),
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.sort().column(), "due_date");
        assert_eq!(query.order().keyword(), "ASC");
    }
}
