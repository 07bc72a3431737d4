use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// How often a recurring template produces an occurrence.
/// Corresponds to the `recurrence_frequency` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "recurrence_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceFrequency {
    /// The due date of the occurrence after `from`, `interval` steps apart.
    pub fn advance(self, from: DateTime<Utc>, interval: i32) -> DateTime<Utc> {
        let interval = interval.max(1);
        match self {
            RecurrenceFrequency::Daily => from + Duration::days(interval as i64),
            RecurrenceFrequency::Weekly => from + Duration::days(7 * interval as i64),
            RecurrenceFrequency::Monthly => from
                .checked_add_months(Months::new(interval as u32))
                .unwrap_or(from),
        }
    }
}

/// A template that spawns concrete [`TaskInstance`] occurrences.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RecurringTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority_id: Option<Uuid>,
    pub frequency: RecurrenceFrequency,
    pub interval_count: i32,
    /// When the next occurrence is due; advanced on every spawn.
    pub next_due_at: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringTask {
    pub fn new(input: RecurringTaskInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            priority_id: input.priority_id,
            frequency: input.frequency,
            interval_count: input.interval_count.unwrap_or(1).max(1),
            next_due_at: input.next_due_at,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecurringTaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub priority_id: Option<Uuid>,
    pub frequency: RecurrenceFrequency,
    #[validate(range(min = 1, max = 365))]
    pub interval_count: Option<i32>,
    pub next_due_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct RecurringTaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub priority_id: Option<Uuid>,
    pub frequency: Option<RecurrenceFrequency>,
    #[validate(range(min = 1, max = 365))]
    pub interval_count: Option<i32>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

impl RecurringTaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority_id.is_none()
            && self.frequency.is_none()
            && self.interval_count.is_none()
            && self.next_due_at.is_none()
            && self.active.is_none()
    }
}

/// A concrete occurrence spawned from a template.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TaskInstance {
    pub id: Uuid,
    pub recurring_task_id: Uuid,
    pub user_id: Uuid,
    pub due_at: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TaskInstance {
    pub fn spawn(template: &RecurringTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            recurring_task_id: template.id,
            user_id: template.user_id,
            due_at: template.next_due_at,
            completed: false,
            created_at: Utc::now(),
        }
    }
}
