pub mod password_reset;
pub mod priority;
pub mod recurring;
pub mod tag;
pub mod task;
pub mod user;

pub use password_reset::PasswordResetToken;
pub use priority::{Priority, PriorityInput, PriorityPatch};
pub use recurring::{
    RecurringTask, RecurringTaskInput, RecurringTaskPatch, RecurrenceFrequency, TaskInstance,
};
pub use tag::{Tag, TagInput, TagPatch};
pub use task::{
    CompleteRequest, SortOrder, Task, TaskInput, TaskListResponse, TaskPatch, TaskQuery, TaskSort,
};
pub use user::{UpdateProfileRequest, User, UserResponse};
