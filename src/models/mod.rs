pub mod task;
pub mod user;

pub use task::{
    coerce_completed, normalize_priority, NewTask, Task, TaskChanges, TaskInput, TaskPatch,
    TaskPriority, TaskStatus,
};
pub use user::{normalize_email, NewUser, Profile, PublicUser, User};
