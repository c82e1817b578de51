// Domain layer modules
pub mod task;
pub mod task_request;

// Re-exports
pub use task::{NewTask, Task, TaskChanges, TaskEcho};
pub use task_request::{TaskCommand, TaskPayload, ValidationError};
