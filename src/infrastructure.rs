// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod task_repository;

// Re-exports
pub use config::{table_name_from_env, TaskConfigError, TaskTableConfig, TABLE_NAME_VAR};
pub use logging::init_logging;
pub use task_repository::{DynamoTaskRepository, TaskRepository, TaskRepositoryError, UpdateResult};
