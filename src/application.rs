// アプリケーション層モジュール
pub mod task_handler;

// 再エクスポート
pub use task_handler::{build_cors_headers, TaskHandler, TaskHandlerError};
