// タスクAPIのHTTPリクエストハンドラー
//
// メソッドで振り分け、ペイロードを検証し、リポジトリを1回だけ呼び出して
// CORSヘッダー付きのJSONレスポンスを返す。

use lambda_http::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{TaskCommand, TaskPayload, ValidationError};
use crate::infrastructure::{TaskRepository, TaskRepositoryError, UpdateResult};

/// メッセージが空のエラーに使う文言
const UNEXPECTED_ERROR: &str = "Unexpected error";

/// ハンドラーのエラー型
///
/// すべてリクエスト境界でエラーレスポンスに変換され、
/// Lambda関数自体はエラーを返さない。
#[derive(Debug, Error)]
pub enum TaskHandlerError {
    /// テーブル名が設定されていない
    #[error("TABLE_NAME is not configured")]
    NotConfigured,

    /// OPTIONS/GET/POST以外のメソッド
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// 更新対象のタスクが存在しない
    #[error("Task with the given id does not exist")]
    NotFound,

    /// ボディがUTF-8として読めない
    #[error("Request body is not valid UTF-8")]
    InvalidEncoding,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl TaskHandlerError {
    /// エラーに対応するHTTPステータス
    ///
    /// 分類できないエラー（ストレージ障害を含む）は400。
    pub fn status_code(&self) -> StatusCode {
        match self {
            TaskHandlerError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            TaskHandlerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            TaskHandlerError::NotFound => StatusCode::NOT_FOUND,
            TaskHandlerError::InvalidEncoding
            | TaskHandlerError::Validation(_)
            | TaskHandlerError::Repository(_)
            | TaskHandlerError::Serialization(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// エラーレスポンスのボディ
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// タスクAPIのリクエストハンドラー
///
/// リポジトリはプロセス起動時に一度だけ構築して注入する。
/// リポジトリがない（設定不備の）場合はすべてのリクエストに500を返す。
pub struct TaskHandler<R>
where
    R: TaskRepository,
{
    repository: Option<R>,
}

impl<R> TaskHandler<R>
where
    R: TaskRepository,
{
    /// 新しいハンドラーを作成
    pub fn new(repository: R) -> Self {
        Self {
            repository: Some(repository),
        }
    }

    /// テーブル設定なしのハンドラーを作成
    pub fn unconfigured() -> Self {
        Self { repository: None }
    }

    /// HTTPリクエストを処理してレスポンスを生成
    pub async fn handle(&self, request: Request) -> Response<Body> {
        let method = request.method().as_str().to_string();
        info!(method = %method, "リクエスト受信");

        match self.dispatch(&method, request.body()).await {
            Ok(response) => {
                info!(method = %method, status = response.status().as_u16(), "レスポンス送信");
                response
            }
            Err(err) => {
                let status = err.status_code();
                match &err {
                    TaskHandlerError::NotConfigured | TaskHandlerError::Repository(_) => {
                        error!(method = %method, status = status.as_u16(), error = %err, "リクエスト処理失敗");
                    }
                    _ => {
                        warn!(method = %method, status = status.as_u16(), error = %err, "リクエスト拒否");
                    }
                }
                Self::error_response(&err)
            }
        }
    }

    /// メソッドで振り分け
    async fn dispatch(&self, method: &str, body: &Body) -> Result<Response<Body>, TaskHandlerError> {
        // 設定不備はメソッドに関係なく先に判定する
        let repository = self
            .repository
            .as_ref()
            .ok_or(TaskHandlerError::NotConfigured)?;

        match method {
            "OPTIONS" => Ok(Self::build_response(StatusCode::OK, Body::Empty)),
            "GET" => {
                let tasks = repository.list().await?;
                info!(count = tasks.len(), "タスク一覧取得");
                Self::json_response(StatusCode::OK, &tasks)
            }
            "POST" => Self::handle_post(repository, body).await,
            _ => Err(TaskHandlerError::MethodNotAllowed),
        }
    }

    /// POST: 作成または更新
    async fn handle_post(repository: &R, body: &Body) -> Result<Response<Body>, TaskHandlerError> {
        let text = Self::body_text(body)?;
        let command = TaskPayload::from_body(text)?.into_command()?;

        match command {
            TaskCommand::Create(new_task) => {
                let task = new_task.into_task();
                repository.put(&task).await?;
                info!(task_id = %task.id, "タスク作成");
                Self::json_response(StatusCode::OK, &task)
            }
            TaskCommand::Update { id, changes } => match repository.update(&id, &changes).await? {
                UpdateResult::Updated(task) => {
                    info!(task_id = %id, "タスク更新");
                    Self::json_response(StatusCode::OK, &task)
                }
                UpdateResult::UpdatedWithoutAttributes => {
                    info!(task_id = %id, "タスク更新（属性なし）");
                    Self::json_response(StatusCode::OK, &changes.echo(&id))
                }
                UpdateResult::NotFound => Err(TaskHandlerError::NotFound),
            },
        }
    }

    /// ボディを文字列として取り出す
    ///
    /// base64エンコードされたボディはlambda_httpがBinaryにデコード済み。
    fn body_text(body: &Body) -> Result<&str, TaskHandlerError> {
        match body {
            Body::Empty => Ok(""),
            Body::Text(text) => Ok(text.as_str()),
            Body::Binary(bytes) => {
                std::str::from_utf8(bytes).map_err(|_| TaskHandlerError::InvalidEncoding)
            }
            // Body is #[non_exhaustive]; all existing variants are handled above.
            _ => unreachable!("unsupported lambda_http::Body variant"),
        }
    }

    fn json_response<T: Serialize>(
        status: StatusCode,
        value: &T,
    ) -> Result<Response<Body>, TaskHandlerError> {
        let json = serde_json::to_string(value)?;
        Ok(Self::build_response(status, Body::Text(json)))
    }

    fn error_response(err: &TaskHandlerError) -> Response<Body> {
        let message = err.to_string();
        let message = if message.is_empty() {
            UNEXPECTED_ERROR
        } else {
            message.as_str()
        };

        // ErrorBodyのシリアライズは失敗しない
        let json = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| format!(r#"{{"error":"{UNEXPECTED_ERROR}"}}"#));

        Self::build_response(err.status_code(), Body::Text(json))
    }

    fn build_response(status: StatusCode, body: Body) -> Response<Body> {
        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = build_cors_headers();
        response
    }
}

/// 全レスポンス共通のヘッダーを生成
///
/// - Content-Type: application/json
/// - Access-Control-Allow-Origin: *
/// - Access-Control-Allow-Headers: Content-Type
/// - Access-Control-Allow-Methods: GET,POST,OPTIONS
pub fn build_cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );

    headers
}
