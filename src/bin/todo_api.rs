/// タスクAPI HTTP Lambdaエントリポイント
///
/// Lambda Function URL / API Gateway経由のHTTPリクエストを処理する。
/// テーブル設定とDynamoDBクライアントは起動時に一度だけ構築する。
use std::sync::Arc;

use lambda_http::{run, service_fn, Error, Request};
use todo_api::application::TaskHandler;
use todo_api::infrastructure::{init_logging, DynamoTaskRepository, TaskTableConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let handler = Arc::new(build_handler().await);

    info!("タスクAPI Lambda関数を初期化");

    run(service_fn(move |request: Request| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, Error>(handler.handle(request).await) }
    }))
    .await
}

/// 環境変数からハンドラーを構築
///
/// `TABLE_NAME`がない場合も起動は続け、全リクエストに500を返す。
async fn build_handler() -> TaskHandler<DynamoTaskRepository> {
    match TaskTableConfig::from_env().await {
        Ok(config) => {
            info!(table_name = config.table_name(), "テーブル設定読み込み完了");
            TaskHandler::new(DynamoTaskRepository::new(
                config.client().clone(),
                config.table_name().to_string(),
            ))
        }
        Err(err) => {
            error!(error = %err, "テーブル設定読み込み失敗");
            TaskHandler::unconfigured()
        }
    }
}
