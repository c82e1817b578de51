/// タスクテーブル接続設定
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// テーブル名を指定する環境変数
pub const TABLE_NAME_VAR: &str = "TABLE_NAME";

/// 設定読み込みのエラー型
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// テーブル名とクライアントを持つDynamoDB設定
///
/// プロセス起動時に一度だけ構築し、リポジトリに渡す。
#[derive(Debug, Clone)]
pub struct TaskTableConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// タスクテーブル名
    table_name: String,
}

impl TaskTableConfig {
    /// 環境変数からテーブル名を読み、AWS設定からクライアントを作成
    ///
    /// テーブル名がなければAWS設定の読み込みは行わない。
    pub async fn from_env() -> Result<Self, TaskConfigError> {
        let table_name = table_name_from_env()?;

        // 環境からAWS設定を読み込み（認証情報、リージョンなど）
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, table_name })
    }

    /// 明示的な値で作成（テスト用）
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// テーブル名を取得
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// `TABLE_NAME`を読み取る（未設定・空文字列はエラー）
pub fn table_name_from_env() -> Result<String, TaskConfigError> {
    std::env::var(TABLE_NAME_VAR)
        .ok()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| TaskConfigError::MissingEnvVar(TABLE_NAME_VAR.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // テストで環境変数を安全に設定/削除するヘルパー
    // 注: Rust 2024エディションでset_var/remove_varはunsafe
    unsafe fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    fn test_missing_env_var_error_display() {
        let error = TaskConfigError::MissingEnvVar("TABLE_NAME".to_string());
        assert_eq!(error.to_string(), "Missing environment variable: TABLE_NAME");
    }

    #[tokio::test]
    async fn test_config_new_and_getters() {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        let config = TaskTableConfig::new(client, "tasks-table".to_string());

        assert_eq!(config.table_name(), "tasks-table");
        let _client_ref = config.client();
    }

    #[test]
    #[serial(table_env)]
    fn test_table_name_from_env_missing() {
        unsafe { remove_env(TABLE_NAME_VAR) };

        assert_eq!(
            table_name_from_env(),
            Err(TaskConfigError::MissingEnvVar("TABLE_NAME".to_string()))
        );
    }

    /// 空文字列は未設定と同じ扱い
    #[test]
    #[serial(table_env)]
    fn test_table_name_from_env_empty() {
        unsafe { set_env(TABLE_NAME_VAR, "") };

        assert!(table_name_from_env().is_err());

        unsafe { remove_env(TABLE_NAME_VAR) };
    }

    #[test]
    #[serial(table_env)]
    fn test_table_name_from_env_present() {
        unsafe { set_env(TABLE_NAME_VAR, "my-tasks") };

        assert_eq!(table_name_from_env(), Ok("my-tasks".to_string()));

        unsafe { remove_env(TABLE_NAME_VAR) };
    }

    #[tokio::test]
    #[serial(table_env)]
    async fn test_from_env_missing_table_name() {
        unsafe { remove_env(TABLE_NAME_VAR) };

        let result = TaskTableConfig::from_env().await;
        assert!(matches!(result, Err(TaskConfigError::MissingEnvVar(var)) if var == "TABLE_NAME"));
    }
}
