/// DynamoDBでタスクを管理するためのタスクリポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, from_items, to_item};
use thiserror::Error;

use crate::domain::{Task, TaskChanges};

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskRepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// アイテムとTaskの変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 条件付き更新の結果
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateResult {
    /// 更新され、更新後のタスクが返された
    Updated(Task),
    /// 更新されたが、ストレージが属性を返さなかった
    UpdatedWithoutAttributes,
    /// 対象のIDが存在しない
    NotFound,
}

/// タスク永続化用トレイト
///
/// 実際のDynamoDB実装とテスト用モックを差し替えられるようにする。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 全タスクを取得（テーブル全体のスキャン）
    async fn list(&self) -> Result<Vec<Task>, TaskRepositoryError>;

    /// タスクを無条件に保存（同一IDは置換）
    async fn put(&self, task: &Task) -> Result<(), TaskRepositoryError>;

    /// 既存タスクを部分更新
    ///
    /// # 戻り値
    /// * 対象が存在しない場合は`Ok(UpdateResult::NotFound)`
    /// * 失敗時は`Err(TaskRepositoryError)`
    async fn update(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> Result<UpdateResult, TaskRepositoryError>;
}

/// TaskRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoTaskRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// タスクテーブル名
    table_name: String,
}

impl DynamoTaskRepository {
    /// 新しいDynamoTaskRepositoryを作成
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// 指定フィールドのみを更新するSET式を生成
    /// フォーマット: SET titulo = :t, completada = :c
    fn build_update_expression(changes: &TaskChanges) -> String {
        let mut assignments = Vec::with_capacity(2);
        if changes.titulo.is_some() {
            assignments.push("titulo = :t");
        }
        if changes.completada.is_some() {
            assignments.push("completada = :c");
        }
        format!("SET {}", assignments.join(", "))
    }

    /// SET式に対応するExpressionAttributeValuesを生成
    fn build_expression_values(changes: &TaskChanges) -> Vec<(&'static str, AttributeValue)> {
        let mut values = Vec::with_capacity(2);
        if let Some(titulo) = &changes.titulo {
            values.push((":t", AttributeValue::S(titulo.clone())));
        }
        if let Some(completada) = changes.completada {
            values.push((":c", AttributeValue::Bool(completada)));
        }
        values
    }
}

#[async_trait]
impl TaskRepository for DynamoTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, TaskRepositoryError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| TaskRepositoryError::ReadError(e.into_service_error().to_string()))?;

        let items = output.items.unwrap_or_default();
        from_items(items).map_err(|e| TaskRepositoryError::SerializationError(e.to_string()))
    }

    async fn put(&self, task: &Task) -> Result<(), TaskRepositoryError> {
        let item =
            to_item(task).map_err(|e| TaskRepositoryError::SerializationError(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| TaskRepositoryError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> Result<UpdateResult, TaskRepositoryError> {
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(Self::build_update_expression(changes))
            .condition_expression("attribute_exists(id)")
            .return_values(ReturnValue::AllNew);

        for (placeholder, value) in Self::build_expression_values(changes) {
            request = request.expression_attribute_values(placeholder, value);
        }

        match request.send().await {
            Ok(output) => match output.attributes {
                Some(attributes) if !attributes.is_empty() => {
                    let task = from_item(attributes)
                        .map_err(|e| TaskRepositoryError::SerializationError(e.to_string()))?;
                    Ok(UpdateResult::Updated(task))
                }
                _ => Ok(UpdateResult::UpdatedWithoutAttributes),
            },
            Err(err) => {
                let service_error = err.into_service_error();

                // 条件チェック失敗 = 対象IDが存在しない
                if service_error.is_conditional_check_failed_exception() {
                    return Ok(UpdateResult::NotFound);
                }

                Err(TaskRepositoryError::WriteError(service_error.to_string()))
            }
        }
    }
}
