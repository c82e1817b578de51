// POSTリクエストのペイロード検証
//
// リクエストボディを型付きの入力構造体にデコードし、
// 作成または更新のコマンドに振り分ける。

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use super::task::{NewTask, TaskChanges};

/// ペイロード検証エラー
///
/// メッセージはそのままクライアントへのエラーレスポンスになる。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// JSONパースに失敗
    #[error("{0}")]
    InvalidJson(String),

    /// JSONだがオブジェクトではない
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// 作成時にタイトルがない
    #[error("Field 'titulo' is required")]
    TitleRequired,

    /// 更新時にタイトルが空
    #[error("Field 'titulo' cannot be empty")]
    TitleEmpty,

    /// 更新対象のフィールドがない
    #[error("You must send at least one of 'titulo' or 'completada' to update a task")]
    NothingToUpdate,
}

/// 検証済みのPOSTコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// IDなし: 新規作成
    Create(NewTask),
    /// IDあり: 既存タスクの部分更新
    Update { id: String, changes: TaskChanges },
}

/// POSTボディの入力構造体
///
/// 各フィールドは型が合わない場合に未指定として扱う。
/// 未知のフィールドは無視する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPayload {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "string_or_absent")]
    pub titulo: Option<String>,

    #[serde(default, deserialize_with = "bool_or_absent")]
    pub completada: Option<bool>,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn bool_or_absent<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(Some(b)),
        _ => Ok(None),
    }
}

/// トリムして空ならNone
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl TaskPayload {
    /// リクエストボディ文字列をデコード
    ///
    /// 空ボディは空オブジェクトとして扱う。
    pub fn from_body(body: &str) -> Result<Self, ValidationError> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        let value: Value =
            serde_json::from_str(body).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;

        if !value.is_object() {
            return Err(ValidationError::NotAnObject);
        }

        serde_json::from_value(value).map_err(|e| ValidationError::InvalidJson(e.to_string()))
    }

    /// 作成か更新かを判定し、検証済みコマンドに変換
    ///
    /// 空でない`id`があれば更新、なければ作成。
    pub fn into_command(self) -> Result<TaskCommand, ValidationError> {
        let id = trimmed(self.id);
        let title_supplied = self.titulo.is_some();
        let titulo = trimmed(self.titulo);

        let Some(id) = id else {
            let titulo = titulo.ok_or(ValidationError::TitleRequired)?;
            return Ok(TaskCommand::Create(NewTask {
                titulo,
                completada: self.completada.unwrap_or(false),
            }));
        };

        if !title_supplied && self.completada.is_none() {
            return Err(ValidationError::NothingToUpdate);
        }

        if title_supplied && titulo.is_none() {
            return Err(ValidationError::TitleEmpty);
        }

        Ok(TaskCommand::Update {
            id,
            changes: TaskChanges {
                titulo,
                completada: self.completada,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(body: &str) -> Result<TaskCommand, ValidationError> {
        TaskPayload::from_body(body)?.into_command()
    }

    // ==================== デコード ====================

    #[test]
    fn test_empty_body_is_empty_payload() {
        assert_eq!(TaskPayload::from_body("").unwrap(), TaskPayload::default());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let result = TaskPayload::from_body("{\"titulo\": ");
        assert!(matches!(result, Err(ValidationError::InvalidJson(_))));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert_eq!(
            TaskPayload::from_body("[1, 2]"),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(
            TaskPayload::from_body("\"titulo\""),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(TaskPayload::from_body("null"), Err(ValidationError::NotAnObject));
    }

    /// 型が合わないフィールドは未指定扱い
    #[test]
    fn test_wrongly_typed_fields_are_absent() {
        let payload =
            TaskPayload::from_body(r#"{"id": 42, "titulo": ["x"], "completada": "true"}"#)
                .unwrap();

        assert_eq!(payload, TaskPayload::default());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let payload = TaskPayload::from_body(r#"{"titulo": "x", "priority": 3}"#).unwrap();
        assert_eq!(payload.titulo.as_deref(), Some("x"));
    }

    // ==================== 作成 ====================

    #[test]
    fn test_create_trims_title_and_defaults_completed() {
        let result = command(r#"{"titulo": "  Buy milk  "}"#).unwrap();

        assert_eq!(
            result,
            TaskCommand::Create(NewTask {
                titulo: "Buy milk".to_string(),
                completada: false,
            })
        );
    }

    #[test]
    fn test_create_keeps_supplied_completed() {
        let result = command(r#"{"titulo": "Buy milk", "completada": true}"#).unwrap();

        assert!(matches!(
            result,
            TaskCommand::Create(NewTask { completada: true, .. })
        ));
    }

    #[test]
    fn test_create_without_title_is_rejected() {
        assert_eq!(command("{}"), Err(ValidationError::TitleRequired));
        assert_eq!(command(""), Err(ValidationError::TitleRequired));
        assert_eq!(
            command(r#"{"completada": true}"#),
            Err(ValidationError::TitleRequired)
        );
    }

    #[test]
    fn test_create_with_blank_title_is_rejected() {
        assert_eq!(
            command(r#"{"titulo": "   "}"#),
            Err(ValidationError::TitleRequired)
        );
    }

    /// 空白のみのIDは未指定扱いで作成になる
    #[test]
    fn test_blank_id_falls_back_to_create() {
        let result = command(r#"{"id": "  ", "titulo": "x"}"#).unwrap();
        assert!(matches!(result, TaskCommand::Create(_)));
    }

    // ==================== 更新 ====================

    #[test]
    fn test_update_with_completed_only() {
        let result = command(r#"{"id": " abc ", "completada": true}"#).unwrap();

        assert_eq!(
            result,
            TaskCommand::Update {
                id: "abc".to_string(),
                changes: TaskChanges {
                    titulo: None,
                    completada: Some(true),
                },
            }
        );
    }

    #[test]
    fn test_update_with_both_fields() {
        let result = command(r#"{"id": "abc", "titulo": " New ", "completada": false}"#).unwrap();

        assert_eq!(
            result,
            TaskCommand::Update {
                id: "abc".to_string(),
                changes: TaskChanges {
                    titulo: Some("New".to_string()),
                    completada: Some(false),
                },
            }
        );
    }

    #[test]
    fn test_update_without_fields_is_rejected() {
        assert_eq!(
            command(r#"{"id": "abc"}"#),
            Err(ValidationError::NothingToUpdate)
        );
        assert_eq!(
            command(r#"{"id": "abc", "completada": "yes"}"#),
            Err(ValidationError::NothingToUpdate)
        );
    }

    #[test]
    fn test_update_with_blank_title_is_rejected() {
        assert_eq!(
            command(r#"{"id": "abc", "titulo": "  ", "completada": true}"#),
            Err(ValidationError::TitleEmpty)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::TitleRequired.to_string(),
            "Field 'titulo' is required"
        );
        assert_eq!(
            ValidationError::TitleEmpty.to_string(),
            "Field 'titulo' cannot be empty"
        );
        assert_eq!(
            ValidationError::NothingToUpdate.to_string(),
            "You must send at least one of 'titulo' or 'completada' to update a task"
        );
    }
}
