// タスク（ToDo）エンティティ
//
// テーブルに保存される唯一のレコード型と、部分更新の変更内容を定義する。

use serde::{Deserialize, Serialize};

/// タスクエンティティ
///
/// DynamoDBの1アイテムに対応する。作成に成功したタスクは
/// 3フィールドすべてを持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// タスクID（パーティションキー、作成後は不変）
    pub id: String,
    /// タイトル（トリム済み、空文字列にはならない）
    pub titulo: String,
    /// 完了フラグ
    pub completada: bool,
}

impl Task {
    /// 新しいIDを払い出してタスクを作成
    pub fn create(titulo: String, completada: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            titulo,
            completada,
        }
    }
}

/// 新規作成用の検証済み入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub titulo: String,
    pub completada: bool,
}

impl NewTask {
    /// IDを払い出してTaskに変換
    pub fn into_task(self) -> Task {
        Task::create(self.titulo, self.completada)
    }
}

/// 部分更新の変更内容
///
/// 指定されたフィールドだけが更新対象になる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub titulo: Option<String>,
    pub completada: Option<bool>,
}

impl TaskChanges {
    /// 更新対象のフィールドが1つもないか
    pub fn is_empty(&self) -> bool {
        self.titulo.is_none() && self.completada.is_none()
    }

    /// ストレージが更新後の属性を返さなかった場合のレスポンス
    ///
    /// IDと指定されたフィールドのみを含む。
    pub fn echo(&self, id: &str) -> TaskEcho {
        TaskEcho {
            id: id.to_string(),
            titulo: self.titulo.clone(),
            completada: self.completada,
        }
    }
}

/// 更新結果のフォールバック表現（未指定フィールドは省略）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEcho {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completada: Option<bool>,
}
