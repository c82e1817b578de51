// ドメイン層: タスクエンティティとペイロード検証
pub mod domain;

// アプリケーション層: HTTPリクエストハンドラー
pub mod application;

// インフラ層: 設定、DynamoDBリポジトリ、ログ
pub mod infrastructure;
