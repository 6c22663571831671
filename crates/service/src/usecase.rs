//! # ユースケース層
//!
//! エンティティ種別ごとのユースケース（アプリケーションサービス）を定義する。
//!
//! すべてのユースケースは同じ形に従う:
//!
//! 1. ポート経由で操作者と対象エンティティを取得する（不在は NotFound）
//! 2. 取得済みの事実からルールセットを組み立てる
//! 3. ルールセットを評価する（最初の失敗で打ち切り）
//! 4. 合格した場合のみエンティティを遷移させ、ポート経由で永続化する
//! 5. 成功時にビジネスイベントを記録する

pub mod board;
pub mod circle;
pub mod comment;
pub mod locker;
pub mod post;

pub(crate) mod helpers;
