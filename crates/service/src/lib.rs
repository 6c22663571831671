//! # CampusFlow サービス層
//!
//! ユースケース（アプリケーションサービス）を提供する。
//!
//! ## 設計方針
//!
//! - **fetch → decide → mutate-and-persist**: 各ユースケースはポート経由で
//!   エンティティを取得し、取得済みの事実からルールセットを組み立て、
//!   全ルール合格後にのみ状態を変更して永続化する。ルールセットが
//!   合格するまで部分的な変更は一切起こらない
//! - **コンストラクタ注入**: ポートと Clock は `Arc<dyn Trait>` で注入する。
//!   プロセスレベルの設定（バインドアドレス等）は外側の API バイナリの責務
//! - **ビジネスイベント**: 成功した変更操作ごとに構造化ログを出力する
//!
//! HTTP 層（ルーティング、DTO、ステータスコード変換）はこのクレートの
//! 責務外であり、[`ServiceError`] の種別をどう表現するかは呼び出し側が決める。

pub mod error;
pub mod usecase;

pub use error::ServiceError;
