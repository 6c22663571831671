//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **単一の失敗**: ルール評価は最初の失敗で打ち切られるため、
//!   [`Validation`](DomainError::Validation) 以外は常に 1 件のメッセージを持つ
//!
//! ## エラーの種類
//!
//! | エラー種別 | 用途 |
//! |-----------|------|
//! | `Validation` | 構造的制約違反（違反フィールドをすべて列挙） |
//! | `NotFound` | 参照先エンティティが存在しない |
//! | `Forbidden` | アカウント状態により操作不可 |
//! | `NotAllowed` | ロール・所有権チェックの失敗 |
//! | `NotMember` | サークルメンバーシップゲートの失敗 |
//! | `CannotPerform` | 状態マシンの前提条件違反 |
//! | `Conflict` | 楽観的ロックの失敗 |

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// 呼び出し側（API 層）でこのエラーを受け取り、プロトコル固有の
/// レスポンスに変換する。変換規則はこのクレートの責務外。
#[derive(Debug, Error)]
pub enum DomainError {
    /// 構造的制約違反
    ///
    /// エンティティの宣言済み制約（必須、文字数、列挙値）への違反。
    /// 検証は原子的に行われ、違反したフィールドを**すべて**保持する。
    /// 順序評価されるルールとは異なり、このエラーのみ複数メッセージを持ちうる。
    #[error("入力値が不正です: {}", .0.join(" / "))]
    Validation(Vec<String>),

    /// エンティティが見つからない
    ///
    /// 指定された ID のエンティティが存在しない場合に使用する。
    /// ルールは解決済みの事実を前提とするため、このエラーは
    /// ルールセット構築より前に送出される。
    #[error("{entity_type}が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"掲示板", "サークル" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// アカウント状態による操作不可
    ///
    /// 操作者のアカウント状態（承認待ち、追放済みなど）が
    /// 一切の操作を許可しない場合に使用する。
    #[error("利用できないアカウントです: {0}")]
    Forbidden(String),

    /// ロール・所有権チェックの失敗
    ///
    /// 操作者は有効なアカウントを持つが、対象操作に必要なロールや
    /// 所有権を満たさない場合に使用する。
    #[error("権限がありません: {0}")]
    NotAllowed(String),

    /// サークルメンバーシップゲートの失敗
    ///
    /// サークルに属する掲示板・投稿・コメントへの操作で、
    /// 操作者のメンバーシップ状態が要求を満たさない場合に使用する。
    #[error("サークルメンバーシップが必要です: {0}")]
    NotMember(String),

    /// 状態マシンの前提条件違反
    ///
    /// 削除済みエンティティへの変更、未使用ロッカーの返却など、
    /// 対象の現在状態では実行できない操作に使用する。
    #[error("実行できない操作です: {0}")]
    CannotPerform(String),

    /// 競合エラー（楽観的ロック失敗）
    ///
    /// 同時更新による競合が発生した場合に使用する。認可エラーとは
    /// 区別され、クライアントは最新データを再取得して再試行できる。
    #[error("競合が発生しました: {0}")]
    Conflict(String),
}
