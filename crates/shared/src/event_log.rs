//! # ビジネスイベントログ
//!
//! 変更系ユースケースの成功を構造化ログとして記録するための
//! マクロとフィールド定数を提供する。
//!
//! フィールド名はドット記法（`event.category`、`event.action`）で統一する。
//! tracing はドット区切りのフィールド名をそのまま受け付けるため、
//! JSON 出力ではフラットなキーとして現れ、
//! `jq 'select(.["event.kind"] == "business_event")'` で抽出できる。
//! 値の表記ゆれを防ぐため、呼び出し側は [`event`] モジュールの定数を使う。

/// ビジネスイベントを info レベルの構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動で付与する。
/// `event.category` / `event.action` / `event.result` は必須とし、
/// `event.entity_type` / `event.entity_id` / `event.actor_id` を
/// 対象が特定できる操作では併せて渡す。
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const BOARD: &str = "board";
        pub const CIRCLE: &str = "circle";
        pub const POST: &str = "post";
        pub const COMMENT: &str = "comment";
        pub const LOCKER: &str = "locker";
    }

    /// イベントアクション
    pub mod action {
        // 掲示板
        pub const BOARD_CREATED: &str = "board.created";
        pub const BOARD_UPDATED: &str = "board.updated";
        pub const BOARD_DELETED: &str = "board.deleted";
        pub const BOARD_RESTORED: &str = "board.restored";

        // サークル
        pub const CIRCLE_DELETED: &str = "circle.deleted";
        pub const CIRCLE_RESTORED: &str = "circle.restored";
        pub const MEMBER_APPLIED: &str = "circle.member_applied";
        pub const MEMBER_LEFT: &str = "circle.member_left";
        pub const MEMBER_ACCEPTED: &str = "circle.member_accepted";
        pub const MEMBER_REJECTED: &str = "circle.member_rejected";
        pub const MEMBER_DROPPED: &str = "circle.member_dropped";

        // 投稿・コメント
        pub const POST_CREATED: &str = "post.created";
        pub const POST_DELETED: &str = "post.deleted";
        pub const POST_RESTORED: &str = "post.restored";
        pub const COMMENT_CREATED: &str = "comment.created";
        pub const COMMENT_DELETED: &str = "comment.deleted";

        // ロッカー
        pub const LOCKER_CREATED: &str = "locker.created";
        pub const LOCKER_REGISTERED: &str = "locker.registered";
        pub const LOCKER_RETURNED: &str = "locker.returned";
        pub const LOCKER_ENABLED: &str = "locker.enabled";
        pub const LOCKER_DISABLED: &str = "locker.disabled";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const BOARD: &str = "board";
        pub const CIRCLE: &str = "circle";
        pub const CIRCLE_MEMBER: &str = "circle_member";
        pub const POST: &str = "post";
        pub const COMMENT: &str = "comment";
        pub const LOCKER: &str = "locker";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}
