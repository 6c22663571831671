//! # 投稿
//!
//! 掲示板への投稿エンティティを定義する。
//!
//! ## 設計方針
//!
//! - **論理削除**: 削除済み投稿へのコメント作成はルールエンジンで拒否される
//! - **所有権**: 削除は投稿者本人、サークルリーダー、学生会長、管理者の
//!   いずれかに限定される（コンテンツ管理権限ルール）

use chrono::{DateTime, Utc};

use crate::{board::BoardId, user::UserId};

define_uuid_id! {
    /// 投稿 ID
    pub struct PostId;
}

/// 投稿タイトルの最大文字数
const POST_TITLE_MAX_LENGTH: usize = 50;

/// 投稿本文の最大文字数
const POST_CONTENT_MAX_LENGTH: usize = 2000;

/// 投稿エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id:         PostId,
    title:      String,
    content:    String,
    writer_id:  UserId,
    board_id:   BoardId,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// 投稿の新規作成パラメータ
pub struct NewPost {
    pub id:        PostId,
    pub title:     String,
    pub content:   String,
    pub writer_id: UserId,
    pub board_id:  BoardId,
    pub now:       DateTime<Utc>,
}

/// 投稿の DB 復元パラメータ
pub struct PostRecord {
    pub id:         PostId,
    pub title:      String,
    pub content:    String,
    pub writer_id:  UserId,
    pub board_id:   BoardId,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// 新しい投稿を作成する
    pub fn new(params: NewPost) -> Self {
        Self {
            id:         params.id,
            title:      params.title,
            content:    params.content,
            writer_id:  params.writer_id,
            board_id:   params.board_id,
            is_deleted: false,
            created_at: params.now,
            updated_at: params.now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: PostRecord) -> Self {
        Self {
            id:         record.id,
            title:      record.title,
            content:    record.content,
            writer_id:  record.writer_id,
            board_id:   record.board_id,
            is_deleted: record.is_deleted,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &PostId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn writer_id(&self) -> &UserId {
        &self.writer_id
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 構造的制約を検証し、違反をすべて返す
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push("title: タイトルは必須です".to_string());
        }
        if self.title.chars().count() > POST_TITLE_MAX_LENGTH {
            violations.push(format!(
                "title: タイトルは{}文字以内である必要があります",
                POST_TITLE_MAX_LENGTH
            ));
        }
        if self.content.trim().is_empty() {
            violations.push("content: 本文は必須です".to_string());
        }
        if self.content.chars().count() > POST_CONTENT_MAX_LENGTH {
            violations.push(format!(
                "content: 本文は{}文字以内である必要があります",
                POST_CONTENT_MAX_LENGTH
            ));
        }

        violations
    }

    /// 論理削除した新しいインスタンスを返す
    pub fn deleted(self, now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: true,
            updated_at: now,
            ..self
        }
    }

    /// 論理削除を取り消した新しいインスタンスを返す
    pub fn restored(self, now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: false,
            updated_at: now,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    /// テスト用の固定タイムスタンプ
    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[fixture]
    fn post(now: DateTime<Utc>) -> Post {
        Post::new(NewPost {
            id:        PostId::new(),
            title:     "新歓のお知らせ".to_string(),
            content:   "4月の新歓イベントの案内です。".to_string(),
            writer_id: UserId::new(),
            board_id:  BoardId::new(),
            now,
        })
    }

    #[rstest]
    fn test_新規投稿は削除されていない(post: Post) {
        assert!(!post.is_deleted());
    }

    #[rstest]
    fn test_削除と復元の往復(post: Post) {
        let delete_time = DateTime::from_timestamp(1_700_001_000, 0).unwrap();
        let restore_time = DateTime::from_timestamp(1_700_002_000, 0).unwrap();

        let deleted = post.deleted(delete_time);
        assert!(deleted.is_deleted());

        let restored = deleted.restored(restore_time);
        assert!(!restored.is_deleted());
        assert_eq!(restored.updated_at(), restore_time);
    }

    #[rstest]
    fn test_正常な投稿は違反なし(post: Post) {
        assert!(post.validate().is_empty());
    }

    #[rstest]
    fn test_空のタイトルと空の本文は両方報告される(now: DateTime<Utc>) {
        let post = Post::new(NewPost {
            id:        PostId::new(),
            title:     String::new(),
            content:   "   ".to_string(),
            writer_id: UserId::new(),
            board_id:  BoardId::new(),
            now,
        });

        let violations = post.validate();
        assert_eq!(violations.len(), 2);
    }

    #[rstest]
    fn test_本文の文字数超過は違反(now: DateTime<Utc>) {
        let post = Post::new(NewPost {
            id:        PostId::new(),
            title:     "タイトル".to_string(),
            content:   "あ".repeat(2001),
            writer_id: UserId::new(),
            board_id:  BoardId::new(),
            now,
        });

        assert_eq!(post.validate().len(), 1);
    }
}
