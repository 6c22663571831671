//! # コメント
//!
//! 投稿へのコメントエンティティを定義する。
//!
//! ## 設計方針
//!
//! - **ネスト**: コメントは親コメントの下にぶら下がれる。親コメントが
//!   削除済みでも返信は許可される（明示的な例外）。削除済み**投稿**への
//!   コメント作成は拒否される
//! - **論理削除**: 削除済みコメントも読み取りは可能なまま残る

use chrono::{DateTime, Utc};

use crate::{post::PostId, user::UserId};

define_uuid_id! {
    /// コメント ID
    pub struct CommentId;
}

/// コメント本文の最大文字数
const COMMENT_CONTENT_MAX_LENGTH: usize = 500;

/// コメントエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id:                CommentId,
    content:           String,
    writer_id:         UserId,
    post_id:           PostId,
    parent_comment_id: Option<CommentId>,
    is_deleted:        bool,
    created_at:        DateTime<Utc>,
    updated_at:        DateTime<Utc>,
}

/// コメントの新規作成パラメータ
pub struct NewComment {
    pub id:                CommentId,
    pub content:           String,
    pub writer_id:         UserId,
    pub post_id:           PostId,
    pub parent_comment_id: Option<CommentId>,
    pub now:               DateTime<Utc>,
}

/// コメントの DB 復元パラメータ
pub struct CommentRecord {
    pub id:                CommentId,
    pub content:           String,
    pub writer_id:         UserId,
    pub post_id:           PostId,
    pub parent_comment_id: Option<CommentId>,
    pub is_deleted:        bool,
    pub created_at:        DateTime<Utc>,
    pub updated_at:        DateTime<Utc>,
}

impl Comment {
    /// 新しいコメントを作成する
    pub fn new(params: NewComment) -> Self {
        Self {
            id:                params.id,
            content:           params.content,
            writer_id:         params.writer_id,
            post_id:           params.post_id,
            parent_comment_id: params.parent_comment_id,
            is_deleted:        false,
            created_at:        params.now,
            updated_at:        params.now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: CommentRecord) -> Self {
        Self {
            id:                record.id,
            content:           record.content,
            writer_id:         record.writer_id,
            post_id:           record.post_id,
            parent_comment_id: record.parent_comment_id,
            is_deleted:        record.is_deleted,
            created_at:        record.created_at,
            updated_at:        record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &CommentId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn writer_id(&self) -> &UserId {
        &self.writer_id
    }

    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    pub fn parent_comment_id(&self) -> Option<&CommentId> {
        self.parent_comment_id.as_ref()
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

        if self.content.trim().is_empty() {
            violations.push("content: コメント本文は必須です".to_string());
        }
        if self.content.chars().count() > COMMENT_CONTENT_MAX_LENGTH {
            violations.push(format!(
                "content: コメント本文は{}文字以内である必要があります",
                COMMENT_CONTENT_MAX_LENGTH
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
}
