//! # CommentRepository
//!
//! コメントの永続化を担当するポート。

use async_trait::async_trait;
use campusflow_domain::comment::{Comment, CommentId};

use crate::error::InfraError;

/// コメントリポジトリトレイト
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// ID でコメントを取得する（削除済みも含む）
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError>;

    /// コメントを保存し、永続化後のエンティティを返す
    async fn save(&self, comment: &Comment) -> Result<Comment, InfraError>;
}
