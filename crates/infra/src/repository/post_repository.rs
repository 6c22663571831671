//! # PostRepository
//!
//! 投稿の永続化を担当するポート。

use async_trait::async_trait;
use campusflow_domain::post::{Post, PostId};

use crate::error::InfraError;

/// 投稿リポジトリトレイト
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// ID で投稿を取得する（削除済みも含む）
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, InfraError>;

    /// 投稿を保存し、永続化後のエンティティを返す
    async fn save(&self, post: &Post) -> Result<Post, InfraError>;
}
