//! # UserRepository
//!
//! ユーザーの永続化を担当するポート。

use async_trait::async_trait;
use campusflow_domain::user::{User, UserId};

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ID でユーザーを取得する
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError>;

    /// ユーザーを保存し、永続化後のエンティティを返す
    async fn save(&self, user: &User) -> Result<User, InfraError>;
}
