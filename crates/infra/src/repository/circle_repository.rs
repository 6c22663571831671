//! # CircleRepository
//!
//! サークルの永続化を担当するポート。

use async_trait::async_trait;
use campusflow_domain::circle::{Circle, CircleId};

use crate::error::InfraError;

/// サークルリポジトリトレイト
#[async_trait]
pub trait CircleRepository: Send + Sync {
    /// ID でサークルを取得する
    async fn find_by_id(&self, id: &CircleId) -> Result<Option<Circle>, InfraError>;

    /// サークルを保存し、永続化後のエンティティを返す
    async fn save(&self, circle: &Circle) -> Result<Circle, InfraError>;
}
