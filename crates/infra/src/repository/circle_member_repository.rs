//! # CircleMemberRepository
//!
//! サークルメンバーシップの永続化を担当するポート。
//!
//! ## 設計方針
//!
//! - **一意性**: (ユーザー, サークル) の組につきレコードは高々 1 件。
//!   一意性の強制はストア実装の責務

use async_trait::async_trait;
use campusflow_domain::{
    circle::{CircleId, CircleMember},
    user::UserId,
};

use crate::error::InfraError;

/// サークルメンバーリポジトリトレイト
#[async_trait]
pub trait CircleMemberRepository: Send + Sync {
    /// ユーザーとサークルの組でメンバーシップを取得する
    async fn find_by_user_and_circle(
        &self,
        user_id: &UserId,
        circle_id: &CircleId,
    ) -> Result<Option<CircleMember>, InfraError>;

    /// ユーザーのメンバーシップ一覧を取得する
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<CircleMember>, InfraError>;

    /// メンバーシップを保存し、永続化後のエンティティを返す
    async fn save(&self, member: &CircleMember) -> Result<CircleMember, InfraError>;
}
