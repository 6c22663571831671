//! # BoardRepository
//!
//! 掲示板の永続化を担当するポート。
//!
//! ## 設計方針
//!
//! - **時系列ソート**: 一覧系ファインダーは created_at ASC で返す
//! - **削除済みの除外**: 一覧系ファインダーは未削除の掲示板のみ返す。
//!   個別取得（`find_by_id`）は削除済みも返す（復元操作のため）

use async_trait::async_trait;
use campusflow_domain::{
    board::{Board, BoardId},
    circle::CircleId,
};

use crate::error::InfraError;

/// 掲示板リポジトリトレイト
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// ID で掲示板を取得する（削除済みも含む）
    async fn find_by_id(&self, id: &BoardId) -> Result<Option<Board>, InfraError>;

    /// 全学掲示板（サークル非所属・未削除）を created_at ASC で取得する
    async fn find_global_active(&self) -> Result<Vec<Board>, InfraError>;

    /// 指定サークル群の未削除掲示板を created_at ASC で取得する
    async fn find_active_by_circles(
        &self,
        circle_ids: &[CircleId],
    ) -> Result<Vec<Board>, InfraError>;

    /// 掲示板を保存し、永続化後のエンティティを返す
    async fn save(&self, board: &Board) -> Result<Board, InfraError>;
}
