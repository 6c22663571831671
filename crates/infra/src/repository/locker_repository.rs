//! # LockerRepository
//!
//! ロッカーの永続化を担当するポート。
//!
//! ## 設計方針
//!
//! - **楽観的ロック必須**: 登録と返却は「2 人が同じ空きロッカーを
//!   フェッチしてから書き込む」競合ウィンドウを持つ。更新は期待
//!   バージョンとの突き合わせを要求し、不一致は
//!   [`InfraErrorKind::Conflict`](crate::error::InfraErrorKind::Conflict)
//!   として認可エラーと区別して報告する
//! - **行なしは no-op**: 対象行が存在しない更新（並行削除など）は
//!   エラーではなく `Ok(None)` を返す。呼び出し側は「操作は効果を
//!   持たなかった」として扱う

use async_trait::async_trait;
use campusflow_domain::{
    locker::{Locker, LockerId},
    value_objects::Version,
};

use crate::error::InfraError;

/// ロッカーリポジトリトレイト
#[async_trait]
pub trait LockerRepository: Send + Sync {
    /// ID でロッカーを取得する
    async fn find_by_id(&self, id: &LockerId) -> Result<Option<Locker>, InfraError>;

    /// 新規ロッカーを作成する
    async fn insert(&self, locker: &Locker) -> Result<(), InfraError>;

    /// バージョン一致を条件にロッカーを更新する
    ///
    /// - 対象行が存在しない場合は `Ok(None)`
    /// - ストア上のバージョンが `expected_version` と一致しない場合は
    ///   `Conflict` エラー
    /// - 成功時は更新後のエンティティを `Ok(Some(_))` で返す
    async fn update_with_version_check(
        &self,
        locker: &Locker,
        expected_version: Version,
    ) -> Result<Option<Locker>, InfraError>;
}
