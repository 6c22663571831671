//! # サービス層エラー定義
//!
//! ユースケースが返すエラーと、インフラ層エラーからの変換を定義する。
//!
//! ## 設計方針
//!
//! - **ドメインエラーを透過**: ルール評価の失敗はそのまま
//!   [`DomainError`] の種別で呼び出し側に届く
//! - **競合の昇格**: インフラ層の楽観的ロック競合は
//!   [`DomainError::Conflict`] に変換し、リトライ可能なエラーとして
//!   認可エラーと区別する
//! - **それ以外のインフラ失敗は内部エラー**: 呼び出し側で回復できない

use campusflow_domain::DomainError;
use campusflow_infra::{InfraError, InfraErrorKind};
use thiserror::Error;

/// サービス層で発生するエラー
#[derive(Debug, Error)]
pub enum ServiceError {
    /// ドメインルール違反（認可・状態・構造的制約）
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<InfraError> for ServiceError {
    fn from(error: InfraError) -> Self {
        match error.kind() {
            InfraErrorKind::Conflict { entity, id } => {
                Self::Domain(DomainError::Conflict(format!(
                    "{}(id={}) は既に更新されています。最新の情報を取得してください。",
                    entity, id
                )))
            }
            InfraErrorKind::Unexpected(_) => Self::Internal(error.to_string()),
        }
    }
}
