//! # CampusFlow インフラ層
//!
//! ドメイン層が消費する抽象ポート（リポジトリトレイト）と、
//! テスト用のインメモリ実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト経由でのみ永続化に触れる
//! - **ストレージ非依存**: コアは具体的なストレージ技術やクエリ言語に
//!   依存しない。ポートがその境界のすべてである
//! - **楽観的ロック**: 競合ウィンドウを持つエンティティ（ロッカー）の
//!   更新は期待バージョンとの突き合わせを要求し、不一致を
//!   [`InfraErrorKind::Conflict`](error::InfraErrorKind::Conflict) として報告する

pub mod error;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind};
