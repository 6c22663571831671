//! # CampusFlow ドメイン層
//!
//! 学内団体サービスのビジネスロジック中核を定義する。
//!
//! ## 設計方針
//!
//! このクレートは DDD（ドメイン駆動設計）の原則に従い、以下を提供する:
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: Board, Locker）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: Version,
//!   TargetKind）
//! - **ルールエンジン**: 操作ごとの認可・状態検証を合成する [`rule`] モジュール
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）に一切依存しない。
//! ルール評価はフェッチ済みの事実のみを入力とする純粋なメモリ内計算であり、
//! I/O を行わない。
//!
//! ## 使用例
//!
//! ```rust
//! use campusflow_domain::{
//!     DomainError,
//!     rule::{Rule, RuleSet},
//!     user::UserState,
//! };
//!
//! let result = RuleSet::new()
//!     .add(Rule::actor_state(UserState::Active))
//!     .validate();
//! assert!(result.is_ok());
//! ```

#[macro_use]
mod macros;

pub mod board;
pub mod circle;
pub mod clock;
pub mod comment;
pub mod error;
pub mod locker;
pub mod post;
pub mod role;
pub mod rule;
pub mod user;
pub mod value_objects;

pub use error::DomainError;
