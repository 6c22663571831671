//! # リポジトリポート
//!
//! エンティティ種別ごとの永続化ポート（トレイト）を定義する。
//!
//! ## 設計方針
//!
//! - **エンティティごとに 1 ポート**: 各ポートは最低限 `find_by_id` と
//!   `save` を公開し、必要に応じてエンティティ固有のファインダーを加える
//! - **テスタビリティ**: トレイト経由でモック可能な設計。インメモリ実装は
//!   `test-utils` feature の [`mock`](crate::mock) モジュールが提供する
//! - **具体実装は境界の外**: ストレージ技術の選定とマッピングは
//!   このクレートの責務外

pub mod board_repository;
pub mod circle_member_repository;
pub mod circle_repository;
pub mod comment_repository;
pub mod locker_repository;
pub mod post_repository;
pub mod user_repository;

pub use board_repository::BoardRepository;
pub use circle_member_repository::CircleMemberRepository;
pub use circle_repository::CircleRepository;
pub use comment_repository::CommentRepository;
pub use locker_repository::LockerRepository;
pub use post_repository::PostRepository;
pub use user_repository::UserRepository;
