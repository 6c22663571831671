//! # 共通値オブジェクト
//!
//! 複数のエンティティにまたがって使われる不変の値型を定義する。
//!
//! | 型 | ドメイン用語 | 要件 |
//! |---|------------|------|
//! | [`Version`] | バージョン番号 | 楽観的ロックの期待値。1 以上で単調増加 |
//! | [`TargetKind`] | 対象種別 | 検証・エラーメッセージに埋め込むエンティティ種別 |

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

// =========================================================================
// Version（バージョン番号）
// =========================================================================

/// バージョン番号（値オブジェクト）
///
/// 楽観的ロックに使用する。1 始まりで、状態遷移のたびに 1 ずつ進む。
/// 永続化層は更新時に期待バージョンとストア上の値を突き合わせ、
/// 不一致を競合として報告する。
///
/// # 使用例
///
/// ```rust
/// use campusflow_domain::value_objects::Version;
///
/// let v1 = Version::initial();
/// let v2 = v1.next();
/// assert_eq!(v2.as_u32(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u32);

impl Version {
    /// 初期バージョン（1）を返す
    pub fn initial() -> Self {
        Self(1)
    }

    /// 永続化済みの値からバージョンを復元する
    ///
    /// # エラー
    ///
    /// バージョンは 1 以上。0 は `DomainError::Validation` になる。
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::Validation(vec![
                "version: バージョン番号は 1 以上である必要があります".to_string(),
            ]));
        }
        Ok(Self(value))
    }

    /// 1 つ進めたバージョンを返す
    ///
    /// # パニック
    ///
    /// u32 の上限に達した場合はパニックする。遷移回数が 40 億を超える
    /// ことは想定しない。
    pub fn next(self) -> Self {
        Self(self.0.checked_add(1).expect("バージョン番号が u32 の上限に達しました"))
    }

    /// 内部の u32 値を取得する
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

// =========================================================================
// TargetKind（検証対象エンティティ種別）
// =========================================================================

/// 検証・エラーメッセージの対象となるエンティティ種別
///
/// 削除フラグ検証や NotFound エラーのメッセージに、どのエンティティに
/// ついての失敗かを埋め込むために使用する。
///
/// # 使用例
///
/// ```rust
/// use campusflow_domain::value_objects::TargetKind;
///
/// assert_eq!(TargetKind::Board.label(), "掲示板");
/// let kind_str: &str = TargetKind::Board.into();
/// assert_eq!(kind_str, "board");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TargetKind {
    /// ユーザー
    User,
    /// サークル
    Circle,
    /// サークルメンバー
    CircleMember,
    /// 掲示板
    Board,
    /// 投稿
    Post,
    /// コメント
    Comment,
    /// ロッカー
    Locker,
}

impl TargetKind {
    /// エラーメッセージ用の表示ラベルを返す
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "ユーザー",
            Self::Circle => "サークル",
            Self::CircleMember => "サークルメンバー",
            Self::Board => "掲示板",
            Self::Post => "投稿",
            Self::Comment => "コメント",
            Self::Locker => "ロッカー",
        }
    }
}

// =========================================================================
// テスト
// =========================================================================
