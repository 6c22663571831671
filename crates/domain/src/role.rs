//! # ロール（権限管理）
//!
//! 操作者に付与されるロールタグとその判定を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 要件 |
//! |---|------------|------|
//! | [`Role`] | ロール（役割） | 操作者ごとの**フラットなタグの集合**。階層・継承は持たない |
//! | [`has_admin_override`] | 管理者オーバーライド | 所有権・ロール検査を無条件に通過する暗黙の管理ロール判定 |
//!
//! ## 設計方針
//!
//! - **集合として判定**: 認可は常に集合の交差・所属で判定し、継承は使わない
//! - **オーバーライドの一元化**: 管理者判定を [`has_admin_override`] に集約し、
//!   ルールごとの判定のずれを防ぐ
//! - **`None` タグ**: 承認前アカウントのプレースホルダ。実権限を持たない

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// ロールタグ
///
/// 操作者に付与される役割。1 人の操作者が複数のロールを持ちうる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// システム管理者（すべての検査をオーバーライドする）
    Admin,
    /// 学生会長
    President,
    /// 副会長
    VicePresident,
    /// 学生会役員
    Council,
    /// サークルリーダー
    LeaderCircle,
    /// 教授
    Professor,
    /// 一般ユーザー
    Common,
    /// 未承認アカウントのプレースホルダ（実権限なし）
    None,
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "president" => Ok(Self::President),
            "vice_president" => Ok(Self::VicePresident),
            "council" => Ok(Self::Council),
            "leader_circle" => Ok(Self::LeaderCircle),
            "professor" => Ok(Self::Professor),
            "common" => Ok(Self::Common),
            "none" => Ok(Self::None),
            _ => Err(DomainError::Validation(vec![format!(
                "role: 不正なロール: {}",
                s
            )])),
        }
    }
}

/// 管理者オーバーライドの判定
///
/// ロール集合が暗黙の管理ロール（[`Role::Admin`]）を含むか判定する。
/// 所有権・ロール検査を行うすべてのルールはこの述語を共有し、
/// 呼び出し箇所ごとの判定のずれを防ぐ。
pub fn has_admin_override(roles: &BTreeSet<Role>) -> bool {
    roles.contains(&Role::Admin)
}

#[cfg(test)]
mod tests {
    use maplit::btreeset;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("president", Role::President)]
    #[case("leader_circle", Role::LeaderCircle)]
    #[case("common", Role::Common)]
    #[case("none", Role::None)]
    fn test_ロールは文字列からパースできる(#[case] input: &str, #[case] expected: Role) {
        assert_eq!(input.parse::<Role>().unwrap(), expected);
    }

    #[test]
    fn test_不正なロール文字列はエラー() {
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_ロールの表示形式はスネークケース() {
        assert_eq!(Role::LeaderCircle.to_string(), "leader_circle");
    }

    #[test]
    fn test_adminを含む集合はオーバーライドを持つ() {
        let roles = btreeset! { Role::Admin, Role::Common };
        assert!(has_admin_override(&roles));
    }

    #[test]
    fn test_adminを含まない集合はオーバーライドを持たない() {
        let roles = btreeset! { Role::President, Role::LeaderCircle };
        assert!(!has_admin_override(&roles));
    }

    #[test]
    fn test_空の集合はオーバーライドを持たない() {
        assert!(!has_admin_override(&BTreeSet::new()));
    }
}
