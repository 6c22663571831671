//! # ユーザー
//!
//! 操作者（認証済みユーザー）エンティティと関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 要件 |
//! |---|------------|------|
//! | [`User`] | ユーザー | 操作を開始する主体。ロール集合とアカウント状態を持つ |
//! | [`UserState`] | アカウント状態 | 承認待ち・有効・追放などのライフサイクル状態 |
//!
//! ## 設計方針
//!
//! - **ロールは集合**: 順序なし・階層なしのタグ集合として保持する。
//!   認可判定は集合の交差・所属のみで行う
//! - **新規アカウント**: 作成直後は `None` ロール + `Await` 状態で、
//!   承認されるまで一切の操作がルールで拒否される

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use maplit::btreeset;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, role::Role};

define_uuid_id! {
    /// ユーザー ID
    ///
    /// UUID v7 を使用し、生成順にソート可能。
    pub struct UserId;
}

/// メールアドレス（値オブジェクト）
///
/// 生成時に検証するため、存在する値は常に正しい形式を持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを検証して作成する
    ///
    /// 空でないこと、`local@domain` の形式であること、255 文字以内で
    /// あることを要求する。違反時は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation(vec![
                "email: メールアドレスは必須です".to_string(),
            ]));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(vec![
                "email: メールアドレスの形式が不正です".to_string(),
            ]));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(vec![
                "email: メールアドレスの形式が不正です".to_string(),
            ]));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(vec![
                "email: メールアドレスは255文字以内である必要があります".to_string(),
            ]));
        }

        Ok(Self(value))
    }

    /// 文字列としての参照を返す
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 内部の文字列を取り出す
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// アカウント状態
///
/// ユーザーのライフサイクル状態を表現する列挙型。
/// `Active` 以外の状態では、あらゆる操作が認可ルールで拒否される。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserState {
    /// 加入承認待ち
    Await,
    /// 有効（操作可能）
    Active,
    /// 退会済み
    Inactive,
    /// 加入申請が拒否された
    Reject,
    /// 追放された
    Drop,
}

impl std::str::FromStr for UserState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "await" => Ok(Self::Await),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "reject" => Ok(Self::Reject),
            "drop" => Ok(Self::Drop),
            _ => Err(DomainError::Validation(vec![format!(
                "state: 不正なアカウント状態: {}",
                s
            )])),
        }
    }
}

/// ユーザーエンティティ
///
/// 操作を開始する主体。認可ルールの入力となるロール集合と
/// アカウント状態を保持する。
///
/// # 不変条件
///
/// - `roles` は空にならない（承認前は `None` タグが入る）
/// - `state` が `Active` 以外の場合、状態検証ルールが操作を拒否する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:         UserId,
    email:      Email,
    name:       String,
    roles:      BTreeSet<Role>,
    state:      UserState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// 新しいユーザーを作成する
    ///
    /// # 不変条件
    ///
    /// - 作成時のロールは `None` のみ
    /// - 作成時の状態は `Await`（管理者の承認で `Active` になる）
    pub fn new(id: UserId, email: Email, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name,
            roles: btreeset! { Role::None },
            state: UserState::Await,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータからユーザーを復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: UserId,
        email: Email,
        name: String,
        roles: BTreeSet<Role>,
        state: UserState,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            roles,
            state,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn state(&self) -> UserState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// アカウントが有効か判定する
    pub fn is_active(&self) -> bool {
        self.state == UserState::Active
    }

    /// 指定ロールを保持しているか判定する
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// アカウントを承認した新しいインスタンスを返す
    ///
    /// 状態を `Active` にし、`None` プレースホルダを実ロールで置き換える。
    pub fn activated(self, roles: BTreeSet<Role>, now: DateTime<Utc>) -> Self {
        Self {
            roles,
            state: UserState::Active,
            updated_at: now,
            ..self
        }
    }

    /// アカウント状態を変更した新しいインスタンスを返す
    pub fn with_state(self, state: UserState, now: DateTime<Utc>) -> Self {
        Self {
            state,
            updated_at: now,
            ..self
        }
    }

    /// ロール集合を変更した新しいインスタンスを返す
    pub fn with_roles(self, roles: BTreeSet<Role>, now: DateTime<Utc>) -> Self {
        Self {
            roles,
            updated_at: now,
            ..self
        }
    }
}
