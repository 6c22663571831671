//! # サークル
//!
//! サークル（学内団体）エンティティとメンバーシップを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 要件 |
//! |---|------------|------|
//! | [`Circle`] | サークル | リーダーとメンバー名簿を持つ下位組織。掲示板・投稿のスコープになる |
//! | [`CircleMember`] | サークルメンバー | (ユーザー, サークル) ごとに高々 1 件のメンバーシップレコード |
//! | [`CircleMemberStatus`] | メンバーシップ状態 | 承認待ち・メンバー・拒否・脱退・除名 |
//!
//! ## 設計方針
//!
//! - **論理削除**: サークルは `is_deleted` フラグで無効化され、復元可能
//! - **投稿権限は MEMBER のみ**: サークルスコープの操作は `Member` 状態だけが
//!   許可される。判定はルールエンジン側で行い、エンティティは事実のみを持つ

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, user::UserId};

define_uuid_id! {
    /// サークル ID
    pub struct CircleId;
}

define_uuid_id! {
    /// サークルメンバー ID
    pub struct CircleMemberId;
}

/// サークル名の最大文字数
const CIRCLE_NAME_MAX_LENGTH: usize = 30;

/// サークル説明の最大文字数
const CIRCLE_DESCRIPTION_MAX_LENGTH: usize = 255;

/// メンバーシップ状態
///
/// あるユーザーのあるサークルにおける立場を表現する。
/// サークルスコープの投稿・コメント権限を持つのは `Member` のみ。
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
pub enum CircleMemberStatus {
    /// 加入承認待ち
    Await,
    /// メンバー（サークルスコープの操作が可能）
    Member,
    /// 加入申請が拒否された
    Reject,
    /// 自発的に脱退した
    Leave,
    /// 除名された（再加入不可）
    Drop,
}

impl std::str::FromStr for CircleMemberStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "await" => Ok(Self::Await),
            "member" => Ok(Self::Member),
            "reject" => Ok(Self::Reject),
            "leave" => Ok(Self::Leave),
            "drop" => Ok(Self::Drop),
            _ => Err(DomainError::Validation(vec![format!(
                "status: 不正なメンバーシップ状態: {}",
                s
            )])),
        }
    }
}

/// サークルエンティティ
///
/// # 不変条件
///
/// - 削除済み（`is_deleted == true`）のサークルに属する掲示板・投稿への
///   変更はルールエンジンで拒否される（読み取りは可能）
/// - リーダーは不在でありうる（引き継ぎ中など）。リーダー限定の操作は
///   その場合 NotAllowed になる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circle {
    id:          CircleId,
    name:        String,
    description: String,
    leader_id:   Option<UserId>,
    is_deleted:  bool,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

/// サークルの DB 復元パラメータ
pub struct CircleRecord {
    pub id:          CircleId,
    pub name:        String,
    pub description: String,
    pub leader_id:   Option<UserId>,
    pub is_deleted:  bool,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

impl Circle {
    /// 新しいサークルを作成する
    pub fn new(
        id: CircleId,
        name: String,
        description: String,
        leader_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            leader_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: CircleRecord) -> Self {
        Self {
            id:          record.id,
            name:        record.name,
            description: record.description,
            leader_id:   record.leader_id,
            is_deleted:  record.is_deleted,
            created_at:  record.created_at,
            updated_at:  record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &CircleId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn leader_id(&self) -> Option<&UserId> {
        self.leader_id.as_ref()
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 構造的制約を検証し、違反をすべて返す
    ///
    /// 順序評価されるルールとは異なり、違反フィールドを一括で収集する。
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push("name: サークル名は必須です".to_string());
        }
        if self.name.chars().count() > CIRCLE_NAME_MAX_LENGTH {
            violations.push(format!(
                "name: サークル名は{}文字以内である必要があります",
                CIRCLE_NAME_MAX_LENGTH
            ));
        }
        if self.description.chars().count() > CIRCLE_DESCRIPTION_MAX_LENGTH {
            violations.push(format!(
                "description: 説明は{}文字以内である必要があります",
                CIRCLE_DESCRIPTION_MAX_LENGTH
            ));
        }

        violations
    }

    /// 論理削除した新しいインスタンスを返す
    pub fn deleted(self, now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: true,
            updated_at: now,
            ..self
        }
    }

    /// 論理削除を取り消した新しいインスタンスを返す
    pub fn restored(self, now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: false,
            updated_at: now,
            ..self
        }
    }
}

/// サークルメンバーシップ（User と Circle の関連）
///
/// # 不変条件
///
/// - (ユーザー, サークル) の組につき高々 1 件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircleMember {
    id:         CircleMemberId,
    user_id:    UserId,
    circle_id:  CircleId,
    status:     CircleMemberStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CircleMember {
    /// 新しい加入申請を作成する
    ///
    /// # 不変条件
    ///
    /// - 作成時の状態は `Await`（リーダーの承認で `Member` になる）
    pub fn new(id: CircleMemberId, user_id: UserId, circle_id: CircleId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            circle_id,
            status: CircleMemberStatus::Await,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(
        id: CircleMemberId,
        user_id: UserId,
        circle_id: CircleId,
        status: CircleMemberStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            circle_id,
            status,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &CircleMemberId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn circle_id(&self) -> &CircleId {
        &self.circle_id
    }

    pub fn status(&self) -> CircleMemberStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// メンバーシップ状態を変更した新しいインスタンスを返す
    ///
    /// 遷移の可否は呼び出し側のルールセットで検証済みであること。
    pub fn with_status(self, status: CircleMemberStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now,
            ..self
        }
    }
}
