//! # ロッカー
//!
//! 物理ロッカーの占有状態マシンと、その操作アクションを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 要件 |
//! |---|------------|------|
//! | [`Locker`] | ロッカー | 占有状態・利用可否フラグ・バージョンを持つ物理資源 |
//! | [`LockerState`] | 占有状態 | `Available`（所有者なし）/ `Used`（所有者あり）の ADT |
//! | [`LockerAction`] | アクション | 登録・返却・利用再開・利用停止の閉じた集合 |
//!
//! ## 設計方針
//!
//! - **ADT ステートマシン**: 「使用中なのに所有者がいない」状態を
//!   型レベルで排除する。占有状態はアクションを通らずに遷移しない
//! - **アクションごとのルールセット**: 各アクションは遷移前に自身の
//!   ルールセットを評価する。評価・遷移は純粋で、永続化は呼び出し側の
//!   ポート経由で行う
//! - **楽観的ロック**: 登録と返却は同一ロッカーへの競合ウィンドウを持つ。
//!   遷移のたびにバージョンを進め、永続化層が期待バージョンと
//!   突き合わせることで、2 人目の書き込みを認可エラーとは別の
//!   競合として報告できるようにする

use chrono::{DateTime, Utc};
use maplit::btreeset;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{
    DomainError,
    role::Role,
    rule::{Rule, RuleSet},
    user::{User, UserId},
    value_objects::Version,
};

define_uuid_id! {
    /// ロッカー ID
    pub struct LockerId;
}

/// 使用中状態の詳細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedState {
    /// 所有者のユーザー ID
    pub owner_id:      UserId,
    /// 登録日時
    pub registered_at: DateTime<Utc>,
}

/// ロッカーの占有状態（ADT）
///
/// `Used` は所有者を必ず持ち、`Available` は所有者を持たない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockerState {
    /// 空き（所有者なし）
    Available,
    /// 使用中（所有者あり）
    Used(UsedState),
}

/// ロッカーエンティティ
///
/// # 不変条件
///
/// - 占有状態は [`LockerAction`] を通じてのみ遷移する
/// - `is_active == false`（利用停止中）のロッカーは登録できない。
///   利用可否は占有状態とは独立に管理者が切り替える
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locker {
    id:         LockerId,
    number:     u32,
    is_active:  bool,
    state:      LockerState,
    version:    Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// ロッカーの DB 復元パラメータ
pub struct LockerRecord {
    pub id:         LockerId,
    pub number:     u32,
    pub is_active:  bool,
    pub state:      LockerState,
    pub version:    Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Locker {
    /// 新しいロッカーを作成する
    ///
    /// # 不変条件
    ///
    /// - 作成時は空き・利用可能・バージョン 1
    pub fn new(id: LockerId, number: u32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            number,
            is_active: true,
            state: LockerState::Available,
            version: Version::initial(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: LockerRecord) -> Self {
        Self {
            id:         record.id,
            number:     record.number,
            is_active:  record.is_active,
            state:      record.state,
            version:    record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &LockerId {
        &self.id
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn state(&self) -> &LockerState {
        &self.state
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 所有者のユーザー ID を返す（空きの場合は None）
    pub fn owner_id(&self) -> Option<&UserId> {
        match &self.state {
            LockerState::Available => None,
            LockerState::Used(used) => Some(&used.owner_id),
        }
    }

    /// 使用中か判定する
    pub fn is_used(&self) -> bool {
        matches!(self.state, LockerState::Used(_))
    }

    // 状態遷移メソッド

    /// 登録した新しいインスタンスを返す（空き → 使用中）
    ///
    /// # エラー
    ///
    /// - 利用停止中の場合: `DomainError::CannotPerform`
    /// - 既に使用中の場合: `DomainError::CannotPerform`
    pub fn registered(self, owner_id: UserId, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if !self.is_active {
            return Err(DomainError::CannotPerform(
                "利用停止中のロッカーです".to_string(),
            ));
        }
        match self.state {
            LockerState::Available => Ok(Self {
                state: LockerState::Used(UsedState {
                    owner_id,
                    registered_at: now,
                }),
                version: self.version.next(),
                updated_at: now,
                ..self
            }),
            LockerState::Used(_) => Err(DomainError::CannotPerform(
                "既に使用中のロッカーです".to_string(),
            )),
        }
    }

    /// 返却した新しいインスタンスを返す（使用中 → 空き）
    ///
    /// # エラー
    ///
    /// - 空きの場合: `DomainError::CannotPerform`
    pub fn returned(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        match self.state {
            LockerState::Used(_) => Ok(Self {
                state: LockerState::Available,
                version: self.version.next(),
                updated_at: now,
                ..self
            }),
            LockerState::Available => Err(DomainError::CannotPerform(
                "使用中のロッカーではありません".to_string(),
            )),
        }
    }

    /// 利用可能にした新しいインスタンスを返す
    ///
    /// 占有状態には影響しない。
    ///
    /// # エラー
    ///
    /// - 既に利用可能な場合: `DomainError::CannotPerform`
    pub fn enabled(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.is_active {
            return Err(DomainError::CannotPerform(
                "既に利用可能なロッカーです".to_string(),
            ));
        }
        Ok(Self {
            is_active: true,
            version: self.version.next(),
            updated_at: now,
            ..self
        })
    }

    /// 利用停止にした新しいインスタンスを返す
    ///
    /// 占有状態には影響しない（使用中のまま停止できる）。
    ///
    /// # エラー
    ///
    /// - 既に利用停止中の場合: `DomainError::CannotPerform`
    pub fn disabled(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if !self.is_active {
            return Err(DomainError::CannotPerform(
                "既に利用停止中のロッカーです".to_string(),
            ));
        }
        Ok(Self {
            is_active: false,
            version: self.version.next(),
            updated_at: now,
            ..self
        })
    }
}

/// ロッカー操作アクション
///
/// 閉じたバリアント集合であり、共通の [`apply`](LockerAction::apply)
/// 契約で多相的に適用される。各アクションは遷移の前に自身の
/// ルールセットを評価する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LockerAction {
    /// 登録（空きロッカーを要求者が占有する）
    Register,
    /// 返却（所有者または管理権限者が空きに戻す）
    Return,
    /// 利用再開（管理者のみ）
    Enable,
    /// 利用停止（管理者のみ）
    Disable,
}

impl std::str::FromStr for LockerAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "register" => Ok(Self::Register),
            "return" => Ok(Self::Return),
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            _ => Err(DomainError::Validation(vec![format!(
                "action: '{}' は対応していない操作です",
                s
            )])),
        }
    }
}

impl LockerAction {
    /// アクションを適用し、遷移後のロッカーを返す
    ///
    /// ルールセットの評価と状態遷移のみを行う純粋な操作。
    /// 永続化（楽観的ロック付き更新）は呼び出し側の責務。
    ///
    /// # 引数
    ///
    /// - `locker`: 遷移対象のロッカー
    /// - `owner`: 現在の所有者（空きの場合は None）
    /// - `requester`: 操作を要求する操作者
    /// - `now`: 現在日時（呼び出し元から注入）
    pub fn apply(
        &self,
        locker: Locker,
        owner: Option<&User>,
        requester: &User,
        now: DateTime<Utc>,
    ) -> Result<Locker, DomainError> {
        match self {
            Self::Register => Self::apply_register(locker, requester, now),
            Self::Return => Self::apply_return(locker, owner, requester, now),
            Self::Enable => {
                Self::admin_rules(requester).validate()?;
                locker.enabled(now)
            }
            Self::Disable => {
                Self::admin_rules(requester).validate()?;
                locker.disabled(now)
            }
        }
    }

    fn apply_register(
        locker: Locker,
        requester: &User,
        now: DateTime<Utc>,
    ) -> Result<Locker, DomainError> {
        RuleSet::new()
            .add(Rule::actor_state(requester.state()))
            .add(Rule::actor_role_is_none(requester.roles()))
            .validate()?;

        locker.registered(requester.id().clone(), now)
    }

    fn apply_return(
        locker: Locker,
        owner: Option<&User>,
        requester: &User,
        now: DateTime<Utc>,
    ) -> Result<Locker, DomainError> {
        // 所有者不在はロール検査より前に状態エラーとして打ち切る
        let Some(owner) = owner else {
            return Err(DomainError::CannotPerform(
                "使用中のロッカーではありません".to_string(),
            ));
        };

        RuleSet::new()
            .add(Rule::contents_admin(
                requester.roles(),
                requester.id(),
                owner.id(),
                btreeset! { Role::President },
            ))
            .validate()?;

        locker.returned(now)
    }

    fn admin_rules(requester: &User) -> RuleSet {
        RuleSet::new()
            .add(Rule::actor_state(requester.state()))
            .add(Rule::actor_role_is_none(requester.roles()))
            .add(Rule::actor_role(requester.roles(), Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::user::Email;

    /// テスト用の固定タイムスタンプ
    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[fixture]
    fn locker(now: DateTime<Utc>) -> Locker {
        Locker::new(LockerId::new(), 101, now)
    }

    fn active_user(roles: std::collections::BTreeSet<Role>, now: DateTime<Utc>) -> User {
        User::new(
            UserId::new(),
            Email::new("student@example.ac.jp").unwrap(),
            "テストユーザー".to_string(),
            now,
        )
        .activated(roles, now)
    }

    // Locker 状態遷移のテスト

    #[rstest]
    fn test_新規ロッカーは空きで所有者なし(locker: Locker) {
        assert_eq!(locker.state(), &LockerState::Available);
        assert_eq!(locker.owner_id(), None);
        assert!(locker.is_active());
        assert!(!locker.is_used());
    }

    #[rstest]
    fn test_登録で使用中になり所有者が設定される(locker: Locker, now: DateTime<Utc>) {
        let owner_id = UserId::new();
        let registered = locker.registered(owner_id.clone(), now).unwrap();

        assert!(registered.is_used());
        assert_eq!(registered.owner_id(), Some(&owner_id));
    }

    #[rstest]
    fn test_使用中ロッカーの再登録はcannot_perform(locker: Locker, now: DateTime<Utc>) {
        let registered = locker.registered(UserId::new(), now).unwrap();
        let result = registered.registered(UserId::new(), now);

        assert!(matches!(result, Err(DomainError::CannotPerform(_))));
    }

    #[rstest]
    fn test_利用停止中ロッカーの登録はcannot_perform(locker: Locker, now: DateTime<Utc>) {
        let disabled = locker.disabled(now).unwrap();
        let result = disabled.registered(UserId::new(), now);

        assert!(matches!(result, Err(DomainError::CannotPerform(_))));
    }

    #[rstest]
    fn test_返却で空きに戻り所有者が消える(locker: Locker, now: DateTime<Utc>) {
        let returned = locker
            .registered(UserId::new(), now)
            .unwrap()
            .returned(now)
            .unwrap();

        assert_eq!(returned.state(), &LockerState::Available);
        assert_eq!(returned.owner_id(), None);
    }

    #[rstest]
    fn test_空きロッカーの返却はcannot_perform(locker: Locker, now: DateTime<Utc>) {
        let result = locker.returned(now);

        assert!(matches!(result, Err(DomainError::CannotPerform(_))));
    }

    #[rstest]
    fn test_利用停止は占有状態に影響しない(locker: Locker, now: DateTime<Utc>) {
        let owner_id = UserId::new();
        let disabled = locker
            .registered(owner_id.clone(), now)
            .unwrap()
            .disabled(now)
            .unwrap();

        assert!(!disabled.is_active());
        assert_eq!(disabled.owner_id(), Some(&owner_id));
    }

    #[rstest]
    fn test_利用可能なロッカーの再開はcannot_perform(locker: Locker, now: DateTime<Utc>) {
        assert!(matches!(
            locker.enabled(now),
            Err(DomainError::CannotPerform(_))
        ));
    }

    #[rstest]
    fn test_遷移のたびにバージョンが進む(locker: Locker, now: DateTime<Utc>) {
        assert_eq!(locker.version().as_u32(), 1);

        let registered = locker.registered(UserId::new(), now).unwrap();
        assert_eq!(registered.version().as_u32(), 2);

        let returned = registered.returned(now).unwrap();
        assert_eq!(returned.version().as_u32(), 3);
    }

    // LockerAction::from_str のテスト

    #[rstest]
    #[case("register", LockerAction::Register)]
    #[case("return", LockerAction::Return)]
    #[case("enable", LockerAction::Enable)]
    #[case("DISABLE", LockerAction::Disable)]
    fn test_アクションは文字列からパースできる(
        #[case] input: &str,
        #[case] expected: LockerAction,
    ) {
        assert_eq!(input.parse::<LockerAction>().unwrap(), expected);
    }

    #[test]
    fn test_不正なアクション文字列はvalidationエラー() {
        let result = "reserve".parse::<LockerAction>();

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    // LockerAction::apply のテスト

    #[rstest]
    fn test_有効なユーザーは登録できる(locker: Locker, now: DateTime<Utc>) {
        let requester = active_user(maplit::btreeset! { Role::Common }, now);

        let updated = LockerAction::Register
            .apply(locker, None, &requester, now)
            .unwrap();

        assert_eq!(updated.owner_id(), Some(requester.id()));
    }

    #[rstest]
    fn test_承認待ちユーザーの登録はforbidden(locker: Locker, now: DateTime<Utc>) {
        let requester = User::new(
            UserId::new(),
            Email::new("await@example.ac.jp").unwrap(),
            "承認待ち".to_string(),
            now,
        );

        let result = LockerAction::Register.apply(locker, None, &requester, now);

        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[rstest]
    fn test_空きロッカーの返却はロール検査より前にcannot_perform(
        locker: Locker,
        now: DateTime<Utc>,
    ) {
        // ロール検査なら NotAllowed になる要求者でも、状態エラーが先に報告される
        let requester = active_user(maplit::btreeset! { Role::Common }, now);
        let original = locker.clone();

        let result = LockerAction::Return.apply(locker, None, &requester, now);

        assert!(matches!(result, Err(DomainError::CannotPerform(_))));
        assert_eq!(original.state(), &LockerState::Available);
    }

    #[rstest]
    fn test_所有者は返却できる(locker: Locker, now: DateTime<Utc>) {
        let owner = active_user(maplit::btreeset! { Role::Common }, now);
        let used = locker.registered(owner.id().clone(), now).unwrap();

        let updated = LockerAction::Return
            .apply(used, Some(&owner), &owner, now)
            .unwrap();

        assert_eq!(updated.state(), &LockerState::Available);
    }

    #[rstest]
    fn test_所有者でも管理権限者でもない返却はnot_allowed(
        locker: Locker,
        now: DateTime<Utc>,
    ) {
        let owner = active_user(maplit::btreeset! { Role::Common }, now);
        let other = active_user(maplit::btreeset! { Role::Common }, now);
        let used = locker.registered(owner.id().clone(), now).unwrap();
        let before = used.clone();

        let result = LockerAction::Return.apply(used, Some(&owner), &other, now);

        assert!(matches!(result, Err(DomainError::NotAllowed(_))));
        // 失敗時は遷移前の状態のまま
        assert_eq!(before.owner_id(), Some(owner.id()));
    }

    #[rstest]
    #[case(maplit::btreeset! { Role::President })]
    #[case(maplit::btreeset! { Role::Admin })]
    fn test_管理権限者は他人のロッカーを返却できる(
        locker: Locker,
        now: DateTime<Utc>,
        #[case] roles: std::collections::BTreeSet<Role>,
    ) {
        let owner = active_user(maplit::btreeset! { Role::Common }, now);
        let administrator = active_user(roles, now);
        let used = locker.registered(owner.id().clone(), now).unwrap();

        let updated = LockerAction::Return
            .apply(used, Some(&owner), &administrator, now)
            .unwrap();

        assert_eq!(updated.owner_id(), None);
    }

    #[rstest]
    fn test_利用停止は管理者のみ実行できる(locker: Locker, now: DateTime<Utc>) {
        let admin = active_user(maplit::btreeset! { Role::Admin }, now);
        let common = active_user(maplit::btreeset! { Role::Common }, now);

        let result = LockerAction::Disable.apply(locker.clone(), None, &common, now);
        assert!(matches!(result, Err(DomainError::NotAllowed(_))));

        let updated = LockerAction::Disable.apply(locker, None, &admin, now).unwrap();
        assert!(!updated.is_active());
    }

    #[rstest]
    fn test_利用再開は管理者のみ実行できる(locker: Locker, now: DateTime<Utc>) {
        let admin = active_user(maplit::btreeset! { Role::Admin }, now);
        let disabled = locker.disabled(now).unwrap();

        let updated = LockerAction::Enable
            .apply(disabled, None, &admin, now)
            .unwrap();

        assert!(updated.is_active());
    }
}
