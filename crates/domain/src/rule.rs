//! # ルールエンジン（認可・状態検証）
//!
//! すべての変更系操作を単一の合否判定でゲートする検証機構。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 要件 |
//! |---|------------|------|
//! | [`Rule`] | ルール | 解決済みの事実に対する単一責務の述語。合格するか、特定のエラー種別で失敗する |
//! | [`RuleSet`] | ルールセット | 呼び出し箇所が組み立てる順序付きのルール列。最初の失敗で打ち切る |
//!
//! ## 設計方針
//!
//! - **閉じたバリアント集合**: ルールの種類は列挙型で固定し、タグで
//!   ディスパッチする。開放的な動的拡張は行わない
//! - **事実は解決済み**: ルールは構築時に必要な事実（状態、ロール集合、
//!   削除フラグ、ID）を受け取る。評価中の遅延読み込みや I/O はない
//! - **短絡評価**: 呼び出し箇所は安価で構造的な検査（アカウント状態）を
//!   先に、所有権・メンバーシップなど具体的な検査を後に並べる。失敗は
//!   常に 1 件だけ報告される
//! - **構造的制約のみ集約**: [`Rule::Constraint`] だけは原子的な一括検証
//!   として全違反を保持する
//!
//! ## 使用例
//!
//! ```rust
//! use campusflow_domain::{
//!     role::Role,
//!     rule::{Rule, RuleSet},
//!     user::UserState,
//!     value_objects::TargetKind,
//! };
//! use maplit::btreeset;
//!
//! let roles = btreeset! { Role::Common };
//! let result = RuleSet::new()
//!     .add(Rule::actor_state(UserState::Active))
//!     .add(Rule::actor_role_is_none(&roles))
//!     .add(Rule::target_not_deleted(TargetKind::Board, false))
//!     .validate();
//! assert!(result.is_ok());
//! ```

use std::collections::BTreeSet;

use crate::{
    DomainError,
    circle::CircleMemberStatus,
    role::{self, Role},
    user::{UserId, UserState},
    value_objects::TargetKind,
};

/// 認可・状態検証ルール
///
/// 構築時に受け取った事実だけを入力とする純粋な述語。
/// [`check`](Rule::check) は合格時に何も返さず、失敗時に対応する
/// [`DomainError`] 種別を返す。
#[derive(Debug, Clone)]
pub enum Rule {
    /// 操作者のアカウント状態が `Active` であること
    ///
    /// 失敗: [`DomainError::Forbidden`]
    ActorState { state: UserState },

    /// 操作者が実ロールを持つこと（未承認アカウントの拒否）
    ///
    /// 空集合、または `None` プレースホルダのみの集合を拒否する。
    /// 読み取り系操作の入口にも使用される。
    ///
    /// 失敗: [`DomainError::Forbidden`]
    ActorRoleIsNone { roles: BTreeSet<Role> },

    /// 操作者のロール集合が許可集合と交差すること
    ///
    /// 管理者オーバーライドは常に通過する。許可集合が空の場合は
    /// 「管理者のみ」を意味する。
    ///
    /// 失敗: [`DomainError::NotAllowed`]
    ActorRole {
        roles:   BTreeSet<Role>,
        allowed: BTreeSet<Role>,
    },

    /// 2 つのユーザー ID が一致すること
    ///
    /// ロール検査でリーダーに絞り込んだ後、「このサークルのリーダー
    /// 本人か」を確認する用途で使用する。
    ///
    /// 失敗: [`DomainError::NotAllowed`]
    ActorEquals { expected: UserId, actual: UserId },

    /// 対象エンティティが削除されていないこと
    ///
    /// 失敗: [`DomainError::CannotPerform`]（エンティティ種別付き）
    TargetNotDeleted { kind: TargetKind, is_deleted: bool },

    /// 対象エンティティが削除済みであること（復元の前提条件）
    ///
    /// 失敗: [`DomainError::CannotPerform`]（エンティティ種別付き）
    TargetDeleted { kind: TargetKind, is_deleted: bool },

    /// メンバーシップ状態が許可された状態のいずれかであること
    ///
    /// 失敗: [`DomainError::NotMember`]
    CircleMemberStatus {
        status:  CircleMemberStatus,
        allowed: BTreeSet<CircleMemberStatus>,
    },

    /// コンテンツ管理権限（所有者本人またはオーバーライドロール）
    ///
    /// 操作者が所有者本人、管理者、またはオーバーライドロールの
    /// いずれかを満たすこと。
    ///
    /// 失敗: [`DomainError::NotAllowed`]
    ContentsAdmin {
        roles:          BTreeSet<Role>,
        actor_id:       UserId,
        owner_id:       UserId,
        override_roles: BTreeSet<Role>,
    },

    /// 構造的制約検証の結果
    ///
    /// エンティティの `validate()` が収集した違反を保持する。
    /// 他のルールと異なり、違反を**すべて**報告する。
    ///
    /// 失敗: [`DomainError::Validation`]
    Constraint {
        kind:       TargetKind,
        violations: Vec<String>,
    },
}

impl Rule {
    /// アカウント状態ルールを作成する
    pub fn actor_state(state: UserState) -> Self {
        Self::ActorState { state }
    }

    /// 未承認アカウント拒否ルールを作成する
    pub fn actor_role_is_none(roles: &BTreeSet<Role>) -> Self {
        Self::ActorRoleIsNone {
            roles: roles.clone(),
        }
    }

    /// ロール交差ルールを作成する（空の `allowed` は管理者のみ）
    pub fn actor_role(roles: &BTreeSet<Role>, allowed: BTreeSet<Role>) -> Self {
        Self::ActorRole {
            roles: roles.clone(),
            allowed,
        }
    }

    /// ユーザー一致ルールを作成する
    pub fn actor_equals(expected: &UserId, actual: &UserId) -> Self {
        Self::ActorEquals {
            expected: expected.clone(),
            actual:   actual.clone(),
        }
    }

    /// 未削除前提ルールを作成する
    pub fn target_not_deleted(kind: TargetKind, is_deleted: bool) -> Self {
        Self::TargetNotDeleted { kind, is_deleted }
    }

    /// 削除済み前提ルールを作成する（復元用）
    pub fn target_deleted(kind: TargetKind, is_deleted: bool) -> Self {
        Self::TargetDeleted { kind, is_deleted }
    }

    /// メンバーシップ状態ルールを作成する
    pub fn circle_member_status(
        status: CircleMemberStatus,
        allowed: BTreeSet<CircleMemberStatus>,
    ) -> Self {
        Self::CircleMemberStatus { status, allowed }
    }

    /// コンテンツ管理権限ルールを作成する
    pub fn contents_admin(
        roles: &BTreeSet<Role>,
        actor_id: &UserId,
        owner_id: &UserId,
        override_roles: BTreeSet<Role>,
    ) -> Self {
        Self::ContentsAdmin {
            roles: roles.clone(),
            actor_id: actor_id.clone(),
            owner_id: owner_id.clone(),
            override_roles,
        }
    }

    /// 構造的制約ルールを作成する
    ///
    /// `violations` にはエンティティの `validate()` の結果をそのまま渡す。
    pub fn constraint(kind: TargetKind, violations: Vec<String>) -> Self {
        Self::Constraint { kind, violations }
    }

    /// ルールを評価する
    ///
    /// 合格時は `Ok(())`、失敗時はバリアントに対応するエラー種別を返す。
    pub fn check(&self) -> Result<(), DomainError> {
        match self {
            Self::ActorState { state } => check_actor_state(*state),
            Self::ActorRoleIsNone { roles } => check_actor_role_is_none(roles),
            Self::ActorRole { roles, allowed } => check_actor_role(roles, allowed),
            Self::ActorEquals { expected, actual } => check_actor_equals(expected, actual),
            Self::TargetNotDeleted { kind, is_deleted } => {
                if *is_deleted {
                    return Err(DomainError::CannotPerform(format!(
                        "削除された{}です",
                        kind.label()
                    )));
                }
                Ok(())
            }
            Self::TargetDeleted { kind, is_deleted } => {
                if !is_deleted {
                    return Err(DomainError::CannotPerform(format!(
                        "{}は削除されていません",
                        kind.label()
                    )));
                }
                Ok(())
            }
            Self::CircleMemberStatus { status, allowed } => {
                check_circle_member_status(*status, allowed)
            }
            Self::ContentsAdmin {
                roles,
                actor_id,
                owner_id,
                override_roles,
            } => check_contents_admin(roles, actor_id, owner_id, override_roles),
            Self::Constraint { kind: _, violations } => {
                if violations.is_empty() {
                    return Ok(());
                }
                Err(DomainError::Validation(violations.clone()))
            }
        }
    }
}

fn check_actor_state(state: UserState) -> Result<(), DomainError> {
    let message = match state {
        UserState::Active => return Ok(()),
        UserState::Await => "承認待ちのアカウントです",
        UserState::Inactive => "退会済みのアカウントです",
        UserState::Reject => "加入申請が拒否されたアカウントです",
        UserState::Drop => "追放されたアカウントです",
    };
    Err(DomainError::Forbidden(message.to_string()))
}

fn check_actor_role_is_none(roles: &BTreeSet<Role>) -> Result<(), DomainError> {
    if roles.is_empty() || roles.iter().all(|role| *role == Role::None) {
        return Err(DomainError::Forbidden(
            "権限が付与されていないアカウントです".to_string(),
        ));
    }
    Ok(())
}

fn check_actor_role(roles: &BTreeSet<Role>, allowed: &BTreeSet<Role>) -> Result<(), DomainError> {
    if role::has_admin_override(roles) {
        return Ok(());
    }
    if roles.intersection(allowed).next().is_some() {
        return Ok(());
    }
    Err(DomainError::NotAllowed(
        "この操作を行う権限がありません".to_string(),
    ))
}

fn check_actor_equals(expected: &UserId, actual: &UserId) -> Result<(), DomainError> {
    if expected != actual {
        return Err(DomainError::NotAllowed(
            "ユーザーが一致しません".to_string(),
        ));
    }
    Ok(())
}

fn check_circle_member_status(
    status: CircleMemberStatus,
    allowed: &BTreeSet<CircleMemberStatus>,
) -> Result<(), DomainError> {
    if allowed.contains(&status) {
        return Ok(());
    }
    let message = match status {
        CircleMemberStatus::Await => "サークル加入の承認待ちです",
        CircleMemberStatus::Member => "既にサークルのメンバーです",
        CircleMemberStatus::Reject => "サークル加入申請が拒否されています",
        CircleMemberStatus::Leave => "脱退済みのサークルです",
        CircleMemberStatus::Drop => "サークルから除名されています",
    };
    Err(DomainError::NotMember(message.to_string()))
}

fn check_contents_admin(
    roles: &BTreeSet<Role>,
    actor_id: &UserId,
    owner_id: &UserId,
    override_roles: &BTreeSet<Role>,
) -> Result<(), DomainError> {
    if actor_id == owner_id {
        return Ok(());
    }
    if role::has_admin_override(roles) {
        return Ok(());
    }
    if roles.intersection(override_roles).next().is_some() {
        return Ok(());
    }
    Err(DomainError::NotAllowed(
        "コンテンツの管理権限がありません".to_string(),
    ))
}

/// ルールセット（検証バケット）
///
/// 呼び出し箇所が操作ごとに組み立てる順序付きのルール列。
/// 1 回の評価で使い捨てる値オブジェクトであり、永続的な識別子を持たない。
///
/// # 評価規則
///
/// - 追加順に評価し、最初の失敗で打ち切ってそのエラーを報告する
/// - ルールが 1 つもない場合は成功する（意図的な no-op デフォルト）
/// - 評価は冪等で、メモ化は行わない
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// 空のルールセットを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// ルールを末尾に追加する（流暢な合成）
    #[must_use]
    pub fn add(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// 追加済みルール数を返す
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// ルールが 1 つもないか判定する
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 追加順にルールを評価する
    ///
    /// 最初に失敗したルールのエラーを返し、以降のルールは評価しない。
    pub fn validate(&self) -> Result<(), DomainError> {
        for rule in &self.rules {
            rule.check()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use maplit::btreeset;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // RuleSet のテスト

    #[test]
    fn test_空のルールセットは成功する() {
        assert!(RuleSet::new().validate().is_ok());
        assert!(RuleSet::new().is_empty());
    }

    #[test]
    fn test_全ルール合格で成功する() {
        let roles = btreeset! { Role::Common };
        let result = RuleSet::new()
            .add(Rule::actor_state(UserState::Active))
            .add(Rule::actor_role_is_none(&roles))
            .add(Rule::target_not_deleted(TargetKind::Board, false))
            .validate();

        assert!(result.is_ok());
    }

    #[test]
    fn test_最初に失敗したルールのエラーが報告される() {
        let roles = btreeset! { Role::Common };
        // 削除済み検査（CannotPerform）がロール検査（NotAllowed）より先
        let result = RuleSet::new()
            .add(Rule::target_not_deleted(TargetKind::Board, true))
            .add(Rule::actor_role(&roles, btreeset! { Role::President }))
            .validate();

        assert!(matches!(result, Err(DomainError::CannotPerform(_))));
    }

    #[test]
    fn test_失敗ルールの並べ替えは報告されるエラーだけを変える() {
        let roles = btreeset! { Role::Common };
        // 同じ 2 ルールを逆順に並べると NotAllowed が先に報告される
        let result = RuleSet::new()
            .add(Rule::actor_role(&roles, btreeset! { Role::President }))
            .add(Rule::target_not_deleted(TargetKind::Board, true))
            .validate();

        assert!(matches!(result, Err(DomainError::NotAllowed(_))));
    }

    #[test]
    fn test_合格ルールの並べ替えは結果を変えない() {
        let roles = btreeset! { Role::President };
        let forward = RuleSet::new()
            .add(Rule::actor_state(UserState::Active))
            .add(Rule::actor_role(&roles, btreeset! { Role::President }))
            .validate();
        let reversed = RuleSet::new()
            .add(Rule::actor_role(&roles, btreeset! { Role::President }))
            .add(Rule::actor_state(UserState::Active))
            .validate();

        assert!(forward.is_ok());
        assert!(reversed.is_ok());
    }

    #[test]
    fn test_評価は冪等で再評価できる() {
        let bucket = RuleSet::new().add(Rule::actor_state(UserState::Drop));

        assert!(bucket.validate().is_err());
        assert!(bucket.validate().is_err());
    }

    // ActorState のテスト

    #[test]
    fn test_有効なアカウントは合格する() {
        assert!(Rule::actor_state(UserState::Active).check().is_ok());
    }

    #[rstest]
    #[case(UserState::Await)]
    #[case(UserState::Inactive)]
    #[case(UserState::Reject)]
    #[case(UserState::Drop)]
    fn test_有効でないアカウントはforbidden(#[case] state: UserState) {
        let result = Rule::actor_state(state).check();

        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    // ActorRoleIsNone のテスト

    #[test]
    fn test_空のロール集合はforbidden() {
        let roles = BTreeSet::new();
        let result = Rule::actor_role_is_none(&roles).check();

        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[test]
    fn test_noneのみのロール集合はforbidden() {
        let roles = btreeset! { Role::None };
        let result = Rule::actor_role_is_none(&roles).check();

        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[test]
    fn test_実ロールを持つ集合は合格する() {
        let roles = btreeset! { Role::Common };
        assert!(Rule::actor_role_is_none(&roles).check().is_ok());
    }

    // ActorRole のテスト

    #[test]
    fn test_許可ロールとの交差で合格する() {
        let roles = btreeset! { Role::Common, Role::LeaderCircle };
        let rule = Rule::actor_role(&roles, btreeset! { Role::LeaderCircle });

        assert!(rule.check().is_ok());
    }

    #[test]
    fn test_管理者は許可集合に関係なく合格する() {
        let roles = btreeset! { Role::Admin };
        let rule = Rule::actor_role(&roles, btreeset! { Role::LeaderCircle });

        assert!(rule.check().is_ok());
    }

    #[test]
    fn test_空の許可集合は管理者のみ合格する() {
        let admin = btreeset! { Role::Admin };
        let president = btreeset! { Role::President };

        assert!(Rule::actor_role(&admin, BTreeSet::new()).check().is_ok());
        assert!(matches!(
            Rule::actor_role(&president, BTreeSet::new()).check(),
            Err(DomainError::NotAllowed(_))
        ));
    }

    #[test]
    fn test_交差しないロール集合はnot_allowed() {
        let roles = btreeset! { Role::Common };
        let rule = Rule::actor_role(&roles, btreeset! { Role::LeaderCircle });

        assert!(matches!(rule.check(), Err(DomainError::NotAllowed(_))));
    }

    // ActorEquals のテスト

    #[test]
    fn test_同一ユーザーは合格する() {
        let id = UserId::new();
        assert!(Rule::actor_equals(&id, &id).check().is_ok());
    }

    #[test]
    fn test_異なるユーザーはnot_allowed() {
        let result = Rule::actor_equals(&UserId::new(), &UserId::new()).check();

        assert!(matches!(result, Err(DomainError::NotAllowed(_))));
    }

    // TargetNotDeleted / TargetDeleted のテスト

    #[test]
    fn test_未削除の対象は未削除前提に合格する() {
        assert!(
            Rule::target_not_deleted(TargetKind::Post, false)
                .check()
                .is_ok()
        );
    }

    #[test]
    fn test_削除済みの対象は未削除前提でcannot_perform() {
        let result = Rule::target_not_deleted(TargetKind::Post, true).check();

        match result {
            Err(DomainError::CannotPerform(msg)) => {
                assert_eq!(msg, "削除された投稿です");
            }
            other => panic!("CannotPerform を期待したが {:?} を受信", other),
        }
    }

    #[test]
    fn test_削除済みの対象は削除済み前提に合格する() {
        assert!(Rule::target_deleted(TargetKind::Board, true).check().is_ok());
    }

    #[test]
    fn test_未削除の対象は削除済み前提でcannot_perform() {
        let result = Rule::target_deleted(TargetKind::Board, false).check();

        match result {
            Err(DomainError::CannotPerform(msg)) => {
                assert_eq!(msg, "掲示板は削除されていません");
            }
            other => panic!("CannotPerform を期待したが {:?} を受信", other),
        }
    }

    // CircleMemberStatus のテスト

    #[test]
    fn test_許可された状態は合格する() {
        let rule = Rule::circle_member_status(
            CircleMemberStatus::Member,
            btreeset! { CircleMemberStatus::Member },
        );

        assert!(rule.check().is_ok());
    }

    #[rstest]
    #[case(CircleMemberStatus::Await)]
    #[case(CircleMemberStatus::Reject)]
    #[case(CircleMemberStatus::Leave)]
    #[case(CircleMemberStatus::Drop)]
    fn test_許可されない状態はnot_member(#[case] status: CircleMemberStatus) {
        let rule =
            Rule::circle_member_status(status, btreeset! { CircleMemberStatus::Member });

        assert!(matches!(rule.check(), Err(DomainError::NotMember(_))));
    }

    // ContentsAdmin のテスト

    #[test]
    fn test_所有者本人は合格する() {
        let owner = UserId::new();
        let roles = btreeset! { Role::Common };
        let rule = Rule::contents_admin(&roles, &owner, &owner, btreeset! { Role::President });

        assert!(rule.check().is_ok());
    }

    #[test]
    fn test_オーバーライドロールは合格する() {
        let roles = btreeset! { Role::President };
        let rule = Rule::contents_admin(
            &roles,
            &UserId::new(),
            &UserId::new(),
            btreeset! { Role::President },
        );

        assert!(rule.check().is_ok());
    }

    #[test]
    fn test_管理者はオーバーライド集合に関係なく合格する() {
        let roles = btreeset! { Role::Admin };
        let rule = Rule::contents_admin(
            &roles,
            &UserId::new(),
            &UserId::new(),
            btreeset! { Role::President },
        );

        assert!(rule.check().is_ok());
    }

    #[test]
    fn test_所有者でもオーバーライドでもない操作者はnot_allowed() {
        let roles = btreeset! { Role::Common };
        let rule = Rule::contents_admin(
            &roles,
            &UserId::new(),
            &UserId::new(),
            btreeset! { Role::President },
        );

        assert!(matches!(rule.check(), Err(DomainError::NotAllowed(_))));
    }

    // Constraint のテスト

    #[test]
    fn test_違反なしの制約は合格する() {
        let rule = Rule::constraint(TargetKind::Board, Vec::new());

        assert!(rule.check().is_ok());
    }

    #[test]
    fn test_制約違反はすべて報告される() {
        let rule = Rule::constraint(
            TargetKind::Board,
            vec![
                "name: 掲示板名は必須です".to_string(),
                "category: カテゴリは必須です".to_string(),
            ],
        );

        match rule.check() {
            Err(DomainError::Validation(violations)) => {
                assert_eq!(violations.len(), 2);
            }
            other => panic!("Validation を期待したが {:?} を受信", other),
        }
    }
}
