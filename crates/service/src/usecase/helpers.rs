//! ユースケース層の共通ヘルパー
//!
//! リポジトリ呼び出し結果の変換や、サークルスコープの認可合成など、
//! 複数のユースケースで繰り返されるパターンを共通化する。

use campusflow_domain::{
    DomainError,
    circle::{Circle, CircleMemberStatus},
    role::{self, Role},
    rule::{Rule, RuleSet},
    user::User,
    value_objects::TargetKind,
};
use campusflow_infra::{InfraError, repository::CircleMemberRepository};
use maplit::btreeset;

use crate::error::ServiceError;

/// リポジトリの `Result<Option<T>, InfraError>` を `Result<T, ServiceError>` に変換する
///
/// `find_by_id` 等の `Option` を返すリポジトリメソッドの結果を、
/// `NotFound` または `Internal` に変換する。
///
/// ```ignore
/// // Before
/// let board = self.board_repo.find_by_id(&board_id).await
///     .map_err(|e| ServiceError::Internal(format!("掲示板の取得に失敗: {}", e)))?
///     .ok_or_else(|| DomainError::NotFound { .. })?;
///
/// // After
/// let board = self.board_repo.find_by_id(&board_id).await
///     .or_not_found(TargetKind::Board, &board_id)?;
/// ```
pub(crate) trait FindResultExt<T> {
    /// `None` の場合は `NotFound`、`InfraError` の場合は `Internal` を返す
    fn or_not_found(self, kind: TargetKind, id: &dyn std::fmt::Display)
    -> Result<T, ServiceError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, InfraError> {
    fn or_not_found(
        self,
        kind: TargetKind,
        id: &dyn std::fmt::Display,
    ) -> Result<T, ServiceError> {
        self.map_err(|e| ServiceError::Internal(format!("{}の取得に失敗: {}", kind.label(), e)))?
            .ok_or_else(|| {
                ServiceError::Domain(DomainError::NotFound {
                    entity_type: kind.label(),
                    id:          id.to_string(),
                })
            })
    }
}

/// リーダー本人（または管理者）であることを要求するルールを合成する
///
/// 操作者がサークルリーダーロールを持つこと（管理者はオーバーライド）、
/// さらにリーダーロールの場合は**このサークルの**リーダー本人である
/// ことを順に要求する。サークルの削除フラグは検査しない（復元操作の
/// 呼び出し側が前提条件を自分で積む）。
///
/// # エラー
///
/// 操作者がリーダーロールを持つのにサークルにリーダーが設定されて
/// いない場合は、その場で `NotAllowed` を返す。
pub(crate) fn circle_leader_rules(
    bucket: RuleSet,
    actor: &User,
    circle: &Circle,
) -> Result<RuleSet, ServiceError> {
    let mut bucket = bucket.add(Rule::actor_role(
        actor.roles(),
        btreeset! { Role::LeaderCircle },
    ));

    if actor.has_role(Role::LeaderCircle) {
        let leader_id = circle.leader_id().ok_or_else(|| {
            ServiceError::Domain(DomainError::NotAllowed(
                "サークルのリーダーではありません".to_string(),
            ))
        })?;
        bucket = bucket.add(Rule::actor_equals(leader_id, actor.id()));
    }

    Ok(bucket)
}

/// サークルスコープの認可ルールを合成する
///
/// 対象サークルが生きていることに加え、[`circle_leader_rules`] の
/// リーダー本人（または管理者）検査を要求する。
pub(crate) fn circle_leadership_rules(
    bucket: RuleSet,
    actor: &User,
    circle: &Circle,
) -> Result<RuleSet, ServiceError> {
    circle_leader_rules(
        bucket.add(Rule::target_not_deleted(
            TargetKind::Circle,
            circle.is_deleted(),
        )),
        actor,
        circle,
    )
}

/// サークルメンバーシップゲートのルールを合成する
///
/// サークルに属する掲示板・投稿・コメントへの操作で、対象サークルが
/// 生きていることを前提条件に積んだうえで、操作者のメンバーシップを
/// 解決し `Member` 状態を要求する。グローバルな管理者ロールが
/// オーバーライドするのはメンバーシップの要求だけで、サークルの
/// 削除状態の検査は管理者も受ける。
///
/// # エラー
///
/// メンバーシップレコード自体が存在しない場合は、ルールが要求する
/// 「解決済みの事実」を用意できないため、ルールセット構築前に
/// `NotMember` を返す（NotFound の fetch-first 方針と同じ扱い）。
pub(crate) async fn circle_membership_gate(
    member_repo: &dyn CircleMemberRepository,
    bucket: RuleSet,
    actor: &User,
    circle: &Circle,
) -> Result<RuleSet, ServiceError> {
    let bucket = bucket.add(Rule::target_not_deleted(
        TargetKind::Circle,
        circle.is_deleted(),
    ));

    if role::has_admin_override(actor.roles()) {
        return Ok(bucket);
    }

    let membership = member_repo
        .find_by_user_and_circle(actor.id(), circle.id())
        .await
        .map_err(|e| {
            ServiceError::Internal(format!("サークルメンバーシップの取得に失敗: {}", e))
        })?
        .ok_or_else(|| {
            ServiceError::Domain(DomainError::NotMember(
                "サークルのメンバーではありません".to_string(),
            ))
        })?;

    Ok(bucket.add(Rule::circle_member_status(
        membership.status(),
        btreeset! { CircleMemberStatus::Member },
    )))
}
