//! サークルユースケース
//!
//! サークルの論理削除・復元と、メンバーシップの状態遷移
//! （加入申請・脱退・承認・拒否・除名）を提供する。
//!
//! ## メンバーシップ遷移
//!
//! ```text
//! (なし) --join--> Await --accept--> Member --leave--> Leave --join--> Await
//!                    |                  |
//!                  reject             drop
//!                    |                  |
//!                  Reject --join-->   Drop（再申請不可）
//! ```

use std::sync::Arc;

use campusflow_domain::{
    DomainError,
    circle::{Circle, CircleId, CircleMember, CircleMemberId, CircleMemberStatus},
    clock::Clock,
    rule::{Rule, RuleSet},
    user::{User, UserId},
    value_objects::TargetKind,
};
use campusflow_infra::repository::{CircleMemberRepository, CircleRepository, UserRepository};
use campusflow_shared::{event_log::event, log_business_event};
use maplit::btreeset;

use crate::{
    error::ServiceError,
    usecase::helpers::{FindResultExt as _, circle_leader_rules, circle_leadership_rules},
};

/// サークルユースケース
pub struct CircleUseCaseImpl {
    user_repo:   Arc<dyn UserRepository>,
    circle_repo: Arc<dyn CircleRepository>,
    member_repo: Arc<dyn CircleMemberRepository>,
    clock:       Arc<dyn Clock>,
}

impl CircleUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        circle_repo: Arc<dyn CircleRepository>,
        member_repo: Arc<dyn CircleMemberRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            circle_repo,
            member_repo,
            clock,
        }
    }

    /// サークルを論理削除する
    ///
    /// リーダー本人または管理者に限定される。
    pub async fn delete_circle(
        &self,
        circle_id: &CircleId,
        actor_id: &UserId,
    ) -> Result<Circle, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let circle = self.fetch_circle(circle_id).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()));
        circle_leadership_rules(bucket, &actor, &circle)?.validate()?;

        let deleted = circle.deleted(self.clock.now());
        let saved = self.circle_repo.save(&deleted).await?;

        log_business_event!(
            event.category = event::category::CIRCLE,
            event.action = event::action::CIRCLE_DELETED,
            event.entity_type = event::entity_type::CIRCLE,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "サークル削除"
        );

        Ok(saved)
    }

    /// 論理削除されたサークルを復元する
    ///
    /// 削除の鏡像で、前提条件だけが `TargetDeleted` に置き換わる。
    pub async fn restore_circle(
        &self,
        circle_id: &CircleId,
        actor_id: &UserId,
    ) -> Result<Circle, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let circle = self.fetch_circle(circle_id).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_deleted(
                TargetKind::Circle,
                circle.is_deleted(),
            ));
        circle_leader_rules(bucket, &actor, &circle)?.validate()?;

        let restored = circle.restored(self.clock.now());
        let saved = self.circle_repo.save(&restored).await?;

        log_business_event!(
            event.category = event::category::CIRCLE,
            event.action = event::action::CIRCLE_RESTORED,
            event.entity_type = event::entity_type::CIRCLE,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "サークル復元"
        );

        Ok(saved)
    }

    /// サークルに加入を申請する
    ///
    /// 初回申請のほか、脱退済み・拒否済みからの再申請を受け付けて
    /// `Await` に戻す。除名（`Drop`）は再申請できない。
    pub async fn join_circle(
        &self,
        circle_id: &CircleId,
        actor_id: &UserId,
    ) -> Result<CircleMember, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let circle = self.fetch_circle(circle_id).await?;

        RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(
                TargetKind::Circle,
                circle.is_deleted(),
            ))
            .validate()?;

        let now = self.clock.now();
        let existing = self
            .member_repo
            .find_by_user_and_circle(actor.id(), circle.id())
            .await?;

        let member = match existing {
            None => CircleMember::new(
                CircleMemberId::new(),
                actor.id().clone(),
                circle.id().clone(),
                now,
            ),
            Some(member) => match member.status() {
                CircleMemberStatus::Leave | CircleMemberStatus::Reject => {
                    member.with_status(CircleMemberStatus::Await, now)
                }
                CircleMemberStatus::Drop => {
                    return Err(ServiceError::Domain(DomainError::NotAllowed(
                        "除名されたサークルには再申請できません".to_string(),
                    )));
                }
                CircleMemberStatus::Await => {
                    return Err(ServiceError::Domain(DomainError::CannotPerform(
                        "既に加入申請中です".to_string(),
                    )));
                }
                CircleMemberStatus::Member => {
                    return Err(ServiceError::Domain(DomainError::CannotPerform(
                        "既にサークルのメンバーです".to_string(),
                    )));
                }
            },
        };

        let saved = self.member_repo.save(&member).await?;

        log_business_event!(
            event.category = event::category::CIRCLE,
            event.action = event::action::MEMBER_APPLIED,
            event.entity_type = event::entity_type::CIRCLE_MEMBER,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "サークル加入申請"
        );

        Ok(saved)
    }

    /// サークルから脱退する
    pub async fn leave_circle(
        &self,
        circle_id: &CircleId,
        actor_id: &UserId,
    ) -> Result<CircleMember, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let circle = self.fetch_circle(circle_id).await?;
        let member = self.fetch_membership(actor.id(), circle.id()).await?;

        RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(
                TargetKind::Circle,
                circle.is_deleted(),
            ))
            .add(Rule::circle_member_status(
                member.status(),
                btreeset! { CircleMemberStatus::Member },
            ))
            .validate()?;

        let left = member.with_status(CircleMemberStatus::Leave, self.clock.now());
        let saved = self.member_repo.save(&left).await?;

        log_business_event!(
            event.category = event::category::CIRCLE,
            event.action = event::action::MEMBER_LEFT,
            event.entity_type = event::entity_type::CIRCLE_MEMBER,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "サークル脱退"
        );

        Ok(saved)
    }

    /// 加入申請を承認する（リーダー本人または管理者）
    pub async fn accept_member(
        &self,
        circle_id: &CircleId,
        target_user_id: &UserId,
        actor_id: &UserId,
    ) -> Result<CircleMember, ServiceError> {
        let member = self
            .transition_member(
                circle_id,
                target_user_id,
                actor_id,
                CircleMemberStatus::Await,
                CircleMemberStatus::Member,
            )
            .await?;

        log_business_event!(
            event.category = event::category::CIRCLE,
            event.action = event::action::MEMBER_ACCEPTED,
            event.entity_type = event::entity_type::CIRCLE_MEMBER,
            event.entity_id = %member.id(),
            event.actor_id = %actor_id,
            event.result = event::result::SUCCESS,
            "サークル加入承認"
        );

        Ok(member)
    }

    /// 加入申請を拒否する（リーダー本人または管理者）
    pub async fn reject_member(
        &self,
        circle_id: &CircleId,
        target_user_id: &UserId,
        actor_id: &UserId,
    ) -> Result<CircleMember, ServiceError> {
        let member = self
            .transition_member(
                circle_id,
                target_user_id,
                actor_id,
                CircleMemberStatus::Await,
                CircleMemberStatus::Reject,
            )
            .await?;

        log_business_event!(
            event.category = event::category::CIRCLE,
            event.action = event::action::MEMBER_REJECTED,
            event.entity_type = event::entity_type::CIRCLE_MEMBER,
            event.entity_id = %member.id(),
            event.actor_id = %actor_id,
            event.result = event::result::SUCCESS,
            "サークル加入拒否"
        );

        Ok(member)
    }

    /// メンバーを除名する（リーダー本人または管理者）
    pub async fn drop_member(
        &self,
        circle_id: &CircleId,
        target_user_id: &UserId,
        actor_id: &UserId,
    ) -> Result<CircleMember, ServiceError> {
        let member = self
            .transition_member(
                circle_id,
                target_user_id,
                actor_id,
                CircleMemberStatus::Member,
                CircleMemberStatus::Drop,
            )
            .await?;

        log_business_event!(
            event.category = event::category::CIRCLE,
            event.action = event::action::MEMBER_DROPPED,
            event.entity_type = event::entity_type::CIRCLE_MEMBER,
            event.entity_id = %member.id(),
            event.actor_id = %actor_id,
            event.result = event::result::SUCCESS,
            "サークル除名"
        );

        Ok(member)
    }

    /// リーダー操作によるメンバーシップ遷移の共通フロー
    ///
    /// 対象メンバーシップが `required` 状態であることを要求し、
    /// リーダー本人または管理者の検査に合格した場合のみ `next` に遷移させる。
    async fn transition_member(
        &self,
        circle_id: &CircleId,
        target_user_id: &UserId,
        actor_id: &UserId,
        required: CircleMemberStatus,
        next: CircleMemberStatus,
    ) -> Result<CircleMember, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let circle = self.fetch_circle(circle_id).await?;
        let member = self.fetch_membership(target_user_id, circle.id()).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()));
        circle_leadership_rules(bucket, &actor, &circle)?
            .add(Rule::circle_member_status(
                member.status(),
                btreeset! { required },
            ))
            .validate()?;

        let transitioned = member.with_status(next, self.clock.now());
        let saved = self.member_repo.save(&transitioned).await?;
        Ok(saved)
    }

    async fn fetch_actor(&self, actor_id: &UserId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(actor_id)
            .await
            .or_not_found(TargetKind::User, actor_id)
    }

    async fn fetch_circle(&self, circle_id: &CircleId) -> Result<Circle, ServiceError> {
        self.circle_repo
            .find_by_id(circle_id)
            .await
            .or_not_found(TargetKind::Circle, circle_id)
    }

    async fn fetch_membership(
        &self,
        user_id: &UserId,
        circle_id: &CircleId,
    ) -> Result<CircleMember, ServiceError> {
        self.member_repo
            .find_by_user_and_circle(user_id, circle_id)
            .await
            .or_not_found(TargetKind::CircleMember, user_id)
    }
}
