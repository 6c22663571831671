//! ロッカーユースケース
//!
//! ロッカーの新設（管理者のみ）と、アクション（登録・返却・利用再開・
//! 利用停止）の実行を提供する。アクションのルール評価と状態遷移は
//! ドメイン層の [`LockerAction::apply`] が行い、このユースケースは
//! fetch と楽観的ロック付きの永続化を受け持つ。
//!
//! ## 競合ウィンドウ
//!
//! 登録と返却は「2 人が同じ空きロッカーをフェッチしてから書き込む」
//! 競合を持つ。フェッチ時点のバージョンを期待値として更新するため、
//! 2 人目の書き込みは認可エラーと区別された `Conflict` で失敗し、
//! 呼び出し側が再取得のうえ再試行できる。
//!
//! ## no-op の契約
//!
//! 更新対象の行が存在しない場合（並行削除など）、エラーではなく
//! `Ok(None)` を返す。呼び出し側は「操作は効果を持たなかった」として
//! 扱い、認可エラーとは区別する。

use std::sync::Arc;

use campusflow_domain::{
    clock::Clock,
    locker::{Locker, LockerAction, LockerId},
    rule::{Rule, RuleSet},
    user::{User, UserId},
    value_objects::TargetKind,
};
use campusflow_infra::repository::{LockerRepository, UserRepository};
use campusflow_shared::{event_log::event, log_business_event};

use crate::{error::ServiceError, usecase::helpers::FindResultExt as _};

/// ロッカーユースケース
pub struct LockerUseCaseImpl {
    user_repo:   Arc<dyn UserRepository>,
    locker_repo: Arc<dyn LockerRepository>,
    clock:       Arc<dyn Clock>,
}

impl LockerUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        locker_repo: Arc<dyn LockerRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            locker_repo,
            clock,
        }
    }

    /// ロッカーを新設する（管理者のみ）
    pub async fn create_locker(
        &self,
        number: u32,
        actor_id: &UserId,
    ) -> Result<Locker, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;

        RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::actor_role(actor.roles(), Default::default()))
            .validate()?;

        let locker = Locker::new(LockerId::new(), number, self.clock.now());
        self.locker_repo.insert(&locker).await?;

        log_business_event!(
            event.category = event::category::LOCKER,
            event.action = event::action::LOCKER_CREATED,
            event.entity_type = event::entity_type::LOCKER,
            event.entity_id = %locker.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "ロッカー新設"
        );

        Ok(locker)
    }

    /// ロッカーにアクションを適用する
    ///
    /// ## 処理フロー
    ///
    /// 1. 要求者・ロッカー・（使用中なら）所有者を取得する
    /// 2. [`LockerAction::apply`] がアクション固有のルールセットを評価し、
    ///    合格した場合のみ遷移後のロッカーを返す
    /// 3. フェッチ時点のバージョンを期待値として永続化する。行が存在
    ///    しなければ `Ok(None)`、バージョン不一致は `Conflict`
    pub async fn execute(
        &self,
        locker_id: &LockerId,
        action: LockerAction,
        actor_id: &UserId,
    ) -> Result<Option<Locker>, ServiceError> {
        let requester = self.fetch_actor(actor_id).await?;
        let locker = self
            .locker_repo
            .find_by_id(locker_id)
            .await
            .or_not_found(TargetKind::Locker, locker_id)?;

        let owner = match locker.owner_id() {
            Some(owner_id) => Some(
                self.user_repo
                    .find_by_id(owner_id)
                    .await
                    .or_not_found(TargetKind::User, owner_id)?,
            ),
            None => None,
        };

        let expected_version = locker.version();
        let updated = action.apply(locker, owner.as_ref(), &requester, self.clock.now())?;

        let persisted = self
            .locker_repo
            .update_with_version_check(&updated, expected_version)
            .await?;

        match &persisted {
            Some(locker) => {
                log_business_event!(
                    event.category = event::category::LOCKER,
                    event.action = Self::event_action(action),
                    event.entity_type = event::entity_type::LOCKER,
                    event.entity_id = %locker.id(),
                    event.actor_id = %requester.id(),
                    event.result = event::result::SUCCESS,
                    "ロッカー操作"
                );
            }
            None => {
                tracing::warn!(
                    locker_id = %locker_id,
                    action = %action,
                    "対象行が存在しないためロッカー操作は効果を持たなかった"
                );
            }
        }

        Ok(persisted)
    }

    fn event_action(action: LockerAction) -> &'static str {
        match action {
            LockerAction::Register => event::action::LOCKER_REGISTERED,
            LockerAction::Return => event::action::LOCKER_RETURNED,
            LockerAction::Enable => event::action::LOCKER_ENABLED,
            LockerAction::Disable => event::action::LOCKER_DISABLED,
        }
    }

    async fn fetch_actor(&self, actor_id: &UserId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(actor_id)
            .await
            .or_not_found(TargetKind::User, actor_id)
    }
}
