//! 掲示板ユースケース
//!
//! 掲示板の一覧取得・作成・更新・論理削除・復元を提供する。
//! 削除・復元の認可は掲示板の所属によって分岐する:
//!
//! - 全学告知カテゴリ: 管理者のみ（サークル所有より優先されるポリシー例外）
//! - サークル所有: サークルが生きていること + リーダー本人または管理者
//! - 全学掲示板: 学生会長または管理者

use std::{collections::BTreeSet, sync::Arc};

use campusflow_domain::{
    board::{Board, BoardId, NewBoard},
    circle::{CircleId, CircleMemberStatus},
    clock::Clock,
    role::Role,
    rule::{Rule, RuleSet},
    user::{User, UserId},
    value_objects::TargetKind,
};
use campusflow_infra::repository::{
    BoardRepository,
    CircleMemberRepository,
    CircleRepository,
    UserRepository,
};
use campusflow_shared::{event_log::event, log_business_event};
use itertools::Itertools as _;
use maplit::btreeset;

use crate::{
    error::ServiceError,
    usecase::helpers::{FindResultExt as _, circle_leadership_rules},
};

/// 掲示板作成の入力
pub struct CreateBoardInput {
    pub name:         String,
    pub description:  String,
    pub create_roles: BTreeSet<Role>,
    pub category:     String,
    pub circle_id:    Option<CircleId>,
}

/// 掲示板更新の入力
pub struct UpdateBoardInput {
    pub board_id:     BoardId,
    pub name:         String,
    pub description:  String,
    pub create_roles: BTreeSet<Role>,
    pub category:     String,
}

/// 掲示板ユースケース
pub struct BoardUseCaseImpl {
    user_repo:   Arc<dyn UserRepository>,
    circle_repo: Arc<dyn CircleRepository>,
    member_repo: Arc<dyn CircleMemberRepository>,
    board_repo:  Arc<dyn BoardRepository>,
    clock:       Arc<dyn Clock>,
}

impl BoardUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        circle_repo: Arc<dyn CircleRepository>,
        member_repo: Arc<dyn CircleMemberRepository>,
        board_repo: Arc<dyn BoardRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            circle_repo,
            member_repo,
            board_repo,
            clock,
        }
    }

    /// 操作者が閲覧できる掲示板一覧を取得する
    ///
    /// 全学掲示板と、操作者が `Member` 状態で所属するサークルの掲示板を
    /// created_at ASC でマージして返す。削除済み掲示板は含まない。
    pub async fn find_boards(&self, actor_id: &UserId) -> Result<Vec<Board>, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;

        RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .validate()?;

        let circle_ids: Vec<CircleId> = self
            .member_repo
            .find_by_user(actor.id())
            .await?
            .into_iter()
            .filter(|m| m.status() == CircleMemberStatus::Member)
            .map(|m| m.circle_id().clone())
            .collect();

        let global = self.board_repo.find_global_active().await?;
        let circle_boards = self.board_repo.find_active_by_circles(&circle_ids).await?;

        // 両方とも created_at ASC 済みなので順序を保ったままマージする
        let boards = global
            .into_iter()
            .merge_by(circle_boards, |a, b| a.created_at() <= b.created_at())
            .collect();
        Ok(boards)
    }

    /// 掲示板を作成する
    ///
    /// ## 処理フロー
    ///
    /// 1. 操作者を取得（不在は NotFound）
    /// 2. アカウント状態 + 所属先に応じた認可ルールを組み立てる
    /// 3. エンティティを生成し、構造的制約を同じバケットで検証する
    /// 4. 全ルール合格後に保存してビジネスイベントを記録する
    pub async fn create_board(
        &self,
        input: CreateBoardInput,
        actor_id: &UserId,
    ) -> Result<Board, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;

        let mut bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()));

        bucket = match &input.circle_id {
            Some(circle_id) => {
                let circle = self
                    .circle_repo
                    .find_by_id(circle_id)
                    .await
                    .or_not_found(TargetKind::Circle, circle_id)?;
                circle_leadership_rules(bucket, &actor, &circle)?
            }
            None => bucket.add(Rule::actor_role(
                actor.roles(),
                btreeset! { Role::President },
            )),
        };

        let board = Board::new(NewBoard {
            id:           BoardId::new(),
            name:         input.name,
            description:  input.description,
            create_roles: input.create_roles,
            category:     input.category,
            circle_id:    input.circle_id,
            now:          self.clock.now(),
        });

        bucket
            .add(Rule::constraint(TargetKind::Board, board.validate()))
            .validate()?;

        let saved = self.board_repo.save(&board).await?;

        log_business_event!(
            event.category = event::category::BOARD,
            event.action = event::action::BOARD_CREATED,
            event.entity_type = event::entity_type::BOARD,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "掲示板作成"
        );

        Ok(saved)
    }

    /// 掲示板を更新する
    ///
    /// 削除と同じ認可パスを通り、更新後の内容で構造的制約を再検証する。
    pub async fn update_board(
        &self,
        input: UpdateBoardInput,
        actor_id: &UserId,
    ) -> Result<Board, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let board = self.fetch_board(&input.board_id).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(
                TargetKind::Board,
                board.is_deleted(),
            ));
        let bucket = self.board_admin_rules(bucket, &actor, &board).await?;

        let updated = board.updated(
            input.name,
            input.description,
            input.create_roles,
            input.category,
            self.clock.now(),
        );

        bucket
            .add(Rule::constraint(TargetKind::Board, updated.validate()))
            .validate()?;

        let saved = self.board_repo.save(&updated).await?;

        log_business_event!(
            event.category = event::category::BOARD,
            event.action = event::action::BOARD_UPDATED,
            event.entity_type = event::entity_type::BOARD,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "掲示板更新"
        );

        Ok(saved)
    }

    /// 掲示板を論理削除する
    pub async fn delete_board(
        &self,
        board_id: &BoardId,
        actor_id: &UserId,
    ) -> Result<Board, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let board = self.fetch_board(board_id).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(
                TargetKind::Board,
                board.is_deleted(),
            ));
        self.board_admin_rules(bucket, &actor, &board)
            .await?
            .validate()?;

        let deleted = board.deleted(self.clock.now());
        let saved = self.board_repo.save(&deleted).await?;

        log_business_event!(
            event.category = event::category::BOARD,
            event.action = event::action::BOARD_DELETED,
            event.entity_type = event::entity_type::BOARD,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "掲示板削除"
        );

        Ok(saved)
    }

    /// 論理削除された掲示板を復元する
    ///
    /// 前提条件が `TargetDeleted` に置き換わる以外は削除の鏡像。
    /// 所属サークルが削除済みの場合、ロール検査より先に
    /// サークルを指す `CannotPerform` で打ち切られる。
    pub async fn restore_board(
        &self,
        board_id: &BoardId,
        actor_id: &UserId,
    ) -> Result<Board, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let board = self.fetch_board(board_id).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_deleted(TargetKind::Board, board.is_deleted()));
        self.board_admin_rules(bucket, &actor, &board)
            .await?
            .validate()?;

        let restored = board.restored(self.clock.now());
        let saved = self.board_repo.save(&restored).await?;

        log_business_event!(
            event.category = event::category::BOARD,
            event.action = event::action::BOARD_RESTORED,
            event.entity_type = event::entity_type::BOARD,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "掲示板復元"
        );

        Ok(saved)
    }

    /// 掲示板の管理操作（作成・更新・削除・復元）の認可ルールを組み立てる
    ///
    /// 全学告知カテゴリは所属に関係なく管理者のみ。サークル所有は
    /// リーダー本人または管理者。それ以外の全学掲示板は学生会長または管理者。
    async fn board_admin_rules(
        &self,
        bucket: RuleSet,
        actor: &User,
        board: &Board,
    ) -> Result<RuleSet, ServiceError> {
        if board.is_app_notice() {
            return Ok(bucket.add(Rule::actor_role(actor.roles(), BTreeSet::new())));
        }

        match board.circle_id() {
            Some(circle_id) => {
                let circle = self
                    .circle_repo
                    .find_by_id(circle_id)
                    .await
                    .or_not_found(TargetKind::Circle, circle_id)?;
                circle_leadership_rules(bucket, actor, &circle)
            }
            None => Ok(bucket.add(Rule::actor_role(
                actor.roles(),
                btreeset! { Role::President },
            ))),
        }
    }

    async fn fetch_actor(&self, actor_id: &UserId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(actor_id)
            .await
            .or_not_found(TargetKind::User, actor_id)
    }

    async fn fetch_board(&self, board_id: &BoardId) -> Result<Board, ServiceError> {
        self.board_repo
            .find_by_id(board_id)
            .await
            .or_not_found(TargetKind::Board, board_id)
    }
}
