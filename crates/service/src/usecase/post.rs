//! 投稿ユースケース
//!
//! 投稿の作成・論理削除・復元を提供する。サークル所有の掲示板への
//! 操作はメンバーシップゲート（`Member` 状態の要求）を通る。
//! ゲートをオーバーライドできるのはグローバルな管理者ロールだけで、
//! 掲示板の投稿ロールを満たすことはゲートの代わりにならない。

use std::sync::Arc;

use campusflow_domain::{
    board::{Board, BoardId},
    clock::Clock,
    post::{NewPost, Post, PostId},
    role::Role,
    rule::{Rule, RuleSet},
    user::{User, UserId},
    value_objects::TargetKind,
};
use campusflow_infra::repository::{
    BoardRepository,
    CircleMemberRepository,
    CircleRepository,
    PostRepository,
    UserRepository,
};
use campusflow_shared::{event_log::event, log_business_event};
use maplit::btreeset;

use crate::{
    error::ServiceError,
    usecase::helpers::{FindResultExt as _, circle_membership_gate},
};

/// 投稿作成の入力
pub struct CreatePostInput {
    pub board_id: BoardId,
    pub title:    String,
    pub content:  String,
}

/// 投稿ユースケース
pub struct PostUseCaseImpl {
    user_repo:   Arc<dyn UserRepository>,
    circle_repo: Arc<dyn CircleRepository>,
    board_repo:  Arc<dyn BoardRepository>,
    member_repo: Arc<dyn CircleMemberRepository>,
    post_repo:   Arc<dyn PostRepository>,
    clock:       Arc<dyn Clock>,
}

impl PostUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        circle_repo: Arc<dyn CircleRepository>,
        board_repo: Arc<dyn BoardRepository>,
        member_repo: Arc<dyn CircleMemberRepository>,
        post_repo: Arc<dyn PostRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            circle_repo,
            board_repo,
            member_repo,
            post_repo,
            clock,
        }
    }

    /// 投稿を作成する
    ///
    /// ## 処理フロー
    ///
    /// 1. 操作者と掲示板を取得（不在は NotFound）
    /// 2. アカウント状態 → 掲示板が生きていること → 投稿ロールの順で検査
    /// 3. サークル所有の掲示板なら所属サークルを取得し、サークルが
    ///    生きていること + メンバーシップゲートを積む
    /// 4. エンティティ生成後、構造的制約を同じバケットで検証して保存する
    pub async fn create_post(
        &self,
        input: CreatePostInput,
        actor_id: &UserId,
    ) -> Result<Post, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let board = self
            .board_repo
            .find_by_id(&input.board_id)
            .await
            .or_not_found(TargetKind::Board, &input.board_id)?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(
                TargetKind::Board,
                board.is_deleted(),
            ))
            .add(Rule::actor_role(
                actor.roles(),
                board.create_roles().clone(),
            ));
        let bucket = self.apply_circle_gate(bucket, &actor, &board).await?;

        let post = Post::new(NewPost {
            id:        PostId::new(),
            title:     input.title,
            content:   input.content,
            writer_id: actor.id().clone(),
            board_id:  input.board_id,
            now:       self.clock.now(),
        });

        bucket
            .add(Rule::constraint(TargetKind::Post, post.validate()))
            .validate()?;

        let saved = self.post_repo.save(&post).await?;

        log_business_event!(
            event.category = event::category::POST,
            event.action = event::action::POST_CREATED,
            event.entity_type = event::entity_type::POST,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "投稿作成"
        );

        Ok(saved)
    }

    /// 投稿を論理削除する
    ///
    /// 投稿者本人、オーバーライドロール（サークル掲示板はリーダーと会長、
    /// 全学掲示板は会長）、管理者のいずれかに限定される。
    pub async fn delete_post(
        &self,
        post_id: &PostId,
        actor_id: &UserId,
    ) -> Result<Post, ServiceError> {
        let (actor, post, board) = self.fetch_post_context(post_id, actor_id).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(TargetKind::Post, post.is_deleted()))
            .add(Rule::target_not_deleted(
                TargetKind::Board,
                board.is_deleted(),
            ))
            .add(Rule::contents_admin(
                actor.roles(),
                actor.id(),
                post.writer_id(),
                Self::override_roles(&board),
            ));
        self.apply_circle_gate(bucket, &actor, &board)
            .await?
            .validate()?;

        let deleted = post.deleted(self.clock.now());
        let saved = self.post_repo.save(&deleted).await?;

        log_business_event!(
            event.category = event::category::POST,
            event.action = event::action::POST_DELETED,
            event.entity_type = event::entity_type::POST,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "投稿削除"
        );

        Ok(saved)
    }

    /// 論理削除された投稿を復元する
    pub async fn restore_post(
        &self,
        post_id: &PostId,
        actor_id: &UserId,
    ) -> Result<Post, ServiceError> {
        let (actor, post, board) = self.fetch_post_context(post_id, actor_id).await?;

        let bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_deleted(TargetKind::Post, post.is_deleted()))
            .add(Rule::target_not_deleted(
                TargetKind::Board,
                board.is_deleted(),
            ))
            .add(Rule::contents_admin(
                actor.roles(),
                actor.id(),
                post.writer_id(),
                Self::override_roles(&board),
            ));
        self.apply_circle_gate(bucket, &actor, &board)
            .await?
            .validate()?;

        let restored = post.restored(self.clock.now());
        let saved = self.post_repo.save(&restored).await?;

        log_business_event!(
            event.category = event::category::POST,
            event.action = event::action::POST_RESTORED,
            event.entity_type = event::entity_type::POST,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "投稿復元"
        );

        Ok(saved)
    }

    /// コンテンツ管理権限のオーバーライドロール集合を返す
    fn override_roles(board: &Board) -> std::collections::BTreeSet<Role> {
        if board.circle_id().is_some() {
            btreeset! { Role::LeaderCircle, Role::President }
        } else {
            btreeset! { Role::President }
        }
    }

    /// サークル所有の掲示板なら所属サークルを取得してメンバーシップゲートを積む
    ///
    /// サークルが生きていることの検査を含む。全学掲示板はそのまま返す。
    async fn apply_circle_gate(
        &self,
        bucket: RuleSet,
        actor: &User,
        board: &Board,
    ) -> Result<RuleSet, ServiceError> {
        match board.circle_id() {
            Some(circle_id) => {
                let circle = self
                    .circle_repo
                    .find_by_id(circle_id)
                    .await
                    .or_not_found(TargetKind::Circle, circle_id)?;
                circle_membership_gate(self.member_repo.as_ref(), bucket, actor, &circle).await
            }
            None => Ok(bucket),
        }
    }

    async fn fetch_actor(&self, actor_id: &UserId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(actor_id)
            .await
            .or_not_found(TargetKind::User, actor_id)
    }

    async fn fetch_post_context(
        &self,
        post_id: &PostId,
        actor_id: &UserId,
    ) -> Result<(User, Post, Board), ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await
            .or_not_found(TargetKind::Post, post_id)?;
        let board = self
            .board_repo
            .find_by_id(post.board_id())
            .await
            .or_not_found(TargetKind::Board, post.board_id())?;
        Ok((actor, post, board))
    }
}
