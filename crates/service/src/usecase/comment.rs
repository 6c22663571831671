//! コメントユースケース
//!
//! コメントの作成・論理削除を提供する。削除済みの**親コメント**への
//! 返信は明示的に許可される一方、削除済みの**投稿**へのコメント作成は
//! 拒否される。スレッドの続きは残せるが、閉じられた投稿は動かない。

use std::sync::Arc;

use campusflow_domain::{
    DomainError,
    board::Board,
    clock::Clock,
    comment::{Comment, CommentId, NewComment},
    post::PostId,
    role::Role,
    rule::{Rule, RuleSet},
    user::{User, UserId},
    value_objects::TargetKind,
};
use campusflow_infra::repository::{
    BoardRepository,
    CircleMemberRepository,
    CircleRepository,
    CommentRepository,
    PostRepository,
    UserRepository,
};
use campusflow_shared::{event_log::event, log_business_event};
use maplit::btreeset;

use crate::{
    error::ServiceError,
    usecase::helpers::{FindResultExt as _, circle_membership_gate},
};

/// コメント作成の入力
pub struct CreateCommentInput {
    pub post_id:           PostId,
    pub content:           String,
    pub parent_comment_id: Option<CommentId>,
}

/// コメントユースケース
pub struct CommentUseCaseImpl {
    user_repo:    Arc<dyn UserRepository>,
    circle_repo:  Arc<dyn CircleRepository>,
    board_repo:   Arc<dyn BoardRepository>,
    post_repo:    Arc<dyn PostRepository>,
    member_repo:  Arc<dyn CircleMemberRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    clock:        Arc<dyn Clock>,
}

impl CommentUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        circle_repo: Arc<dyn CircleRepository>,
        board_repo: Arc<dyn BoardRepository>,
        post_repo: Arc<dyn PostRepository>,
        member_repo: Arc<dyn CircleMemberRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            circle_repo,
            board_repo,
            post_repo,
            member_repo,
            comment_repo,
            clock,
        }
    }

    /// コメントを作成する
    ///
    /// ## 処理フロー
    ///
    /// 1. 操作者・投稿・掲示板を取得（不在は NotFound）
    /// 2. 親コメント指定時はそれを取得し、同じ投稿に属することを確認する。
    ///    親コメントの削除フラグは検査しない（削除済みへの返信は許可）
    /// 3. アカウント状態 → 投稿・掲示板が生きていること → （サークル
    ///    所有の掲示板なら）サークルが生きていること + メンバーシップ
    ///    ゲート → 構造的制約の順で検証して保存する
    pub async fn create_comment(
        &self,
        input: CreateCommentInput,
        actor_id: &UserId,
    ) -> Result<Comment, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let post = self
            .post_repo
            .find_by_id(&input.post_id)
            .await
            .or_not_found(TargetKind::Post, &input.post_id)?;
        let board = self
            .board_repo
            .find_by_id(post.board_id())
            .await
            .or_not_found(TargetKind::Board, post.board_id())?;

        if let Some(parent_id) = &input.parent_comment_id {
            let parent = self
                .comment_repo
                .find_by_id(parent_id)
                .await
                .or_not_found(TargetKind::Comment, parent_id)?;
            if parent.post_id() != post.id() {
                return Err(ServiceError::Domain(DomainError::CannotPerform(
                    "別の投稿のコメントには返信できません".to_string(),
                )));
            }
        }

        let mut bucket = RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(TargetKind::Post, post.is_deleted()))
            .add(Rule::target_not_deleted(
                TargetKind::Board,
                board.is_deleted(),
            ));

        if let Some(circle_id) = board.circle_id() {
            let circle = self
                .circle_repo
                .find_by_id(circle_id)
                .await
                .or_not_found(TargetKind::Circle, circle_id)?;
            bucket =
                circle_membership_gate(self.member_repo.as_ref(), bucket, &actor, &circle)
                    .await?;
        }

        let comment = Comment::new(NewComment {
            id:                CommentId::new(),
            content:           input.content,
            writer_id:         actor.id().clone(),
            post_id:           input.post_id,
            parent_comment_id: input.parent_comment_id,
            now:               self.clock.now(),
        });

        bucket
            .add(Rule::constraint(TargetKind::Comment, comment.validate()))
            .validate()?;

        let saved = self.comment_repo.save(&comment).await?;

        log_business_event!(
            event.category = event::category::COMMENT,
            event.action = event::action::COMMENT_CREATED,
            event.entity_type = event::entity_type::COMMENT,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "コメント作成"
        );

        Ok(saved)
    }

    /// コメントを論理削除する
    ///
    /// コメント投稿者本人、オーバーライドロール（サークル掲示板は
    /// リーダーと会長、全学掲示板は会長）、管理者のいずれかに限定される。
    pub async fn delete_comment(
        &self,
        comment_id: &CommentId,
        actor_id: &UserId,
    ) -> Result<Comment, ServiceError> {
        let actor = self.fetch_actor(actor_id).await?;
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await
            .or_not_found(TargetKind::Comment, comment_id)?;
        let post = self
            .post_repo
            .find_by_id(comment.post_id())
            .await
            .or_not_found(TargetKind::Post, comment.post_id())?;
        let board = self
            .board_repo
            .find_by_id(post.board_id())
            .await
            .or_not_found(TargetKind::Board, post.board_id())?;

        RuleSet::new()
            .add(Rule::actor_state(actor.state()))
            .add(Rule::actor_role_is_none(actor.roles()))
            .add(Rule::target_not_deleted(
                TargetKind::Comment,
                comment.is_deleted(),
            ))
            .add(Rule::contents_admin(
                actor.roles(),
                actor.id(),
                comment.writer_id(),
                Self::override_roles(&board),
            ))
            .validate()?;

        let deleted = comment.deleted(self.clock.now());
        let saved = self.comment_repo.save(&deleted).await?;

        log_business_event!(
            event.category = event::category::COMMENT,
            event.action = event::action::COMMENT_DELETED,
            event.entity_type = event::entity_type::COMMENT,
            event.entity_id = %saved.id(),
            event.actor_id = %actor.id(),
            event.result = event::result::SUCCESS,
            "コメント削除"
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

    async fn fetch_actor(&self, actor_id: &UserId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(actor_id)
            .await
            .or_not_found(TargetKind::User, actor_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use campusflow_domain::{
        board::{BoardId, NewBoard, category},
        circle::{Circle, CircleId, CircleMember, CircleMemberId, CircleMemberStatus},
        clock::FixedClock,
        post::{NewPost, Post},
        user::Email,
    };
    use campusflow_infra::mock::{
        MockBoardRepository,
        MockCircleMemberRepository,
        MockCircleRepository,
        MockCommentRepository,
        MockPostRepository,
        MockUserRepository,
    };
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn active_user(roles: BTreeSet<Role>) -> User {
        User::new(
            UserId::new(),
            Email::new("student@example.ac.jp").unwrap(),
            "テストユーザー".to_string(),
            now(),
        )
        .activated(roles, now())
    }

    struct Fixture {
        user_repo:    MockUserRepository,
        circle_repo:  MockCircleRepository,
        board_repo:   MockBoardRepository,
        post_repo:    MockPostRepository,
        member_repo:  MockCircleMemberRepository,
        comment_repo: MockCommentRepository,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                user_repo:    MockUserRepository::new(),
                circle_repo:  MockCircleRepository::new(),
                board_repo:   MockBoardRepository::new(),
                post_repo:    MockPostRepository::new(),
                member_repo:  MockCircleMemberRepository::new(),
                comment_repo: MockCommentRepository::new(),
            }
        }

        fn sut(&self) -> CommentUseCaseImpl {
            CommentUseCaseImpl::new(
                Arc::new(self.user_repo.clone()),
                Arc::new(self.circle_repo.clone()),
                Arc::new(self.board_repo.clone()),
                Arc::new(self.post_repo.clone()),
                Arc::new(self.member_repo.clone()),
                Arc::new(self.comment_repo.clone()),
                Arc::new(FixedClock::new(now())),
            )
        }

        /// サークルとそのサークル所有の掲示板・投稿を登録し、投稿を返す
        fn seed_circle_post(&self, circle: &Circle) -> Post {
            self.circle_repo.add_circle(circle.clone());

            let board = Board::new(NewBoard {
                id:           BoardId::new(),
                name:         "部内連絡".to_string(),
                description:  String::new(),
                create_roles: btreeset! { Role::Common },
                category:     category::NORMAL.to_string(),
                circle_id:    Some(circle.id().clone()),
                now:          now(),
            });
            self.board_repo.add_board(board.clone());

            let post = Post::new(NewPost {
                id:        PostId::new(),
                title:     "部内告知".to_string(),
                content:   "内容".to_string(),
                writer_id: UserId::new(),
                board_id:  board.id().clone(),
                now:       now(),
            });
            self.post_repo.add_post(post.clone());
            post
        }

        /// 全学掲示板と投稿を登録し、投稿を返す
        fn seed_global_post(&self, writer_id: &UserId) -> Post {
            let board = Board::new(NewBoard {
                id:           BoardId::new(),
                name:         "自由掲示板".to_string(),
                description:  String::new(),
                create_roles: btreeset! { Role::Common },
                category:     category::NORMAL.to_string(),
                circle_id:    None,
                now:          now(),
            });
            self.board_repo.add_board(board.clone());

            let post = Post::new(NewPost {
                id:        PostId::new(),
                title:     "告知".to_string(),
                content:   "内容".to_string(),
                writer_id: writer_id.clone(),
                board_id:  board.id().clone(),
                now:       now(),
            });
            self.post_repo.add_post(post.clone());
            post
        }
    }

    fn comment_input(post: &Post, parent: Option<&Comment>) -> CreateCommentInput {
        CreateCommentInput {
            post_id:           post.id().clone(),
            content:           "参加します！".to_string(),
            parent_comment_id: parent.map(|c| c.id().clone()),
        }
    }

    // === create_comment ===

    #[tokio::test]
    async fn test_create_comment_投稿にコメントできる() {
        // Arrange
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());
        let post = fixture.seed_global_post(actor.id());

        // Act
        let comment = fixture
            .sut()
            .create_comment(comment_input(&post, None), actor.id())
            .await
            .unwrap();

        // Assert
        assert_eq!(comment.writer_id(), actor.id());
        assert_eq!(comment.post_id(), post.id());
    }

    #[tokio::test]
    async fn test_create_comment_削除済み親コメントへの返信は成功する() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());
        let post = fixture.seed_global_post(actor.id());

        let parent = Comment::new(NewComment {
            id:                CommentId::new(),
            content:           "最初のコメント".to_string(),
            writer_id:         actor.id().clone(),
            post_id:           post.id().clone(),
            parent_comment_id: None,
            now:               now(),
        })
        .deleted(now());
        fixture.comment_repo.add_comment(parent.clone());

        let reply = fixture
            .sut()
            .create_comment(comment_input(&post, Some(&parent)), actor.id())
            .await
            .unwrap();

        assert_eq!(reply.parent_comment_id(), Some(parent.id()));
    }

    #[tokio::test]
    async fn test_create_comment_削除済み投稿へのコメントはcannot_perform() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());

        let board = Board::new(NewBoard {
            id:           BoardId::new(),
            name:         "自由掲示板".to_string(),
            description:  String::new(),
            create_roles: btreeset! { Role::Common },
            category:     category::NORMAL.to_string(),
            circle_id:    None,
            now:          now(),
        });
        fixture.board_repo.add_board(board.clone());

        let post = Post::new(NewPost {
            id:        PostId::new(),
            title:     "告知".to_string(),
            content:   "内容".to_string(),
            writer_id: actor.id().clone(),
            board_id:  board.id().clone(),
            now:       now(),
        })
        .deleted(now());
        fixture.post_repo.add_post(post.clone());

        let result = fixture
            .sut()
            .create_comment(
                CreateCommentInput {
                    post_id:           post.id().clone(),
                    content:           "遅れてコメント".to_string(),
                    parent_comment_id: None,
                },
                actor.id(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Domain(DomainError::CannotPerform(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_comment_別の投稿の親コメントはcannot_perform() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());
        let post = fixture.seed_global_post(actor.id());
        let other_post = fixture.seed_global_post(actor.id());

        let parent = Comment::new(NewComment {
            id:                CommentId::new(),
            content:           "よその投稿のコメント".to_string(),
            writer_id:         actor.id().clone(),
            post_id:           other_post.id().clone(),
            parent_comment_id: None,
            now:               now(),
        });
        fixture.comment_repo.add_comment(parent.clone());

        let result = fixture
            .sut()
            .create_comment(comment_input(&post, Some(&parent)), actor.id())
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Domain(DomainError::CannotPerform(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_comment_サークル掲示板は非メンバーにnot_member() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());

        let circle = Circle::new(
            CircleId::new(),
            "写真部".to_string(),
            String::new(),
            None,
            now(),
        );
        let post = fixture.seed_circle_post(&circle);

        let result = fixture
            .sut()
            .create_comment(comment_input(&post, None), actor.id())
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Domain(DomainError::NotMember(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_comment_メンバーはサークル掲示板にコメントできる() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());

        let circle = Circle::new(
            CircleId::new(),
            "写真部".to_string(),
            String::new(),
            None,
            now(),
        );
        let post = fixture.seed_circle_post(&circle);
        fixture.member_repo.add_member(
            CircleMember::new(
                CircleMemberId::new(),
                actor.id().clone(),
                circle.id().clone(),
                now(),
            )
            .with_status(CircleMemberStatus::Member, now()),
        );

        let result = fixture
            .sut()
            .create_comment(comment_input(&post, None), actor.id())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_comment_所属サークルが削除済みならメンバーでもcannot_perform() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());

        let circle = Circle::new(
            CircleId::new(),
            "写真部".to_string(),
            String::new(),
            None,
            now(),
        )
        .deleted(now());
        let post = fixture.seed_circle_post(&circle);
        fixture.member_repo.add_member(
            CircleMember::new(
                CircleMemberId::new(),
                actor.id().clone(),
                circle.id().clone(),
                now(),
            )
            .with_status(CircleMemberStatus::Member, now()),
        );

        let result = fixture
            .sut()
            .create_comment(comment_input(&post, None), actor.id())
            .await;

        match result {
            Err(ServiceError::Domain(DomainError::CannotPerform(msg))) => {
                assert!(msg.contains("サークル"));
            }
            other => panic!("CannotPerform を期待したが {:?} を受信", other),
        }
    }

    // === delete_comment ===

    #[tokio::test]
    async fn test_delete_comment_本人は削除できる() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());
        let post = fixture.seed_global_post(actor.id());

        let comment = Comment::new(NewComment {
            id:                CommentId::new(),
            content:           "消したいコメント".to_string(),
            writer_id:         actor.id().clone(),
            post_id:           post.id().clone(),
            parent_comment_id: None,
            now:               now(),
        });
        fixture.comment_repo.add_comment(comment.clone());

        let deleted = fixture
            .sut()
            .delete_comment(comment.id(), actor.id())
            .await
            .unwrap();

        assert!(deleted.is_deleted());
    }

    #[tokio::test]
    async fn test_delete_comment_他人のコメントは一般ユーザーには削除できない() {
        let fixture = Fixture::new();
        let writer = active_user(btreeset! { Role::Common });
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());
        let post = fixture.seed_global_post(writer.id());

        let comment = Comment::new(NewComment {
            id:                CommentId::new(),
            content:           "本人のコメント".to_string(),
            writer_id:         writer.id().clone(),
            post_id:           post.id().clone(),
            parent_comment_id: None,
            now:               now(),
        });
        fixture.comment_repo.add_comment(comment.clone());

        let result = fixture.sut().delete_comment(comment.id(), actor.id()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Domain(DomainError::NotAllowed(_)))
        ));
    }

    #[tokio::test]
    async fn test_delete_comment_削除済みコメントの再削除はcannot_perform() {
        let fixture = Fixture::new();
        let actor = active_user(btreeset! { Role::Common });
        fixture.user_repo.add_user(actor.clone());
        let post = fixture.seed_global_post(actor.id());

        let comment = Comment::new(NewComment {
            id:                CommentId::new(),
            content:           "削除済み".to_string(),
            writer_id:         actor.id().clone(),
            post_id:           post.id().clone(),
            parent_comment_id: None,
            now:               now(),
        })
        .deleted(now());
        fixture.comment_repo.add_comment(comment.clone());

        let result = fixture.sut().delete_comment(comment.id(), actor.id()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Domain(DomainError::CannotPerform(_)))
        ));
    }
}
