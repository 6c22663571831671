//! # テスト用モックリポジトリ
//!
//! ユースケーステストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! campusflow-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use campusflow_domain::{
    board::{Board, BoardId},
    circle::{Circle, CircleId, CircleMember},
    comment::{Comment, CommentId},
    locker::{Locker, LockerId},
    post::{Post, PostId},
    user::{User, UserId},
    value_objects::Version,
};

use crate::{
    error::InfraError,
    repository::{
        BoardRepository,
        CircleMemberRepository,
        CircleRepository,
        CommentRepository,
        LockerRepository,
        PostRepository,
        UserRepository,
    },
};

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<User, InfraError> {
        let mut users = self.users.lock().unwrap();
        if let Some(pos) = users.iter().position(|u| u.id() == user.id()) {
            users[pos] = user.clone();
        } else {
            users.push(user.clone());
        }
        Ok(user.clone())
    }
}

// ===== MockCircleRepository =====

#[derive(Clone, Default)]
pub struct MockCircleRepository {
    circles: Arc<Mutex<Vec<Circle>>>,
}

impl MockCircleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_circle(&self, circle: Circle) {
        self.circles.lock().unwrap().push(circle);
    }
}

#[async_trait]
impl CircleRepository for MockCircleRepository {
    async fn find_by_id(&self, id: &CircleId) -> Result<Option<Circle>, InfraError> {
        Ok(self
            .circles
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn save(&self, circle: &Circle) -> Result<Circle, InfraError> {
        let mut circles = self.circles.lock().unwrap();
        if let Some(pos) = circles.iter().position(|c| c.id() == circle.id()) {
            circles[pos] = circle.clone();
        } else {
            circles.push(circle.clone());
        }
        Ok(circle.clone())
    }
}

// ===== MockCircleMemberRepository =====

#[derive(Clone, Default)]
pub struct MockCircleMemberRepository {
    members: Arc<Mutex<Vec<CircleMember>>>,
}

impl MockCircleMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, member: CircleMember) {
        self.members.lock().unwrap().push(member);
    }
}

#[async_trait]
impl CircleMemberRepository for MockCircleMemberRepository {
    async fn find_by_user_and_circle(
        &self,
        user_id: &UserId,
        circle_id: &CircleId,
    ) -> Result<Option<CircleMember>, InfraError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.user_id() == user_id && m.circle_id() == circle_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<CircleMember>, InfraError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn save(&self, member: &CircleMember) -> Result<CircleMember, InfraError> {
        let mut members = self.members.lock().unwrap();
        if let Some(pos) = members.iter().position(|m| m.id() == member.id()) {
            members[pos] = member.clone();
        } else {
            members.push(member.clone());
        }
        Ok(member.clone())
    }
}

// ===== MockBoardRepository =====

#[derive(Clone, Default)]
pub struct MockBoardRepository {
    boards: Arc<Mutex<Vec<Board>>>,
}

impl MockBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_board(&self, board: Board) {
        self.boards.lock().unwrap().push(board);
    }
}

#[async_trait]
impl BoardRepository for MockBoardRepository {
    async fn find_by_id(&self, id: &BoardId) -> Result<Option<Board>, InfraError> {
        Ok(self
            .boards
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id() == id)
            .cloned())
    }

    async fn find_global_active(&self) -> Result<Vec<Board>, InfraError> {
        let mut boards: Vec<Board> = self
            .boards
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.circle_id().is_none() && !b.is_deleted())
            .cloned()
            .collect();
        boards.sort_by_key(Board::created_at);
        Ok(boards)
    }

    async fn find_active_by_circles(
        &self,
        circle_ids: &[CircleId],
    ) -> Result<Vec<Board>, InfraError> {
        let mut boards: Vec<Board> = self
            .boards
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                !b.is_deleted()
                    && b.circle_id()
                        .is_some_and(|circle_id| circle_ids.contains(circle_id))
            })
            .cloned()
            .collect();
        boards.sort_by_key(Board::created_at);
        Ok(boards)
    }

    async fn save(&self, board: &Board) -> Result<Board, InfraError> {
        let mut boards = self.boards.lock().unwrap();
        if let Some(pos) = boards.iter().position(|b| b.id() == board.id()) {
            boards[pos] = board.clone();
        } else {
            boards.push(board.clone());
        }
        Ok(board.clone())
    }
}

// ===== MockPostRepository =====

#[derive(Clone, Default)]
pub struct MockPostRepository {
    posts: Arc<Mutex<Vec<Post>>>,
}

impl MockPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_post(&self, post: Post) {
        self.posts.lock().unwrap().push(post);
    }
}

#[async_trait]
impl PostRepository for MockPostRepository {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, InfraError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }

    async fn save(&self, post: &Post) -> Result<Post, InfraError> {
        let mut posts = self.posts.lock().unwrap();
        if let Some(pos) = posts.iter().position(|p| p.id() == post.id()) {
            posts[pos] = post.clone();
        } else {
            posts.push(post.clone());
        }
        Ok(post.clone())
    }
}

// ===== MockCommentRepository =====

#[derive(Clone, Default)]
pub struct MockCommentRepository {
    comments: Arc<Mutex<Vec<Comment>>>,
}

impl MockCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_comment(&self, comment: Comment) {
        self.comments.lock().unwrap().push(comment);
    }
}

#[async_trait]
impl CommentRepository for MockCommentRepository {
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn save(&self, comment: &Comment) -> Result<Comment, InfraError> {
        let mut comments = self.comments.lock().unwrap();
        if let Some(pos) = comments.iter().position(|c| c.id() == comment.id()) {
            comments[pos] = comment.clone();
        } else {
            comments.push(comment.clone());
        }
        Ok(comment.clone())
    }
}

// ===== MockLockerRepository =====

#[derive(Clone, Default)]
pub struct MockLockerRepository {
    lockers: Arc<Mutex<Vec<Locker>>>,
}

impl MockLockerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_locker(&self, locker: Locker) {
        self.lockers.lock().unwrap().push(locker);
    }

    /// 並行する別の書き込みを模倣し、ストア上のエンティティを差し替える
    pub fn replace_for_test(&self, locker: Locker) {
        let mut lockers = self.lockers.lock().unwrap();
        if let Some(pos) = lockers.iter().position(|l| l.id() == locker.id()) {
            lockers[pos] = locker;
        }
    }
}

#[async_trait]
impl LockerRepository for MockLockerRepository {
    async fn find_by_id(&self, id: &LockerId) -> Result<Option<Locker>, InfraError> {
        Ok(self
            .lockers
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id() == id)
            .cloned())
    }

    async fn insert(&self, locker: &Locker) -> Result<(), InfraError> {
        self.lockers.lock().unwrap().push(locker.clone());
        Ok(())
    }

    async fn update_with_version_check(
        &self,
        locker: &Locker,
        expected_version: Version,
    ) -> Result<Option<Locker>, InfraError> {
        let mut lockers = self.lockers.lock().unwrap();
        let Some(pos) = lockers.iter().position(|l| l.id() == locker.id()) else {
            return Ok(None);
        };
        if lockers[pos].version() != expected_version {
            return Err(InfraError::conflict("Locker", locker.id().to_string()));
        }
        lockers[pos] = locker.clone();
        Ok(Some(locker.clone()))
    }
}
