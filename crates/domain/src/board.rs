//! # 掲示板
//!
//! 掲示板エンティティを定義する。
//!
//! ## 設計方針
//!
//! - **サークルスコープ**: `circle_id` を持つ掲示板はそのサークルの
//!   メンバーシップゲートを受ける。`None` は全学掲示板を意味する
//! - **投稿ロール**: `create_roles` に含まれるロールだけが投稿を作成できる
//! - **カテゴリ例外**: 全学告知カテゴリ（[`category::APP_NOTICE`]）の
//!   削除・復元は管理者に限定される。汎用ルールの上に重ねる
//!   ハードコードされたポリシーであり、別機構ではない

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::{circle::CircleId, role::Role};

define_uuid_id! {
    /// 掲示板 ID
    pub struct BoardId;
}

/// 掲示板カテゴリの定数
pub mod category {
    /// 全学告知掲示板（削除・復元は管理者のみ）
    pub const APP_NOTICE: &str = "APP_NOTICE";
    /// 一般掲示板
    pub const NORMAL: &str = "NORMAL";
}

/// 掲示板名の最大文字数
const BOARD_NAME_MAX_LENGTH: usize = 30;

/// 掲示板説明の最大文字数
const BOARD_DESCRIPTION_MAX_LENGTH: usize = 255;

/// カテゴリの最大文字数
const BOARD_CATEGORY_MAX_LENGTH: usize = 30;

/// 掲示板エンティティ
///
/// # 不変条件
///
/// - `circle_id` が `Some` の掲示板への変更系操作はメンバーシップゲートを通る
/// - 削除済み（`is_deleted == true`）の掲示板とその配下への変更は
///   ルールエンジンで拒否される
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    id:           BoardId,
    name:         String,
    description:  String,
    create_roles: BTreeSet<Role>,
    category:     String,
    circle_id:    Option<CircleId>,
    is_deleted:   bool,
    created_at:   DateTime<Utc>,
    updated_at:   DateTime<Utc>,
}

/// 掲示板の新規作成パラメータ
pub struct NewBoard {
    pub id:           BoardId,
    pub name:         String,
    pub description:  String,
    pub create_roles: BTreeSet<Role>,
    pub category:     String,
    pub circle_id:    Option<CircleId>,
    pub now:          DateTime<Utc>,
}

/// 掲示板の DB 復元パラメータ
pub struct BoardRecord {
    pub id:           BoardId,
    pub name:         String,
    pub description:  String,
    pub create_roles: BTreeSet<Role>,
    pub category:     String,
    pub circle_id:    Option<CircleId>,
    pub is_deleted:   bool,
    pub created_at:   DateTime<Utc>,
    pub updated_at:   DateTime<Utc>,
}

impl Board {
    /// 新しい掲示板を作成する
    pub fn new(params: NewBoard) -> Self {
        Self {
            id:           params.id,
            name:         params.name,
            description:  params.description,
            create_roles: params.create_roles,
            category:     params.category,
            circle_id:    params.circle_id,
            is_deleted:   false,
            created_at:   params.now,
            updated_at:   params.now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: BoardRecord) -> Self {
        Self {
            id:           record.id,
            name:         record.name,
            description:  record.description,
            create_roles: record.create_roles,
            category:     record.category,
            circle_id:    record.circle_id,
            is_deleted:   record.is_deleted,
            created_at:   record.created_at,
            updated_at:   record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &BoardId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn create_roles(&self) -> &BTreeSet<Role> {
        &self.create_roles
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn circle_id(&self) -> Option<&CircleId> {
        self.circle_id.as_ref()
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

    /// 全学告知掲示板か判定する
    ///
    /// 該当する場合、削除・復元は管理者に限定される。
    pub fn is_app_notice(&self) -> bool {
        self.category == category::APP_NOTICE
    }

    /// 構造的制約を検証し、違反をすべて返す
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push("name: 掲示板名は必須です".to_string());
        }
        if self.name.chars().count() > BOARD_NAME_MAX_LENGTH {
            violations.push(format!(
                "name: 掲示板名は{}文字以内である必要があります",
                BOARD_NAME_MAX_LENGTH
            ));
        }
        if self.description.chars().count() > BOARD_DESCRIPTION_MAX_LENGTH {
            violations.push(format!(
                "description: 説明は{}文字以内である必要があります",
                BOARD_DESCRIPTION_MAX_LENGTH
            ));
        }
        if self.category.trim().is_empty() {
            violations.push("category: カテゴリは必須です".to_string());
        }
        if self.category.chars().count() > BOARD_CATEGORY_MAX_LENGTH {
            violations.push(format!(
                "category: カテゴリは{}文字以内である必要があります",
                BOARD_CATEGORY_MAX_LENGTH
            ));
        }

        violations
    }

    /// 内容を更新した新しいインスタンスを返す
    pub fn updated(
        self,
        name: String,
        description: String,
        create_roles: BTreeSet<Role>,
        category: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            description,
            create_roles,
            category,
            updated_at: now,
            ..self
        }
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

#[cfg(test)]
mod tests {
    use maplit::btreeset;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    /// テスト用の固定タイムスタンプ
    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[fixture]
    fn board(now: DateTime<Utc>) -> Board {
        Board::new(NewBoard {
            id:           BoardId::new(),
            name:         "自由掲示板".to_string(),
            description:  "なんでも書ける掲示板".to_string(),
            create_roles: btreeset! { Role::Common },
            category:     category::NORMAL.to_string(),
            circle_id:    None,
            now,
        })
    }

    #[rstest]
    fn test_新規掲示板は削除されていない(board: Board) {
        assert!(!board.is_deleted());
    }

    #[rstest]
    fn test_一般カテゴリは全学告知ではない(board: Board) {
        assert!(!board.is_app_notice());
    }

    #[rstest]
    fn test_全学告知カテゴリの判定(now: DateTime<Utc>) {
        let board = Board::new(NewBoard {
            id:           BoardId::new(),
            name:         "全学告知".to_string(),
            description:  String::new(),
            create_roles: BTreeSet::new(),
            category:     category::APP_NOTICE.to_string(),
            circle_id:    None,
            now,
        });

        assert!(board.is_app_notice());
    }

    #[rstest]
    fn test_削除と復元の往復(board: Board) {
        let delete_time = DateTime::from_timestamp(1_700_001_000, 0).unwrap();
        let restore_time = DateTime::from_timestamp(1_700_002_000, 0).unwrap();

        let deleted = board.deleted(delete_time);
        assert!(deleted.is_deleted());

        let restored = deleted.restored(restore_time);
        assert!(!restored.is_deleted());
        assert_eq!(restored.updated_at(), restore_time);
    }

    #[rstest]
    fn test_更新後の状態(board: Board) {
        let update_time = DateTime::from_timestamp(1_700_001_000, 0).unwrap();
        let updated = board.clone().updated(
            "質問掲示板".to_string(),
            "授業の質問用".to_string(),
            btreeset! { Role::Common, Role::Professor },
            category::NORMAL.to_string(),
            update_time,
        );

        assert_eq!(updated.name(), "質問掲示板");
        assert!(updated.create_roles().contains(&Role::Professor));
        assert_eq!(updated.id(), board.id());
        assert_eq!(updated.updated_at(), update_time);
    }

    #[rstest]
    fn test_正常な掲示板は違反なし(board: Board) {
        assert!(board.validate().is_empty());
    }

    #[rstest]
    fn test_空の名前と空のカテゴリは両方報告される(now: DateTime<Utc>) {
        let board = Board::new(NewBoard {
            id:           BoardId::new(),
            name:         String::new(),
            description:  String::new(),
            create_roles: BTreeSet::new(),
            category:     String::new(),
            circle_id:    None,
            now,
        });

        let violations = board.validate();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].starts_with("name:"));
        assert!(violations[1].starts_with("category:"));
    }

    #[rstest]
    fn test_名前の文字数超過は違反(now: DateTime<Utc>) {
        let board = Board::new(NewBoard {
            id:           BoardId::new(),
            name:         "あ".repeat(31),
            description:  String::new(),
            create_roles: BTreeSet::new(),
            category:     category::NORMAL.to_string(),
            circle_id:    None,
            now,
        });

        assert_eq!(board.validate().len(), 1);
    }
}
