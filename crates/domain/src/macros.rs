/// エンティティ ID 用の UUID Newtype を定義する宣言型マクロ
///
/// ID は UUID v7（時刻順にソート可能）で採番する。型ごとに別の
/// Newtype を生成することで、`BoardId` を要求する箇所に `UserId` を
/// 渡すような取り違えをコンパイルエラーにする。
///
/// # 使用例
///
/// ```rust
/// use campusflow_domain::locker::LockerId;
///
/// let id = LockerId::new();
/// let restored = LockerId::from_uuid(*id.as_uuid());
/// assert_eq!(id, restored);
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[derive(derive_more::Display)]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// UUID v7 で新しい ID を採番する
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// 永続化済みの UUID から ID を復元する
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// 内部の UUID への参照を返す
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// 内部の UUID を取り出す
            pub fn into_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $Name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self::from_uuid(uuid)
            }
        }
    };
}
