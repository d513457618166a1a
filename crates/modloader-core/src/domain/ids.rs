//! Strongly-typed identifiers.
//!
//! ULID ベースの `Id<T>` を Phantom type で区別します。
//! モジュール名そのものは文字列キーなので ID を持ちません。ここで扱うのは
//! ローダー内部の相関用 ID だけです:
//!
//! - `RequireId`: 1 回の `require` パイプライン（再帰的な require も別 ID）
//! - `ListenerId`: EventBus の購読ハンドル（`off` に使う）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Display で使うプレフィックスを提供するマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData なので実行時のサイズは ULID と同じ 16 bytes です。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 新しい ID を発行（時刻順にソート可能）
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Require のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Require {}

impl IdMarker for Require {
    fn prefix() -> &'static str {
        "require-"
    }
}

/// Listener のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Listener {}

impl IdMarker for Listener {
    fn prefix() -> &'static str {
        "listener-"
    }
}

/// Identifier of one `require` pipeline run (log correlation).
pub type RequireId = Id<Require>;

/// Identifier of an event-bus subscription.
pub type ListenerId = Id<Listener>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let ulid1 = Ulid::new();
        let ulid2 = Ulid::new();

        let require = RequireId::from_ulid(ulid1);
        let listener = ListenerId::from_ulid(ulid2);

        assert_eq!(require.as_ulid(), ulid1);
        assert_eq!(listener.as_ulid(), ulid2);

        assert!(require.to_string().starts_with("require-"));
        assert!(listener.to_string().starts_with("listener-"));
    }

    #[test]
    fn generated_ids_are_unique_and_sortable() {
        let id1 = ListenerId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = ListenerId::generate();

        assert_ne!(id1, id2);
        assert!(id1 < id2);
    }

    #[test]
    fn ids_can_be_serialized() {
        let id = RequireId::generate();

        let serialized = serde_json::to_string(&id).unwrap();
        let deserialized: RequireId = serde_json::from_str(&serialized).unwrap();

        assert_eq!(id, deserialized);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<RequireId>(), size_of::<Ulid>());
        assert_eq!(size_of::<ListenerId>(), 16);
    }
}
