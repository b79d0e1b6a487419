//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use rcommon::{ChatId, Registry};
//!
//! let chat = ChatId::from("20250101_120000");
//! let mut registry = Registry::new();
//! registry.insert("llama3:latest".to_string(), 1_u32);
//!
//! assert_eq!(chat.as_str(), "20250101_120000");
//! assert_eq!(registry.get("llama3:latest"), Some(&1));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use rcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Chat identity newtype.
    //!
    //! Identifiers are timestamps formatted `%Y%m%d_%H%M%S`, so lexical order
    //! follows creation order.
    //!
    //! ```rust
    //! use chrono::{TimeZone, Utc};
    //! use rcommon::ChatId;
    //!
    //! let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap();
    //! assert_eq!(ChatId::from_timestamp(at).as_str(), "20250309_140500");
    //! ```

    use std::fmt::{Display, Formatter};

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    pub const CHAT_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ChatId(String);

    impl ChatId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn generate() -> Self {
            Self::from_timestamp(Utc::now())
        }

        pub fn from_timestamp(at: DateTime<Utc>) -> Self {
            Self(at.format(CHAT_ID_FORMAT).to_string())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for ChatId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for ChatId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for ChatId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use rcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{CHAT_ID_FORMAT, ChatId};
pub use future::BoxFuture;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{ChatId, Registry};

    #[test]
    fn chat_id_round_trips_strings() {
        let id = ChatId::new("20240102_030405");

        assert_eq!(id.as_str(), "20240102_030405");
        assert_eq!(id.to_string(), "20240102_030405");
        assert_eq!(ChatId::from("20240102_030405".to_string()), id);
    }

    #[test]
    fn chat_ids_sort_by_creation_time() {
        let earlier = ChatId::from_timestamp(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap());
        let later = ChatId::from_timestamp(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        assert_eq!(earlier.as_str(), "20241231_235959");
        assert!(earlier < later);
    }

    #[test]
    fn generic_registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        assert_eq!(registry.get("alpha"), Some(&1));
        assert!(registry.contains_key("alpha"));
        assert_eq!(registry.len(), 1);

        let removed = registry.remove("alpha");
        assert_eq!(removed, Some(1));
        assert!(registry.is_empty());
    }
}
