//! Bounded, persisted conversation history.
//!
//! A [`HistoryStore`] keeps the messages of the current session in memory and
//! writes the whole log through a key-value [`Storage`] after every append.
//! Logs are keyed by session id.  Reading is fail-open: a missing, unreadable
//! or corrupt log is an empty log.

use std::collections::{HashMap, VecDeque};

use utf8path::Path;

use crate::error::{Error, Result};
use crate::observability::{
    HISTORY_APPENDS, HISTORY_EVICTIONS, HISTORY_LOAD_FAILURES, HISTORY_PERSIST_FAILURES,
};
use crate::types::Message;

/// Default number of messages retained per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

const KEY_PREFIX: &str = "conversation_";

/// The persistence key for a session's log.
pub fn history_key(session_id: &str) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

////////////////////////////////////////////// Storage /////////////////////////////////////////////

/// A string key-value persistence layer.
pub trait Storage {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`.  Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage that keeps one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: Path<'static>,
}

impl FileStorage {
    /// Store files under `root`.  The directory is created on first write.
    pub fn new(root: &str) -> Self {
        Self {
            root: Path::from(root).into_owned(),
        }
    }

    /// The directory files are kept in.
    pub fn root(&self) -> &str {
        self.root.as_str()
    }

    fn path_for(&self, key: &str) -> Path<'static> {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let file_name = format!("{file_name}.json");
        self.root.join(file_name.as_str()).into_owned()
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| Error::io(format!("failed to read {}", path.as_str()), err))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .map_err(|err| Error::io(format!("failed to create {}", self.root.as_str()), err))?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|err| Error::io(format!("failed to write {}", path.as_str()), err))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::io(format!("failed to remove {}", path.as_str()), err)),
        }
    }
}

//////////////////////////////////////////// HistoryStore ///////////////////////////////////////////

/// The message log of one session, bounded and persisted.
pub struct HistoryStore<S: Storage> {
    storage: S,
    capacity: usize,
    session_id: String,
    messages: VecDeque<Message>,
}

impl<S: Storage> HistoryStore<S> {
    /// Open the log of `session_id`, loading whatever was persisted for it.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(storage: S, capacity: usize, session_id: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            capacity: capacity.max(1),
            session_id: session_id.into(),
            messages: VecDeque::new(),
        };
        store.messages = store.load_for_session(&store.session_id).into();
        store
    }

    /// Returns the persisted log of `session_id`, or an empty log.
    ///
    /// Never fails: unreadable or corrupt state is logged and treated as empty.
    /// At most `capacity` of the newest messages are returned.
    pub fn load_for_session(&self, session_id: &str) -> Vec<Message> {
        let key = history_key(session_id);
        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                HISTORY_LOAD_FAILURES.click();
                tracing::warn!(session_id, error = %err, "history unreadable; starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(mut messages) => {
                if messages.len() > self.capacity {
                    messages.drain(..messages.len() - self.capacity);
                }
                messages
            }
            Err(err) => {
                HISTORY_LOAD_FAILURES.click();
                tracing::warn!(session_id, error = %err, "history corrupt; starting empty");
                Vec::new()
            }
        }
    }

    /// Append a message, evicting the oldest entries beyond capacity, and
    /// persist the log.
    ///
    /// The in-memory log is updated even when persisting fails; the error is
    /// returned so the caller can report it.
    pub fn append(&mut self, message: Message) -> Result<()> {
        HISTORY_APPENDS.click();
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
            HISTORY_EVICTIONS.click();
            tracing::debug!(session_id = %self.session_id, "evicted oldest history entry");
        }
        self.persist()
    }

    /// Discard the current log, persisted copy included, and start an empty
    /// log for `session_id`.
    pub fn reset(&mut self, session_id: impl Into<String>) -> Result<()> {
        let old = std::mem::replace(&mut self.session_id, session_id.into());
        self.messages.clear();
        self.storage.remove(&history_key(&old))
    }

    /// Session whose log this is.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Maximum number of retained messages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Retained messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.messages)?;
        self.storage
            .set(&history_key(&self.session_id), &raw)
            .inspect_err(|_| HISTORY_PERSIST_FAILURES.click())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureId;

    fn user(body: &str) -> Message {
        Message::user(FeatureId::from("chat"), body)
    }

    fn bodies<S: Storage>(store: &HistoryStore<S>) -> Vec<String> {
        store.messages().map(|m| m.body.clone()).collect()
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _: &str) -> Result<Option<String>> {
            Err(Error::io(
                "disk on fire",
                std::io::Error::other("disk on fire"),
            ))
        }

        fn set(&mut self, _: &str, _: &str) -> Result<()> {
            Err(Error::io(
                "disk on fire",
                std::io::Error::other("disk on fire"),
            ))
        }

        fn remove(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn key_is_derived_from_session() {
        assert_eq!(history_key("session_1_abc"), "conversation_session_1_abc");
    }

    #[test]
    fn append_persists_log() {
        let mut store = HistoryStore::new(MemoryStorage::new(), 10, "s1");
        store.append(user("one")).unwrap();
        store.append(user("two")).unwrap();
        assert_eq!(store.len(), 2);

        let reopened = HistoryStore::new(store.storage().clone(), 10, "s1");
        assert_eq!(bodies(&reopened), vec!["one", "two"]);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut store = HistoryStore::new(MemoryStorage::new(), 3, "s1");
        for body in ["a", "b", "c", "d", "e"] {
            store.append(user(body)).unwrap();
            assert!(store.len() <= store.capacity());
        }
        assert_eq!(bodies(&store), vec!["c", "d", "e"]);

        let persisted = store.load_for_session("s1");
        assert_eq!(persisted.len(), 3);
        assert_eq!(persisted[0].body, "c");
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let mut store = HistoryStore::new(MemoryStorage::new(), 0, "s1");
        store.append(user("a")).unwrap();
        store.append(user("b")).unwrap();
        assert_eq!(bodies(&store), vec!["b"]);
    }

    #[test]
    fn missing_session_is_empty() {
        let store = HistoryStore::new(MemoryStorage::new(), 10, "s1");
        assert!(store.load_for_session("nobody").is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_state_is_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(&history_key("s1"), "{not json").unwrap();
        let store = HistoryStore::new(storage, 10, "s1");
        assert!(store.is_empty());
    }

    #[test]
    fn unreadable_state_is_empty() {
        let store = HistoryStore::new(BrokenStorage, 10, "s1");
        assert!(store.is_empty());
        assert!(store.load_for_session("s1").is_empty());
    }

    #[test]
    fn persist_failure_keeps_memory() {
        let mut store = HistoryStore::new(BrokenStorage, 10, "s1");
        assert!(store.append(user("kept")).is_err());
        assert_eq!(bodies(&store), vec!["kept"]);
    }

    #[test]
    fn oversized_persisted_log_is_trimmed_on_load() {
        let mut big = HistoryStore::new(MemoryStorage::new(), 10, "s1");
        for i in 0..10 {
            big.append(user(&i.to_string())).unwrap();
        }
        let small = HistoryStore::new(big.storage().clone(), 4, "s1");
        assert_eq!(bodies(&small), vec!["6", "7", "8", "9"]);
    }

    #[test]
    fn reset_discards_old_log() {
        let mut store = HistoryStore::new(MemoryStorage::new(), 10, "s1");
        store.append(user("old")).unwrap();
        store.reset("s2").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.session_id(), "s2");
        assert!(store.load_for_session("s1").is_empty());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "chatterbox-history-{}-{}",
            std::process::id(),
            crate::types::Session::generate().id
        ));
        let dir = dir.to_str().unwrap().to_string();
        let mut storage = FileStorage::new(&dir);
        assert_eq!(storage.get("conversation_x").unwrap(), None);
        storage.set("conversation_x", "[]").unwrap();
        assert_eq!(storage.get("conversation_x").unwrap().as_deref(), Some("[]"));
        storage.set("weird/key", "1").unwrap();
        assert_eq!(storage.get("weird/key").unwrap().as_deref(), Some("1"));
        storage.remove("conversation_x").unwrap();
        storage.remove("conversation_x").unwrap();
        assert_eq!(storage.get("conversation_x").unwrap(), None);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
