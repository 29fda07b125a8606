pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use lanbox_types::models::{
    ChatMessage, NewChatMessage, NewFile, NewUser, StoredFile, UserAccount,
};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Collection-oriented persistence for users, files and chat messages.
///
/// Each collection is independent. Lookups return the first match in
/// insertion order, and nothing enforces uniqueness on any field.
pub trait DocumentStore: Send + Sync {
    // -- Users --

    fn insert_user(&self, user: NewUser) -> Result<UserAccount>;

    fn find_users(&self) -> Result<Vec<UserAccount>>;

    /// First account whose username and password both match exactly.
    fn find_user(&self, username: &str, password: &str) -> Result<Option<UserAccount>>;

    // -- Files --

    /// Stores a new file document and returns its id. Never overwrites.
    fn insert_file(&self, file: NewFile) -> Result<String>;

    /// Filenames only; payloads are not loaded.
    fn file_names(&self) -> Result<Vec<String>>;

    fn find_file(&self, filename: &str) -> Result<Option<StoredFile>>;

    /// Removes at most one document. Returns whether anything was removed.
    fn delete_file(&self, filename: &str) -> Result<bool>;

    // -- Chat --

    fn insert_chat(&self, message: NewChatMessage) -> Result<ChatMessage>;

    fn find_chat(&self) -> Result<Vec<ChatMessage>>;
}

/// Shared store handle, created once at startup.
pub type Store = Arc<dyn DocumentStore>;

/// Opens a store from a connection URI.
///
/// - `sqlite://<path>` or a bare path: SQLite database file
/// - `sqlite::memory:`: transient SQLite database
/// - `memory://`: in-process collections
pub fn open(uri: &str) -> Result<Store> {
    let uri = uri.trim();

    if uri == "sqlite::memory:" {
        return Ok(Arc::new(SqliteStore::open_in_memory()?));
    }
    if uri == "memory://" || uri == "memory" {
        return Ok(Arc::new(MemoryStore::new()));
    }
    if let Some(path) = uri.strip_prefix("sqlite://") {
        if path.is_empty() {
            bail!("sqlite store URI has no path: {}", uri);
        }
        return Ok(Arc::new(SqliteStore::open(Path::new(path))?));
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        bail!("Unsupported store scheme '{}' in {}", scheme, uri);
    }
    if uri.is_empty() {
        bail!("Store URI is empty");
    }

    Ok(Arc::new(SqliteStore::open(Path::new(uri))?))
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_unknown_scheme() {
        let err = open("mongodb://localhost:27017/app").err().unwrap();
        assert!(err.to_string().contains("mongodb"));
    }

    #[test]
    fn open_rejects_empty_sqlite_path() {
        assert!(open("sqlite://").is_err());
        assert!(open("   ").is_err());
    }

    #[test]
    fn open_memory_variants() {
        let store = open("memory://").unwrap();
        assert!(store.find_users().unwrap().is_empty());

        let store = open("sqlite::memory:").unwrap();
        store.insert_user(NewUser::default()).unwrap();
        assert_eq!(store.find_users().unwrap().len(), 1);
    }

    #[test]
    fn open_sqlite_file_persists_across_handles() {
        let dir = std::env::temp_dir().join(format!("lanbox_db_test_{}", new_id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("store.db");
        let uri = format!("sqlite://{}", path.display());

        {
            let store = open(&uri).unwrap();
            store
                .insert_chat(NewChatMessage {
                    user: "a".into(),
                    text: "hi".into(),
                })
                .unwrap();
        }

        let store = open(&uri).unwrap();
        let chat = store.find_chat().unwrap();
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].text, "hi");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
