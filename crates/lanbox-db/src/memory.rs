use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};

use lanbox_types::models::{
    ChatMessage, NewChatMessage, NewFile, NewUser, StoredFile, UserAccount,
};

use crate::{DocumentStore, new_id};

/// In-process store. Contents live only as long as the handle.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserAccount>>,
    files: Mutex<Vec<StoredFile>>,
    chat: Mutex<Vec<ChatMessage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|e| anyhow!("Store lock poisoned: {}", e))
}

impl DocumentStore for MemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<UserAccount> {
        let account = UserAccount {
            id: new_id(),
            username: user.username,
            password: user.password,
        };
        lock(&self.users)?.push(account.clone());
        Ok(account)
    }

    fn find_users(&self) -> Result<Vec<UserAccount>> {
        Ok(lock(&self.users)?.clone())
    }

    fn find_user(&self, username: &str, password: &str) -> Result<Option<UserAccount>> {
        Ok(lock(&self.users)?
            .iter()
            .find(|u| {
                u.username.as_deref() == Some(username) && u.password.as_deref() == Some(password)
            })
            .cloned())
    }

    fn insert_file(&self, file: NewFile) -> Result<String> {
        let id = new_id();
        lock(&self.files)?.push(StoredFile {
            id: id.clone(),
            filename: file.filename,
            data: file.data,
            content_type: file.content_type,
        });
        Ok(id)
    }

    fn file_names(&self) -> Result<Vec<String>> {
        Ok(lock(&self.files)?
            .iter()
            .map(|f| f.filename.clone())
            .collect())
    }

    fn find_file(&self, filename: &str) -> Result<Option<StoredFile>> {
        Ok(lock(&self.files)?
            .iter()
            .find(|f| f.filename == filename)
            .cloned())
    }

    fn delete_file(&self, filename: &str) -> Result<bool> {
        let mut files = lock(&self.files)?;
        match files.iter().position(|f| f.filename == filename) {
            Some(idx) => {
                files.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_chat(&self, message: NewChatMessage) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: new_id(),
            user: message.user,
            text: message.text,
        };
        lock(&self.chat)?.push(message.clone());
        Ok(message)
    }

    fn find_chat(&self) -> Result<Vec<ChatMessage>> {
        Ok(lock(&self.chat)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_never_match_login() {
        let store = MemoryStore::new();
        store
            .insert_user(NewUser {
                username: Some("a".into()),
                password: None,
            })
            .unwrap();

        assert!(store.find_user("a", "").unwrap().is_none());
    }

    #[test]
    fn delete_takes_first_match_only() {
        let store = MemoryStore::new();
        for data in [b"one", b"two"] {
            store
                .insert_file(NewFile {
                    filename: "u:f".into(),
                    data: data.to_vec(),
                    content_type: "application/octet-stream".into(),
                })
                .unwrap();
        }

        assert!(store.delete_file("u:f").unwrap());
        assert_eq!(store.find_file("u:f").unwrap().unwrap().data, b"two");
        assert!(!store.delete_file("missing").unwrap());
    }

    #[test]
    fn ids_are_distinct() {
        let store = MemoryStore::new();
        let a = store.insert_user(NewUser::default()).unwrap();
        let b = store.insert_user(NewUser::default()).unwrap();
        assert_ne!(a.id, b.id);
    }
}
