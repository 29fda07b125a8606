use serde::{Deserialize, Serialize};

/// A registered account. Passwords are stored and returned as given.
///
/// Both fields are optional: registration stores whatever it was sent and
/// absent fields stay absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// An uploaded file. `filename` is the composite `<username>:<original name>` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub filename: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub text: String,
}

// -- Insert payloads (no identity yet) --

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

impl NewFile {
    /// Builds the composite storage key for an upload.
    pub fn composite_name(username: &str, original_name: &str) -> String {
        format!("{}:{}", username, original_name)
    }
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub user: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_name_joins_with_colon() {
        assert_eq!(NewFile::composite_name("u", "f.txt"), "u:f.txt");
        assert_eq!(NewFile::composite_name("a:b", "c"), "a:b:c");
    }

    #[test]
    fn user_account_omits_absent_fields() {
        let user = UserAccount {
            id: "1".into(),
            username: Some("a".into()),
            password: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({ "_id": "1", "username": "a" }));
    }
}
