use serde::{Deserialize, Deserializer, Serialize};

/// Scalar body values accepted where a string is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// Reads a string field, casting numbers and booleans to their string form.
/// `null` counts as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Scalar::Str(s) => s,
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::UInt(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
    }))
}

// -- Users --

/// Body of `POST /register` and `POST /login`.
///
/// Fields are optional so that registration never rejects a body for
/// missing keys; login treats an absent field as a mismatch.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}

// -- Chat --

#[derive(Debug, Default, Deserialize)]
pub struct PostChatRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// -- Generic --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_cast_to_strings() {
        let req: CredentialsRequest =
            serde_json::from_str(r#"{"username": 7, "password": 1234}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some("7"));
        assert_eq!(req.password.as_deref(), Some("1234"));

        let req: PostChatRequest =
            serde_json::from_str(r#"{"user": true, "text": 1.5}"#).unwrap();
        assert_eq!(req.user.as_deref(), Some("true"));
        assert_eq!(req.text.as_deref(), Some("1.5"));
    }

    #[test]
    fn null_and_missing_are_absent() {
        let req: PostChatRequest = serde_json::from_str(r#"{"user": null}"#).unwrap();
        assert!(req.user.is_none());
        assert!(req.text.is_none());
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(serde_json::from_str::<PostChatRequest>(r#"{"text": {"a": 1}}"#).is_err());
    }
}
