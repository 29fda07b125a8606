use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use tracing::info;

use lanbox_types::api::MessageResponse;
use lanbox_types::models::NewFile;

use crate::error::{ApiError, Result};
use crate::{AppState, with_store};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// GET /files — stored filenames, payloads excluded.
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let names = with_store(&state, |store| store.file_names()).await?;
    Ok(Json(names))
}

/// POST /upload — multipart with a `file` part and a `username` field.
///
/// The file is buffered in memory and stored under `<username>:<filename>`.
/// Re-uploading the same name adds another document. Only one `file` part
/// is accepted per request.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut username: Option<String> = None;
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to process multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                if upload.is_some() {
                    return Err(ApiError::BadRequest("Unexpected field".into()));
                }
                let original_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                upload = Some((original_name, content_type, data.to_vec()));
            }
            "username" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read username: {}", e)))?;
                username = Some(text);
            }
            _ => {}
        }
    }

    let username = username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Username required".into()))?;
    let (original_name, content_type, data) =
        upload.ok_or_else(|| ApiError::BadRequest("File required".into()))?;

    let file = NewFile {
        filename: NewFile::composite_name(&username, &original_name),
        data,
        content_type,
    };
    let filename = file.filename.clone();
    let size = file.data.len();

    let id = with_store(&state, move |store| store.insert_file(file)).await?;
    info!("Stored {} ({} bytes) as {}", filename, size, id);

    Ok(Json(MessageResponse::new("File uploaded successfully")))
}

/// GET /download/{name} — raw bytes of the first file with this exact name.
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let file = with_store(&state, move |store| store.find_file(&name))
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".into()))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&file.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&attachment_disposition(&file.filename))
            .map_err(|e| ApiError::Internal(format!("Bad disposition header: {}", e)))?,
    );

    Ok((headers, file.data))
}

/// DELETE /delete/{name} — removes at most one matching file. Succeeds on a miss.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>> {
    let target = name.clone();
    let removed = with_store(&state, move |store| store.delete_file(&target)).await?;
    if removed {
        info!("Deleted file {}", name);
    }

    Ok(Json(MessageResponse::new("File deleted")))
}

/// `attachment; filename="..."`, plus an RFC 5987 `filename*` when the name
/// is not printable ASCII.
pub fn attachment_disposition(filename: &str) -> String {
    let plain = filename.chars().all(|c| c.is_ascii() && !c.is_ascii_control());

    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => quoted.push(c),
            _ => quoted.push('?'),
        }
    }

    if plain {
        format!("attachment; filename=\"{}\"", quoted)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            quoted,
            encode_ext_value(filename)
        )
    }
}

fn encode_ext_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for b in value.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_names_use_plain_filename() {
        assert_eq!(
            attachment_disposition("u:f.txt"),
            "attachment; filename=\"u:f.txt\""
        );
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(
            attachment_disposition(r#"a"b\c"#),
            r#"attachment; filename="a\"b\\c""#
        );
    }

    #[test]
    fn non_ascii_names_get_extended_parameter() {
        assert_eq!(
            attachment_disposition("u:café.txt"),
            "attachment; filename=\"u:caf?.txt\"; filename*=UTF-8''u%3Acaf%C3%A9.txt"
        );
    }

    #[test]
    fn disposition_is_a_valid_header_value() {
        for name in ["u:f.txt", "line\nbreak", "日本語.pdf", "tab\there"] {
            assert!(HeaderValue::from_str(&attachment_disposition(name)).is_ok());
        }
    }
}
