//! Uploaded file handling
//!
//! Reads multipart forms that carry at most one file, writes that file under
//! the uploads directory with a collision-resistant name, and hands back the
//! `/uploads/...` reference the static file route serves it from.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::error::ApiError;

/// URL prefix under which the uploads directory is served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;

/// A file received in a multipart request
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Filename as sent by the client
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Text fields and the optional file of one multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<FilePart>,
}

/// Reads a multipart body, accepting a single file under `file_field`
///
/// Text parts are collected by name. A file part under any other name, or a
/// second file, is rejected. A part with an empty filename and no content
/// counts as "no file", which is what browsers send for an empty file input.
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if name != file_field || form.file.is_some() {
                    return Err(ApiError::BadRequest("Unexpected field"));
                }
                form.file = Some(FilePart {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Directory-backed file store for uploads
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the uploads directory if it is missing
    pub fn ensure_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Writes `file` under a generated name and returns its public reference
    pub async fn save(&self, file: &FilePart) -> io::Result<String> {
        let stored_name = stored_file_name(&file.file_name);
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, &file.bytes).await?;

        debug!(path = %path.display(), size = file.bytes.len(), "saved upload");
        Ok(format!("{UPLOADS_URL_PREFIX}/{stored_name}"))
    }
}

/// `<unix-millis>-<6 random base36 chars><.ext>`, keeping the original
/// extension when there is one
pub fn stored_file_name(original: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();

    let ext = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_extension() {
        let name = stored_file_name("tiramisu.JPG");
        assert!(name.ends_with(".JPG"));

        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), SUFFIX_LEN + ".JPG".len());
    }

    #[test]
    fn no_extension() {
        let name = stored_file_name("avatar");
        let (_, suffix) = name.split_once('-').unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    #[test]
    fn names_do_not_collide() {
        assert_ne!(stored_file_name("a.png"), stored_file_name("a.png"));
    }

    #[tokio::test]
    async fn save_writes_under_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));
        store.ensure_dir().unwrap();

        let file = FilePart {
            file_name: "pic.png".into(),
            bytes: vec![1, 2, 3],
        };
        let reference = store.save(&file).await.unwrap();

        let stored = reference.strip_prefix("/uploads/").unwrap();
        assert_eq!(std::fs::read(store.dir().join(stored)).unwrap(), vec![1, 2, 3]);
    }
}
