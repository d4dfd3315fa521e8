mod in_memory;
mod local_fs;

pub use in_memory::InMemoryStorage;
pub use local_fs::LocalFileStorage;

use crate::errors::ApiError;
use async_trait::async_trait;
use mime::Mime;
use std::path::Path;

/// URL prefix uploaded files are served under and recorded with.
pub const UPLOADS_PREFIX: &str = "uploads";

#[derive(Debug)]
pub struct FileData {
    pub bytes: Vec<u8>,
    pub content_type: Option<Mime>,
    pub filename: Option<String>,
}

#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Stores the file and returns the generated name it lives under.
    async fn save(&self, file_data: FileData) -> Result<String, ApiError>;
    async fn get(&self, name: &str) -> Result<(Vec<u8>, Option<Mime>), ApiError>;
    async fn delete(&self, name: &str) -> Result<(), ApiError>;
}

/// `<unix-millis>-<random><.ext>`, keeping the original extension lower-cased.
pub fn generate_name(original: Option<&str>) -> String {
    let stamp = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::random();
    let ext = original
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{stamp}-{suffix}{ext}")
}

/// Reference stored on the owning record for a saved upload.
pub fn public_path(name: &str) -> String {
    format!("{UPLOADS_PREFIX}/{name}")
}

/// Generated names never contain separators; anything else is not ours.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_name_keeps_extension() {
        let name = generate_name(Some("Poster.PNG"));
        assert!(name.ends_with(".png"));
        assert!(is_valid_name(&name));
    }

    #[test]
    fn generated_name_without_extension() {
        let name = generate_name(Some("README"));
        assert!(!name.contains('.'));
        assert_eq!(name.split('-').count(), 2);
    }

    #[test]
    fn generated_names_differ() {
        assert_ne!(generate_name(Some("a.jpg")), generate_name(Some("a.jpg")));
    }

    #[test]
    fn rejects_path_traversal_names() {
        assert!(!is_valid_name("../secret"));
        assert!(!is_valid_name("a/b.png"));
        assert!(!is_valid_name(".meta"));
    }

    #[test]
    fn public_path_is_relative() {
        assert_eq!(public_path("1-2.png"), "uploads/1-2.png");
    }
}
