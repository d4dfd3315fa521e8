use super::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    files: Arc<RwLock<HashMap<String, (Vec<u8>, Option<Mime>)>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save(&self, file_data: FileData) -> Result<String, ApiError> {
        let name = generate_name(file_data.filename.as_deref());
        self.files
            .write()
            .await
            .insert(name.clone(), (file_data.bytes, file_data.content_type));
        Ok(name)
    }

    async fn get(&self, name: &str) -> Result<(Vec<u8>, Option<Mime>), ApiError> {
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found("File not found"))
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.files
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("File not found"))
    }
}
