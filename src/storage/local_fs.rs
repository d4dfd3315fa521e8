use super::*;
use std::path::PathBuf;
use tokio::fs;

fn io_error(err: std::io::Error) -> ApiError {
    ApiError::Internal(err.to_string())
}

/// Files under a fixed directory, each with a `<name>.meta` JSON sidecar
/// recording its content type and original filename.
pub struct LocalFileStorage {
    storage_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(storage_path: PathBuf) -> Result<Self, ApiError> {
        if !storage_path.exists() {
            std::fs::create_dir_all(&storage_path).map_err(io_error)?;
            tracing::info!(path = %storage_path.display(), "created upload directory");
        }
        Ok(Self { storage_path })
    }

    fn paths(&self, name: &str) -> Result<(PathBuf, PathBuf), ApiError> {
        if !is_valid_name(name) {
            return Err(ApiError::not_found("File not found"));
        }
        Ok((
            self.storage_path.join(name),
            self.storage_path.join(format!("{name}.meta")),
        ))
    }
}

#[async_trait]
impl Storage for LocalFileStorage {
    async fn save(&self, file_data: FileData) -> Result<String, ApiError> {
        let name = generate_name(file_data.filename.as_deref());
        let (file_path, meta_path) = self.paths(&name)?;

        let meta = serde_json::json!({
            "content_type": file_data.content_type.map(|m| m.to_string()),
            "filename": file_data.filename,
        });
        fs::write(&meta_path, meta.to_string())
            .await
            .map_err(io_error)?;

        fs::write(&file_path, file_data.bytes)
            .await
            .map_err(io_error)?;

        tracing::debug!(%name, "stored upload");
        Ok(name)
    }

    async fn get(&self, name: &str) -> Result<(Vec<u8>, Option<Mime>), ApiError> {
        let (file_path, meta_path) = self.paths(name)?;

        let meta = fs::read_to_string(meta_path)
            .await
            .map_err(|_| ApiError::not_found("File not found"))?;
        let meta: serde_json::Value =
            serde_json::from_str(&meta).map_err(|e| ApiError::Internal(e.to_string()))?;
        let content_type = meta["content_type"].as_str().and_then(|s| s.parse().ok());

        let bytes = fs::read(&file_path)
            .await
            .map_err(|_| ApiError::not_found("File not found"))?;

        Ok((bytes, content_type))
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        let (file_path, meta_path) = self.paths(name)?;

        fs::remove_file(file_path)
            .await
            .map_err(|_| ApiError::not_found("File not found"))?;

        if let Err(err) = fs::remove_file(&meta_path).await {
            tracing::warn!(path = %meta_path.display(), error = %err, "failed to remove upload metadata");
        }
        Ok(())
    }
}
