// Storage for uploaded tour images

use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];
const TOUR_IMAGE_DIR: &str = "tours";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Empty upload")]
    Empty,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// A file part taken from a multipart form
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedImage {
    fn extension(&self) -> Result<String, UploadError> {
        let from_name = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let from_type = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.strip_prefix("image/"))
            .map(str::to_ascii_lowercase);

        from_name
            .into_iter()
            .chain(from_type)
            .find(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| UploadError::UnsupportedType(self.file_name.clone()))
    }
}

// Files go under root/tours/, URLs under public_prefix
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    pub async fn save(&self, image: &UploadedImage) -> Result<String, UploadError> {
        if image.data.is_empty() {
            return Err(UploadError::Empty);
        }
        let extension = image.extension()?;

        let dir = self.root.join(TOUR_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{:016x}.{}", rand::random::<u64>(), extension);
        tokio::fs::write(dir.join(&file_name), &image.data).await?;
        debug!(file = %file_name, bytes = image.data.len(), "stored tour image");

        Ok(format!(
            "{}/{}/{}",
            self.public_prefix, TOUR_IMAGE_DIR, file_name
        ))
    }

    // Best effort: URLs this store did not issue are left alone
    pub async fn remove(&self, url: &str) {
        let Some(relative) = url
            .strip_prefix(self.public_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if relative.split('/').any(|part| part == "..") {
            return;
        }

        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            warn!(url, error = %e, "could not remove stored image");
        }
    }
}
