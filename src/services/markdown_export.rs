// ReadFocus Markdown export
// Renders an extracted article as a Markdown document and hands it to a downloader.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::info;

use crate::platform;
use crate::types::article::ArticleRecord;
use crate::types::errors::ExportError;

pub const MARKDOWN_MIME: &str = "text/markdown";

/// A rendered export, ready to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: String,
    pub contents: String,
}

impl ExportedFile {
    pub fn from_article(article: &ArticleRecord) -> Self {
        Self {
            filename: export_filename(&article.title),
            mime_type: MARKDOWN_MIME.to_string(),
            contents: render_markdown(article),
        }
    }

    /// The contents as a base64 `data:` URL.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            STANDARD.encode(self.contents.as_bytes())
        )
    }
}

/// Lays the article out as title heading, source link, save date, rule, body.
///
/// The two trailing spaces after the source line force a Markdown line break.
pub fn render_markdown(article: &ArticleRecord) -> String {
    format!(
        "# {title}\n\n**Source:** [{url}]({url})  \n**Saved:** {date}\n\n---\n\n{content}",
        title = article.title,
        url = article.url,
        date = article.date,
        content = article.content,
    )
}

/// Every character outside `[A-Za-z0-9]` becomes `_`; the result is lowercased and gets `.md`.
///
/// Characters outside the BMP count as two, one `_` per UTF-16 code unit, so
/// names match what a browser-side `/[^a-z0-9]/gi` replace produces.
pub fn export_filename(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else {
            stem.extend(std::iter::repeat('_').take(c.len_utf16()));
        }
    }
    format!("{}.md", stem)
}

/// Receives finished exports. Implemented by the host's download facility.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Stores the file and returns where it ended up.
    async fn download(&self, file: &ExportedFile) -> Result<PathBuf, ExportError>;
}

/// Writes exports into a directory on disk.
pub struct FsDownloader {
    dir: PathBuf,
}

impl FsDownloader {
    /// Uses `dir`, or the platform download directory when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(platform::get_download_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Downloader for FsDownloader {
    async fn download(&self, file: &ExportedFile) -> Result<PathBuf, ExportError> {
        let name = Path::new(&file.filename);
        if file.filename.is_empty() || name.components().count() != 1 {
            return Err(ExportError::InvalidFileName(file.filename.clone()));
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ExportError::Io(format!("Failed to create download directory: {}", e))
        })?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, file.contents.as_bytes())
            .await
            .map_err(|e| ExportError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), bytes = file.contents.len(), "Saved article");
        Ok(path)
    }
}
