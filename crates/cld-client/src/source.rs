//! Upload sources.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::{ClientError, ClientResult};

/// URL schemes the API fetches on its own.
const REMOTE_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "s3", "gs"];

static DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([\w-]+/[\w\-+.]+)?(;[\w-]+=[\w-]+)*;base64,([a-zA-Z0-9/+\n=]+)$").unwrap()
});

/// What to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    LocalPath(PathBuf),
    /// In-memory contents with the file name to report.
    Bytes { data: Vec<u8>, filename: String },
    /// Fetched by the API itself.
    RemoteUrl(String),
    /// Base64 `data:` URI, sent as-is.
    DataUri(String),
}

impl FileSource {
    /// Classify a string as a remote URL, a data URI or a local path.
    pub fn parse(value: &str) -> Self {
        if is_remote_url(value) {
            FileSource::RemoteUrl(value.to_string())
        } else if DATA_URI.is_match(value) {
            FileSource::DataUri(value.to_string())
        } else {
            FileSource::LocalPath(PathBuf::from(value))
        }
    }

    pub fn bytes(data: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        FileSource::Bytes {
            data: data.into(),
            filename: filename.into(),
        }
    }

    /// Sources the API reads by itself; these are never chunked.
    pub fn is_remote(&self) -> bool {
        matches!(self, FileSource::RemoteUrl(_) | FileSource::DataUri(_))
    }

    /// File name sent with the multipart part.
    pub fn filename(&self) -> String {
        match self {
            FileSource::LocalPath(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string()),
            FileSource::Bytes { filename, .. } => filename.clone(),
            FileSource::RemoteUrl(_) | FileSource::DataUri(_) => "file".to_string(),
        }
    }

    /// Size in bytes of local content; `None` for remote sources.
    pub async fn size(&self) -> ClientResult<Option<u64>> {
        match self {
            FileSource::LocalPath(path) => Ok(Some(tokio::fs::metadata(path).await?.len())),
            FileSource::Bytes { data, .. } => Ok(Some(data.len() as u64)),
            FileSource::RemoteUrl(_) | FileSource::DataUri(_) => Ok(None),
        }
    }

    /// Read `length` bytes starting at `offset`.
    pub async fn read_range(&self, offset: u64, length: u64) -> ClientResult<Vec<u8>> {
        match self {
            FileSource::LocalPath(path) => read_file_range(path, offset, length).await,
            FileSource::Bytes { data, .. } => {
                let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
                let end = usize::try_from(offset.saturating_add(length))
                    .unwrap_or(usize::MAX)
                    .min(data.len());
                Ok(data[start..end].to_vec())
            }
            FileSource::RemoteUrl(_) | FileSource::DataUri(_) => Err(ClientError::configuration(
                "remote sources are read by the API, not the client",
            )),
        }
    }
}

impl From<&str> for FileSource {
    fn from(value: &str) -> Self {
        FileSource::parse(value)
    }
}

impl From<String> for FileSource {
    fn from(value: String) -> Self {
        FileSource::parse(&value)
    }
}

impl From<PathBuf> for FileSource {
    fn from(value: PathBuf) -> Self {
        FileSource::LocalPath(value)
    }
}

impl From<&Path> for FileSource {
    fn from(value: &Path) -> Self {
        FileSource::LocalPath(value.to_path_buf())
    }
}

fn is_remote_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| REMOTE_SCHEMES.contains(&u.scheme()))
        .unwrap_or(false)
}

async fn read_file_range(path: &Path, offset: u64, length: u64) -> ClientResult<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;

    let mut buf = Vec::with_capacity(usize::try_from(length).unwrap_or(0));
    file.take(length).read_to_end(&mut buf).await?;
    Ok(buf)
}
