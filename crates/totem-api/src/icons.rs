//! # Icon Storage
//!
//! Uploaded procedure and counter icons live as flat files in one directory
//! served under `/icons/`. Names are generated on upload and validated on
//! delete so a request can never reach outside the directory.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use thiserror::Error;

/// Largest accepted icon upload.
pub const MAX_ICON_BYTES: usize = 5 * 1024 * 1024;

/// Accepted icon extensions, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "webp", "avif"];

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Error, Debug)]
pub enum IconError {
    #[error("unsupported file type; allowed: png, jpg, jpeg, svg, webp, avif")]
    Extension,

    #[error("invalid icon filename")]
    InvalidName,

    #[error("file exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Directory of uploaded icons.
#[derive(Debug, Clone)]
pub struct IconStore {
    dir: PathBuf,
}

impl IconStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Store `bytes` under a fresh name derived from `original_name`'s extension.
    /// Returns the stored filename.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, IconError> {
        if bytes.len() > MAX_ICON_BYTES {
            return Err(IconError::TooLarge {
                limit: MAX_ICON_BYTES,
            });
        }
        let ext = extension_of(original_name).ok_or(IconError::Extension)?;
        let filename = generate_name(&ext);

        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;
        tracing::info!(filename = %filename, bytes = bytes.len(), "icon stored");
        Ok(filename)
    }

    /// Delete a stored icon. `Ok(false)` when no such file exists.
    pub async fn delete(&self, filename: &str) -> Result<bool, IconError> {
        validate_name(filename)?;
        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => {
                tracing::info!(filename = %filename, "icon deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the icon a removed record pointed at. Invalid names and
    /// missing files are skipped; other failures are logged.
    pub async fn remove_quietly(&self, filename: &str) {
        match self.delete(filename).await {
            Ok(_) | Err(IconError::InvalidName) | Err(IconError::Extension) => {}
            Err(e) => tracing::warn!(filename = %filename, error = %e, "could not remove icon"),
        }
    }
}

/// Lowercase extension of `name` when it is on the allow-list.
pub fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Reject anything that is not a bare filename with an allowed extension.
pub fn validate_name(filename: &str) -> Result<(), IconError> {
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.starts_with('.')
    {
        return Err(IconError::InvalidName);
    }
    if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
        return Err(IconError::InvalidName);
    }
    extension_of(filename).map(|_| ()).ok_or(IconError::Extension)
}

/// `<base36 millis>-<6 random base36>.<ext>`
fn generate_name(ext: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{}-{}.{}", to_base36(millis), suffix, ext)
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
