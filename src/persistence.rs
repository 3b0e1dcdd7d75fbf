use std::{
    hash::{Hash, Hasher},
    path::Path,
};

use thiserror::Error;
use tokio::fs;
use twox_hash::XxHash3_64;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Write `data` to `path`, creating missing parent directories.
pub async fn save_to_file(
    data: impl AsRef<[u8]>,
    path: impl AsRef<Path>,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, data).await?;
    Ok(())
}

pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<u8>, PersistenceError> {
    Ok(fs::read(path).await?)
}

/// Lower 32 bits of the xxHash of `key`, as lowercase hex.
pub fn short_hash(key: impl Hash) -> String {
    let mut hasher = XxHash3_64::default();
    key.hash(&mut hasher);
    format!("{:x}", hasher.finish() & 0xFFFFFFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_missing_directories() {
        let root = std::env::temp_dir().join(format!("crew-rs-{}", uuid::Uuid::new_v4()));
        let path = root.join("metadata").join("nested").join("run.json");

        save_to_file(r#"{"ok":true}"#, &path).await.unwrap();
        let data = load_from_file(&path).await.unwrap();
        assert_eq!(data, br#"{"ok":true}"#);

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[test]
    fn test_short_hash_is_stable_and_bounded() {
        let a = short_hash("Flight Crew");
        assert_eq!(a, short_hash("Flight Crew"));
        assert_ne!(a, short_hash("Budget Crew"));
        assert!(a.len() <= 8);
        assert!(u32::from_str_radix(&a, 16).is_ok());
    }
}
