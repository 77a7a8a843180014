use crate::errors::internal::{InternalError, PatientError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File extensions accepted for biopsy uploads, matched case-insensitively
const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

/// ImageStore persists uploaded biopsy files under a single upload directory
///
/// Stored names are sanitized and prefixed with the patient id; the database
/// reference row is written by the patient store after the bytes are durable,
/// and `remove` exists so callers can undo the write when that insert fails.
pub struct ImageStore {
    upload_dir: PathBuf,
}

impl ImageStore {
    /// Create an ImageStore rooted at the given directory, creating it if needed
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self, InternalError> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)
            .map_err(|e| InternalError::io("create upload directory", e))?;
        Ok(Self { upload_dir })
    }

    /// Whether a filename carries an accepted extension (".JPG" counts)
    pub fn allowed_file(filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                ALLOWED_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Write uploaded bytes under a sanitized `{patient_id}_{original}` name
    ///
    /// # Returns
    /// * `Ok(String)` - The stored filename to reference in the database
    /// * `Err(InternalError::Patient(UnsupportedFileType))` - Extension not accepted
    pub async fn store(
        &self,
        patient_id: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, InternalError> {
        if !Self::allowed_file(original_filename) {
            return Err(InternalError::from(PatientError::UnsupportedFileType(
                original_filename.to_string(),
            )));
        }

        let stored_filename = sanitize_filename(&format!("{}_{}", patient_id, original_filename));
        let path = self.upload_dir.join(&stored_filename);

        fs::write(&path, bytes)
            .await
            .map_err(|e| InternalError::io("write upload", e))?;

        Ok(stored_filename)
    }

    /// Read a previously stored file back, or None if it does not exist
    ///
    /// Names containing path separators or parent references never resolve;
    /// only files directly under the upload directory are served.
    pub async fn load(&self, stored_filename: &str) -> Result<Option<Vec<u8>>, InternalError> {
        if !is_safe_name(stored_filename) {
            return Ok(None);
        }

        let path = self.upload_dir.join(stored_filename);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InternalError::io("read upload", e)),
        }
    }

    /// Best-effort removal for compensating cleanup after a failed DB append
    pub async fn remove(&self, stored_filename: &str) {
        if !is_safe_name(stored_filename) {
            return;
        }
        let path = self.upload_dir.join(stored_filename);
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!("failed to remove orphaned upload {}: {}", stored_filename, e);
        }
    }
}

/// Keep only characters safe for a flat filename; everything else becomes '_'
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, ImageStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = ImageStore::new(dir.path()).expect("Failed to create image store");
        (dir, store)
    }

    #[test]
    fn test_allowed_file_accepts_whitelisted_extensions() {
        assert!(ImageStore::allowed_file("scan.png"));
        assert!(ImageStore::allowed_file("scan.jpg"));
        assert!(ImageStore::allowed_file("scan.jpeg"));
        assert!(ImageStore::allowed_file("report.pdf"));
    }

    #[test]
    fn test_allowed_file_is_case_insensitive() {
        assert!(ImageStore::allowed_file("scan.JPG"));
        assert!(ImageStore::allowed_file("scan.PnG"));
    }

    #[test]
    fn test_allowed_file_rejects_other_extensions() {
        assert!(!ImageStore::allowed_file("scan.exe"));
        assert!(!ImageStore::allowed_file("scan.svg"));
        assert!(!ImageStore::allowed_file("noextension"));
        assert!(!ImageStore::allowed_file(""));
    }

    #[test]
    fn test_sanitize_filename_flattens_suspicious_characters() {
        assert_eq!(sanitize_filename("p1_../../etc/passwd"), "p1_.._.._etc_passwd");
        assert_eq!(sanitize_filename("p1_my scan (2).png"), "p1_my_scan__2_.png");
    }

    #[tokio::test]
    async fn test_store_and_load_round_trip() {
        let (_dir, store) = test_store();

        let stored = store.store("p1", "scan.png", b"fake png bytes").await.unwrap();
        assert_eq!(stored, "p1_scan.png");

        let bytes = store.load(&stored).await.unwrap().unwrap();
        assert_eq!(bytes, b"fake png bytes");
    }

    #[tokio::test]
    async fn test_store_rejects_unsupported_extension() {
        let (_dir, store) = test_store();

        let result = store.store("p1", "malware.exe", b"bytes").await;
        assert!(matches!(
            result,
            Err(InternalError::Patient(PatientError::UnsupportedFileType(_)))
        ));
    }

    #[tokio::test]
    async fn test_load_refuses_path_traversal() {
        let (_dir, store) = test_store();

        assert!(store.load("../secret.txt").await.unwrap().is_none());
        assert!(store.load("a/../../b.png").await.unwrap().is_none());
        assert!(store.load("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_unknown_file_is_none() {
        let (_dir, store) = test_store();
        assert!(store.load("p9_missing.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_deletes_stored_file() {
        let (_dir, store) = test_store();

        let stored = store.store("p1", "scan.png", b"bytes").await.unwrap();
        store.remove(&stored).await;
        assert!(store.load(&stored).await.unwrap().is_none());
    }
}
