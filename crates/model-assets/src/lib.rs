//! Model Asset Provisioning
//!
//! Fetches and caches the two detection model files under fixed,
//! well-known subdirectory and file names relative to the executable.
//! Already-cached files short-circuit; failed downloads leave no partial
//! files behind.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Subdirectory holding the face detection model
pub const FACE_MODEL_DIR: &str = "face_models";

/// Face detection model filename
pub const FACE_MODEL_NAME: &str = "blazeface_frontal.onnx";

/// Face detection model source
pub const FACE_MODEL_URL: &str =
    "https://github.com/vigilteam/vigil-models/releases/download/models-v1/blazeface_frontal.onnx";

/// Subdirectory holding the 68-point landmark model
pub const LANDMARK_MODEL_DIR: &str = "landmark_models";

/// Landmark model filename
pub const LANDMARK_MODEL_NAME: &str = "face_landmarks_68.onnx";

/// Landmark model source
pub const LANDMARK_MODEL_URL: &str =
    "https://github.com/vigilteam/vigil-models/releases/download/models-v1/face_landmarks_68.onnx";

/// Asset provisioning error types
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to locate executable directory: {0}")]
    ExecutablePath(String),

    #[error("Failed to create asset directory {0:?}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to download {name} from {url}: {reason}. Place the file manually at {dest:?}")]
    Download {
        name: String,
        url: String,
        reason: String,
        dest: PathBuf,
    },
}

/// Resolved locations of the cached model files
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub face_model: PathBuf,
    pub landmark_model: PathBuf,
}

/// Directory of the running executable, the root for asset caching
pub fn executable_dir() -> Result<PathBuf, AssetError> {
    let exe = std::env::current_exe().map_err(|e| AssetError::ExecutablePath(e.to_string()))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| AssetError::ExecutablePath("executable has no parent directory".into()))
}

/// Ensure both model files exist under `base_dir`, downloading whichever
/// is missing. Returns the resolved paths.
pub async fn ensure_assets(base_dir: &Path) -> Result<AssetPaths, AssetError> {
    let face_model = ensure_asset(base_dir, FACE_MODEL_DIR, FACE_MODEL_NAME, FACE_MODEL_URL).await?;
    let landmark_model = ensure_asset(
        base_dir,
        LANDMARK_MODEL_DIR,
        LANDMARK_MODEL_NAME,
        LANDMARK_MODEL_URL,
    )
    .await?;

    Ok(AssetPaths {
        face_model,
        landmark_model,
    })
}

async fn ensure_asset(
    base_dir: &Path,
    subdir: &str,
    name: &str,
    url: &str,
) -> Result<PathBuf, AssetError> {
    let dir = base_dir.join(subdir);
    let dest = dir.join(name);

    if dest.exists() {
        info!("Model '{}' already cached at {}", name, dest.display());
        return Ok(dest);
    }

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AssetError::CreateDir(dir.clone(), e))?;

    info!("Model '{}' not found. Downloading from {}", name, url);
    match download_file(url, &dest).await {
        Ok(()) => {
            info!("Model '{}' saved to {}", name, dest.display());
            Ok(dest)
        }
        Err(reason) => {
            // Never leave a partial file that would satisfy the cache
            // check on the next run.
            if dest.exists() {
                if let Err(e) = tokio::fs::remove_file(&dest).await {
                    warn!("Failed to remove partial download {}: {}", dest.display(), e);
                }
            }
            Err(AssetError::Download {
                name: name.to_string(),
                url: url.to_string(),
                reason,
                dest,
            })
        }
    }
}

async fn download_file(url: &str, dest: &Path) -> Result<(), String> {
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;

    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "model-assets-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_cached_assets_short_circuit() {
        let base = scratch_dir("cached");
        for (subdir, name) in [
            (FACE_MODEL_DIR, FACE_MODEL_NAME),
            (LANDMARK_MODEL_DIR, LANDMARK_MODEL_NAME),
        ] {
            let dir = base.join(subdir);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(name), b"cached").unwrap();
        }

        // No network touched: both files resolve from the cache
        let paths = ensure_assets(&base).await.unwrap();
        assert!(paths.face_model.ends_with(FACE_MODEL_NAME));
        assert!(paths.landmark_model.ends_with(LANDMARK_MODEL_NAME));

        std::fs::remove_dir_all(&base).ok();
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_partial_file() {
        let base = scratch_dir("partial");
        // Unroutable URL: download must fail and the destination must
        // not exist afterwards
        let result = ensure_asset(
            &base,
            "bad_models",
            "missing.onnx",
            "http://127.0.0.1:1/missing.onnx",
        )
        .await;

        assert!(result.is_err());
        assert!(!base.join("bad_models").join("missing.onnx").exists());

        std::fs::remove_dir_all(&base).ok();
    }
}
