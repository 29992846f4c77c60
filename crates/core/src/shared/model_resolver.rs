use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model file not found at {0}")]
    Missing(PathBuf),
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where a model file may come from, in priority order.
#[derive(Debug, Clone, Default)]
pub struct ModelSource {
    /// Explicit file chosen by the user; never downloaded over.
    pub explicit: Option<PathBuf>,
    /// Directory shipped alongside the binary.
    pub bundled_dir: Option<PathBuf>,
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. Explicit path (must exist)
/// 2. User cache directory (platform-specific)
/// 3. Bundled directory
/// 4. Download from URL to cache
pub fn resolve(
    name: &str,
    url: &str,
    source: &ModelSource,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = &source.explicit {
        return if path.is_file() {
            Ok(path.clone())
        } else {
            Err(ModelResolveError::Missing(path.clone()))
        };
    }
    let cache_dir = model_cache_dir()?;
    resolve_in(&cache_dir, name, url, source.bundled_dir.as_deref(), progress)
}

fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.is_file() {
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.is_file() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {name} from {url}");
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/DocPrivacy/models/`
/// - Linux: `$XDG_CACHE_HOME/DocPrivacy/models/` or `~/.cache/DocPrivacy/models/`
/// - Windows: `%LOCALAPPDATA%/DocPrivacy/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("DocPrivacy").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("DocPrivacy").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let download_err = |source| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;
    let total = response.content_length().unwrap_or(0);

    // Write to a temp file first, then rename so a failed download leaves nothing behind
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(write_error(&temp_path))?;

    let mut buf = vec![0u8; 1024 * 1024];
    let mut downloaded: u64 = 0;
    let copied = loop {
        let n = match response.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(e) => break Err(e),
        };
        if let Err(e) = file.write_all(&buf[..n]) {
            break Err(e);
        }
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    };

    let finished = copied.and_then(|_| file.flush());
    drop(file);
    if let Err(e) = finished {
        let _ = fs::remove_file(&temp_path);
        return Err(ModelResolveError::Write {
            path: temp_path,
            source: e,
        });
    }

    fs::rename(&temp_path, dest).map_err(write_error(dest))?;
    Ok(())
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> ModelResolveError {
    let path = path.to_path_buf();
    move |source| ModelResolveError::Write { path, source }
}
