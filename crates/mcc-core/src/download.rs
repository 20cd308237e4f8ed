//! Download-link fetch.
//!
//! A successful conversion returns a (usually relative) download link; this
//! module resolves it against the service base URL and streams the body to a
//! file in the download directory with a single sequential GET. Runs in the
//! current thread; call from `spawn_blocking` if used from async code.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

use curl::easy::Easy;
use thiserror::Error;

use crate::filename;

/// A fetched conversion on disk.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid download link: {0}")]
    BadLink(#[from] url::ParseError),
    #[error("download failed: {0}")]
    Transport(#[from] curl::Error),
    #[error("download returned HTTP {0}")]
    Http(u32),
    #[error("could not write download: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves `download_url` against the service base (absolute links pass
/// through unchanged).
pub fn resolve_download_url(service_url: &str, download_url: &str) -> Result<String, FetchError> {
    let base = url::Url::parse(service_url)?;
    Ok(base.join(download_url)?.into())
}

/// GETs `url` into `dir`, naming the file from the `Content-Disposition`
/// header, the `title` hint, or the URL path. The body streams to a scratch
/// file that is renamed on success and removed on failure.
pub fn fetch_to_dir(
    url: &str,
    dir: &Path,
    title: Option<&str>,
    timeout: Option<Duration>,
) -> Result<FetchedFile, FetchError> {
    std::fs::create_dir_all(dir)?;
    let part_path = dir.join(".mcc-fetch.part");
    let mut out = File::create(&part_path)?;

    let mut bytes: u64 = 0;
    let mut content_disposition: Option<String> = None;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    if let Some(t) = timeout {
        easy.timeout(t)?;
    }

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Ok(s) = str::from_utf8(line) {
                if let Some((name, value)) = s.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-disposition") {
                        content_disposition = Some(value.trim().to_string());
                    }
                }
            }
            true
        })?;
        transfer.write_function(|data| match out.write_all(data) {
            Ok(()) => {
                bytes += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        let _ = std::fs::remove_file(&part_path);
        return Err(FetchError::Io(e));
    }
    if let Err(e) = perform_result {
        let _ = std::fs::remove_file(&part_path);
        return Err(FetchError::Transport(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        let _ = std::fs::remove_file(&part_path);
        return Err(FetchError::Http(code));
    }

    out.flush()?;
    drop(out);

    let name = filename::derive_filename(url, content_disposition.as_deref(), title);
    let target = unique_path(dir, &name);
    std::fs::rename(&part_path, &target)?;
    tracing::info!(path = %target.display(), bytes, "download fetched");

    Ok(FetchedFile {
        path: target,
        bytes,
    })
}

/// First free path for `name` in `dir`, browser style: `song.mp3`,
/// `song (1).mp3`, `song (2).mp3`, ...
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) if !s.is_empty() => (s, Some(e)),
        _ => (name, None),
    };
    for n in 1u32.. {
        let candidate = match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        };
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("exhausted u32 duplicate suffixes");
}
