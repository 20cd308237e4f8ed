//! `mcc convert <url>` – one-shot conversion.

use anyhow::Result;
use mcc_core::config::MccConfig;
use mcc_core::submit::{Outcome, Submitter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::flash::FlashRenderer;

pub async fn run_convert(
    cfg: &MccConfig,
    url: &str,
    quality: Option<u32>,
    download_dir: Option<PathBuf>,
) -> Result<()> {
    let download_dir = match download_dir.or_else(|| cfg.download_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let ui = Arc::new(FlashRenderer::plain());
    let submitter = Submitter::new(&cfg.service_url, download_dir, ui)
        .with_quality(quality.or(cfg.default_quality))
        .with_timeout(cfg.request_timeout_secs.map(Duration::from_secs))
        .with_profile(cfg.fingerprint_profile());

    match submitter.submit(url).await {
        Outcome::Converted { file: Some(f), .. } => {
            println!("Saved {} ({} bytes)", f.path.display(), f.bytes);
            Ok(())
        }
        Outcome::Converted { file: None, .. } => {
            anyhow::bail!("conversion succeeded but the download could not be fetched")
        }
        Outcome::EmptyInput => anyhow::bail!("no URL given"),
        Outcome::InvalidUrl => anyhow::bail!("unsupported video URL"),
        // One-shot commands own their submitter, so nothing else can be in
        // flight; kept for completeness.
        Outcome::Busy => Ok(()),
        Outcome::Failed(e) => Err(e.into()),
    }
}
