//! `mcc interactive` – prompt loop reading URLs from stdin.

use anyhow::Result;
use mcc_core::config::MccConfig;
use mcc_core::submit::{Outcome, Submitter};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::flash::FlashRenderer;
use crate::cli::menu::MenuPanel;

pub async fn run_interactive(cfg: &MccConfig) -> Result<()> {
    let download_dir = match cfg.download_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let ui = Arc::new(FlashRenderer::transient());
    let sink: Arc<dyn mcc_core::notify::UiSink> = ui.clone();
    let submitter = Submitter::new(&cfg.service_url, download_dir, sink)
        .with_quality(cfg.default_quality)
        .with_timeout(cfg.request_timeout_secs.map(Duration::from_secs))
        .with_profile(cfg.fingerprint_profile());

    let mut panel = MenuPanel::new();
    println!("Paste a video URL and press Enter. '?' toggles the menu, 'quit' exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        ui.settle().await;
        print!("mcc> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        let input = line.trim();

        match input {
            "quit" | "exit" => break,
            "?" => {
                if panel.toggle() {
                    for (i, section) in MenuPanel::sections().iter().enumerate() {
                        println!("  {}. {} ({})", i + 1, section.title, section.id);
                    }
                } else {
                    println!("(menu closed)");
                }
                continue;
            }
            _ => {}
        }

        if panel.is_open() {
            if let Some(section) = panel.follow(input) {
                println!("-- {} --", section.title);
                println!("{}", section.body);
                continue;
            }
        }

        if let Outcome::Converted { file: Some(f), .. } = submitter.submit(input).await {
            println!("Saved {} ({} bytes)", f.path.display(), f.bytes);
        }
    }

    ui.settle().await;
    Ok(())
}
