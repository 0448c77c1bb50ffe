//! Terminal progress output. Everything goes to stderr so stdout only ever
//! carries the resolved path.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::style::Stylize;
use shellcheck_core::Reporter;
use shellcheck_schema::ResolutionMethod;

/// Reporter printing short status lines to stderr.
#[derive(Debug, Default)]
pub struct StderrReporter {
    quiet: bool,
    last_decile: AtomicU64,
}

impl StderrReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            last_decile: AtomicU64::new(0),
        }
    }
}

impl Reporter for StderrReporter {
    fn resolving(&self, method: ResolutionMethod, platform_key: &str) {
        if !self.quiet {
            eprintln!(
                "{} shellcheck ({method}) for {}",
                "Resolving".cyan().bold(),
                platform_key.dark_grey()
            );
        }
    }

    fn downloading(&self, url: &str, current: u64, total: Option<u64>) {
        if self.quiet {
            return;
        }
        if current == 0 {
            self.last_decile.store(0, Ordering::Relaxed);
            eprintln!("  {} {url}", "Downloading".cyan());
            return;
        }
        let Some(total) = total.filter(|t| *t > 0) else {
            return;
        };
        let decile = current.saturating_mul(10) / total;
        if decile > self.last_decile.swap(decile, Ordering::Relaxed) {
            eprintln!("  {:>3}% of {}", decile * 10, format_size(total));
        }
    }

    fn cached(&self, _url: &str, archive: &Path) {
        if !self.quiet {
            eprintln!("  {} {}", "Cached".green(), archive.display());
        }
    }

    fn extracting(&self, _archive: &Path, dest: &Path) {
        if !self.quiet {
            eprintln!("  {} into {}", "Unpacking".cyan(), dest.display());
        }
    }

    fn resolved(&self, binary: &Path) {
        if !self.quiet {
            eprintln!("{} {}", "Resolved".green().bold(), binary.display());
        }
    }

    fn warning(&self, msg: &str) {
        eprintln!("{} {msg}", "warning:".yellow().bold());
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
