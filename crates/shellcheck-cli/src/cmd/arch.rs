//! Arch command

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use serde::Serialize;
use shellcheck_schema::{Architecture, reported_cpu, reported_os_name};

#[derive(Serialize)]
struct ArchReport<'a> {
    os: &'a str,
    cpu: &'a str,
    #[serde(flatten)]
    arch: Option<&'a Architecture>,
    supported: bool,
}

/// Show the detected platform and the sources its binary would come from.
pub fn arch(json: bool, list: bool) -> Result<()> {
    if list {
        for key in Architecture::known_platform_keys() {
            println!("{key}");
        }
        return Ok(());
    }

    let os = reported_os_name(std::env::consts::OS);
    let cpu = reported_cpu(std::env::consts::OS, std::env::consts::ARCH);
    let detected = Architecture::detect();

    if json {
        let report = ArchReport {
            os,
            cpu,
            arch: detected.as_ref().ok(),
            supported: detected.is_ok(),
        };
        let out = serde_json::to_string_pretty(&report).context("Failed to encode JSON")?;
        println!("{out}");
        return Ok(());
    }

    let lw = 12;
    println!();
    match &detected {
        Ok(arch) => {
            println!("  {}", arch.platform_key().white().bold());
            println!();
            println!("  {:<lw$}{}", "family", arch.os_family());
            println!("  {:<lw$}{}", "download", arch.default_download_url());
            println!("  {:<lw$}{}", "embedded", arch.embedded_bin_path());
            println!("  {:<lw$}{}", "archive", arch.archive_binary_path());
        }
        Err(e) => {
            println!("  {} {os} / {cpu}", "unsupported".red().bold());
            println!("  {e}");
        }
    }
    println!();
    Ok(())
}
