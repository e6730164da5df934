use anyhow::{bail, Context, Result};
use console::{style, Term};
use dialoguer::{Input, Password};
use serde::Serialize;
use std::io::{self, BufRead, IsTerminal, Read};
use std::path::Path;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use tshare::config::Config;
use tshare::fingerprint::Fingerprint;
use tshare::shamir;

/// One line of `split --json` output
#[derive(Debug, Serialize)]
struct ShareRecord<'a> {
    x: usize,
    share: &'a str,
    fingerprint: String,
}

/// Execute the split command
pub fn split(
    config: &Config,
    threshold: Option<usize>,
    shares: Option<usize>,
    secret: Option<String>,
    json: bool,
) -> Result<()> {
    let threshold = threshold.unwrap_or(config.default_threshold);
    let shares = shares.unwrap_or(config.default_shares);

    let secret = read_secret(secret)?;
    if secret.is_empty() {
        bail!("Secret cannot be empty");
    }

    let mut encoded = shamir::split_secret(&secret, threshold, shares)
        .context("Failed to split secret")?;
    info!(threshold, shares, "secret split");

    if json {
        let records = encoded
            .iter()
            .enumerate()
            .map(|(i, share)| ShareRecord {
                x: i + 1,
                share,
                fingerprint: Fingerprint::of(share).to_string(),
            })
            .collect::<Vec<_>>();
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to serialize shares")?
        );
    } else if Term::stdout().is_term() {
        println!("{}", style("Your Shares:").green().bold());
        println!("{}", style("─".repeat(50)).dim());
        for (i, share) in encoded.iter().enumerate() {
            println!(
                "{:>3}  {}  {}",
                style(i + 1).bold(),
                share,
                style(Fingerprint::of(share)).dim()
            );
        }
        println!("{}", style("─".repeat(50)).dim());
        println!(
            "\nAny {} of these {} shares recover the secret; fewer reveal nothing.",
            style(threshold).bold(),
            shares
        );
        println!(
            "{}",
            style("Shares do not record the threshold. Keep a note of it.").yellow()
        );
    } else {
        for share in &encoded {
            println!("{share}");
        }
    }

    encoded.zeroize();
    Ok(())
}

/// Execute the combine command
pub fn combine(threshold: Option<usize>, shares: Vec<String>) -> Result<()> {
    let mut shares = if shares.is_empty() {
        read_shares()?
    } else {
        shares
    };

    for share in &shares {
        debug!(fingerprint = %Fingerprint::of(share), "share supplied");
    }

    if let Some(needed) = threshold {
        if shares.len() < needed {
            warn!(supplied = shares.len(), needed, "fewer shares than the threshold");
            eprintln!(
                "{}",
                style(format!(
                    "Warning: {} shares supplied but {} are needed; the result will be wrong.",
                    shares.len(),
                    needed
                ))
                .yellow()
            );
        }
    }

    let mut recovered = shamir::reconstruct(&shares).context("Failed to reconstruct secret")?;
    shares.zeroize();

    if !recovered.is_text() {
        warn!("recovered bytes are not valid utf-8");
        eprintln!(
            "{}",
            style("Warning: the recovered secret is not text. Too few shares, or shares from different splits?")
                .yellow()
        );
    }

    println!("{recovered}");
    recovered.zeroize();

    Ok(())
}

/// Execute the init command
pub fn init(
    path: &Path,
    threshold: Option<usize>,
    shares: Option<usize>,
    force: bool,
) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let defaults = Config::default();
    let config = Config {
        default_threshold: threshold.unwrap_or(defaults.default_threshold),
        default_shares: shares.unwrap_or(defaults.default_shares),
        ..defaults
    };
    config.save(path)?;

    println!(
        "{} {}",
        style("Configuration saved to").green(),
        path.display()
    );

    Ok(())
}

/// Execute the config command
pub fn show_config(path: &Path, config: &Config) -> Result<()> {
    let state = if path.exists() {
        "present"
    } else {
        "not found, using defaults"
    };

    println!("{}", style("Configuration").bold());
    println!("Config file: {} ({})", path.display(), state);
    println!("Default threshold: {}", config.default_threshold);
    println!("Default shares: {}", config.default_shares);
    println!("Log level: {}", config.log_level);

    Ok(())
}

fn read_secret(arg: Option<String>) -> Result<Zeroizing<String>> {
    if let Some(secret) = arg {
        return Ok(Zeroizing::new(secret));
    }

    if io::stdin().is_terminal() {
        let secret = Password::new()
            .with_prompt("Enter secret")
            .with_confirmation("Repeat secret", "Secrets do not match")
            .interact()?;
        return Ok(Zeroizing::new(secret));
    }

    let mut secret = Zeroizing::new(String::new());
    io::stdin()
        .read_to_string(&mut secret)
        .context("Failed to read secret from stdin")?;

    // Drop the single line ending an `echo` or heredoc leaves behind
    if secret.ends_with('\n') {
        secret.pop();
        if secret.ends_with('\r') {
            secret.pop();
        }
    }

    Ok(secret)
}

fn read_shares() -> Result<Vec<String>> {
    let mut shares = Vec::new();

    if io::stdin().is_terminal() {
        eprintln!("Enter shares one per line; finish with an empty line.");
        loop {
            let share: String = Input::new()
                .with_prompt(format!("Share #{}", shares.len() + 1))
                .allow_empty(true)
                .interact_text()?;

            if share.trim().is_empty() {
                break;
            }
            shares.push(share.trim().to_string());
        }
        return Ok(shares);
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read shares from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            shares.push(line.to_string());
        }
    }

    Ok(shares)
}
