//! `namaste-cloud` CLI for managing cloud provider credentials.
//!
//! Credentials are kept encrypted in the per-user vault directory; the active
//! provider is a plaintext selection next to them. All vault errors come back
//! as values and are presented here, at the outermost boundary.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use namaste_core::{Credential, ErrorKind, Provider, Vault, VaultPaths};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BANNER_SMALL: &str = "☁ Namaste Cloud";

// ── CLI structure ────────────────────────────────────────────────────

/// Namaste Cloud: one CLI for AWS, GCP, and Azure credentials.
#[derive(Parser)]
#[command(
    name = "namaste-cloud",
    version,
    about = "Namaste Cloud CLI for managing cloud resources",
    long_about = "A CLI tool to manage cloud resources across AWS, GCP, and Azure.",
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         NAMASTE_CLOUD_HOME         Vault directory (default: ~/.namaste-cloud)\n  \
         NAMASTE_CLOUD_SECRET_KEY   Secret key for `configure`\n  \
         NAMASTE_LOG                Log filter (default: warn)\n\n\
         {DIM}Examples:{RESET}\n  \
         namaste-cloud configure --provider aws\n  \
         namaste-cloud use-cloud aws\n  \
         namaste-cloud status"
    ),
)]
struct Cli {
    /// Directory holding config.json, credentials.enc, and keyfile.
    #[arg(long, env = "NAMASTE_CLOUD_HOME", global = true)]
    config_dir: Option<PathBuf>,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure credentials for a cloud provider.
    Configure {
        /// Cloud provider (aws, gcp, azure). Prompted when omitted.
        #[arg(long)]
        provider: Option<String>,
        /// Access key. Prompted when omitted.
        #[arg(long)]
        access_key: Option<String>,
        /// Secret key. Prompted when omitted. A value given as a flag is
        /// visible in the process list and shell history; prefer the prompt
        /// or NAMASTE_CLOUD_SECRET_KEY.
        #[arg(long, env = "NAMASTE_CLOUD_SECRET_KEY", hide_env_values = true)]
        secret_key: Option<String>,
    },
    /// Set the active cloud provider.
    #[command(name = "use-cloud")]
    UseCloud {
        /// Cloud provider (aws, gcp, azure).
        provider: String,
    },
    /// Display the current cloud provider and credential status.
    Status,
    /// List providers with stored credentials.
    List,
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

// ── Entry point ──────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("NAMASTE_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Only fails if a global subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("Welcome to Namaste Cloud CLI!");
        println!();
        Cli::command().print_help().context("failed to print help")?;
        return Ok(());
    };

    let paths = VaultPaths::resolve(cli.config_dir)?;
    debug!(dir = %paths.dir().display(), "using vault directory");
    let vault = Vault::open(&paths);

    match command {
        Commands::Configure {
            provider,
            access_key,
            secret_key,
        } => cmd_configure(&vault, provider, access_key, secret_key),
        Commands::UseCloud { provider } => cmd_use_cloud(&vault, &provider),
        Commands::Status => cmd_status(&vault, &paths),
        Commands::List => cmd_list(&vault),
    }
}

// ── Commands ─────────────────────────────────────────────────────────

fn cmd_configure(
    vault: &Vault,
    provider: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
) -> Result<()> {
    let mut input = io::stdin().lock();

    let provider = match provider {
        Some(p) => p,
        None => prompt(&mut input, "Select a cloud provider (aws, gcp, azure):\n")?,
    };
    let provider: Provider = provider.parse()?;

    if access_key.is_none() || secret_key.is_none() {
        println!("Enter credentials for {provider}:");
    }
    let access_key = match access_key {
        Some(k) => k,
        None => prompt(&mut input, "Access Key: ")?,
    };
    let secret_key = match secret_key {
        Some(k) => k,
        None => prompt(&mut input, "Secret Key: ")?,
    };

    let credential = Credential::new(provider, access_key, secret_key)
        .context("invalid credentials, please try again")?;
    vault
        .credentials()
        .save(credential)
        .context("failed to save credentials")?;

    success(&format!("Credentials for {provider} saved successfully."));
    Ok(())
}

fn cmd_use_cloud(vault: &Vault, provider: &str) -> Result<()> {
    let provider: Provider = provider.parse()?;

    match vault.credentials().get(provider) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => bail!(
            "No credentials found for {provider}. Use `namaste-cloud configure` to set them."
        ),
        Err(e) => return Err(e).context("failed to read credentials"),
    }

    vault
        .config()
        .set_active(provider)
        .context("failed to save active cloud provider")?;

    success(&format!("Active cloud provider set to: {provider}"));
    Ok(())
}

fn cmd_status(vault: &Vault, paths: &VaultPaths) -> Result<()> {
    let active = vault.config().load_active_provider()?;

    println!();
    println!("  {BANNER_SMALL} {DIM}checking credentials...{RESET}");
    println!();
    header("🔐", "Status");
    kv_line("Active Cloud Provider", active.as_str());
    kv_line("Config File", &paths.config_file().display().to_string());
    kv_line("Credentials File", &paths.credentials_file().display().to_string());
    kv_line("Key File", &paths.key_file().display().to_string());

    match vault.credentials().get(active) {
        Ok(cred) => {
            kv_line("Access Key", &mask(cred.access_key()));
            println!();
            success(&format!("Credentials for {} are valid.", cred.provider()));
            Ok(())
        }
        Err(e) => {
            println!();
            warning("Invalid or missing credentials. Use `namaste-cloud configure` to update.");
            Err(e).context(format!("credentials for {active} are unusable"))
        }
    }
}

fn cmd_list(vault: &Vault) -> Result<()> {
    let providers = vault.credentials().providers()?;
    let active = match vault.config().load_active_provider() {
        Ok(p) => Some(p),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    header("☁", "Configured Providers");
    if providers.is_empty() {
        warning("No credentials configured. Use `namaste-cloud configure` to add them.");
        return Ok(());
    }
    for provider in providers {
        let marker = if Some(provider) == active {
            format!("{GREEN}active{RESET}")
        } else {
            String::new()
        };
        kv_line(provider.as_str(), &marker);
    }
    Ok(())
}

// ── Input helpers ────────────────────────────────────────────────────

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        bail!("unexpected end of input while reading {}", label.trim().trim_end_matches(':'));
    }
    Ok(line.trim().to_owned())
}

/// Show only the last four characters of an access key.
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask("AKIAABCDEFGH"), "********EFGH");
        assert_eq!(mask("abcd"), "****");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn prompt_trims_line() {
        let mut input = io::Cursor::new(b"  AWS \n".to_vec());
        assert_eq!(prompt(&mut input, "").ok(), Some("AWS".to_owned()));
    }

    #[test]
    fn prompt_fails_on_eof() {
        let mut input = io::Cursor::new(Vec::new());
        assert!(prompt(&mut input, "Access Key: ").is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
