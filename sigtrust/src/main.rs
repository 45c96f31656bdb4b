//! sigtrust: Command-line front end for detached PKCS#7 signature checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sigtrust_lib::{DigestAlgorithm, TrustContext, VerifyOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "sigtrust",
    about = "Verify detached PKCS#7 signatures against a single trusted root",
    long_about = "sigtrust checks that a file was signed by a certificate chaining to\n\
                  one trusted root certificate, optionally consulting a CRL for every\n\
                  certificate in the chain.\n\n\
                  Signatures are DER-encoded detached PKCS#7 SignedData. The signer\n\
                  certificate must be embedded in the signature.",
    after_help = "EXAMPLES:\n\
                  \n  sigtrust verify --cert root.pem Manifest.MoM Manifest.MoM.sig\
                  \n  sigtrust verify --cert root.pem --crl root.crl data data.sig\
                  \n  sigtrust verify --cert root.pem --ignore-expiration data data.sig\
                  \n  sigtrust verify-root --cert root.pem\
                  \n  sigtrust show --json root.pem\
                  \n  sigtrust info root.pem"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a detached signature over a file (exit 0 = trusted, 2 = fail)
    #[command(after_help = "EXAMPLES:\n\
                      \n  sigtrust verify --cert root.pem Manifest.MoM Manifest.MoM.sig\
                      \n  sigtrust verify --cert root.pem --crl root.crl data data.sig\
                      \n  sigtrust verify --cert root.pem --quiet data data.sig")]
    Verify {
        #[command(flatten)]
        anchor: AnchorArgs,
        /// Accept certificates whose validity period has ended
        #[arg(long)]
        ignore_expiration: bool,
        /// Do not log the reason for a failed check
        #[arg(short, long)]
        quiet: bool,
        /// File whose content was signed
        file: PathBuf,
        /// DER-encoded detached PKCS#7 signature
        signature: PathBuf,
    },
    /// Load and validate the trusted root only (exit 0 = usable, 2 = fail)
    #[command(after_help = "EXAMPLES:\n\
                      \n  sigtrust verify-root --cert root.pem\
                      \n  sigtrust verify-root --cert root.pem --crl root.crl")]
    VerifyRoot {
        #[command(flatten)]
        anchor: AnchorArgs,
    },
    /// Display certificate information with its SHA-256 fingerprint
    #[command(after_help = "EXAMPLES:\n\
                      \n  sigtrust show root.pem\
                      \n  sigtrust show --json root.pem\
                      \n  sigtrust show signer.der\
                      \n  cat root.pem | sigtrust show")]
    Show {
        /// Certificate file (PEM or DER). Reads from stdin if omitted.
        file: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Log issuer, subject and the raw PEM of a certificate file
    Info {
        /// PEM certificate file
        file: PathBuf,
    },
}

#[derive(clap::Args)]
struct AnchorArgs {
    /// PEM file holding the trusted root certificate
    #[arg(long = "cert", value_name = "ROOT")]
    cert: PathBuf,
    /// PEM certificate revocation list checked for every chain element
    #[arg(long, value_name = "CRL")]
    crl: Option<PathBuf>,
}

impl AnchorArgs {
    fn init(&self) -> Result<TrustContext, sigtrust_lib::SigError> {
        TrustContext::init(&self.cert, self.crl.as_deref())
    }
}

/// Maximum size for certificate inputs read by `show` (64 MiB).
const MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            let meta = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat file: {}", path.display()))?;
            if meta.len() > MAX_INPUT_BYTES {
                anyhow::bail!(
                    "File too large ({} bytes, max {} bytes): {}",
                    meta.len(),
                    MAX_INPUT_BYTES,
                    path.display()
                );
            }
            std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .take(MAX_INPUT_BYTES)
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn parse_input(input: &[u8]) -> Result<sigtrust_lib::CertificateInfo> {
    if sigtrust_lib::is_pem(input) {
        Ok(sigtrust_lib::parse_pem(input)?)
    } else {
        Ok(sigtrust_lib::parse_der(input)?)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Verify {
            anchor,
            ignore_expiration,
            quiet,
            file,
            signature,
        } => {
            let ctx = match anchor.init() {
                Ok(ctx) => ctx,
                Err(e) => {
                    log::error!("{e}");
                    std::process::exit(2);
                }
            };
            let options = VerifyOptions::default()
                .with_ignore_expiration(*ignore_expiration)
                .with_print_errors(!*quiet);
            if ctx.verify_files(file, signature, options) {
                println!("{}: OK", file.display());
            } else {
                println!("{}: FAIL", file.display());
                std::process::exit(2);
            }
        }
        Commands::VerifyRoot { anchor } => match anchor.init() {
            Ok(ctx) => {
                println!("{}: OK", ctx.anchor().subject());
                if let Some(crl) = ctx.store().crl_path() {
                    println!("CRL: {}", crl.display());
                }
            }
            Err(e) => {
                log::error!("{e}");
                std::process::exit(2);
            }
        },
        Commands::Show { file, json } => {
            let input = read_input(file.as_deref())?;
            let cert = parse_input(&input)?;
            if *json {
                println!("{}", sigtrust_lib::to_json(&cert)?);
            } else {
                print!("{}", sigtrust_lib::display_text(&cert, DigestAlgorithm::Sha256));
            }
        }
        Commands::Info { file } => {
            read_input(Some(file.as_path()))?;
            sigtrust_lib::print_certificate_info(file);
        }
    }

    Ok(())
}
