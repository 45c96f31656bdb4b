//! sigtrust-lib: Trust-anchored verification of detached PKCS#7 signatures.
//!
//! A single root certificate (optionally paired with a CRL) is loaded and
//! validated once into a [`TrustContext`]. Every later call checks a detached
//! DER-encoded PKCS#7 signature over a byte buffer or a file against that
//! anchor and yields a plain trust decision.
//!
//! Certificate inspection (subject, issuer, validity window, extensions) is
//! provided alongside for operator diagnostics.

mod certificate;
mod display;
mod fields;
mod fingerprint;
pub mod global;
mod oid;
mod parser;
mod util;
pub mod verify;

use std::path::PathBuf;

pub use certificate::{certificate_report, load_certificate, print_certificate_info, Certificate};
pub use display::{display_text, to_json};
pub use fields::{
    AiaEntry, CertificateInfo, DateTime, DigestAlgorithm, DistinguishedName, Extension,
    ExtensionValue, PublicKeyInfo,
};
pub use fingerprint::compute_fingerprint;
pub use parser::{parse_der, parse_pem};
pub use util::is_pem;
pub use verify::{
    authority_access_is_safely_handled, is_acceptable, ChainFailure, TrustContext, TrustStore,
    VerifyOptions,
};

/// Errors returned by sigtrust-lib.
#[derive(Debug, thiserror::Error)]
pub enum SigError {
    /// The certificate file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not a valid PEM certificate.
    #[error("Failed to parse certificate {}: {reason}", path.display())]
    ParseFailure { path: PathBuf, reason: String },

    /// DER-level parse error with no file attached.
    #[error("Invalid DER format: {0}")]
    DerError(String),

    /// Invalid PEM framing with no file attached.
    #[error("Invalid PEM format: {0}")]
    PemError(String),

    #[error("Failed to build trust store for {}: {reason}", path.display())]
    StoreCreation { path: PathBuf, reason: String },

    #[error("Failed to load CRL {}: {reason}", path.display())]
    CrlLoad { path: PathBuf, reason: String },

    #[error("Certificate chain invalid: {0}")]
    ChainInvalid(#[from] ChainFailure),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Signature does not match data: {0}")]
    SignatureMismatch(String),

    /// Open, stat or read failure while acquiring file content.
    #[error("Failed to {step} {}: {source}", path.display())]
    Io {
        step: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Trust context is not initialized")]
    NotInitialized,

    #[error("Trust context is already initialized")]
    AlreadyInitialized,

    /// The process-wide context was released and cannot be installed again.
    #[error("Trust context has been torn down")]
    TornDown,

    #[error("OpenSSL error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
