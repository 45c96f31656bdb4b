//! Loading a single PEM certificate from disk, and the operator dump.

use crate::fields::CertificateInfo;
use crate::parser;
use crate::SigError;
use openssl::x509::{X509Ref, X509};
use std::io::Read;
use std::path::{Path, PathBuf};

/// A parsed certificate: the OpenSSL handle used for verification plus the
/// inspected fields used for policy checks and diagnostics.
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
    info: CertificateInfo,
    path: PathBuf,
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("path", &self.path)
            .field("subject", &self.info.subject_string())
            .finish()
    }
}

impl Certificate {
    pub fn x509(&self) -> &X509Ref {
        &self.x509
    }

    pub fn info(&self) -> &CertificateInfo {
        &self.info
    }

    /// Path the certificate was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn subject(&self) -> String {
        self.info.subject_string()
    }

    pub fn issuer(&self) -> String {
        self.info.issuer_string()
    }
}

/// Load exactly one PEM-encoded X.509 certificate from `path`.
///
/// Only the first `CERTIFICATE` block is read; text before it is skipped.
///
/// # Errors
///
/// [`SigError::NotFound`] if the file cannot be opened, [`SigError::ParseFailure`]
/// if it does not hold a PEM certificate that can be inspected.
pub fn load_certificate(path: impl AsRef<Path>) -> Result<Certificate, SigError> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path).map_err(|source| SigError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let mut pem = Vec::new();
    file.read_to_end(&mut pem).map_err(|source| SigError::Io {
        step: "read",
        path: path.to_path_buf(),
        source,
    })?;

    let parse_failure = |reason: String| SigError::ParseFailure {
        path: path.to_path_buf(),
        reason,
    };

    if pem.is_empty() {
        return Err(parse_failure("empty file".into()));
    }

    let x509 = X509::from_pem(&pem).map_err(|e| parse_failure(e.to_string()))?;
    let der = x509.to_der().map_err(|e| parse_failure(e.to_string()))?;
    let info = parser::parse_der(&der).map_err(|e| parse_failure(e.to_string()))?;

    Ok(Certificate {
        x509,
        info,
        path: path.to_path_buf(),
    })
}

/// Issuer and subject of the certificate at `path`, followed by the raw
/// content of the file.
pub fn certificate_report(path: impl AsRef<Path>) -> Result<String, SigError> {
    let path = path.as_ref();
    let cert = load_certificate(path)?;
    let content = std::fs::read(path).map_err(|source| SigError::Io {
        step: "read",
        path: path.to_path_buf(),
        source,
    })?;

    let mut report = format!("Issuer: {}\nSubject: {}\n\n", cert.issuer(), cert.subject());
    report.push_str(&String::from_utf8_lossy(&content));
    Ok(report)
}

/// Log the subject, issuer and full file content of a certificate.
///
/// Meant for operators; failures are logged and never returned.
pub fn print_certificate_info(path: impl AsRef<Path>) {
    match certificate_report(path.as_ref()) {
        Ok(report) => {
            for line in report.lines() {
                log::info!("{}", line);
            }
        }
        Err(e) => log::error!("Invalid certificate - {}", e),
    }
}
