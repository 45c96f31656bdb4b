//! Trust store construction from a root certificate and optional CRL.
//!
//! Two OpenSSL stores are built from identical inputs. The strict store is
//! used for every first verification pass. The time-agnostic store adds
//! `NO_CHECK_TIME` and is only consulted when a caller asked to tolerate
//! expired certificates.

use crate::SigError;
use openssl::ssl::SslFiletype;
use openssl::x509::store::{X509Lookup, X509Store, X509StoreBuilder, X509StoreRef};
use openssl::x509::verify::X509VerifyFlags;
use openssl::x509::X509PurposeId;
use std::path::{Path, PathBuf};

/// OpenSSL verification stores anchored at a single root certificate.
pub struct TrustStore {
    strict: X509Store,
    time_agnostic: X509Store,
    root_path: PathBuf,
    crl_path: Option<PathBuf>,
}

impl std::fmt::Debug for TrustStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustStore")
            .field("root_path", &self.root_path)
            .field("crl_path", &self.crl_path)
            .finish()
    }
}

impl TrustStore {
    /// Build the stores for `root_path` (PEM), with revocation checking for
    /// the whole chain when `crl_path` is given.
    ///
    /// Purpose is set to "any": only chain structure, dates and revocation
    /// are enforced here.
    ///
    /// # Errors
    ///
    /// [`SigError::StoreCreation`] on any allocation or certificate load
    /// failure, [`SigError::CrlLoad`] if a supplied CRL cannot be loaded.
    /// A CRL path that was given is never silently ignored.
    pub fn build(root_path: &Path, crl_path: Option<&Path>) -> Result<Self, SigError> {
        let strict = build_store(root_path, crl_path, X509VerifyFlags::empty())?;
        let time_agnostic = build_store(root_path, crl_path, X509VerifyFlags::NO_CHECK_TIME)?;
        log::debug!(
            "Trust store built from {} (crl: {})",
            root_path.display(),
            crl_path.map_or_else(|| "none".into(), |p| p.display().to_string())
        );
        Ok(TrustStore {
            strict,
            time_agnostic,
            root_path: root_path.to_path_buf(),
            crl_path: crl_path.map(Path::to_path_buf),
        })
    }

    pub(crate) fn strict(&self) -> &X509StoreRef {
        &self.strict
    }

    /// Same contents as the strict store, with validity dates unchecked.
    pub(crate) fn time_agnostic(&self) -> &X509StoreRef {
        &self.time_agnostic
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn crl_path(&self) -> Option<&Path> {
        self.crl_path.as_deref()
    }

    /// Whether revocation is checked for every chain element.
    pub fn checks_revocation(&self) -> bool {
        self.crl_path.is_some()
    }
}

fn build_store(
    root_path: &Path,
    crl_path: Option<&Path>,
    extra_flags: X509VerifyFlags,
) -> Result<X509Store, SigError> {
    let store_err = |step: &str, reason: String| SigError::StoreCreation {
        path: root_path.to_path_buf(),
        reason: format!("{}: {}", step, reason),
    };

    // X509_load_cert_file takes a C string; reject paths OpenSSL cannot be given.
    if root_path.to_str().is_none() {
        return Err(store_err("path", "not valid UTF-8".into()));
    }

    let mut builder =
        X509StoreBuilder::new().map_err(|e| store_err("X509_STORE_new", e.to_string()))?;
    builder
        .set_purpose(X509PurposeId::ANY)
        .map_err(|e| store_err("X509_STORE_set_purpose", e.to_string()))?;
    builder
        .add_lookup(X509Lookup::file())
        .map_err(|e| store_err("X509_STORE_add_lookup", e.to_string()))?
        .load_cert_file(root_path, SslFiletype::PEM)
        .map_err(|e| store_err("X509_load_cert_file", e.to_string()))?;

    let mut flags = extra_flags;
    if let Some(crl_path) = crl_path {
        let crl_err = |reason: String| SigError::CrlLoad {
            path: crl_path.to_path_buf(),
            reason,
        };
        if crl_path.to_str().is_none() {
            return Err(crl_err("path is not valid UTF-8".into()));
        }
        let loaded = builder
            .add_lookup(X509Lookup::file())
            .map_err(|e| crl_err(e.to_string()))?
            .load_crl_file(crl_path, SslFiletype::PEM)
            .map_err(|e| crl_err(e.to_string()))?;
        if loaded < 1 {
            return Err(crl_err("no revocation list found in file".into()));
        }
        flags |= X509VerifyFlags::CRL_CHECK | X509VerifyFlags::CRL_CHECK_ALL;
    }

    if !flags.is_empty() {
        builder
            .set_flags(flags)
            .map_err(|e| store_err("X509_STORE_set_flags", e.to_string()))?;
    }

    Ok(builder.build())
}
