//! The owned trust context.

use super::chain::validate_anchor;
use super::file::FileView;
use super::signature::check_detached;
use super::trust_store::TrustStore;
use super::VerifyOptions;
use crate::certificate::{load_certificate, Certificate};
use crate::SigError;
use openssl::stack::Stack;
use openssl::x509::X509;
use std::path::Path;

/// A validated trust anchor with its stores and signer candidate set.
///
/// Built once by [`TrustContext::init`] and immutable afterwards, so a
/// shared reference can serve concurrent verification calls.
pub struct TrustContext {
    anchor: Certificate,
    store: TrustStore,
    candidates: Stack<X509>,
}

impl std::fmt::Debug for TrustContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustContext")
            .field("anchor", &self.anchor)
            .field("store", &self.store)
            .finish()
    }
}

impl TrustContext {
    /// Load the root certificate at `root_path`, build the trust store (with
    /// `crl_path` when given) and validate the root against it.
    ///
    /// # Errors
    ///
    /// Any load, store or validation failure. Nothing is retained on error.
    pub fn init(root_path: impl AsRef<Path>, crl_path: Option<&Path>) -> Result<Self, SigError> {
        let root_path = root_path.as_ref();
        let anchor = load_certificate(root_path)?;
        let store = TrustStore::build(root_path, crl_path)?;
        validate_anchor(&store, &anchor)?;

        let mut candidates = Stack::new()?;
        candidates.push(anchor.x509().to_owned())?;

        log::debug!("Trust anchor loaded: {}", anchor.subject());
        Ok(TrustContext {
            anchor,
            store,
            candidates,
        })
    }

    /// The validated root certificate.
    pub fn anchor(&self) -> &Certificate {
        &self.anchor
    }

    pub fn store(&self) -> &TrustStore {
        &self.store
    }

    /// Check a detached DER PKCS#7 `signature` over `data`.
    ///
    /// An empty `data` buffer is valid input; an empty `signature` is
    /// always [`SigError::MalformedSignature`].
    pub fn check_data(
        &self,
        data: &[u8],
        signature: &[u8],
        options: VerifyOptions,
    ) -> Result<(), SigError> {
        check_detached(&self.store, &self.candidates, data, signature, options)
    }

    /// [`check_data`](Self::check_data) as a trust decision. With
    /// `print_errors` the failure is logged.
    pub fn verify_data(&self, data: &[u8], signature: &[u8], options: VerifyOptions) -> bool {
        match self.check_data(data, signature, options) {
            Ok(()) => true,
            Err(e) => {
                if options.print_errors {
                    log::debug!("{}", e);
                }
                false
            }
        }
    }

    /// Check the file at `signature_path` as a detached signature over the
    /// file at `data_path`.
    ///
    /// The signature file is acquired first, then the data file. Open, stat
    /// or read failures are returned as [`SigError::Io`] without running
    /// any signature check.
    pub fn check_files(
        &self,
        data_path: impl AsRef<Path>,
        signature_path: impl AsRef<Path>,
        options: VerifyOptions,
    ) -> Result<(), SigError> {
        let signature = FileView::open(signature_path.as_ref())?;
        let data = FileView::open(data_path.as_ref())?;
        self.check_data(data.bytes(), signature.bytes(), options)
    }

    /// [`check_files`](Self::check_files) as a trust decision.
    pub fn verify_files(
        &self,
        data_path: impl AsRef<Path>,
        signature_path: impl AsRef<Path>,
        options: VerifyOptions,
    ) -> bool {
        match self.check_files(data_path, signature_path, options) {
            Ok(()) => true,
            Err(e) => {
                if options.print_errors {
                    log::debug!("{}", e);
                    log::warn!("Signature check failed");
                }
                false
            }
        }
    }
}
