//! Trust anchoring and detached-signature verification.
//!
//! A [`TrustContext`] owns the validated root certificate, the OpenSSL
//! trust stores built from it and the signer candidate set. Verification
//! calls borrow the context immutably; per-call policy such as expiration
//! tolerance travels in [`VerifyOptions`] and never touches shared state.

mod authority;
mod chain;
mod context;
mod file;
mod signature;
mod trust_store;

pub use authority::authority_access_is_safely_handled;
pub use chain::{is_acceptable, ChainFailure};
pub use context::TrustContext;
pub use trust_store::TrustStore;

/// Per-call verification options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifyOptions {
    /// Accept a chain whose only failure is an expired certificate.
    pub ignore_expiration: bool,
    /// Log a diagnostic when verification fails.
    pub print_errors: bool,
}

impl VerifyOptions {
    pub fn with_ignore_expiration(mut self, ignore_expiration: bool) -> Self {
        self.ignore_expiration = ignore_expiration;
        self
    }

    pub fn with_print_errors(mut self, print_errors: bool) -> Self {
        self.print_errors = print_errors;
        self
    }
}
