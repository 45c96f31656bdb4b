//! Certificate chain validation against a [`TrustStore`].
//!
//! Every certificate is first verified against the strict store. A failure
//! is classified into a [`ChainFailure`]; [`is_acceptable`] then decides,
//! from the failure and the caller's options alone, whether a second pass
//! against the time-agnostic store may rescue it. Store state is never
//! mutated between passes.

use super::authority::authority_access_is_safely_handled;
use super::trust_store::TrustStore;
use super::VerifyOptions;
use crate::certificate::Certificate;
use crate::fields::{local_clock_string, CertificateInfo};
use crate::SigError;
use openssl::asn1::Asn1Time;
use openssl::stack::{Stack, StackRef};
use openssl::x509::store::X509StoreRef;
use openssl::x509::{X509Ref, X509StoreContext, X509StoreContextRef, X509};
use std::cmp::Ordering;

/// Why a certificate chain did not verify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainFailure {
    #[error("certificate has expired (depth {depth})")]
    Expired { depth: u32 },

    #[error("certificate is not yet valid (depth {depth})")]
    NotYetValid { depth: u32 },

    /// A critical Authority Information Access extension demands a
    /// revocation mechanism this verifier does not implement.
    #[error("unsupported critical revocation-checking requirement")]
    UnsupportedCriticalRevocation,

    /// Any other X509_V_ERR_* reported by OpenSSL.
    #[error("{reason} (code {code}, depth {depth})")]
    Rejected {
        code: i32,
        depth: u32,
        reason: String,
    },
}

impl ChainFailure {
    fn from_context(ctx: &X509StoreContextRef) -> Self {
        let result = ctx.error();
        let depth = ctx.error_depth();
        match result.as_raw() {
            openssl_sys::X509_V_ERR_CERT_HAS_EXPIRED => ChainFailure::Expired { depth },
            openssl_sys::X509_V_ERR_CERT_NOT_YET_VALID => ChainFailure::NotYetValid { depth },
            code => ChainFailure::Rejected {
                code,
                depth,
                reason: result.error_string().to_string(),
            },
        }
    }
}

/// Whether a strict-pass failure may be re-checked with validity dates ignored.
///
/// Only an expired certificate qualifies, and only when the caller opted in.
pub fn is_acceptable(failure: &ChainFailure, options: VerifyOptions) -> bool {
    options.ignore_expiration && matches!(failure, ChainFailure::Expired { .. })
}

/// Verify `cert` up to the trust anchor, using `untrusted` as intermediates.
pub(crate) fn check_certificate(
    store: &TrustStore,
    cert: &X509Ref,
    untrusted: &StackRef<X509>,
    options: VerifyOptions,
) -> Result<(), SigError> {
    match run_chain(store.strict(), cert, untrusted) {
        Err(SigError::ChainInvalid(failure)) if is_acceptable(&failure, options) => {
            recheck_ignoring_expiration(store, cert, untrusted)?;
            log::debug!("Signature is expired, but operation will proceed");
            Ok(())
        }
        other => other,
    }
}

/// Validate the trust anchor itself before anything is trusted with it.
///
/// A "not yet valid" failure logs the system clock next to the certificate's
/// validity window so a skewed clock can be told apart from a bad
/// certificate. The verdict is unchanged by the diagnostic.
pub(crate) fn validate_anchor(store: &TrustStore, anchor: &Certificate) -> Result<(), SigError> {
    let no_intermediates = Stack::<X509>::new()?;

    if let Err(e) = run_chain(store.strict(), anchor.x509(), &no_intermediates) {
        let failure = match e {
            SigError::ChainInvalid(failure) => failure,
            other => return Err(other),
        };
        // OpenSSL stops at the unhandled critical extension before looking at
        // dates; report the precise policy reason when AIA is the culprit.
        if !authority_access_is_safely_handled(anchor.info()) {
            log::error!("Failed to verify certificate: {}", failure);
            return Err(ChainFailure::UnsupportedCriticalRevocation.into());
        }
        if matches!(failure, ChainFailure::NotYetValid { .. }) {
            log_validity_window(anchor.info());
        }
        log::error!("Failed to verify certificate: {}", failure);
        return Err(failure.into());
    }

    if !authority_access_is_safely_handled(anchor.info()) {
        log::debug!("Failed to validate certificate using 'Authority Information Access'");
        return Err(ChainFailure::UnsupportedCriticalRevocation.into());
    }

    Ok(())
}

fn run_chain(
    store: &X509StoreRef,
    cert: &X509Ref,
    untrusted: &StackRef<X509>,
) -> Result<(), SigError> {
    let mut ctx = X509StoreContext::new()?;
    let outcome = ctx.init(store, cert, untrusted, |c| {
        if c.verify_cert()? {
            Ok(Ok(()))
        } else {
            Ok(Err(ChainFailure::from_context(c)))
        }
    })?;
    outcome.map_err(|failure| {
        log::debug!("Certificate verification error - {}", failure);
        SigError::ChainInvalid(failure)
    })
}

/// Second pass with `NO_CHECK_TIME`. Dates are then checked by hand so that
/// only expiry is forgiven: a chain element that is not yet valid still fails.
fn recheck_ignoring_expiration(
    store: &TrustStore,
    cert: &X509Ref,
    untrusted: &StackRef<X509>,
) -> Result<(), SigError> {
    let now = Asn1Time::days_from_now(0)?;
    let mut ctx = X509StoreContext::new()?;
    let outcome = ctx.init(store.time_agnostic(), cert, untrusted, |c| {
        if !c.verify_cert()? {
            return Ok(Err(ChainFailure::from_context(c)));
        }
        if let Some(chain) = c.chain() {
            for (depth, link) in chain.iter().enumerate() {
                if link.not_before().compare(&now)? == Ordering::Greater {
                    let depth = u32::try_from(depth).unwrap_or(u32::MAX);
                    return Ok(Err(ChainFailure::NotYetValid { depth }));
                }
            }
        }
        Ok(Ok(()))
    })?;
    outcome.map_err(|failure| {
        log::debug!("Certificate verification error - {}", failure);
        SigError::ChainInvalid(failure)
    })
}

fn log_validity_window(info: &CertificateInfo) {
    let [clock, heading, not_before, not_after] = validity_window(info, &local_clock_string());
    log::warn!("{}", clock);
    log::info!("{}", heading);
    log::info!("{}", not_before);
    log::info!("{}", not_after);
}

fn validity_window(info: &CertificateInfo, clock: &str) -> [String; 4] {
    [
        format!("Current time is {}", clock),
        "Certificate validity is:".to_string(),
        format!("  Not Before: {}", info.not_before),
        format!("  Not After:  {}", info.not_after),
    ]
}
