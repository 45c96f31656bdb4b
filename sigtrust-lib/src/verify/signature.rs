//! Detached PKCS#7 signature checks.

use super::chain::check_certificate;
use super::trust_store::TrustStore;
use super::VerifyOptions;
use crate::SigError;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::{Stack, StackRef};
use openssl::x509::X509;

/// Check a DER-encoded detached PKCS#7 `signature` over `data`.
///
/// The content digest and signer signature are verified first, with the
/// signer looked up in `candidates` and in the envelope's own certificates.
/// Each signer is then chain-checked against `store`, using the embedded
/// certificates as untrusted intermediates and `options` for expiration
/// tolerance.
pub(crate) fn check_detached(
    store: &TrustStore,
    candidates: &StackRef<X509>,
    data: &[u8],
    signature: &[u8],
    options: VerifyOptions,
) -> Result<(), SigError> {
    if signature.is_empty() {
        return Err(SigError::MalformedSignature("empty signature".into()));
    }
    let pkcs7 =
        Pkcs7::from_der(signature).map_err(|e| SigError::MalformedSignature(e.to_string()))?;

    // NOVERIFY: the chain is checked below, per signer, with per-call options.
    // NO_DUAL_CONTENT: an envelope carrying its own content is not detached.
    pkcs7
        .verify(
            candidates,
            store.strict(),
            Some(data),
            None,
            Pkcs7Flags::BINARY | Pkcs7Flags::NOVERIFY | Pkcs7Flags::NO_DUAL_CONTENT,
        )
        .map_err(|e| SigError::SignatureMismatch(e.to_string()))?;

    let signers = pkcs7
        .signers(candidates, Pkcs7Flags::empty())
        .map_err(|e| SigError::SignatureMismatch(e.to_string()))?;
    if signers.is_empty() {
        return Err(SigError::SignatureMismatch("no signer certificate".into()));
    }

    let no_intermediates: Stack<X509>;
    let untrusted: &StackRef<X509> = match pkcs7.signed().and_then(|s| s.certificates()) {
        Some(certs) => certs,
        None => {
            no_intermediates = Stack::new()?;
            &no_intermediates
        }
    };

    for signer in &signers {
        check_certificate(store, signer, untrusted, options)?;
    }
    Ok(())
}
