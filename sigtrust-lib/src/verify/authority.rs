//! Authority Information Access policy.

use crate::fields::{CertificateInfo, ExtensionValue};

/// Whether the certificate's Authority Information Access extension can be
/// honoured by this verifier.
///
/// Absent or non-critical AIA imposes nothing. A critical AIA always fails:
/// OCSP is not implemented, and a critical declaration of any other access
/// method is not treated as satisfied either.
pub fn authority_access_is_safely_handled(cert: &CertificateInfo) -> bool {
    let Some((ext, entries)) = cert.authority_info_access() else {
        return true;
    };
    if !ext.critical {
        return true;
    }

    log::debug!("Authority Information Access is critical. Checking certificate revocation method");
    if !matches!(ext.value, ExtensionValue::AuthorityInfoAccess(_)) {
        log::debug!("Failed to decode 'Authority Information Access'");
        return false;
    }
    if entries.iter().any(|entry| entry.is_ocsp()) {
        log::debug!("OCSP uri found, but method not supported");
        return false;
    }

    log::debug!("Supported Authority Information Access methods not found in the certificate");
    false
}
