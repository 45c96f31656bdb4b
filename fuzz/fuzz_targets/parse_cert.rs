#![no_main]

use libfuzzer_sys::fuzz_target;
use sigtrust_lib::{authority_access_is_safely_handled, is_pem, parse_der, parse_pem, DigestAlgorithm};

fuzz_target!(|data: &[u8]| {
    // The parser must never panic, regardless of input.
    let parsed = if is_pem(data) {
        parse_pem(data)
    } else {
        parse_der(data)
    };
    if let Ok(cert) = parsed {
        let _ = cert.subject_string();
        let _ = cert.issuer_string();
        let _ = cert.not_before_string();
        let _ = cert.not_after_string();
        let _ = cert.fingerprint(DigestAlgorithm::Sha1);
        let _ = cert.ocsp_urls();
        let _ = authority_access_is_safely_handled(&cert);

        let _ = sigtrust_lib::display_text(&cert, DigestAlgorithm::Sha256);
        let _ = sigtrust_lib::to_json(&cert);
    }
});
