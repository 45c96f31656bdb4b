#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! End-to-end trust decisions over buffers and files.

mod common;

use common::*;
use sigtrust_lib::{ChainFailure, SigError, TrustContext, VerifyOptions};
use std::path::Path;

const PAYLOAD: &[u8] = b"MANIFEST\t1\nversion:\t41230\nfiles:\t2\n";

struct Fixture {
    _dir: tempfile::TempDir,
    ctx: TrustContext,
    signer: Identity,
}

/// A fresh root and a leaf it issued, with the root loaded as anchor.
fn generated_fixture(leaf: CertTemplate<'_>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = issue(CertTemplate::ca("Generated Root"), None);
    let signer = issue(leaf, Some(&root));
    let root_path = write_pem(dir.path(), "root.pem", &root.cert);
    let ctx = TrustContext::init(&root_path, None).unwrap();
    Fixture {
        _dir: dir,
        ctx,
        signer,
    }
}

fn strict() -> VerifyOptions {
    VerifyOptions::default()
}

fn ignoring_expiration() -> VerifyOptions {
    VerifyOptions::default().with_ignore_expiration(true)
}

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

#[test]
fn valid_signature_verifies() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let sig = sign_detached(&f.signer, PAYLOAD);
    assert!(f.ctx.verify_data(PAYLOAD, &sig, strict()));
    f.ctx.check_data(PAYLOAD, &sig, strict()).unwrap();
}

#[test]
fn signature_by_root_itself_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let root = issue(CertTemplate::ca("Self Signer"), None);
    let root_path = write_pem(dir.path(), "root.pem", &root.cert);
    let ctx = TrustContext::init(&root_path, None).unwrap();
    let sig = sign_detached(&root, PAYLOAD);
    assert!(ctx.verify_data(PAYLOAD, &sig, strict()));
}

#[test]
fn empty_data_can_be_signed() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let sig = sign_detached(&f.signer, b"");
    assert!(f.ctx.verify_data(b"", &sig, strict()));
    assert!(!f.ctx.verify_data(b"x", &sig, strict()));
}

#[test]
fn single_byte_mutation_fails() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let sig = sign_detached(&f.signer, PAYLOAD);
    for idx in [0, PAYLOAD.len() / 2, PAYLOAD.len() - 1] {
        let mut tampered = PAYLOAD.to_vec();
        tampered[idx] ^= 0x01;
        assert!(!f.ctx.verify_data(&tampered, &sig, strict()), "byte {idx}");
        let err = f.ctx.check_data(&tampered, &sig, strict()).unwrap_err();
        assert!(matches!(err, SigError::SignatureMismatch(_)), "{err}");
    }
}

#[test]
fn appended_byte_fails() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let sig = sign_detached(&f.signer, PAYLOAD);
    let mut longer = PAYLOAD.to_vec();
    longer.push(b'\n');
    assert!(!f.ctx.verify_data(&longer, &sig, strict()));
}

#[test]
fn empty_signature_is_malformed() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    for data in [&b""[..], PAYLOAD] {
        let err = f.ctx.check_data(data, b"", strict()).unwrap_err();
        assert!(matches!(err, SigError::MalformedSignature(_)), "{err}");
        assert!(!f.ctx.verify_data(data, b"", ignoring_expiration()));
    }
}

#[test]
fn garbage_signature_is_malformed() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let err = f
        .ctx
        .check_data(PAYLOAD, b"\x30\x03\x02\x01\x00garbage", strict())
        .unwrap_err();
    assert!(matches!(err, SigError::MalformedSignature(_)), "{err}");
}

#[test]
fn truncated_signature_fails() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let sig = sign_detached(&f.signer, PAYLOAD);
    assert!(!f.ctx.verify_data(PAYLOAD, &sig[..sig.len() / 2], strict()));
}

#[test]
fn attached_signature_is_rejected() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let sig = sign_attached(&f.signer, PAYLOAD);
    assert!(!f.ctx.verify_data(PAYLOAD, &sig, strict()));
    let err = f.ctx.check_data(PAYLOAD, &sig, strict()).unwrap_err();
    assert!(matches!(err, SigError::SignatureMismatch(_)), "{err}");
}

#[test]
fn attached_signature_over_other_data_is_rejected() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let sig = sign_attached(&f.signer, b"some other manifest");
    assert!(!f.ctx.verify_data(PAYLOAD, &sig, strict()));
    assert!(!f.ctx.verify_data(PAYLOAD, &sig, ignoring_expiration()));
}

#[test]
fn signer_from_other_root_is_rejected() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let stranger_root = issue(CertTemplate::ca("Stranger Root"), None);
    let stranger = issue(CertTemplate::leaf("Stranger"), Some(&stranger_root));
    let sig = sign_detached(&stranger, PAYLOAD);

    let err = f.ctx.check_data(PAYLOAD, &sig, strict()).unwrap_err();
    assert!(
        matches!(err, SigError::ChainInvalid(ChainFailure::Rejected { .. })),
        "{err}"
    );
    assert!(!f.ctx.verify_data(PAYLOAD, &sig, ignoring_expiration()));
}

// ---------------------------------------------------------------------------
// Expiration tolerance
// ---------------------------------------------------------------------------

#[test]
fn expired_signer_needs_ignore_expiration() {
    let f = generated_fixture(
        CertTemplate::leaf("Expired Signer").valid_between(now() - 30 * DAY, now() - DAY),
    );
    let sig = sign_detached(&f.signer, PAYLOAD);

    let err = f.ctx.check_data(PAYLOAD, &sig, strict()).unwrap_err();
    assert!(
        matches!(err, SigError::ChainInvalid(ChainFailure::Expired { depth: 0 })),
        "{err}"
    );
    assert!(!f.ctx.verify_data(PAYLOAD, &sig, strict()));
    assert!(f.ctx.verify_data(PAYLOAD, &sig, ignoring_expiration()));
}

#[test]
fn ignore_expiration_does_not_leak_between_calls() {
    let f = generated_fixture(
        CertTemplate::leaf("Expired Signer").valid_between(now() - 30 * DAY, now() - DAY),
    );
    let sig = sign_detached(&f.signer, PAYLOAD);

    assert!(f.ctx.verify_data(PAYLOAD, &sig, ignoring_expiration()));
    assert!(!f.ctx.verify_data(PAYLOAD, &sig, strict()));
    assert!(f.ctx.verify_data(PAYLOAD, &sig, ignoring_expiration()));
}

#[test]
fn ignore_expiration_still_checks_the_data() {
    let f = generated_fixture(
        CertTemplate::leaf("Expired Signer").valid_between(now() - 30 * DAY, now() - DAY),
    );
    let sig = sign_detached(&f.signer, PAYLOAD);
    assert!(!f.ctx.verify_data(b"something else", &sig, ignoring_expiration()));
}

#[test]
fn not_yet_valid_signer_is_never_accepted() {
    let f = generated_fixture(
        CertTemplate::leaf("Future Signer").valid_between(now() + DAY, now() + 30 * DAY),
    );
    let sig = sign_detached(&f.signer, PAYLOAD);

    let err = f.ctx.check_data(PAYLOAD, &sig, strict()).unwrap_err();
    assert!(
        matches!(err, SigError::ChainInvalid(ChainFailure::NotYetValid { .. })),
        "{err}"
    );
    assert!(!f.ctx.verify_data(PAYLOAD, &sig, ignoring_expiration()));
}

#[test]
fn concurrent_calls_with_mixed_options() {
    let f = generated_fixture(
        CertTemplate::leaf("Expired Signer").valid_between(now() - 30 * DAY, now() - DAY),
    );
    let sig = sign_detached(&f.signer, PAYLOAD);

    std::thread::scope(|s| {
        for i in 0..8 {
            let ctx = &f.ctx;
            let sig = &sig;
            s.spawn(move || {
                for _ in 0..10 {
                    let tolerant = i % 2 == 0;
                    let options = VerifyOptions::default().with_ignore_expiration(tolerant);
                    assert_eq!(ctx.verify_data(PAYLOAD, sig, options), tolerant);
                }
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn files_match_buffers() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let dir = tempfile::tempdir().unwrap();
    let sig = sign_detached(&f.signer, PAYLOAD);

    let data_path = dir.path().join("Manifest.MoM");
    let sig_path = dir.path().join("Manifest.MoM.sig");
    std::fs::write(&data_path, PAYLOAD).unwrap();
    std::fs::write(&sig_path, &sig).unwrap();

    let mut tampered = PAYLOAD.to_vec();
    tampered[3] ^= 0x20;
    let tampered_path = dir.path().join("Manifest.tampered");
    std::fs::write(&tampered_path, &tampered).unwrap();

    for options in [strict(), ignoring_expiration()] {
        assert_eq!(
            f.ctx.verify_files(&data_path, &sig_path, options),
            f.ctx.verify_data(PAYLOAD, &sig, options)
        );
        assert_eq!(
            f.ctx.verify_files(&tampered_path, &sig_path, options),
            f.ctx.verify_data(&tampered, &sig, options)
        );
    }
    assert!(f.ctx.verify_files(&data_path, &sig_path, strict()));
    assert!(!f.ctx.verify_files(&tampered_path, &sig_path, strict()));
}

#[test]
fn empty_signature_file_is_malformed() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data");
    let sig_path = dir.path().join("data.sig");
    std::fs::write(&data_path, PAYLOAD).unwrap();
    std::fs::write(&sig_path, b"").unwrap();

    let err = f.ctx.check_files(&data_path, &sig_path, strict()).unwrap_err();
    assert!(matches!(err, SigError::MalformedSignature(_)), "{err}");
}

#[test]
fn missing_signature_file_is_reported_before_data() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let missing = Path::new("/nonexistent/sigtrust/missing");

    match f.ctx.check_files(missing, missing.with_extension("sig"), strict()) {
        Err(SigError::Io { step, path, .. }) => {
            assert_eq!(step, "open");
            assert!(path.ends_with("missing.sig"), "{}", path.display());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn missing_data_file_fails() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let dir = tempfile::tempdir().unwrap();
    let sig_path = dir.path().join("data.sig");
    std::fs::write(&sig_path, sign_detached(&f.signer, PAYLOAD)).unwrap();

    let options = strict().with_print_errors(true);
    assert!(!f.ctx.verify_files(dir.path().join("data"), &sig_path, options));
    match f.ctx.check_files(dir.path().join("data"), &sig_path, options) {
        Err(SigError::Io { step, .. }) => assert_eq!(step, "open"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn directory_as_data_fails() {
    let f = generated_fixture(CertTemplate::leaf("Signer"));
    let dir = tempfile::tempdir().unwrap();
    let sig_path = dir.path().join("data.sig");
    std::fs::write(&sig_path, sign_detached(&f.signer, PAYLOAD)).unwrap();
    assert!(!f.ctx.verify_files(dir.path(), &sig_path, strict()));
}
