//! Certificate and signature factories shared by the integration tests.
//!
//! Short-lived certificates (expired, not yet valid, critical AIA) are
//! generated on the fly. Long-lived ones that a CRL must reference live in
//! `tests/certs/`.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use openssl::asn1::{Asn1Object, Asn1OctetString, Asn1Time};
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::{X509Extension, X509NameBuilder, X509};
use std::path::{Path, PathBuf};

pub const DAY: i64 = 86_400;

/// OID bytes (without tag/length) of id-ad-ocsp.
pub const ACCESS_OCSP_OID: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01];
/// OID bytes (without tag/length) of id-ad-caIssuers.
pub const ACCESS_CA_ISSUERS_OID: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x02];

pub struct Identity {
    pub cert: X509,
    pub key: PKey<Private>,
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("certs")
        .join(name)
}

pub fn load_fixture_identity(stem: &str) -> Identity {
    let cert = X509::from_pem(&std::fs::read(fixture(&format!("{stem}.pem"))).unwrap()).unwrap();
    let key =
        PKey::private_key_from_pem(&std::fs::read(fixture(&format!("{stem}.key"))).unwrap())
            .unwrap();
    Identity { cert, key }
}

pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

pub struct CertTemplate<'a> {
    pub common_name: &'a str,
    pub serial: u32,
    pub not_before: i64,
    pub not_after: i64,
    pub ca: bool,
    pub extra: Vec<X509Extension>,
}

impl<'a> CertTemplate<'a> {
    pub fn ca(common_name: &'a str) -> Self {
        CertTemplate {
            common_name,
            serial: 1,
            not_before: now() - DAY,
            not_after: now() + 3650 * DAY,
            ca: true,
            extra: Vec::new(),
        }
    }

    pub fn leaf(common_name: &'a str) -> Self {
        CertTemplate {
            ca: false,
            serial: 2,
            ..CertTemplate::ca(common_name)
        }
    }

    pub fn valid_between(mut self, not_before: i64, not_after: i64) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    pub fn with_extension(mut self, ext: X509Extension) -> Self {
        self.extra.push(ext);
        self
    }
}

/// Issue a certificate; self-signed when `issuer` is `None`.
pub fn issue(template: CertTemplate<'_>, issuer: Option<&Identity>) -> Identity {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("C", "US").unwrap();
    name.append_entry_by_text("O", "Sigtrust Test").unwrap();
    name.append_entry_by_text("CN", template.common_name).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(template.serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some(issuer) => builder.set_issuer_name(issuer.cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_unix(template.not_before as _).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(template.not_after as _).unwrap())
        .unwrap();

    if template.ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        builder
            .append_extension(
                KeyUsage::new()
                    .critical()
                    .key_cert_sign()
                    .crl_sign()
                    .build()
                    .unwrap(),
            )
            .unwrap();
    } else {
        builder
            .append_extension(BasicConstraints::new().build().unwrap())
            .unwrap();
        builder
            .append_extension(KeyUsage::new().critical().digital_signature().build().unwrap())
            .unwrap();
    }
    for ext in template.extra {
        builder.append_extension(ext).unwrap();
    }

    let signing_key = issuer.map_or(&key, |i| &i.key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();
    Identity {
        cert: builder.build(),
        key,
    }
}

/// Authority Information Access with a single access description whose
/// location is `uri`.
pub fn authority_info_access(critical: bool, method_oid: &[u8], uri: &str) -> X509Extension {
    let mut oid = vec![0x06, method_oid.len() as u8];
    oid.extend_from_slice(method_oid);
    let mut location = vec![0x86, uri.len() as u8];
    location.extend_from_slice(uri.as_bytes());

    let mut description = vec![0x30, (oid.len() + location.len()) as u8];
    description.extend_from_slice(&oid);
    description.extend_from_slice(&location);

    let mut syntax = vec![0x30, description.len() as u8];
    syntax.extend_from_slice(&description);

    X509Extension::new_from_der(
        &Asn1Object::from_str("1.3.6.1.5.5.7.1.1").unwrap(),
        critical,
        &Asn1OctetString::new_from_bytes(&syntax).unwrap(),
    )
    .unwrap()
}

/// Authority Information Access whose value does not decode as
/// AuthorityInfoAccessSyntax.
pub fn undecodable_authority_info_access(critical: bool) -> X509Extension {
    X509Extension::new_from_der(
        &Asn1Object::from_str("1.3.6.1.5.5.7.1.1").unwrap(),
        critical,
        &Asn1OctetString::new_from_bytes(&[0x30, 0x03, 0x02, 0x01, 0x05]).unwrap(),
    )
    .unwrap()
}

/// Detached DER PKCS#7 signature over `data`, embedding the signer certificate.
pub fn sign_detached(signer: &Identity, data: &[u8]) -> Vec<u8> {
    let extra = Stack::new().unwrap();
    Pkcs7::sign(
        &signer.cert,
        &signer.key,
        &extra,
        data,
        Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY,
    )
    .unwrap()
    .to_der()
    .unwrap()
}

/// PKCS#7 signature with the content embedded (not detached).
pub fn sign_attached(signer: &Identity, data: &[u8]) -> Vec<u8> {
    let extra = Stack::new().unwrap();
    Pkcs7::sign(&signer.cert, &signer.key, &extra, data, Pkcs7Flags::BINARY)
        .unwrap()
        .to_der()
        .unwrap()
}

pub fn write_pem(dir: &Path, name: &str, cert: &X509) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, cert.to_pem().unwrap()).unwrap();
    path
}
