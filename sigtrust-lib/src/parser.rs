//! Certificate inspection from PEM and DER encodings.

use crate::fields::{
    AiaEntry, CertificateInfo, DateTime, DistinguishedName, Extension, ExtensionValue,
    PublicKeyInfo,
};
use crate::oid;
use crate::util;
use crate::SigError;
use x509_parser::prelude::*;

/// Parse the first certificate block of a PEM document.
pub fn parse_pem(input: &[u8]) -> Result<CertificateInfo, SigError> {
    let (_, pem) = x509_parser::pem::parse_x509_pem(input)
        .map_err(|e| SigError::PemError(format!("{}", e)))?;

    if pem.label != "CERTIFICATE"
        && pem.label != "TRUSTED CERTIFICATE"
        && pem.label != "X509 CERTIFICATE"
    {
        return Err(SigError::PemError(format!(
            "expected CERTIFICATE, got {}",
            pem.label
        )));
    }

    parse_der(&pem.contents)
}

/// Parse a certificate from DER format.
pub fn parse_der(input: &[u8]) -> Result<CertificateInfo, SigError> {
    let (remaining, x509) =
        X509Certificate::from_der(input).map_err(|e| SigError::DerError(format!("{}", e)))?;

    // Fingerprints cover the certificate only, not trailing bytes.
    let cert_len = input.len() - remaining.len();
    let cert_der = input.get(..cert_len).unwrap_or(input);
    build_certificate_info(&x509, cert_der)
}

fn build_certificate_info(
    x509: &X509Certificate,
    raw_der: &[u8],
) -> Result<CertificateInfo, SigError> {
    let tbs = &x509.tbs_certificate;

    let raw_version = tbs.version.0;
    if raw_version > 2 {
        return Err(SigError::DerError(format!(
            "unsupported X.509 version {} (expected v1, v2, or v3)",
            raw_version + 1
        )));
    }

    Ok(CertificateInfo {
        version: raw_version + 1,
        serial: format_serial(tbs.raw_serial()),
        signature_algorithm: format_sig_algorithm(&x509.signature_algorithm),
        issuer: build_dn(&tbs.issuer),
        subject: build_dn(&tbs.subject),
        not_before: DateTime::from_timestamp(tbs.validity.not_before.timestamp()),
        not_after: DateTime::from_timestamp(tbs.validity.not_after.timestamp()),
        public_key: build_public_key_info(&tbs.subject_pki),
        extensions: tbs.extensions().iter().map(build_extension).collect(),
        raw_der: raw_der.to_vec(),
    })
}

/// Colon-separated uppercase hex, leading zero bytes stripped (at least one byte kept).
fn format_serial(raw: &[u8]) -> String {
    let stripped = match raw.iter().position(|&b| b != 0) {
        Some(pos) => raw.get(pos..).unwrap_or(raw),
        None => raw.get(raw.len().saturating_sub(1)..).unwrap_or(raw),
    };
    util::hex_colon_upper(stripped)
}

fn format_sig_algorithm(algo: &AlgorithmIdentifier) -> String {
    match algo.algorithm.to_id_string().as_str() {
        oid::SHA1_WITH_RSA => "sha1WithRSAEncryption".into(),
        oid::SHA256_WITH_RSA => "sha256WithRSAEncryption".into(),
        oid::SHA384_WITH_RSA => "sha384WithRSAEncryption".into(),
        oid::SHA512_WITH_RSA => "sha512WithRSAEncryption".into(),
        oid::ECDSA_WITH_SHA256 => "ecdsa-with-SHA256".into(),
        oid::ECDSA_WITH_SHA384 => "ecdsa-with-SHA384".into(),
        oid::ED25519 => "Ed25519".into(),
        other => other.to_string(),
    }
}

fn build_dn(name: &X509Name) -> DistinguishedName {
    let mut components = Vec::new();
    for rdn in name.iter() {
        for attr in rdn.iter() {
            let key = util::oid_short_name(&attr.attr_type().to_id_string());
            let value = attr.as_str().unwrap_or("<binary>").to_string();
            components.push((key, value));
        }
    }
    DistinguishedName { components }
}

fn build_public_key_info(spki: &SubjectPublicKeyInfo) -> PublicKeyInfo {
    let oid_str = spki.algorithm.algorithm.to_id_string();

    match oid_str.as_str() {
        oid::RSA_ENCRYPTION => {
            let key_size = match spki.parsed() {
                Ok(x509_parser::public_key::PublicKey::RSA(rsa)) => {
                    u32::try_from(rsa.key_size()).ok()
                }
                _ => None,
            };
            PublicKeyInfo {
                algorithm: "RSA".into(),
                key_size,
                curve: None,
            }
        }
        oid::EC_PUBLIC_KEY => {
            let curve = spki
                .algorithm
                .parameters
                .as_ref()
                .and_then(|p| p.as_oid().ok())
                .map(|o| match o.to_id_string().as_str() {
                    oid::CURVE_P256 => "P-256".to_string(),
                    oid::CURVE_P384 => "P-384".to_string(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "unknown".into());
            let key_size = match curve.as_str() {
                "P-256" => Some(256),
                "P-384" => Some(384),
                _ => None,
            };
            PublicKeyInfo {
                algorithm: "EC".into(),
                key_size,
                curve: Some(curve),
            }
        }
        oid::ED25519 => PublicKeyInfo {
            algorithm: "Ed25519".into(),
            key_size: Some(256),
            curve: None,
        },
        _ => PublicKeyInfo {
            algorithm: oid_str,
            key_size: None,
            curve: None,
        },
    }
}

fn build_extension(ext: &X509Extension) -> Extension {
    let oid = ext.oid.to_id_string();
    let name = extension_oid_to_name(&oid);

    let value = match ext.parsed_extension() {
        ParsedExtension::BasicConstraints(bc) => ExtensionValue::BasicConstraints {
            ca: bc.ca,
            path_len: bc.path_len_constraint,
        },
        ParsedExtension::KeyUsage(ku) => {
            let flags = [
                (ku.digital_signature(), "Digital Signature"),
                (ku.non_repudiation(), "Non Repudiation"),
                (ku.key_encipherment(), "Key Encipherment"),
                (ku.data_encipherment(), "Data Encipherment"),
                (ku.key_agreement(), "Key Agreement"),
                (ku.key_cert_sign(), "Certificate Sign"),
                (ku.crl_sign(), "CRL Sign"),
                (ku.encipher_only(), "Encipher Only"),
                (ku.decipher_only(), "Decipher Only"),
            ];
            ExtensionValue::KeyUsage(
                flags
                    .iter()
                    .filter(|(set, _)| *set)
                    .map(|(_, label)| (*label).to_string())
                    .collect(),
            )
        }
        ParsedExtension::ExtendedKeyUsage(eku) => {
            let flags = [
                (eku.any, "Any Extended Key Usage"),
                (eku.server_auth, "TLS Web Server Authentication"),
                (eku.client_auth, "TLS Web Client Authentication"),
                (eku.code_signing, "Code Signing"),
                (eku.email_protection, "E-mail Protection"),
                (eku.time_stamping, "Time Stamping"),
                (eku.ocsp_signing, "OCSP Signing"),
            ];
            let mut usages: Vec<String> = flags
                .iter()
                .filter(|(set, _)| *set)
                .map(|(_, label)| (*label).to_string())
                .collect();
            usages.extend(eku.other.iter().map(|o| o.to_id_string()));
            ExtensionValue::ExtendedKeyUsage(usages)
        }
        ParsedExtension::SubjectKeyIdentifier(ski) => {
            ExtensionValue::SubjectKeyIdentifier(util::hex_colon_upper(ski.0))
        }
        ParsedExtension::AuthorityKeyIdentifier(aki) => ExtensionValue::AuthorityKeyIdentifier(
            aki.key_identifier
                .as_ref()
                .map(|ki| util::hex_colon_upper(ki.0)),
        ),
        ParsedExtension::AuthorityInfoAccess(aia) => ExtensionValue::AuthorityInfoAccess(
            aia.accessdescs
                .iter()
                .map(|desc| {
                    let method_oid = desc.access_method.to_id_string();
                    let method = match method_oid.as_str() {
                        oid::ACCESS_OCSP => "OCSP".into(),
                        oid::ACCESS_CA_ISSUERS => "CA Issuers".into(),
                        other => other.to_string(),
                    };
                    AiaEntry {
                        method,
                        method_oid,
                        location: format_general_name(&desc.access_location),
                    }
                })
                .collect(),
        ),
        ParsedExtension::CRLDistributionPoints(cdp) => {
            let mut uris = Vec::new();
            for point in &cdp.points {
                if let Some(x509_parser::extensions::DistributionPointName::FullName(names)) =
                    &point.distribution_point
                {
                    for gn in names {
                        if let GeneralName::URI(uri) = gn {
                            uris.push(uri.to_string());
                        }
                    }
                }
            }
            ExtensionValue::CrlDistributionPoints(uris)
        }
        _ => ExtensionValue::Raw(hex::encode(ext.value)),
    };

    Extension {
        oid,
        name,
        critical: ext.critical,
        value,
    }
}

fn extension_oid_to_name(oid_str: &str) -> String {
    match oid_str {
        oid::EXT_SUBJECT_KEY_ID => "Subject Key Identifier".into(),
        oid::EXT_KEY_USAGE => "Key Usage".into(),
        oid::EXT_SUBJECT_ALT_NAME => "Subject Alternative Name".into(),
        oid::EXT_BASIC_CONSTRAINTS => "Basic Constraints".into(),
        oid::EXT_CRL_DISTRIBUTION_POINTS => "CRL Distribution Points".into(),
        oid::EXT_CERTIFICATE_POLICIES => "Certificate Policies".into(),
        oid::EXT_AUTHORITY_KEY_ID => "Authority Key Identifier".into(),
        oid::EXT_EXTENDED_KEY_USAGE => "Extended Key Usage".into(),
        oid::EXT_AUTHORITY_INFO_ACCESS => "Authority Information Access".into(),
        other => other.to_string(),
    }
}

fn format_general_name(gn: &GeneralName) -> String {
    match gn {
        GeneralName::URI(uri) => uri.to_string(),
        GeneralName::DNSName(name) => name.to_string(),
        GeneralName::RFC822Name(email) => email.to_string(),
        GeneralName::DirectoryName(dn) => build_dn(dn).to_oneline(),
        other => format!("{:?}", other),
    }
}
