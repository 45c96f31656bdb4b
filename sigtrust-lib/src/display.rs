//! Human-readable and JSON formatting of certificate information.

use crate::fields::{CertificateInfo, DigestAlgorithm, Extension, ExtensionValue};
use crate::SigError;
use std::fmt::Write as _;

/// Format certificate information as human-readable text.
///
/// The fingerprint line uses `digest`.
pub fn display_text(cert: &CertificateInfo, digest: DigestAlgorithm) -> String {
    let mut out = String::new();

    out.push_str("Certificate:\n");
    let _ = writeln!(out, "  Version: {} (v{})", cert.version, cert.version);
    let _ = writeln!(out, "  Serial: {}", cert.serial);
    let _ = writeln!(out, "  Signature Algorithm: {}", cert.signature_algorithm);
    let _ = writeln!(out, "  Issuer: {}", cert.issuer_string());
    out.push_str("  Validity:\n");
    let _ = writeln!(out, "    Not Before: {}", cert.not_before);
    let _ = writeln!(out, "    Not After:  {}", cert.not_after);
    let _ = writeln!(out, "  Subject: {}", cert.subject_string());

    let _ = write!(out, "  Public Key: {}", cert.public_key.algorithm);
    if let Some(bits) = cert.public_key.key_size {
        let _ = write!(out, " ({} bit)", bits);
    }
    if let Some(curve) = &cert.public_key.curve {
        let _ = write!(out, " [{}]", curve);
    }
    out.push('\n');

    if !cert.extensions.is_empty() {
        out.push_str("  Extensions:\n");
        for ext in &cert.extensions {
            format_extension(&mut out, ext);
        }
    }

    let label = match digest {
        DigestAlgorithm::Sha256 => "SHA-256",
        DigestAlgorithm::Sha384 => "SHA-384",
        DigestAlgorithm::Sha512 => "SHA-512",
        DigestAlgorithm::Sha1 => "SHA-1",
    };
    let _ = writeln!(out, "  Fingerprint ({}): {}", label, cert.fingerprint(digest));

    out
}

fn format_extension(out: &mut String, ext: &Extension) {
    let critical_str = if ext.critical { " [critical]" } else { "" };

    match &ext.value {
        ExtensionValue::BasicConstraints { ca, path_len } => {
            let pl = path_len
                .map(|n| format!(", pathlen:{}", n))
                .unwrap_or_default();
            let _ = writeln!(out, "    Basic Constraints:{} CA={}{}", critical_str, ca, pl);
        }
        ExtensionValue::KeyUsage(usages) => {
            let _ = writeln!(out, "    Key Usage:{} {}", critical_str, usages.join(", "));
        }
        ExtensionValue::ExtendedKeyUsage(usages) => {
            let _ = writeln!(
                out,
                "    Extended Key Usage:{} {}",
                critical_str,
                usages.join(", ")
            );
        }
        ExtensionValue::SubjectKeyIdentifier(hex) => {
            let _ = writeln!(out, "    Subject Key Identifier:{} {}", critical_str, hex);
        }
        ExtensionValue::AuthorityKeyIdentifier(key_id) => match key_id {
            Some(kid) => {
                let _ = writeln!(
                    out,
                    "    Authority Key Identifier:{} keyid:{}",
                    critical_str, kid
                );
            }
            None => {
                let _ = writeln!(out, "    Authority Key Identifier:{}", critical_str);
            }
        },
        ExtensionValue::AuthorityInfoAccess(entries) => {
            let _ = writeln!(out, "    Authority Information Access:{}", critical_str);
            for entry in entries {
                let _ = writeln!(out, "      {}: {}", entry.method, entry.location);
            }
        }
        ExtensionValue::CrlDistributionPoints(uris) => {
            let _ = writeln!(out, "    CRL Distribution Points:{}", critical_str);
            for uri in uris {
                let _ = writeln!(out, "      {}", uri);
            }
        }
        ExtensionValue::Raw(hex) => {
            let shown = match hex.get(..40) {
                Some(head) if hex.len() > 40 => format!("{}...", head),
                _ => hex.clone(),
            };
            let _ = writeln!(
                out,
                "    {} ({}):{} {}",
                ext.name, ext.oid, critical_str, shown
            );
        }
    }
}

/// Serialize certificate information to a pretty-printed JSON string.
pub fn to_json(cert: &CertificateInfo) -> Result<String, SigError> {
    serde_json::to_string_pretty(cert).map_err(SigError::Json)
}
