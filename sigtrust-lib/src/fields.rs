//! Certificate data types and field extraction.

use serde::Serialize;

/// Digest algorithm for fingerprint computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha1,
}

/// Inspected fields of an X.509 certificate.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateInfo {
    /// Certificate version (1, 2, or 3).
    pub version: u32,
    /// Serial number as a colon-separated hex string.
    pub serial: String,
    /// Signature algorithm name.
    pub signature_algorithm: String,
    /// Issuer distinguished name.
    pub issuer: DistinguishedName,
    /// Subject distinguished name.
    pub subject: DistinguishedName,
    /// Validity start date.
    pub not_before: DateTime,
    /// Validity end date.
    pub not_after: DateTime,
    /// Public key summary.
    pub public_key: PublicKeyInfo,
    /// X.509v3 extensions, in certificate order.
    pub extensions: Vec<Extension>,

    /// Raw DER bytes of the entire certificate (for fingerprint computation).
    #[serde(skip)]
    pub raw_der: Vec<u8>,
}

/// Distinguished name with ordered components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistinguishedName {
    /// Ordered list of (attribute_type, value) pairs.
    /// Attribute types use short names where known (e.g., "CN", "O", "C").
    pub components: Vec<(String, String)>,
}

impl DistinguishedName {
    /// Format as a comma-separated one-line string matching OpenSSL's default format.
    /// Example: "C = US, O = Org, CN = example.com"
    ///
    /// Commas, equals signs and backslashes inside values are escaped.
    pub fn to_oneline(&self) -> String {
        let mut result = String::new();
        for (i, (k, v)) in self.components.iter().enumerate() {
            if i > 0 {
                result.push_str(", ");
            }
            result.push_str(k);
            result.push_str(" = ");
            for ch in v.chars() {
                match ch {
                    '\\' => result.push_str("\\\\"),
                    ',' => result.push_str("\\,"),
                    '=' => result.push_str("\\="),
                    _ => result.push(ch),
                }
            }
        }
        result
    }
}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_oneline())
    }
}

/// Public key summary.
#[derive(Debug, Clone, Serialize)]
pub struct PublicKeyInfo {
    /// Algorithm name: "RSA", "EC", "Ed25519", etc.
    pub algorithm: String,
    /// Key size in bits, when known.
    pub key_size: Option<u32>,
    /// Named curve for EC keys (e.g., "P-256").
    pub curve: Option<String>,
}

/// A certificate extension.
#[derive(Debug, Clone, Serialize)]
pub struct Extension {
    /// OID as a dotted-decimal string.
    pub oid: String,
    /// Human-readable name (or OID string if unknown).
    pub name: String,
    /// Whether this extension is marked critical.
    pub critical: bool,
    /// Parsed extension value.
    pub value: ExtensionValue,
}

/// Extension values the inspector understands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ExtensionValue {
    BasicConstraints {
        ca: bool,
        path_len: Option<u32>,
    },
    KeyUsage(Vec<String>),
    ExtendedKeyUsage(Vec<String>),
    SubjectKeyIdentifier(String),
    AuthorityKeyIdentifier(Option<String>),
    AuthorityInfoAccess(Vec<AiaEntry>),
    CrlDistributionPoints(Vec<String>),
    /// Hex-encoded value of anything else.
    Raw(String),
}

/// Authority Information Access entry.
#[derive(Debug, Clone, Serialize)]
pub struct AiaEntry {
    /// Access method: "OCSP", "CA Issuers", or the dotted OID.
    pub method: String,
    /// Access method OID as a dotted-decimal string.
    pub method_oid: String,
    /// Access location (usually a URI).
    pub location: String,
}

impl AiaEntry {
    pub fn is_ocsp(&self) -> bool {
        self.method_oid == crate::oid::ACCESS_OCSP
    }
}

/// Date-time representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTime {
    /// ISO 8601 formatted string.
    pub iso8601: String,
    /// Unix timestamp.
    pub timestamp: i64,
}

impl DateTime {
    /// Build from a Unix timestamp (UTC).
    pub fn from_timestamp(ts: i64) -> Self {
        let iso = match ::time::OffsetDateTime::from_unix_timestamp(ts) {
            Ok(dt) => format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                dt.year(),
                u8::from(dt.month()),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            Err(_) => format!("{}", ts),
        };
        DateTime {
            iso8601: iso,
            timestamp: ts,
        }
    }

    /// The current system clock.
    pub fn now() -> Self {
        Self::from_timestamp(::time::OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Format in OpenSSL's default date style: `Feb  3 23:57:06 2026 GMT`.
    pub fn to_openssl(&self) -> String {
        match ::time::OffsetDateTime::from_unix_timestamp(self.timestamp) {
            Ok(dt) => format!(
                "{} {:2} {:02}:{:02}:{:02} {} GMT",
                month_abbrev(u8::from(dt.month())),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second(),
                dt.year()
            ),
            Err(_) => self.iso8601.clone(),
        }
    }
}

/// The system clock in the local timezone, `ctime` style:
/// `Tue Feb 03 23:57:06 2026`. Falls back to UTC when the local offset
/// cannot be determined.
pub(crate) fn local_clock_string() -> String {
    let now = ::time::OffsetDateTime::now_utc();
    let local = ::time::UtcOffset::current_local_offset().map_or(now, |offset| now.to_offset(offset));
    format_clock(local)
}

pub(crate) fn format_clock(dt: ::time::OffsetDateTime) -> String {
    format!(
        "{} {} {:02} {:02}:{:02}:{:02} {}",
        weekday_abbrev(dt.weekday()),
        month_abbrev(u8::from(dt.month())),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.year()
    )
}

fn weekday_abbrev(day: ::time::Weekday) -> &'static str {
    use ::time::Weekday;
    match day {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

fn month_abbrev(month: u8) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "???",
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_openssl())
    }
}

impl CertificateInfo {
    /// Return the subject as a one-line string.
    pub fn subject_string(&self) -> String {
        self.subject.to_oneline()
    }

    /// Return the issuer as a one-line string.
    pub fn issuer_string(&self) -> String {
        self.issuer.to_oneline()
    }

    /// Return the notBefore date as a string (OpenSSL format).
    pub fn not_before_string(&self) -> String {
        self.not_before.to_openssl()
    }

    /// Return the notAfter date as a string (OpenSSL format).
    pub fn not_after_string(&self) -> String {
        self.not_after.to_openssl()
    }

    /// Compute the fingerprint of the certificate using the given digest algorithm.
    pub fn fingerprint(&self, algorithm: DigestAlgorithm) -> String {
        crate::fingerprint::compute_fingerprint(&self.raw_der, algorithm)
    }

    /// The Authority Information Access extension, if present, matched by
    /// OID. The entry list is empty when the value could not be decoded.
    pub fn authority_info_access(&self) -> Option<(&Extension, &[AiaEntry])> {
        let ext = self
            .extensions
            .iter()
            .find(|ext| ext.oid == crate::oid::EXT_AUTHORITY_INFO_ACCESS)?;
        let entries = match &ext.value {
            ExtensionValue::AuthorityInfoAccess(entries) => entries.as_slice(),
            _ => &[],
        };
        Some((ext, entries))
    }

    /// Extract OCSP responder URLs from the AIA extension.
    pub fn ocsp_urls(&self) -> Vec<String> {
        self.authority_info_access()
            .map(|(_, entries)| {
                entries
                    .iter()
                    .filter(|e| e.is_ocsp())
                    .map(|e| e.location.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
