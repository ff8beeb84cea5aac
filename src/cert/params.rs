use std::fmt;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Any, PrintableStringRef, SetOfVec};
use der::{Tag, Tagged};
use rand::RngCore;
use time::{Duration, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use crate::error::{CertForgeError, Result};

const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const STATE_OR_PROVINCE_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const LOCALITY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const ORGANIZATIONAL_UNIT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// Distinguished name of a certificate subject or issuer.
///
/// Attributes are encoded in the order C, ST, L, O, OU, CN, each in its own RDN.
/// Absent optional attributes are left out of the encoded name.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `country` - The country (C), encoded as a PrintableString.
/// * `state` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(into)]
    pub common_name: String,
    #[builder(into)]
    pub country: Option<String>,
    #[builder(into)]
    pub state: Option<String>,
    #[builder(into)]
    pub locality: Option<String>,
    #[builder(into)]
    pub organization: Option<String>,
    #[builder(into)]
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// The present attributes in encoding order.
    fn attributes(&self) -> Vec<(ObjectIdentifier, &str)> {
        [
            (COUNTRY_NAME, self.country.as_deref()),
            (STATE_OR_PROVINCE_NAME, self.state.as_deref()),
            (LOCALITY_NAME, self.locality.as_deref()),
            (ORGANIZATION_NAME, self.organization.as_deref()),
            (ORGANIZATIONAL_UNIT_NAME, self.organization_unit.as_deref()),
            (COMMON_NAME, Some(self.common_name.as_str())),
        ]
        .into_iter()
        .filter_map(|(oid, value)| value.map(|v| (oid, v)))
        .collect()
    }

    /// Converts the distinguished name to an X.509 `Name`.
    pub fn as_x509_name(&self) -> Result<Name> {
        let rdns = self
            .attributes()
            .into_iter()
            .map(|(oid, value)| -> Result<RelativeDistinguishedName> {
                let value = if oid == COUNTRY_NAME {
                    PrintableStringRef::new(value).map_err(|_| {
                        CertForgeError::InvalidInput(format!(
                            "country {value:?} is not a printable string"
                        ))
                    })?;
                    Any::new(Tag::PrintableString, value.as_bytes())?
                } else {
                    Any::new(Tag::Utf8String, value.as_bytes())?
                };
                let set = SetOfVec::try_from(vec![AttributeTypeAndValue { oid, value }])?;
                Ok(RelativeDistinguishedName(set))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509 `Name`.
    ///
    /// Attributes other than the six modelled here are ignored.
    pub fn from_x509_name(name: &Name) -> Result<Self> {
        let mut dn = DistinguishedName::default();
        for rdn in name.0.iter() {
            for attr in rdn.0.iter() {
                let slot = match attr.oid {
                    COMMON_NAME => {
                        dn.common_name = directory_string(&attr.value)?;
                        continue;
                    }
                    COUNTRY_NAME => &mut dn.country,
                    STATE_OR_PROVINCE_NAME => &mut dn.state,
                    LOCALITY_NAME => &mut dn.locality,
                    ORGANIZATION_NAME => &mut dn.organization,
                    ORGANIZATIONAL_UNIT_NAME => &mut dn.organization_unit,
                    _ => continue,
                };
                *slot = Some(directory_string(&attr.value)?);
            }
        }
        Ok(dn)
    }
}

fn directory_string(value: &Any) -> Result<String> {
    match value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String => {
            std::str::from_utf8(value.value())
                .map(str::to_string)
                .map_err(|e| CertForgeError::DecodingError(e.to_string()))
        }
        tag => Err(CertForgeError::DecodingError(format!(
            "unsupported directory string type {tag}"
        ))),
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = ["C", "ST", "L", "O", "OU", "CN"];
        let all = [
            self.country.as_deref(),
            self.state.as_deref(),
            self.locality.as_deref(),
            self.organization.as_deref(),
            self.organization_unit.as_deref(),
            Some(self.common_name.as_str()),
        ];
        let mut first = true;
        for (label, value) in labels.iter().zip(all) {
            if let Some(value) = value {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{label}={value}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Certificate validity period.
///
/// Both bounds are truncated to whole seconds, the resolution of X.509 time values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity window, rejecting one that ends before it starts.
    pub fn new(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Result<Self> {
        if not_after < not_before {
            return Err(CertForgeError::InvalidInput(format!(
                "validity ends ({not_after}) before it starts ({not_before})"
            )));
        }
        Ok(Self {
            not_before: truncate_to_seconds(not_before),
            not_after: truncate_to_seconds(not_after),
        })
    }

    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Result<Self> {
        Self::backdated(0, days)
    }

    /// Creates a validity period that started `backdate_days` ago and ends `days` from now.
    ///
    /// The back-dated start tolerates clock skew between issuer and relying party. Fails
    /// with [`CertForgeError::InvalidInput`] if the window would end before it starts.
    pub fn backdated(backdate_days: i64, days: i64) -> Result<Self> {
        let now = OffsetDateTime::now_utc();
        Self::new(now - Duration::days(backdate_days), now + Duration::days(days))
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.not_after - self.not_before
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

fn truncate_to_seconds(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_nanosecond(0).unwrap_or(at)
}

/// Positive certificate serial number, big-endian without leading zero bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SerialNumber(Vec<u8>);

impl SerialNumber {
    /// RFC 5280 caps serial numbers at 20 octets.
    pub const MAX_LEN: usize = 20;

    /// Generates a random serial from a CSPRNG.
    ///
    /// The top bit is cleared so the value stays positive and the next bit is set so
    /// the encoding is always exactly 20 octets, leaving 158 random bits.
    pub fn random() -> Self {
        let mut bytes = [0u8; Self::MAX_LEN];
        rand::rng().fill_bytes(&mut bytes);
        bytes[0] = (bytes[0] & 0x7f) | 0x40;
        Self(bytes.to_vec())
    }

    /// Creates a serial from big-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let start = bytes.iter().position(|b| *b != 0).ok_or_else(|| {
            CertForgeError::InvalidInput("serial number must be positive".to_string())
        })?;
        let bytes = &bytes[start..];
        // A set high bit costs one more octet for the sign.
        let encoded_len = bytes.len() + usize::from(bytes[0] & 0x80 != 0);
        if encoded_len > Self::MAX_LEN {
            return Err(CertForgeError::InvalidInput(format!(
                "serial number needs {encoded_len} octets, at most {} allowed",
                Self::MAX_LEN
            )));
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn to_x509(&self) -> Result<x509_cert::serial_number::SerialNumber> {
        Ok(x509_cert::serial_number::SerialNumber::new(&self.0)?)
    }

    pub(crate) fn from_x509(serial: &x509_cert::serial_number::SerialNumber) -> Result<Self> {
        Self::from_bytes(serial.as_bytes())
    }
}

impl TryFrom<u64> for SerialNumber {
    type Error = CertForgeError;

    fn try_from(value: u64) -> Result<Self> {
        Self::from_bytes(&value.to_be_bytes())
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Represents an X.509 extension.
///
/// This struct contains the OID, criticality, and value of an extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        if self.oid != E::OID {
            return Err(CertForgeError::InvalidInput(format!(
                "extension {} is not {}",
                self.oid,
                E::OID
            )));
        }
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_name() -> DistinguishedName {
        DistinguishedName::builder()
            .country("CZ")
            .state("Prague")
            .locality("Prague")
            .organization("Example Org")
            .common_name("Example CA")
            .build()
    }

    #[test]
    fn test_name_roundtrip_keeps_every_field() {
        let dn = full_name();
        let decoded = DistinguishedName::from_x509_name(&dn.as_x509_name().unwrap()).unwrap();
        assert_eq!(decoded, dn);
        assert_eq!(decoded.organization_unit, None);
    }

    #[test]
    fn test_name_attribute_order() {
        let name = full_name().as_x509_name().unwrap();
        let oids: Vec<_> = name.0.iter().map(|rdn| rdn.0.iter().next().unwrap().oid).collect();
        assert_eq!(
            oids,
            vec![
                COUNTRY_NAME,
                STATE_OR_PROVINCE_NAME,
                LOCALITY_NAME,
                ORGANIZATION_NAME,
                COMMON_NAME
            ]
        );
        assert_eq!(
            full_name().to_string(),
            "C=CZ, ST=Prague, L=Prague, O=Example Org, CN=Example CA"
        );
    }

    #[test]
    fn test_country_must_be_printable() {
        let dn = DistinguishedName::builder()
            .common_name("x")
            .country("Č")
            .build();
        assert!(matches!(
            dn.as_x509_name(),
            Err(CertForgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_random_serials_are_twenty_positive_octets() {
        let a = SerialNumber::random();
        let b = SerialNumber::random();
        assert_ne!(a, b);
        for serial in [&a, &b] {
            assert_eq!(serial.as_bytes().len(), SerialNumber::MAX_LEN);
            assert_eq!(serial.as_bytes()[0] & 0x80, 0);
            let x509 = serial.to_x509().unwrap();
            assert_eq!(&SerialNumber::from_x509(&x509).unwrap(), serial);
        }
    }

    #[test]
    fn test_serial_from_bytes_normalizes_and_bounds() {
        let serial = SerialNumber::from_bytes(&[0, 0, 1, 2]).unwrap();
        assert_eq!(serial.as_bytes(), &[1, 2]);
        assert_eq!(serial.to_string(), "01:02");
        assert_eq!(SerialNumber::try_from(258u64).unwrap(), serial);
        assert!(SerialNumber::from_bytes(&[0, 0]).is_err());
        assert!(SerialNumber::from_bytes(&[0xff; 20]).is_err());
        assert!(SerialNumber::from_bytes(&[0x7f; 20]).is_ok());
    }

    #[test]
    fn test_validity_backdated_window() {
        let validity = Validity::backdated(1, 30).unwrap();
        assert_eq!(validity.duration(), Duration::days(31));
        assert!(validity.contains(OffsetDateTime::now_utc()));
        assert_eq!(validity.not_before.nanosecond(), 0);
    }

    #[test]
    fn test_validity_rejects_inverted_window() {
        let now = OffsetDateTime::now_utc();
        assert!(Validity::new(now, now - Duration::days(1)).is_err());
        assert!(matches!(
            Validity::backdated(1, -5),
            Err(CertForgeError::InvalidInput(_))
        ));
        assert!(Validity::for_days(-1).is_err());
        assert!(Validity::for_days(0).is_ok());
    }
}
