pub mod builder;
pub mod extensions;
pub mod params;

use der::asn1::{Any, AnyRef, BitString};
use der::{Decode, Encode};
use x509_cert::certificate::{CertificateInner, TbsCertificateInner};
use x509_cert::name::Name;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::error::{CertForgeError, Result};
use crate::issuer::Issuer;
use crate::key::{DigestAlgorithm, KeyPair, PublicKey};
use crate::pem_utils;
use crate::tbs_certificate::TbsCertificate;
use builder::CertificateRequest;
use extensions::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName, ToAndFromX509Extension,
};
use params::{DistinguishedName, ExtensionParam, SerialNumber, Validity};

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
}

impl From<SignatureAlgorithm> for AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA identifiers carry explicit NULL parameters (RFC 4055); ECDSA ones carry none
    /// (RFC 5758).
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Sha256WithRSA => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(Any::from(AnyRef::NULL)),
            },
            SignatureAlgorithm::Sha256WithECDSA => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
                parameters: None,
            },
        }
    }
}

impl TryFrom<&AlgorithmIdentifierOwned> for SignatureAlgorithm {
    type Error = CertForgeError;

    fn try_from(value: &AlgorithmIdentifierOwned) -> Result<Self> {
        match value.oid {
            const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION => {
                Ok(SignatureAlgorithm::Sha256WithRSA)
            }
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256 => Ok(SignatureAlgorithm::Sha256WithECDSA),
            oid => Err(CertForgeError::DecodingError(format!(
                "Unsupported signature algorithm {oid}"
            ))),
        }
    }
}

/// A signed X.509 certificate.
///
/// Certificates are only produced by signing a [`CertificateRequest`] or by decoding
/// DER/PEM, and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    inner: CertificateInner,
}

impl Certificate {
    /// Wraps a freshly signed TBS structure.
    pub(crate) fn from_signed_parts(
        tbs_certificate: TbsCertificateInner,
        signature_algorithm: SignatureAlgorithm,
        signature: &[u8],
    ) -> Result<Self> {
        let signature = BitString::from_bytes(signature)
            .map_err(|e| CertForgeError::SerializationError(e.to_string()))?;
        Ok(Self {
            inner: CertificateInner {
                tbs_certificate,
                signature_algorithm: signature_algorithm.into(),
                signature,
            },
        })
    }

    /// The underlying `x509-cert` structure.
    pub fn as_x509(&self) -> &CertificateInner {
        &self.inner
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertForgeError::SerializationError(e.to_string()))
    }

    /// Encodes the certificate into an RFC 7468 `CERTIFICATE` PEM document.
    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, CERTIFICATE_LABEL))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_der(der)?,
        })
    }

    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem_str, CERTIFICATE_LABEL)?)
    }

    /// Decodes the to-be-signed fields.
    pub fn tbs(&self) -> Result<TbsCertificate> {
        TbsCertificate::from_tbs_certificate_inner(&self.inner.tbs_certificate)
    }

    pub fn subject(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    pub fn serial_number(&self) -> Result<SerialNumber> {
        SerialNumber::from_x509(&self.inner.tbs_certificate.serial_number)
    }

    pub fn validity(&self) -> Result<Validity> {
        Ok(self.tbs()?.validity)
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::try_from(&self.inner.signature_algorithm)
    }

    /// All extensions in encoding order.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect()
    }

    /// Decodes the first extension of kind `E`, along with its critical flag.
    pub fn extension<E: ToAndFromX509Extension>(&self) -> Result<Option<(E, bool)>> {
        match self.extensions().into_iter().find(|ext| ext.oid == E::OID) {
            Some(ext) => Ok(Some((ext.to_extension::<E>()?, ext.critical))),
            None => Ok(None),
        }
    }

    pub fn basic_constraints(&self) -> Result<Option<BasicConstraints>> {
        Ok(self.extension::<BasicConstraints>()?.map(|(ext, _)| ext))
    }

    pub fn key_usage(&self) -> Result<Option<KeyUsage>> {
        Ok(self.extension::<KeyUsage>()?.map(|(ext, _)| ext))
    }

    pub fn extended_key_usage(&self) -> Result<Option<ExtendedKeyUsage>> {
        Ok(self.extension::<ExtendedKeyUsage>()?.map(|(ext, _)| ext))
    }

    /// DNS names from the Subject Alternative Name extension, empty if it is absent.
    pub fn subject_alt_names(&self) -> Result<Vec<String>> {
        Ok(self
            .extension::<SubjectAltName>()?
            .map(|(san, _)| san.names)
            .unwrap_or_default())
    }

    /// Checks the certificate signature against `issuer_key`.
    pub fn verify_signature(&self, issuer_key: &PublicKey) -> Result<()> {
        if self.inner.signature_algorithm != self.inner.tbs_certificate.signature {
            return Err(CertForgeError::SignatureError(
                "outer and inner signature algorithms differ".to_string(),
            ));
        }
        let algorithm = self.signature_algorithm()?;
        let tbs_der = self
            .inner
            .tbs_certificate
            .to_der()
            .map_err(|e| CertForgeError::SerializationError(e.to_string()))?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            CertForgeError::SignatureError("signature has unused bits".to_string())
        })?;
        issuer_key.verify(&tbs_der, signature, &algorithm)
    }

    /// Checks that `issuer` issued this certificate: the issuer name must equal the
    /// issuer certificate's subject and the signature must verify under its key.
    pub fn verify_issued_by(&self, issuer: &Certificate) -> Result<()> {
        if self.inner.tbs_certificate.issuer != issuer.inner.tbs_certificate.subject {
            return Err(CertForgeError::SignatureError(
                "issuer name does not match the issuer certificate subject".to_string(),
            ));
        }
        self.verify_signature(&issuer.public_key()?)
    }

    /// Creates a new self-signed certificate.
    ///
    /// The request's subject doubles as its issuer and `key` signs it.
    pub fn new_self_signed(
        request: CertificateRequest,
        key: &KeyPair,
        digest: DigestAlgorithm,
    ) -> Result<Self> {
        let name = request
            .subject_name()
            .cloned()
            .ok_or(CertForgeError::IncompleteRequest("subject"))?;

        let self_issuer = SelfIssuer { name, key };
        self_issuer.issue(request, digest)
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> Result<Name> {
        self.name.as_x509_name()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}

/// A certificate together with the private key matching its public key.
#[derive(Debug, Clone)]
pub struct CertificateWithPrivateKey {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl Issuer for CertificateWithPrivateKey {
    fn issuer_name(&self) -> Result<Name> {
        // The name of the issuer is the subject of the certificate
        Ok(self.cert.inner.tbs_certificate.subject.clone())
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }
}
