use der::Encode;
use time::OffsetDateTime;
use tracing::debug;
use x509_cert::name::Name;

use super::Certificate;
use super::extensions::ToAndFromX509Extension;
use super::params::{DistinguishedName, ExtensionParam, SerialNumber, Validity};
use crate::error::{CertForgeError, Result};
use crate::key::{DigestAlgorithm, KeyPair, PublicKey};
use crate::tbs_certificate::TbsCertificate;

/// A builder for constructing X.509 certificates.
///
/// Setters consume the request and hand it back, so calls chain. [`sign`] consumes it
/// for good: once a certificate has been produced, the request it came from no longer
/// exists and cannot be altered.
///
/// Extensions are kept in insertion order. Adding the same kind twice is not rejected.
///
/// ```rust,no_run
/// use certforge::cert::builder::CertificateRequest;
/// use certforge::cert::extensions::BasicConstraints;
/// use certforge::cert::params::{DistinguishedName, SerialNumber, Validity};
/// use certforge::key::{DigestAlgorithm, KeyPair};
///
/// # fn main() -> Result<(), certforge::error::CertForgeError> {
/// let key = KeyPair::generate_ecdsa_p256();
/// let name = DistinguishedName::builder().common_name("Example CA").build();
///
/// let certificate = CertificateRequest::new()
///     .subject(name.clone())
///     .issuer(name)
///     .validity(Validity::backdated(1, 3650)?)
///     .public_key(key.public_key())
///     .serial_number(SerialNumber::random())
///     .add_extension(BasicConstraints { is_ca: true, max_path_length: None }, true)?
///     .sign(&key, DigestAlgorithm::Sha256)?;
/// # Ok(())
/// # }
/// ```
///
/// [`sign`]: CertificateRequest::sign
#[derive(Clone, Debug, Default)]
pub struct CertificateRequest {
    subject: Option<DistinguishedName>,
    issuer: Option<IssuerName>,
    validity: Option<Validity>,
    public_key: Option<PublicKey>,
    serial_number: Option<SerialNumber>,
    extensions: Vec<ExtensionParam>,
}

impl CertificateRequest {
    /// Create an empty request with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject distinguished name.
    pub fn subject(mut self, name: DistinguishedName) -> Self {
        self.subject = Some(name);
        self
    }

    /// Set the issuer distinguished name.
    pub fn issuer(mut self, name: DistinguishedName) -> Self {
        self.issuer = Some(IssuerName::Modelled(name));
        self
    }

    /// Set the issuer name verbatim, as encoded in the issuing certificate's subject.
    ///
    /// Attribute types, string types and RDN structure are copied without change.
    pub fn issuer_x509_name(mut self, name: Name) -> Self {
        self.issuer = Some(IssuerName::Encoded(name));
        self
    }

    /// Set the validity period.
    pub fn validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    /// Set the validity period from its two bounds.
    pub fn validity_window(
        self,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Result<Self> {
        Ok(self.validity(Validity::new(not_before, not_after)?))
    }

    /// Set the subject public key.
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Set the serial number.
    pub fn serial_number(mut self, serial: SerialNumber) -> Self {
        self.serial_number = Some(serial);
        self
    }

    /// Set a freshly generated random serial number.
    pub fn random_serial_number(self) -> Self {
        self.serial_number(SerialNumber::random())
    }

    /// Encode and append an extension.
    pub fn add_extension<E: ToAndFromX509Extension>(
        mut self,
        extension: E,
        critical: bool,
    ) -> Result<Self> {
        self.extensions
            .push(ExtensionParam::from_extension(&extension, critical)?);
        Ok(self)
    }

    /// Append an already encoded extension.
    pub fn add_raw_extension(mut self, extension: ExtensionParam) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn subject_name(&self) -> Option<&DistinguishedName> {
        self.subject.as_ref()
    }

    pub fn extensions(&self) -> &[ExtensionParam] {
        &self.extensions
    }

    /// Sign the request with the issuer's private key, producing a certificate.
    ///
    /// Fails with [`CertForgeError::IncompleteRequest`] if the subject, issuer, validity,
    /// public key or serial number is missing, and with
    /// [`CertForgeError::UnsupportedDigest`] unless `digest` is SHA-256.
    pub fn sign(self, issuer_key: &KeyPair, digest: DigestAlgorithm) -> Result<Certificate> {
        let subject = self
            .subject
            .ok_or(CertForgeError::IncompleteRequest("subject"))?;
        let issuer = match self
            .issuer
            .ok_or(CertForgeError::IncompleteRequest("issuer"))?
        {
            IssuerName::Modelled(name) => name.as_x509_name()?,
            IssuerName::Encoded(name) => name,
        };
        let validity = self
            .validity
            .ok_or(CertForgeError::IncompleteRequest("validity"))?;
        let subject_public_key = self
            .public_key
            .ok_or(CertForgeError::IncompleteRequest("public key"))?;
        let serial_number = self
            .serial_number
            .ok_or(CertForgeError::IncompleteRequest("serial number"))?;

        let signature_algorithm = issuer_key.signature_algorithm(digest)?;

        debug!(
            serial = %serial_number,
            subject = %subject,
            issuer = %issuer,
            algorithm = ?signature_algorithm,
            extensions = self.extensions.len(),
            "signing certificate"
        );

        let tbs_cert = TbsCertificate {
            serial_number,
            signature_algorithm,
            issuer,
            validity,
            subject,
            subject_public_key,
            extensions: self.extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let tbs_der = tbs_cert_inner
            .to_der()
            .map_err(|e| CertForgeError::SerializationError(e.to_string()))?;
        let signature = issuer_key.sign_data(&tbs_der, digest)?;

        Certificate::from_signed_parts(tbs_cert_inner, signature_algorithm, &signature)
    }
}

#[derive(Clone, Debug)]
enum IssuerName {
    Modelled(DistinguishedName),
    Encoded(Name),
}
