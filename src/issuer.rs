use der::flagset::FlagSet;
use x509_cert::name::Name;
use tracing::info;

use crate::cert::builder::CertificateRequest;
use crate::cert::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage, KeyUsages,
    SubjectAltName,
};
use crate::cert::params::DistinguishedName;
use crate::cert::{Certificate, CertificateWithPrivateKey};
use crate::error::Result;
use crate::key::{DigestAlgorithm, KeyPair};
use crate::policy::{IssuancePolicy, SERVER_DNS_NAME};

/// Represents an entity capable of issuing certificates.
///
/// This trait provides methods to retrieve issuer details and issue certificates.
pub trait Issuer {
    /// Returns the encoded name of the issuer, copied into issued certificates as is.
    fn issuer_name(&self) -> Result<Name>;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Stamps this issuer's name on `request` and signs it with the issuer key.
    fn issue(&self, request: CertificateRequest, digest: DigestAlgorithm) -> Result<Certificate> {
        request
            .issuer_x509_name(self.issuer_name()?)
            .sign(self.signing_key(), digest)
    }
}

/// Key usages of a certificate authority: certificate and CRL signing only.
pub fn ca_key_usage() -> KeyUsage {
    KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign)
}

/// Key usages of a server certificate.
pub fn server_key_usage() -> KeyUsage {
    let flags: FlagSet<KeyUsages> =
        KeyUsages::DigitalSignature | KeyUsages::DataEncipherment | KeyUsages::KeyAgreement;
    KeyUsage(flags)
}

/// Builds and self-signs a certificate authority certificate.
///
/// Extensions, in order: BasicConstraints(CA, no path length) critical, then KeyUsage
/// {keyCertSign, cRLSign} non-critical.
pub fn issue_ca_certificate(
    subject: DistinguishedName,
    key: KeyPair,
    policy: &IssuancePolicy,
) -> Result<CertificateWithPrivateKey> {
    info!(subject = %subject, "issuing certificate authority");
    let request = CertificateRequest::new()
        .subject(subject)
        .validity(policy.ca_validity()?)
        .public_key(key.public_key())
        .random_serial_number()
        .add_extension(
            BasicConstraints {
                is_ca: true,
                max_path_length: None,
            },
            true,
        )?
        .add_extension(ca_key_usage(), false)?;

    let cert = Certificate::new_self_signed(request, &key, policy.digest)?;
    Ok(CertificateWithPrivateKey { cert, key })
}

/// Builds a server certificate for `key` and signs it with the CA's key.
///
/// Extensions, in order: BasicConstraints(not CA) critical, ExtendedKeyUsage
/// {serverAuth} non-critical, SubjectAltName {"localhost"} critical, KeyUsage
/// {digitalSignature, dataEncipherment, keyAgreement} non-critical.
pub fn issue_server_certificate(
    ca: &CertificateWithPrivateKey,
    subject: DistinguishedName,
    key: KeyPair,
    policy: &IssuancePolicy,
) -> Result<CertificateWithPrivateKey> {
    info!(subject = %subject, "issuing server certificate");
    let request = CertificateRequest::new()
        .subject(subject)
        .validity(policy.leaf_validity()?)
        .public_key(key.public_key())
        .random_serial_number()
        .add_extension(BasicConstraints::default(), true)?
        .add_extension(
            ExtendedKeyUsage {
                usage: vec![ExtendedKeyUsageOption::ServerAuth],
            },
            false,
        )?
        .add_extension(
            SubjectAltName {
                names: vec![SERVER_DNS_NAME.to_string()],
            },
            true,
        )?
        .add_extension(server_key_usage(), false)?;

    let cert = ca.issue(request, policy.digest)?;
    Ok(CertificateWithPrivateKey { cert, key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::SignatureAlgorithm;
    use crate::cert::extensions::ToAndFromX509Extension;
    use crate::key::KeyAlgorithm;
    use const_oid::ObjectIdentifier;
    use der::asn1::{Any, SetOfVec};
    use der::{Encode, Tag};
    use x509_cert::attr::AttributeTypeAndValue;
    use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

    fn ec_policy() -> IssuancePolicy {
        IssuancePolicy::builder()
            .key_algorithm(KeyAlgorithm::EcdsaP256)
            .build()
    }

    #[test]
    fn test_ca_extension_policy() {
        let subject = DistinguishedName::builder().common_name("Test CA").build();
        let ca =
            issue_ca_certificate(subject.clone(), KeyPair::generate_ecdsa_p256(), &ec_policy())
                .unwrap();

        assert_eq!(ca.cert.subject().unwrap(), subject);
        assert_eq!(ca.cert.issuer().unwrap(), subject);
        let extensions = ca.cert.extensions();
        assert_eq!(extensions.len(), 2);
        assert_eq!(extensions[0].oid, BasicConstraints::OID);
        assert!(extensions[0].critical);
        assert!(!extensions[1].critical);
        assert_eq!(ca.cert.key_usage().unwrap(), Some(ca_key_usage()));
        assert_eq!(
            ca.cert.basic_constraints().unwrap(),
            Some(BasicConstraints {
                is_ca: true,
                max_path_length: None
            })
        );
        ca.cert.verify_issued_by(&ca.cert).unwrap();
    }

    #[test]
    fn test_issue_uses_certificate_subject_as_issuer() {
        let policy = ec_policy();
        let ca_name = DistinguishedName::builder()
            .common_name("Issuing CA")
            .organization("Example")
            .build();
        let ca = issue_ca_certificate(ca_name.clone(), KeyPair::generate_ecdsa_p256(), &policy)
            .unwrap();
        assert_eq!(ca.issuer_name().unwrap(), ca_name.as_x509_name().unwrap());

        let server = issue_server_certificate(
            &ca,
            DistinguishedName::builder().common_name("server").build(),
            KeyPair::generate_ecdsa_p256(),
            &policy,
        )
        .unwrap();
        assert_eq!(server.cert.issuer().unwrap(), ca_name);
        assert_eq!(server.cert.key_usage().unwrap(), Some(server_key_usage()));
    }

    fn attribute(oid: &str, tag: Tag, value: &str) -> RelativeDistinguishedName {
        let attr = AttributeTypeAndValue {
            oid: ObjectIdentifier::new_unwrap(oid),
            value: Any::new(tag, value.as_bytes()).unwrap(),
        };
        RelativeDistinguishedName(SetOfVec::try_from(vec![attr]).unwrap())
    }

    #[test]
    fn test_imported_ca_name_is_copied_verbatim() {
        // PrintableString O and an emailAddress attribute have no place in
        // DistinguishedName, so they only survive if the raw name is copied.
        let name = RdnSequence(vec![
            attribute("2.5.4.10", Tag::PrintableString, "Example Org"),
            attribute("2.5.4.3", Tag::Utf8String, "Imported CA"),
            attribute("1.2.840.113549.1.9.1", Tag::Ia5String, "ca@example.com"),
        ]);

        let policy = ec_policy();
        let key = KeyPair::generate_ecdsa_p256();
        let generated = issue_ca_certificate(
            DistinguishedName::builder().common_name("placeholder").build(),
            key.clone(),
            &policy,
        )
        .unwrap();
        let mut tbs = generated.cert.as_x509().tbs_certificate.clone();
        tbs.subject = name.clone();
        tbs.issuer = name.clone();
        let signature = key
            .sign_data(&tbs.to_der().unwrap(), DigestAlgorithm::Sha256)
            .unwrap();
        let resigned =
            Certificate::from_signed_parts(tbs, SignatureAlgorithm::Sha256WithECDSA, &signature)
                .unwrap();

        let ca = CertificateWithPrivateKey {
            cert: Certificate::from_pem(&resigned.to_pem().unwrap()).unwrap(),
            key,
        };
        ca.cert.verify_issued_by(&ca.cert).unwrap();

        let server = issue_server_certificate(
            &ca,
            DistinguishedName::builder().common_name("server").build(),
            KeyPair::generate_ecdsa_p256(),
            &policy,
        )
        .unwrap();
        assert_eq!(server.cert.as_x509().tbs_certificate.issuer, name);
        server.cert.verify_issued_by(&ca.cert).unwrap();
        assert_eq!(
            server.cert.issuer().unwrap().organization.as_deref(),
            Some("Example Org")
        );
    }

    #[test]
    fn test_policy_digest_is_enforced() {
        let policy = IssuancePolicy::builder()
            .key_algorithm(KeyAlgorithm::EcdsaP256)
            .digest(DigestAlgorithm::Sha512)
            .build();
        let err = issue_ca_certificate(
            DistinguishedName::builder().common_name("CA").build(),
            KeyPair::generate_ecdsa_p256(),
            &policy,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::CertForgeError::UnsupportedDigest(DigestAlgorithm::Sha512)
        ));
    }
}
