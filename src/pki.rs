use tracing::info;

use crate::cert::CertificateWithPrivateKey;
use crate::cert::params::DistinguishedName;
use crate::error::{CertForgeError, Result};
use crate::issuer::{issue_ca_certificate, issue_server_certificate};
use crate::key::KeyPair;
use crate::policy::IssuancePolicy;

/// A certificate authority and the server certificate it signed, each with its key.
#[derive(Debug, Clone)]
pub struct IssuedChain {
    pub ca: CertificateWithPrivateKey,
    pub server: CertificateWithPrivateKey,
}

/// The three PEM documents a TLS server deployment needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBundle {
    /// CA certificate, `CERTIFICATE`.
    pub ca_certificate: String,
    /// Server private key, unencrypted, `RSA PRIVATE KEY` or `EC PRIVATE KEY`.
    pub server_private_key: String,
    /// Server certificate, `CERTIFICATE`.
    pub server_certificate: String,
}

impl PemBundle {
    pub const CA_CERTIFICATE_FILE: &'static str = "ca.cert.pem";
    pub const SERVER_PRIVATE_KEY_FILE: &'static str = "server.key.pem";
    pub const SERVER_CERTIFICATE_FILE: &'static str = "server.cert.pem";

    /// Conventional file names paired with their contents.
    pub fn files(&self) -> [(&'static str, &str); 3] {
        [
            (Self::CA_CERTIFICATE_FILE, self.ca_certificate.as_str()),
            (Self::SERVER_PRIVATE_KEY_FILE, self.server_private_key.as_str()),
            (Self::SERVER_CERTIFICATE_FILE, self.server_certificate.as_str()),
        ]
    }
}

impl IssuedChain {
    /// Serializes the chain for a TLS server.
    pub fn to_pem_bundle(&self) -> Result<PemBundle> {
        let serialization = |e: CertForgeError| match e {
            CertForgeError::SerializationError(_) => e,
            other => CertForgeError::SerializationError(other.to_string()),
        };
        Ok(PemBundle {
            ca_certificate: self.ca.cert.to_pem().map_err(serialization)?,
            server_private_key: self.server.key.to_traditional_pem().map_err(serialization)?,
            server_certificate: self.server.cert.to_pem().map_err(serialization)?,
        })
    }
}

/// Runs one complete issuance: CA key, self-signed CA certificate, server key, and a
/// server certificate signed by the CA key.
///
/// Every run draws fresh keys and serial numbers; nothing is reused between runs.
pub fn issue_server_chain(
    policy: &IssuancePolicy,
    ca_subject: DistinguishedName,
    server_subject: DistinguishedName,
) -> Result<IssuedChain> {
    // Fail before any key is generated.
    policy.ca_validity()?;
    policy.leaf_validity()?;

    info!(algorithm = ?policy.key_algorithm, "generating CA key");
    let ca_key = KeyPair::generate(policy.key_algorithm)?;
    let ca = issue_ca_certificate(ca_subject, ca_key, policy)?;

    info!(algorithm = ?policy.key_algorithm, "generating server key");
    let server_key = KeyPair::generate(policy.key_algorithm)?;
    let server = issue_server_certificate(&ca, server_subject, server_key, policy)?;

    info!("issuance complete");
    Ok(IssuedChain { ca, server })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyAlgorithm;

    fn name(common_name: &str) -> DistinguishedName {
        DistinguishedName::builder().common_name(common_name).build()
    }

    #[test]
    fn test_inverted_leaf_window_is_rejected() {
        let policy = IssuancePolicy::builder()
            .key_algorithm(KeyAlgorithm::EcdsaP256)
            .leaf_validity_days(-5)
            .build();
        let err = issue_server_chain(&policy, name("CA"), name("server")).unwrap_err();
        assert!(matches!(err, CertForgeError::InvalidInput(_)));
    }

    #[test]
    fn test_chain_windows_are_readable() {
        let policy = IssuancePolicy::builder()
            .key_algorithm(KeyAlgorithm::EcdsaP256)
            .leaf_validity_days(0)
            .build();
        let chain = issue_server_chain(&policy, name("CA"), name("server")).unwrap();
        let validity = chain.server.cert.validity().unwrap();
        assert!(validity.not_before < validity.not_after);
        chain.server.cert.verify_issued_by(&chain.ca.cert).unwrap();
    }
}
