use bon::Builder;

use crate::cert::params::Validity;
use crate::error::Result;
use crate::key::{DigestAlgorithm, KeyAlgorithm};

/// Lifetime of a certificate authority certificate.
pub const CA_VALIDITY_DAYS: i64 = 3650;
/// Lifetime of a server (leaf) certificate.
pub const LEAF_VALIDITY_DAYS: i64 = 30;
/// How far `not_before` is moved into the past to tolerate clock skew.
pub const BACKDATE_DAYS: i64 = 1;
/// DNS name placed in every server certificate's Subject Alternative Name.
pub const SERVER_DNS_NAME: &str = "localhost";

/// Parameters for one issuance run.
///
/// The defaults are the fixed policy: RSA-2048 keys, SHA-256 signatures, a 3650 day CA
/// and 30 day server certificates, both back-dated by one day. The extension sets are
/// not part of the policy; see [`crate::issuer`].
///
/// ```
/// use certforge::key::KeyAlgorithm;
/// use certforge::policy::IssuancePolicy;
///
/// let policy = IssuancePolicy::builder()
///     .key_algorithm(KeyAlgorithm::EcdsaP256)
///     .build();
/// assert_eq!(policy.leaf_validity_days, 30);
/// ```
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct IssuancePolicy {
    #[builder(default = CA_VALIDITY_DAYS)]
    pub ca_validity_days: i64,
    #[builder(default = LEAF_VALIDITY_DAYS)]
    pub leaf_validity_days: i64,
    #[builder(default = BACKDATE_DAYS)]
    pub backdate_days: i64,
    #[builder(default = KeyAlgorithm::Rsa { bits: 2048 })]
    pub key_algorithm: KeyAlgorithm,
    #[builder(default = DigestAlgorithm::Sha256)]
    pub digest: DigestAlgorithm,
}

impl IssuancePolicy {
    /// Window for a CA certificate issued now.
    pub fn ca_validity(&self) -> Result<Validity> {
        Validity::backdated(self.backdate_days, self.ca_validity_days)
    }

    /// Window for a server certificate issued now.
    pub fn leaf_validity(&self) -> Result<Validity> {
        Validity::backdated(self.backdate_days, self.leaf_validity_days)
    }
}

impl Default for IssuancePolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CertForgeError;
    use time::Duration;

    #[test]
    fn test_default_windows() {
        let policy = IssuancePolicy::default();
        assert_eq!(policy.ca_validity().unwrap().duration(), Duration::days(3651));
        assert_eq!(policy.leaf_validity().unwrap().duration(), Duration::days(31));
    }

    #[test]
    fn test_negative_days_are_rejected() {
        let policy = IssuancePolicy::builder().leaf_validity_days(-5).build();
        assert!(policy.ca_validity().is_ok());
        assert!(matches!(
            policy.leaf_validity(),
            Err(CertForgeError::InvalidInput(_))
        ));

        let policy = IssuancePolicy::builder().backdate_days(-2).ca_validity_days(1).build();
        assert!(policy.ca_validity().is_err());
    }
}
