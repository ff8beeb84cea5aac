use std::sync::OnceLock;

use certforge::cert::params::DistinguishedName;
use certforge::key::KeyAlgorithm;
use certforge::pki::{IssuedChain, issue_server_chain};
use certforge::policy::IssuancePolicy;

pub fn ca_subject() -> DistinguishedName {
    DistinguishedName::builder()
        .country("CZ")
        .state("Prague")
        .locality("Prague")
        .organization("DesignPatternsInTheWild")
        .common_name("DesignPatternsInTheWildCA")
        .build()
}

pub fn server_subject() -> DistinguishedName {
    DistinguishedName::builder()
        .country("CZ")
        .state("Prague")
        .locality("Prague")
        .organization("DesignPatternsInTheWild")
        .common_name("DesignPatternsInTheWildServer")
        .build()
}

pub fn ec_policy() -> IssuancePolicy {
    IssuancePolicy::builder()
        .key_algorithm(KeyAlgorithm::EcdsaP256)
        .build()
}

/// An RSA-2048 chain issued with the default policy, generated once per test binary.
pub fn rsa_chain() -> &'static IssuedChain {
    static CHAIN: OnceLock<IssuedChain> = OnceLock::new();
    CHAIN.get_or_init(|| {
        issue_server_chain(&IssuancePolicy::default(), ca_subject(), server_subject())
            .expect("Failed to issue RSA chain")
    })
}

pub fn ec_chain() -> IssuedChain {
    issue_server_chain(&ec_policy(), ca_subject(), server_subject())
        .expect("Failed to issue ECDSA chain")
}
