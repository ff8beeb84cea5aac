//! # CertForge - Certificate Authority and Server Certificate Issuance
//!
//! CertForge builds a self-signed certificate authority, issues a TLS server certificate
//! signed by it, and exports both as PEM. It is built entirely on RustCrypto crates;
//! key generation and signing are delegated to `rsa` and `p256`.
//!
//! ## Supported Key Types
//!
//! - **RSA**: 2048, 3072, and 4096-bit keys, PKCS#1 v1.5 signatures
//! - **ECDSA**: P-256
//!
//! Signatures always use SHA-256.
//!
//! ## Quick Start
//!
//! ### Issuing a CA and a server certificate
//!
//! ```rust,no_run
//! use certforge::{
//!     cert::params::DistinguishedName,
//!     pki::issue_server_chain,
//!     policy::IssuancePolicy,
//! };
//!
//! # fn main() -> Result<(), certforge::error::CertForgeError> {
//! let ca_subject = DistinguishedName::builder()
//!     .country("CZ")
//!     .organization("Example Corp")
//!     .common_name("Example CA")
//!     .build();
//! let server_subject = DistinguishedName::builder()
//!     .country("CZ")
//!     .organization("Example Corp")
//!     .common_name("Example Server")
//!     .build();
//!
//! let chain = issue_server_chain(&IssuancePolicy::default(), ca_subject, server_subject)?;
//! let bundle = chain.to_pem_bundle()?;
//! println!("{}", bundle.server_certificate);
//! # Ok(())
//! # }
//! ```
//!
//! ### Building a certificate by hand
//!
//! ```rust,no_run
//! use certforge::{
//!     cert::{
//!         builder::CertificateRequest,
//!         extensions::{BasicConstraints, SubjectAltName},
//!         params::{DistinguishedName, Validity},
//!     },
//!     key::{DigestAlgorithm, KeyPair},
//! };
//!
//! # fn main() -> Result<(), certforge::error::CertForgeError> {
//! let key = KeyPair::generate_ecdsa_p256();
//! let name = DistinguishedName::builder().common_name("example.com").build();
//!
//! let certificate = CertificateRequest::new()
//!     .subject(name.clone())
//!     .issuer(name)
//!     .validity(Validity::for_days(90)?)
//!     .public_key(key.public_key())
//!     .random_serial_number()
//!     .add_extension(BasicConstraints::default(), true)?
//!     .add_extension(SubjectAltName { names: vec!["example.com".to_string()] }, false)?
//!     .sign(&key, DigestAlgorithm::Sha256)?;
//!
//! println!("{}", certificate.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use certforge::{key::KeyPair, error::CertForgeError};
//!
//! match KeyPair::generate_rsa(1024) {
//!     Ok(_) => unreachable!(),
//!     Err(CertForgeError::InvalidKeySpec(msg)) => println!("Rejected: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key generation, signing, verification, PEM import/export
//! - [`cert`]: The certificate builder, certificates, parameters and extensions
//! - [`issuer`]: The `Issuer` trait and the CA/server extension policy
//! - [`policy`]: Validity periods, key algorithm and digest for an issuance run
//! - [`pki`]: The end-to-end issuance flow and its PEM output
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod pki;
pub mod policy;
pub mod tbs_certificate;
