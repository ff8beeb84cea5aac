//! Issues a CA and a `localhost` server certificate and writes the PEM files.
//!
//! ```text
//! RUST_LOG=info cargo run --example generate -- target/certs
//! ```

use std::path::PathBuf;

use certforge::cert::params::DistinguishedName;
use certforge::pki::issue_server_chain;
use certforge::policy::IssuancePolicy;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT_DIR: &str = "target/certs";

fn name(common_name: &str) -> DistinguishedName {
    DistinguishedName::builder()
        .country("CZ")
        .state("Prague")
        .locality("Prague")
        .organization("DesignPatternsInTheWild")
        .common_name(common_name)
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let chain = issue_server_chain(
        &IssuancePolicy::default(),
        name("DesignPatternsInTheWildCA"),
        name("DesignPatternsInTheWildServer"),
    )?;
    let bundle = chain.to_pem_bundle()?;

    std::fs::create_dir_all(&output_dir)?;
    for (file_name, contents) in bundle.files() {
        let path = output_dir.join(file_name);
        std::fs::write(&path, contents)?;
        info!(path = %path.display(), "wrote");
    }

    println!(
        "CA serial {}, server serial {}",
        chain.ca.cert.serial_number()?,
        chain.server.cert.serial_number()?
    );
    Ok(())
}
