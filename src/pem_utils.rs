use crate::error::{CertForgeError, Result};

/// RFC 7468 framing: LF line endings and a 64-column base64 body.
const ENCODE_CONFIG: pem::EncodeConfig =
    pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF);

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(&pem, ENCODE_CONFIG)
}

/// Convert a PEM‑encoded string to DER‑encoded bytes, checking its label.
pub fn pem_to_der(pem_str: &str, expected_label: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str)?;
    if pem.tag() != expected_label {
        return Err(CertForgeError::DecodingError(format!(
            "expected PEM label {expected_label:?}, found {:?}",
            pem.tag()
        )));
    }
    Ok(pem.into_contents())
}

/// Returns the label of the first PEM document in `pem_str`.
pub fn pem_label(pem_str: &str) -> Result<String> {
    Ok(pem::parse(pem_str)?.tag().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_with_lf_and_64_columns() {
        let der = vec![0xAB; 100];
        let encoded = der_to_pem(&der, "CERTIFICATE");
        assert!(encoded.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(encoded.ends_with("-----END CERTIFICATE-----\n"));
        assert!(!encoded.contains('\r'));
        assert!(encoded.lines().all(|line| line.len() <= 64));
        assert_eq!(pem_to_der(&encoded, "CERTIFICATE").unwrap(), der);
    }

    #[test]
    fn test_rejects_wrong_label() {
        let encoded = der_to_pem(&[1, 2, 3], "PRIVATE KEY");
        let err = pem_to_der(&encoded, "CERTIFICATE").unwrap_err();
        assert!(matches!(err, CertForgeError::DecodingError(_)));
        assert_eq!(pem_label(&encoded).unwrap(), "PRIVATE KEY");
    }
}
