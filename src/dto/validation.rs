//! Validation helpers for DTOs.

use std::net::IpAddr;

use validator::ValidationError;

const MAX_HOSTNAME_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// Rejects values made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a server address is an IP address or a DNS hostname.
///
/// # Examples
///
/// ```ignore
/// validate_address("127.0.0.1")          // Ok
/// validate_address("::1")                // Ok
/// validate_address("eu-1.rtype.example") // Ok
/// validate_address("-bad-.example")      // Err - label starts with a hyphen
/// ```
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    if address.is_empty() || address.len() > MAX_HOSTNAME_LENGTH {
        let mut err = ValidationError::new("address_length");
        err.message = Some(
            format!(
                "address must be 1 to {MAX_HOSTNAME_LENGTH} characters (got {})",
                address.len()
            )
            .into(),
        );
        return Err(err);
    }

    let valid_labels = address.trim_end_matches('.').split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    if !valid_labels {
        let mut err = ValidationError::new("address_format");
        err.message = Some("address must be an IP address or a hostname".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address_accepts_ips_and_hostnames() {
        assert!(validate_address("1.2.3.4").is_ok());
        assert!(validate_address("::1").is_ok());
        assert!(validate_address("2001:db8::7").is_ok());
        assert!(validate_address("localhost").is_ok());
        assert!(validate_address("eu-1.rtype.example").is_ok());
        assert!(validate_address("eu-1.rtype.example.").is_ok());
    }

    #[test]
    fn test_validate_address_rejects_garbage() {
        assert!(validate_address("").is_err());
        assert!(validate_address("-bad-.example").is_err());
        assert!(validate_address("two..dots").is_err());
        assert!(validate_address("space here").is_err());
        assert!(validate_address("1.2.3.4:7777").is_err()); // port belongs elsewhere
        assert!(validate_address(&"a".repeat(254)).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Doom").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t").is_err());
    }
}
