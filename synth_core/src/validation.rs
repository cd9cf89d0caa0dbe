use crate::error::SessionError;

/// Maximum text length for a synthesis request
const MAX_TEXT_LENGTH: usize = 5000;

/// Validate a synthesis request before anything is sent to the backend
pub fn validate_request(text: &str, voice: &str, language_code: &str) -> Result<(), SessionError> {
    if text.is_empty() {
        return Err(SessionError::InvalidRequest("Text cannot be empty".to_string()));
    }
    if text.len() > MAX_TEXT_LENGTH {
        return Err(SessionError::InvalidRequest(format!(
            "Text too long (max {} characters)",
            MAX_TEXT_LENGTH
        )));
    }

    if voice.is_empty() {
        return Err(SessionError::InvalidRequest(
            "Voice name cannot be empty".to_string(),
        ));
    }

    if !is_valid_language_code(language_code) {
        return Err(SessionError::InvalidRequest(format!(
            "Invalid language code format: {}. Expected format: ll-CC (e.g., en-US, de-DE)",
            language_code
        )));
    }

    Ok(())
}

/// Validate language code format (e.g., en-US, de-DE)
fn is_valid_language_code(code: &str) -> bool {
    // Language code should be in format: ll-CC (2 lowercase letters, hyphen, 2 uppercase letters)
    // Or just ll (2 lowercase letters)
    let parts: Vec<&str> = code.split('-').collect();
    match parts.len() {
        1 => parts[0].len() == 2 && parts[0].chars().all(|c| c.is_ascii_lowercase()),
        2 => {
            parts[0].len() == 2
                && parts[0].chars().all(|c| c.is_ascii_lowercase())
                && parts[1].len() == 2
                && parts[1].chars().all(|c| c.is_ascii_uppercase())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request_valid() {
        assert!(validate_request("Hello", "en-US-Journey-F", "en-US").is_ok());
        assert!(validate_request("Test", "default", "en").is_ok());
    }

    #[test]
    fn test_validate_request_empty_text() {
        let result = validate_request("", "default", "en-US");
        assert!(result.is_err());
        if let Err(SessionError::InvalidRequest(msg)) = result {
            assert!(msg.contains("empty"));
        }
    }

    #[test]
    fn test_validate_request_too_long() {
        let long_text = "a".repeat(6000);
        let result = validate_request(&long_text, "default", "en-US");
        assert!(result.is_err());
        if let Err(SessionError::InvalidRequest(msg)) = result {
            assert!(msg.contains("too long"));
        }
    }

    #[test]
    fn test_validate_request_empty_voice() {
        assert!(validate_request("Hello", "", "en-US").is_err());
    }

    #[test]
    fn test_validate_request_invalid_language_code() {
        let result = validate_request("Hello", "default", "invalid");
        assert!(result.is_err());

        let result = validate_request("Hello", "default", "INVALID");
        assert!(result.is_err());

        let result = validate_request("Hello", "default", "en");
        assert!(result.is_ok());

        let result = validate_request("Hello", "default", "en-US");
        assert!(result.is_ok());
    }
}
