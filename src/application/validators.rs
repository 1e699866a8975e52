use validator::ValidateEmail;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Normalizes an email to its canonical stored form: trimmed and lowercased.
/// Uniqueness on the waitlist is case-insensitive, so every read and write
/// goes through this first.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
