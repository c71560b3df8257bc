//! # Validation Module
//!
//! Field validators shared by the form schemas in [`crate::forms`].
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard frontend                                           │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Form schema (Rust)                                           │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: per-field rules → FieldErrors                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator takes the field name so the error lands under the key
//! the client submitted.
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_email, validate_quantity};
//!
//! assert_eq!(validate_email("email", "  ops@example.com ").unwrap(), "ops@example.com");
//! assert!(validate_quantity("quantity", 0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length, counted after trimming.
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Normalizes an optional free-text field.
///
/// Blank input becomes `None`; anything longer than `max` is rejected.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(Some(value.to_string()))
}

/// Validates an email address and returns it trimmed.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part
/// - Domain contains a dot that is neither first nor last
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_email;
///
/// assert!(validate_email("email", "a@b.co").is_ok());
/// assert!(validate_email("email", "@b.co").is_err());
/// assert!(validate_email("email", "a@localhost").is_err());
/// ```
pub fn validate_email(field: &str, email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    if local.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match domain.find('.') {
        Some(dot) if dot > 0 && !domain.ends_with('.') => Ok(email.to_string()),
        _ => Err(invalid()),
    }
}

/// Validates a password and returns it trimmed.
///
/// ## Rules
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │  length ≥ 8        "hunter2"      ❌          │
/// │  one letter        "12345678!"    ❌          │
/// │  one digit         "password!"    ❌          │
/// │  one special char  "password1"    ❌          │
/// │                    "password1!"   ✅          │
/// └──────────────────────────────────────────────┘
/// ```
pub fn validate_password(field: &str, password: &str) -> ValidationResult<String> {
    let password = password.trim();

    if password.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !(has_letter && has_digit && has_special) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain at least one letter, one number and one special character"
                .to_string(),
        });
    }

    Ok(password.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an opening stock quantity. Zero is allowed.
pub fn validate_opening_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_LINE_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or total in cents.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 1099).is_ok());  // $10.99
/// assert!(validate_price_cents("price", 0).is_ok());     // Free item
/// assert!(validate_price_cents("price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID reference and returns it normalized (lowercase, hyphenated).
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_uuid;
///
/// assert!(validate_uuid("productId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("productId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let parsed = uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(parsed.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "  Acme  ").unwrap(), "Acme");
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_optional_text() {
        assert_eq!(validate_optional_text("location", None, 10).unwrap(), None);
        assert_eq!(validate_optional_text("location", Some("  "), 10).unwrap(), None);
        assert_eq!(
            validate_optional_text("location", Some(" Oslo "), 10).unwrap(),
            Some("Oslo".to_string())
        );
        assert!(validate_optional_text("location", Some("far too long"), 5).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "ops@example.com").is_ok());
        assert!(validate_email("email", "a.b+c@sub.example.org").is_ok());

        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "no-at-sign.com").is_err());
        assert!(validate_email("email", "two@@example.com").is_err());
        assert!(validate_email("email", "@example.com").is_err());
        assert!(validate_email("email", "ops@example").is_err());
        assert!(validate_email("email", "ops@.com").is_err());
        assert!(validate_email("email", "ops@example.").is_err());
        assert!(validate_email("email", "o ps@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password", "password1!").is_ok());
        assert_eq!(
            validate_password("password", "  password1!  ").unwrap(),
            "password1!"
        );

        assert!(matches!(
            validate_password("password", "pa1!"),
            Err(ValidationError::TooShort { min: 8, .. })
        ));
        assert!(validate_password("password", "password1").is_err());
        assert!(validate_password("password", "password!").is_err());
        assert!(validate_password("password", "12345678!").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity("quantity", 0).is_err());
        assert!(validate_quantity("quantity", -1).is_err());
        assert!(validate_quantity("quantity", MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_opening_quantity() {
        assert!(validate_opening_quantity("openingQuantity", 0).is_ok());
        assert!(validate_opening_quantity("openingQuantity", 50).is_ok());
        assert!(validate_opening_quantity("openingQuantity", -1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert_eq!(
            validate_uuid("id", "550E8400-E29B-41D4-A716-446655440000").unwrap(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }
}
