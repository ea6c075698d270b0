//! Input validation for account names, passwords and participant display names

use std::collections::HashSet;

/// Username validation errors with helpful messages
#[derive(Debug, thiserror::Error)]
pub enum UsernameError {
    #[error("Username is too short (minimum 2 characters)")]
    TooShort,

    #[error("Username is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Username cannot start or end with whitespace")]
    InvalidWhitespace,

    #[error("Username contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Username contains path separators (/ or \\)")]
    PathTraversal,

    #[error("Username contains filesystem reserved characters")]
    FilesystemReserved,

    #[error("Username is a reserved name")]
    Reserved,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("Password too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("Password too long (maximum {max} characters)")]
    TooLong { max: usize },
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SecurityError {
    #[error("File size exceeds limit ({limit} bytes)")]
    FileSizeExceeded { limit: usize },

    #[error("Invalid format")]
    InvalidFormat,
}

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
/// Longest display name shown at the table.
pub const MAX_DISPLAY_NAME_LEN: usize = 30;

/// Username validation rules configuration
#[derive(Debug, Clone)]
pub struct UsernameRules {
    pub min_length: usize,
    pub max_length: usize,
    pub allow_spaces: bool,
    pub allow_unicode: bool,
    pub allow_special_chars: bool,
}

impl UsernameRules {
    /// Rules for stored accounts; the name doubles as the score key.
    pub fn account() -> Self {
        UsernameRules {
            min_length: 2,
            max_length: MAX_DISPLAY_NAME_LEN,
            allow_spaces: true,
            allow_unicode: true,
            allow_special_chars: false,
        }
    }
}

/// Generate safe filename from username using URL encoding
pub fn safe_filename(username: &str) -> String {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    utf8_percent_encode(username, NON_ALPHANUMERIC).to_string()
}

/// Names that would be confused with the table itself or with device files
fn reserved_names() -> HashSet<&'static str> {
    [
        "dealer", "admin", "administrator", "root", "system", "guest", "anonymous",
        "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7",
        "com8", "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8",
        "lpt9",
    ]
    .iter()
    .copied()
    .collect()
}

/// Validate a username according to the given rules
pub fn validate_username(username: &str, rules: &UsernameRules) -> Result<String, UsernameError> {
    let trimmed = username.trim();

    let len = trimmed.chars().count();
    if len < rules.min_length {
        return Err(UsernameError::TooShort);
    }
    if len > rules.max_length {
        return Err(UsernameError::TooLong {
            max: rules.max_length,
        });
    }

    if trimmed != username {
        return Err(UsernameError::InvalidWhitespace);
    }

    if reserved_names().contains(trimmed.to_lowercase().as_str()) {
        return Err(UsernameError::Reserved);
    }

    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(UsernameError::PathTraversal);
    }

    let fs_reserved = ['<', '>', ':', '"', '|', '?', '*', '\0'];
    if trimmed.chars().any(|c| fs_reserved.contains(&c)) {
        return Err(UsernameError::FilesystemReserved);
    }

    let mut invalid: Vec<char> = trimmed
        .chars()
        .filter(|&ch| {
            let ok = if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
                true
            } else if ch == ' ' {
                rules.allow_spaces
            } else if ch.is_control() {
                false
            } else if !ch.is_ascii() {
                rules.allow_unicode
            } else {
                rules.allow_special_chars
            };
            !ok
        })
        .collect();

    if !invalid.is_empty() {
        invalid.sort_unstable();
        invalid.dedup();
        let chars = invalid
            .into_iter()
            .map(|c| {
                if c.is_control() {
                    format!("\\u{{{:04x}}}", c as u32)
                } else {
                    c.to_string()
                }
            })
            .collect::<String>();
        return Err(UsernameError::InvalidCharacters { chars });
    }

    Ok(trimmed.to_string())
}

/// Validate an account name for sign up and log in
pub fn validate_account_name(name: &str) -> Result<String, UsernameError> {
    validate_username(name, &UsernameRules::account())
}

/// Password length bounds, counted in characters
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if len > MAX_PASSWORD_LEN {
        return Err(PasswordError::TooLong {
            max: MAX_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Clean a free-form participant name for display: trimmed, control characters
/// removed, inner whitespace collapsed, capped at [`MAX_DISPLAY_NAME_LEN`].
/// An empty result means the caller should substitute a default.
pub fn sanitize_participant_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_DISPLAY_NAME_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Validate file size before reading
pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), SecurityError> {
    if size > max_size {
        return Err(SecurityError::FileSizeExceeded {
            limit: max_size as usize,
        });
    }
    Ok(())
}

/// Securely parse JSON with size limits and error handling
pub fn secure_json_parse<T>(content: &str, max_bytes: usize) -> Result<T, SecurityError>
where
    T: serde::de::DeserializeOwned,
{
    if content.len() > max_bytes {
        return Err(SecurityError::FileSizeExceeded { limit: max_bytes });
    }

    // Interrupted writes have left leading NULs before; valid JSON never starts with one.
    let normalized = content.trim_start_matches('\0');

    serde_json::from_str(normalized).map_err(|_| SecurityError::InvalidFormat)
}
