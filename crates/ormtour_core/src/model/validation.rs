use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length of `User.name`, mirroring the `VARCHAR(30)` column.
pub const USER_NAME_MAX_CHARS: usize = 30;

/// Field-level constraint violations on account records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// User name is empty after trim.
    BlankName,
    /// User name exceeds [`USER_NAME_MAX_CHARS`].
    NameTooLong { name: String, chars: usize },
    /// Email address is empty after trim.
    BlankEmailAddress,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "user name must not be blank"),
            Self::NameTooLong { name, chars } => write!(
                f,
                "user name `{name}` has {chars} characters; at most {USER_NAME_MAX_CHARS} allowed"
            ),
            Self::BlankEmailAddress => write!(f, "email address must not be blank"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn validate_user_name(name: &str) -> Result<(), ModelValidationError> {
    if name.trim().is_empty() {
        return Err(ModelValidationError::BlankName);
    }
    let chars = name.chars().count();
    if chars > USER_NAME_MAX_CHARS {
        return Err(ModelValidationError::NameTooLong {
            name: name.to_string(),
            chars,
        });
    }
    Ok(())
}

pub(crate) fn validate_email_address(email_address: &str) -> Result<(), ModelValidationError> {
    if email_address.trim().is_empty() {
        return Err(ModelValidationError::BlankEmailAddress);
    }
    Ok(())
}
