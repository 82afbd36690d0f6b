//! Input checks for registration and login

use crate::core::error::{Error, Result};
use crate::models::{AgeInput, NewAccount};

pub const PHONE_DIGITS: usize = 10;

/// Registration input that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: Option<u32>,
    pub address: Option<String>,
    pub phone: String,
}

/// Trim an optional field, treating blank as absent
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

fn parse_age(age: Option<AgeInput>) -> Result<Option<u32>> {
    let invalid = || Error::validation("Age must be a number.");

    match age {
        None => Ok(None),
        Some(AgeInput::Number(n)) => u32::try_from(n).map(Some).map_err(|_| invalid()),
        Some(AgeInput::Other(_)) => Err(invalid()),
        Some(AgeInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            if !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            text.parse::<u32>().map(Some).map_err(|_| invalid())
        }
    }
}

/// Check a registration. The password is taken verbatim, everything else is trimmed.
pub fn registration(input: NewAccount) -> Result<Registration> {
    let name = input.name.trim().to_string();
    let email = input.email.trim().to_string();
    let phone = input.phone.trim().to_string();
    let password = input.password;

    if name.is_empty() || email.is_empty() || password.is_empty() || phone.is_empty() {
        return Err(Error::validation(
            "Name, email, password, and phone number are required.",
        ));
    }

    let age = parse_age(input.age)?;

    if !is_valid_phone(&phone) {
        return Err(Error::validation(
            "Please enter a valid 10-digit phone number.",
        ));
    }

    Ok(Registration {
        name,
        email,
        password,
        age,
        address: optional_text(input.address),
        phone,
    })
}

/// Check login input, returning the trimmed email
pub fn credentials(email: &str, password: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(Error::validation("Please enter both email and password."));
    }
    Ok(email.to_string())
}
