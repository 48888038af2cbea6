//! Checkout form validation.
//!
//! Card fields are checked for presence and shape only. They are never
//! stored, logged or sent anywhere.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use shophub_core::{Email, EmailError};

use crate::models::ShippingInfo;

/// Minimum number of digits in a card number.
const MIN_CARD_DIGITS: usize = 16;

/// The submitted checkout form.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    /// Optional.
    pub state: String,
    pub zip_code: String,
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutForm")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("city", &self.city)
            .field("zip_code", &self.zip_code)
            .field("card_number", &"[REDACTED]")
            .field("card_name", &"[REDACTED]")
            .field("expiry_date", &"[REDACTED]")
            .field("cvv", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl CheckoutForm {
    /// Validate every field and build the shipping details.
    ///
    /// All failing fields are reported together.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` listing each invalid field.
    pub fn validate(&self) -> Result<ShippingInfo, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(EmailError::Empty) => {
                errors.add("email", "Email is required");
                None
            }
            Err(_) => {
                errors.add("email", "Email is invalid");
                None
            }
        };

        let required = [
            ("first_name", &self.first_name, "First name is required"),
            ("last_name", &self.last_name, "Last name is required"),
            ("address", &self.address, "Address is required"),
            ("city", &self.city, "City is required"),
            ("zip_code", &self.zip_code, "ZIP code is required"),
            ("phone", &self.phone, "Phone is required"),
            ("card_number", &self.card_number, "Card number is required"),
            ("card_name", &self.card_name, "Cardholder name is required"),
            ("expiry_date", &self.expiry_date, "Expiry date is required"),
            ("cvv", &self.cvv, "CVV is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.add(field, message);
            }
        }

        if !self.card_number.trim().is_empty() && card_digits(&self.card_number) < MIN_CARD_DIGITS {
            errors.add("card_number", "Card number is invalid");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(ShippingInfo {
                name: format!("{} {}", self.first_name.trim(), self.last_name.trim()),
                email,
                phone: self.phone.trim().to_owned(),
                address: self.address.trim().to_owned(),
                city: self.city.trim().to_owned(),
                state: self.state.trim().to_owned(),
                zip_code: self.zip_code.trim().to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// Count digits once spaces and dashes are stripped. Any other character
/// makes the number invalid.
fn card_digits(number: &str) -> usize {
    let stripped: Vec<char> = number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if stripped.iter().all(char::is_ascii_digit) {
        stripped.len()
    } else {
        0
    }
}
