//! Customer-facing order reference.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    /// The value does not start with the `ORD-` prefix.
    #[error("order number must start with {prefix}")]
    MissingPrefix {
        /// Required prefix.
        prefix: &'static str,
    },
    /// The value has nothing after the prefix, or is too long.
    #[error("order number must be between {min} and {max} characters")]
    InvalidLength {
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// The value contains characters other than ASCII letters, digits and `-`.
    #[error("order number may only contain letters, digits and dashes")]
    InvalidCharacter,
}

/// An order number such as `ORD-1760400000000-7QK2M9XZA`.
///
/// Order numbers are unique and never change once issued. Generation lives in
/// the storefront; this type only guarantees the shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "ORD-";
    /// Maximum stored length.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is missing, the value is empty after the
    /// prefix or longer than [`OrderNumber::MAX_LENGTH`], or it contains
    /// characters outside `[A-Za-z0-9-]`.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let rest = s
            .strip_prefix(Self::PREFIX)
            .ok_or(OrderNumberError::MissingPrefix {
                prefix: Self::PREFIX,
            })?;

        if rest.is_empty() || s.len() > Self::MAX_LENGTH {
            return Err(OrderNumberError::InvalidLength {
                min: Self::PREFIX.len() + 1,
                max: Self::MAX_LENGTH,
            });
        }

        if !rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(OrderNumberError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
