//! Order number generation.

use chrono::{DateTime, Utc};
use rand::Rng;

use shophub_core::{OrderNumber, OrderNumberError};

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Source of fresh order numbers.
pub trait OrderNumberSource: Send + Sync {
    /// Produce a new order number for an order placed at `now`.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError` if the generated value is malformed.
    fn next_number(&self, now: DateTime<Utc>) -> Result<OrderNumber, OrderNumberError>;
}

/// `ORD-{unix millis}-{9 random base36 characters}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderNumbers;

impl OrderNumberSource for RandomOrderNumbers {
    fn next_number(&self, now: DateTime<Utc>) -> Result<OrderNumber, OrderNumberError> {
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let index = rng.random_range(0..BASE36.len());
                BASE36.get(index).map_or('0', |&b| char::from(b))
            })
            .collect();
        OrderNumber::parse(&format!(
            "{}{}-{suffix}",
            OrderNumber::PREFIX,
            now.timestamp_millis()
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_random_order_number_shape() {
        let now = Utc.timestamp_millis_opt(1_760_432_400_000).unwrap();
        let number = RandomOrderNumbers.next_number(now).unwrap();
        let rest = number
            .as_str()
            .strip_prefix("ORD-1760432400000-")
            .unwrap();
        assert_eq!(rest.len(), SUFFIX_LEN);
        assert!(
            rest.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_random_order_numbers_differ() {
        let now = Utc::now();
        let a = RandomOrderNumbers.next_number(now).unwrap();
        let b = RandomOrderNumbers.next_number(now).unwrap();
        assert_ne!(a, b);
    }
}
