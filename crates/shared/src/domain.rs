use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PriceError;

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

key_newtype!(CategoryKey);
key_newtype!(ProductKey);

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(ChatId);
id_newtype!(MessageId);

/// Non-negative amount stored in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriceRepr", into = "String")]
pub struct Price {
    minor_units: u64,
}

impl Price {
    pub const fn from_minor_units(minor_units: u64) -> Self {
        Self { minor_units }
    }

    pub const fn minor_units(self) -> u64 {
        self.minor_units
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.minor_units / 100, self.minor_units % 100)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.starts_with('-') {
            return Err(PriceError::Negative(raw.to_string()));
        }
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PriceError::Malformed(raw.to_string()));
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PriceError::Malformed(raw.to_string()));
        }

        let whole: u64 = whole
            .parse()
            .map_err(|_| PriceError::Malformed(raw.to_string()))?;
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().unwrap_or(0) * 10,
            _ => fraction.parse::<u64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|units| units.checked_add(cents))
            .map(Self::from_minor_units)
            .ok_or_else(|| PriceError::Malformed(raw.to_string()))
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Text(String),
    Whole(u64),
    Decimal(f64),
}

impl TryFrom<PriceRepr> for Price {
    type Error = PriceError;

    fn try_from(value: PriceRepr) -> Result<Self, Self::Error> {
        match value {
            PriceRepr::Text(raw) => raw.parse(),
            PriceRepr::Whole(whole) => whole
                .checked_mul(100)
                .map(Self::from_minor_units)
                .ok_or_else(|| PriceError::Malformed(whole.to_string())),
            PriceRepr::Decimal(amount) => {
                if amount.is_sign_negative() {
                    return Err(PriceError::Negative(amount.to_string()));
                }
                let scaled = amount * 100.0;
                // `as u64` saturates, so out-of-range amounts are rejected first.
                if !scaled.is_finite()
                    || scaled >= u64::MAX as f64
                    || (scaled - scaled.round()).abs() > 1e-6
                {
                    return Err(PriceError::Malformed(amount.to_string()));
                }
                Ok(Self::from_minor_units(scaled.round() as u64))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub key: ProductKey,
    pub name: String,
    pub price: Price,
    pub description: String,
    pub image: Url,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,
    pub name: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Category {
    pub fn product(&self, key: &ProductKey) -> Option<&Product> {
        self.products.iter().find(|product| &product.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub first_name: String,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
