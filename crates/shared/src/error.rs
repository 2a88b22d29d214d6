use thiserror::Error;

use crate::domain::{CategoryKey, ProductKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must not be negative: {0}")]
    Negative(String),
    #[error("price must be a decimal amount with at most two fractional digits: {0}")]
    Malformed(String),
}

/// A token named something the catalog does not hold. Both variants render
/// the same user-facing fallback; the distinction only feeds diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryKey),
    #[error("product not found: {category}/{product}")]
    ProductNotFound {
        category: CategoryKey,
        product: ProductKey,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown verb '{0}'")]
    UnknownVerb(String),
    #[error("verb '{verb}' is missing its {segment} segment")]
    MissingSegment {
        verb: &'static str,
        segment: &'static str,
    },
}
