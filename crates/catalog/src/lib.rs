use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use shared::{
    domain::{Category, CategoryKey, Product, ProductKey},
    error::LookupError,
    protocol::{Command, MAX_TOKEN_BYTES, TOKEN_DELIMITER},
};

const BUILTIN_CATALOG: &str = include_str!("../catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error("duplicate category key '{0}'")]
    DuplicateCategory(CategoryKey),
    #[error("duplicate product key '{product}' in category '{category}'")]
    DuplicateProduct {
        category: CategoryKey,
        product: ProductKey,
    },
    #[error("'{0}' has an empty display name")]
    EmptyName(String),
    #[error("product '{product}' image must be an http(s) url, got '{image}'")]
    UnsupportedImage { product: ProductKey, image: String },
    #[error("token '{token}' exceeds {MAX_TOKEN_BYTES} bytes")]
    TokenTooLong { token: String },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<Category>,
}

/// Read-only, insertion-ordered registry of categories and their products.
///
/// Built once and shared behind an `Arc`; nothing mutates it afterwards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<CategoryKey, usize>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            validate_category(category)?;
            if index.insert(category.key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateCategory(category.key.clone()));
            }
        }

        Ok(Self { categories, index })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::new(file.categories)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog '{}'", path.display()))?;
        let catalog = Self::from_toml_str(&raw)
            .with_context(|| format!("invalid catalog '{}'", path.display()))?;
        info!(
            path = %path.display(),
            categories = catalog.len(),
            products = catalog.product_count(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, key: &CategoryKey) -> Result<&Category, LookupError> {
        self.index
            .get(key)
            .map(|&position| &self.categories[position])
            .ok_or_else(|| LookupError::CategoryNotFound(key.clone()))
    }

    /// Two-stage lookup; the owning category comes back with the product
    /// because the detail screen labels its back button with it.
    pub fn product(
        &self,
        category_key: &CategoryKey,
        product_key: &ProductKey,
    ) -> Result<(&Category, &Product), LookupError> {
        let category = self.category(category_key)?;
        let product =
            category
                .product(product_key)
                .ok_or_else(|| LookupError::ProductNotFound {
                    category: category_key.clone(),
                    product: product_key.clone(),
                })?;
        Ok((category, product))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn product_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.products.len())
            .sum()
    }
}

fn validate_category(category: &Category) -> Result<(), CatalogError> {
    validate_key(category.key.as_str())?;
    if category.name.trim().is_empty() {
        return Err(CatalogError::EmptyName(category.key.to_string()));
    }

    let mut seen = HashSet::with_capacity(category.products.len());
    for product in &category.products {
        validate_key(product.key.as_str())?;
        if !seen.insert(&product.key) {
            return Err(CatalogError::DuplicateProduct {
                category: category.key.clone(),
                product: product.key.clone(),
            });
        }
        if product.name.trim().is_empty() {
            return Err(CatalogError::EmptyName(format!(
                "{}/{}",
                category.key, product.key
            )));
        }
        if !matches!(product.image.scheme(), "http" | "https") {
            return Err(CatalogError::UnsupportedImage {
                product: product.key.clone(),
                image: product.image.to_string(),
            });
        }

        // `product_` tokens are the longest a catalog produces.
        let token = Command::ShowProduct {
            category: category.key.clone(),
            product: product.key.clone(),
        }
        .encode();
        if token.len() > MAX_TOKEN_BYTES {
            return Err(CatalogError::TokenTooLong { token });
        }
    }

    Ok(())
}

fn validate_key(key: &str) -> Result<(), CatalogError> {
    let reason = if key.is_empty() {
        "must not be empty"
    } else if key.contains(TOKEN_DELIMITER) {
        "must not contain the '_' token delimiter"
    } else if !key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        "must contain only ascii letters, digits and '-'"
    } else {
        return Ok(());
    };

    Err(CatalogError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
