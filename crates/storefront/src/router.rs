use std::sync::Arc;

use catalog::Catalog;
use shared::{
    domain::UserProfile,
    protocol::{Command, Screen},
};
use tracing::{debug, info};

use crate::{render, Presentation};

/// What the delivery layer should do with the screen a token produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Re-render the originating message in place.
    Edit(Screen),
    /// Create a new message, then delete the originating one.
    Replace(Screen),
    /// Recognised action with nothing to render.
    Acknowledge,
    Ignore,
}

/// Stateless: every transition is a function of the token and the catalog.
#[derive(Debug, Clone)]
pub struct Router {
    catalog: Arc<Catalog>,
    presentation: Presentation,
}

impl Router {
    pub fn new(catalog: Arc<Catalog>, presentation: Presentation) -> Self {
        Self {
            catalog,
            presentation,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn start_screen(&self, user: &UserProfile) -> Screen {
        render::welcome(&self.catalog, &self.presentation, user)
    }

    pub fn category_menu(&self) -> Screen {
        render::category_menu(&self.catalog)
    }

    pub fn handle_token(&self, token: &str) -> Transition {
        match Command::decode(token) {
            Ok(command) => self.route(&command),
            Err(error) => {
                debug!(token, %error, "ignoring interaction token");
                Transition::Ignore
            }
        }
    }

    pub fn route(&self, command: &Command) -> Transition {
        match command {
            Command::ShowCategory(key) => match self.catalog.category(key) {
                Ok(category) => Transition::Edit(render::product_list(category)),
                Err(error) => {
                    info!(%error, "category lookup failed");
                    Transition::Edit(render::not_found(&error))
                }
            },
            Command::ShowProduct { category, product } => {
                match self.catalog.product(category, product) {
                    Ok((category, product)) => Transition::Replace(render::product_detail(
                        category,
                        product,
                        &self.presentation,
                    )),
                    Err(error) => {
                        info!(%error, "product lookup failed");
                        Transition::Edit(render::not_found(&error))
                    }
                }
            }
            Command::AddToCart { category, product } => {
                // No cart subsystem yet; the press is only acknowledged.
                info!(%category, %product, "add to cart pressed");
                Transition::Acknowledge
            }
            Command::BackToCategories => Transition::Edit(self.category_menu()),
        }
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
