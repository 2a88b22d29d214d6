use catalog::Catalog;
use shared::{
    domain::{Category, Product, UserProfile},
    error::LookupError,
    protocol::{Button, Command, Keyboard, ParseMode, Screen, ScreenBody, ScreenKind},
};

use crate::Presentation;

const BACK_TO_CATEGORIES: &str = "⬅️ Back to Categories";
const ADD_TO_CART: &str = "🛒 Add to Cart";
const MENU_PROMPT: &str = "Please select a category to continue browsing:";

pub fn welcome(catalog: &Catalog, presentation: &Presentation, user: &UserProfile) -> Screen {
    let text = format!(
        "Welcome to {}, {}!\n\n\
         I'm your personal assistant for exploring our collection. \
         Please select a category to begin browsing:",
        presentation.shop_name, user.first_name
    );
    Screen::text(ScreenKind::CategoryMenu, text, category_buttons(catalog))
}

pub fn category_menu(catalog: &Catalog) -> Screen {
    Screen::text(ScreenKind::CategoryMenu, MENU_PROMPT, category_buttons(catalog))
}

fn category_buttons(catalog: &Catalog) -> Keyboard {
    Keyboard::single_column(catalog.categories().iter().map(|category| {
        Button::new(
            category.name.clone(),
            Command::ShowCategory(category.key.clone()),
        )
    }))
}

pub fn product_list(category: &Category) -> Screen {
    let products = category.products.iter().map(|product| {
        Button::new(
            product.name.clone(),
            Command::ShowProduct {
                category: category.key.clone(),
                product: product.key.clone(),
            },
        )
    });
    let back = Button::new(BACK_TO_CATEGORIES, Command::BackToCategories);

    Screen::text(
        ScreenKind::ProductList(category.key.clone()),
        format!("Showing products in {}:", category.name),
        Keyboard::single_column(products.chain(std::iter::once(back))),
    )
}

pub fn product_detail(category: &Category, product: &Product, presentation: &Presentation) -> Screen {
    let price = format!("{}{}", presentation.currency_symbol, product.price);
    let caption = format!(
        "🌟 *{}*\n\n_{}_\n\n💰 *Price: {}*",
        escape_markdown_v2(&product.name),
        escape_markdown_v2(&product.description),
        escape_markdown_v2(&price),
    );

    let keyboard = Keyboard::single_column([
        Button::new(
            ADD_TO_CART,
            Command::AddToCart {
                category: category.key.clone(),
                product: product.key.clone(),
            },
        ),
        Button::new(
            format!("⬅️ Back to {}", category.name),
            Command::ShowCategory(category.key.clone()),
        ),
    ]);

    Screen {
        kind: ScreenKind::ProductDetail {
            category: category.key.clone(),
            product: product.key.clone(),
        },
        body: ScreenBody::Photo {
            image: product.image.clone(),
            caption,
        },
        keyboard,
        parse_mode: Some(ParseMode::MarkdownV2),
    }
}

/// Dead end: no controls, the user recovers with a fresh `/start`.
pub fn not_found(error: &LookupError) -> Screen {
    let text = match error {
        LookupError::CategoryNotFound(_) => "Sorry, category not found.",
        LookupError::ProductNotFound { .. } => "Sorry, product not found.",
    };
    Screen::text(ScreenKind::NotFound, text, Keyboard::default())
}

pub fn escape_markdown_v2(text: &str) -> String {
    const RESERVED: &[char] = &[
        '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
        '!',
    ];

    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if RESERVED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
