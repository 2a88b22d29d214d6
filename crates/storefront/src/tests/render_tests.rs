use super::*;
use shared::domain::{Price, ProductKey};
use url::Url;

fn necklace_category() -> Category {
    Category {
        key: "necklaces".into(),
        name: "✨ Necklaces".into(),
        products: vec![Product {
            key: "necklace1".into(),
            name: "Celestial Pearl Necklace".into(),
            price: Price::from_minor_units(18000),
            description: "A single, luminous pearl. Timeless (and elegant)!".into(),
            image: Url::parse("https://placehold.co/600x600?text=Pearl").expect("url"),
        }],
    }
}

#[test]
fn escapes_every_markdown_v2_reserved_character() {
    assert_eq!(escape_markdown_v2("plain text"), "plain text");
    assert_eq!(escape_markdown_v2("$12.50"), "$12\\.50");
    assert_eq!(
        escape_markdown_v2("a_b*c[d](e)~f`g>h#i+j-k=l|m{n}o.p!q\\r"),
        "a\\_b\\*c\\[d\\]\\(e\\)\\~f\\`g\\>h\\#i\\+j\\-k\\=l\\|m\\{n\\}o\\.p\\!q\\\\r"
    );
}

#[test]
fn product_detail_caption_is_escaped_markdown() {
    let category = necklace_category();
    let product = category.product(&ProductKey::new("necklace1")).expect("product");
    let screen = product_detail(&category, product, &Presentation::default());

    assert_eq!(screen.parse_mode, Some(ParseMode::MarkdownV2));
    let ScreenBody::Photo { image, caption } = &screen.body else {
        panic!("detail should carry a photo");
    };
    assert_eq!(image.as_str(), "https://placehold.co/600x600?text=Pearl");
    assert_eq!(
        caption,
        "🌟 *Celestial Pearl Necklace*\n\n\
         _A single, luminous pearl\\. Timeless \\(and elegant\\)\\!_\n\n\
         💰 *Price: $180\\.00*"
    );
}

#[test]
fn currency_symbol_comes_from_presentation() {
    let category = necklace_category();
    let presentation = Presentation {
        shop_name: "Shop".into(),
        currency_symbol: "€".into(),
    };
    let screen = product_detail(&category, &category.products[0], &presentation);
    assert!(screen.text_body().contains("Price: €180\\.00"));
}

#[test]
fn detail_back_button_names_the_category() {
    let category = necklace_category();
    let screen = product_detail(&category, &category.products[0], &Presentation::default());
    let labels: Vec<_> = screen.keyboard.buttons().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["🛒 Add to Cart", "⬅️ Back to ✨ Necklaces"]);
}

#[test]
fn not_found_screens_have_no_controls() {
    let category = not_found(&LookupError::CategoryNotFound("x".into()));
    assert_eq!(category.text_body(), "Sorry, category not found.");
    assert!(category.keyboard.is_empty());
    assert_eq!(category.kind, ScreenKind::NotFound);

    let product = not_found(&LookupError::ProductNotFound {
        category: "x".into(),
        product: "y".into(),
    });
    assert_eq!(product.text_body(), "Sorry, product not found.");
    assert!(product.keyboard.is_empty());
}

#[test]
fn product_list_is_plain_text() {
    let screen = product_list(&necklace_category());
    assert_eq!(screen.parse_mode, None);
    assert_eq!(screen.text_body(), "Showing products in ✨ Necklaces:");
}
