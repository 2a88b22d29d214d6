use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    domain::{CategoryKey, ChatId, MessageId, ProductKey, UserProfile},
    error::DecodeError,
};

pub const TOKEN_DELIMITER: char = '_';
/// Telegram rejects callback data longer than this.
pub const MAX_TOKEN_BYTES: usize = 64;

const VERB_CATEGORY: &str = "category";
const VERB_PRODUCT: &str = "product";
const VERB_ADD: &str = "add";
const VERB_BACK: &str = "back";
const BACK_TARGET: &str = "categories";

/// Typed form of an interaction token: `<verb>[_<category>][_<product>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    ShowCategory(CategoryKey),
    ShowProduct {
        category: CategoryKey,
        product: ProductKey,
    },
    AddToCart {
        category: CategoryKey,
        product: ProductKey,
    },
    BackToCategories,
}

impl Command {
    /// Splits into at most three segments, so anything after the second
    /// delimiter stays part of the product key.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let mut segments = token.splitn(3, TOKEN_DELIMITER);
        let verb = segments.next().unwrap_or_default();

        match verb {
            VERB_CATEGORY => {
                let category = segments.next().ok_or(DecodeError::MissingSegment {
                    verb: VERB_CATEGORY,
                    segment: "category",
                })?;
                Ok(Self::ShowCategory(category.into()))
            }
            VERB_PRODUCT => {
                let (category, product) = category_and_product(VERB_PRODUCT, segments)?;
                Ok(Self::ShowProduct { category, product })
            }
            VERB_ADD => {
                let (category, product) = category_and_product(VERB_ADD, segments)?;
                Ok(Self::AddToCart { category, product })
            }
            VERB_BACK => Ok(Self::BackToCategories),
            other => Err(DecodeError::UnknownVerb(other.to_string())),
        }
    }

    pub fn encode(&self) -> String {
        let d = TOKEN_DELIMITER;
        match self {
            Self::ShowCategory(category) => format!("{VERB_CATEGORY}{d}{category}"),
            Self::ShowProduct { category, product } => {
                format!("{VERB_PRODUCT}{d}{category}{d}{product}")
            }
            Self::AddToCart { category, product } => {
                format!("{VERB_ADD}{d}{category}{d}{product}")
            }
            Self::BackToCategories => format!("{VERB_BACK}{d}{BACK_TARGET}"),
        }
    }
}

fn category_and_product<'a>(
    verb: &'static str,
    mut segments: impl Iterator<Item = &'a str>,
) -> Result<(CategoryKey, ProductKey), DecodeError> {
    let category = segments.next().ok_or(DecodeError::MissingSegment {
        verb,
        segment: "category",
    })?;
    let product = segments.next().ok_or(DecodeError::MissingSegment {
        verb,
        segment: "product",
    })?;
    Ok((category.into(), product.into()))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    MarkdownV2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub command: Command,
}

impl Button {
    pub fn new(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            command,
        }
    }

    pub fn token(&self) -> String {
        self.command.encode()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn single_column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|button| vec![button]).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.buttons().map(Button::token).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenKind {
    CategoryMenu,
    ProductList(CategoryKey),
    ProductDetail {
        category: CategoryKey,
        product: ProductKey,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenBody {
    Text(String),
    Photo { image: Url, caption: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub kind: ScreenKind,
    pub body: ScreenBody,
    pub keyboard: Keyboard,
    pub parse_mode: Option<ParseMode>,
}

impl Screen {
    pub fn text(kind: ScreenKind, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            kind,
            body: ScreenBody::Text(text.into()),
            keyboard,
            parse_mode: None,
        }
    }

    pub fn text_body(&self) -> &str {
        match &self.body {
            ScreenBody::Text(text) => text,
            ScreenBody::Photo { caption, .. } => caption,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The message a control was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub message: MessageRef,
    pub has_media: bool,
}

/// One activated inline control, as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub id: String,
    pub user: UserProfile,
    pub token: String,
    pub origin: Option<Origin>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
