use super::*;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use async_trait::async_trait;
use catalog::Catalog;
use shared::{
    domain::{Category, MessageId, Price, Product, UserId},
    protocol::{Keyboard, Origin, ParseMode},
};
use tokio::sync::Mutex;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    SendText {
        chat_id: ChatId,
        text: String,
        tokens: Vec<String>,
    },
    EditText {
        message: MessageRef,
        text: String,
        tokens: Vec<String>,
    },
    SendPhoto {
        chat_id: ChatId,
        image: String,
        tokens: Vec<String>,
        parse_mode: Option<ParseMode>,
    },
    Delete(MessageRef),
    Ack(String),
}

#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    last_message_id: AtomicI64,
    fail_send_photo: bool,
    fail_delete: bool,
    fail_ack: bool,
    edit_not_modified: bool,
}

impl RecordingTransport {
    async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    fn next_message(&self, chat_id: ChatId) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(self.last_message_id.fetch_add(1, Ordering::SeqCst) + 1),
        }
    }
}

fn rejected(method: &'static str) -> TransportError {
    TransportError::Rejected {
        method,
        code: Some(400),
        description: "Bad Request".into(),
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: &Keyboard,
        _parse_mode: Option<ParseMode>,
    ) -> Result<MessageRef, TransportError> {
        self.calls.lock().await.push(Call::SendText {
            chat_id,
            text: text.to_string(),
            tokens: keyboard.tokens(),
        });
        Ok(self.next_message(chat_id))
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: &Keyboard,
        _parse_mode: Option<ParseMode>,
    ) -> Result<(), TransportError> {
        self.calls.lock().await.push(Call::EditText {
            message,
            text: text.to_string(),
            tokens: keyboard.tokens(),
        });
        if self.edit_not_modified {
            return Err(TransportError::NotModified);
        }
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        image: &Url,
        _caption: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageRef, TransportError> {
        self.calls.lock().await.push(Call::SendPhoto {
            chat_id,
            image: image.to_string(),
            tokens: keyboard.tokens(),
            parse_mode,
        });
        if self.fail_send_photo {
            return Err(rejected("sendPhoto"));
        }
        Ok(self.next_message(chat_id))
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError> {
        self.calls.lock().await.push(Call::Delete(message));
        if self.fail_delete {
            return Err(rejected("deleteMessage"));
        }
        Ok(())
    }

    async fn acknowledge_interaction(&self, interaction_id: &str) -> Result<(), TransportError> {
        self.calls
            .lock()
            .await
            .push(Call::Ack(interaction_id.to_string()));
        if self.fail_ack {
            return Err(rejected("answerCallbackQuery"));
        }
        Ok(())
    }
}

const CHAT: ChatId = ChatId(42);

fn product(key: &str) -> Product {
    Product {
        key: key.into(),
        name: format!("Product {key}"),
        price: Price::from_minor_units(1999),
        description: format!("All about {key}"),
        image: Url::parse(&format!("https://img.example/{key}.png")).expect("url"),
    }
}

fn storefront(transport: RecordingTransport) -> Storefront<RecordingTransport> {
    let catalog = Catalog::new(vec![
        Category {
            key: "A".into(),
            name: "A".into(),
            products: vec![product("p1"), product("p2")],
        },
        Category {
            key: "B".into(),
            name: "B".into(),
            products: vec![product("p3")],
        },
    ])
    .expect("catalog");
    Storefront::new(
        Router::new(Arc::new(catalog), Presentation::default()),
        transport,
    )
}

fn user() -> UserProfile {
    UserProfile {
        user_id: UserId(7),
        first_name: "Aye".into(),
    }
}

fn message(id: i64) -> MessageRef {
    MessageRef {
        chat_id: CHAT,
        message_id: MessageId(id),
    }
}

fn tap(id: &str, token: &str, origin: MessageRef, has_media: bool) -> Interaction {
    Interaction {
        id: id.into(),
        user: user(),
        token: token.into(),
        origin: Some(Origin {
            message: origin,
            has_media,
        }),
    }
}

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn start_sends_category_menu() {
    let shop = storefront(RecordingTransport::default());
    let delivery = shop.start(CHAT, &user()).await.expect("start");
    assert_eq!(delivery, Delivery::Sent(message(1)));

    let calls = shop.transport().calls().await;
    assert!(matches!(
        &calls[..],
        [Call::SendText { chat_id, text, tokens: t }]
            if *chat_id == CHAT
                && text.starts_with("Welcome to SpiritedSHE, Aye!")
                && *t == tokens(&["category_A", "category_B"])
    ));
}

#[tokio::test]
async fn category_tap_acknowledges_then_edits_in_place() {
    let shop = storefront(RecordingTransport::default());
    let delivery = shop
        .handle_interaction(&tap("cb-1", "category_A", message(10), false))
        .await
        .expect("deliver");
    assert_eq!(delivery, Delivery::Edited(message(10)));

    assert_eq!(
        shop.transport().calls().await,
        vec![
            Call::Ack("cb-1".into()),
            Call::EditText {
                message: message(10),
                text: "Showing products in A:".into(),
                tokens: tokens(&["product_A_p1", "product_A_p2", "back_categories"]),
            },
        ]
    );
}

#[tokio::test]
async fn product_tap_sends_photo_before_deleting_origin() {
    let shop = storefront(RecordingTransport::default());
    let delivery = shop
        .handle_interaction(&tap("cb-2", "product_A_p1", message(10), false))
        .await
        .expect("deliver");
    assert_eq!(
        delivery,
        Delivery::Replaced {
            created: message(1),
            deleted: true,
        }
    );

    assert_eq!(
        shop.transport().calls().await,
        vec![
            Call::Ack("cb-2".into()),
            Call::SendPhoto {
                chat_id: CHAT,
                image: "https://img.example/p1.png".into(),
                tokens: tokens(&["add_A_p1", "category_A"]),
                parse_mode: Some(ParseMode::MarkdownV2),
            },
            Call::Delete(message(10)),
        ]
    );
}

#[tokio::test]
async fn failed_photo_send_never_deletes_origin() {
    let shop = storefront(RecordingTransport {
        fail_send_photo: true,
        ..Default::default()
    });
    let err = shop
        .handle_interaction(&tap("cb-3", "product_B_p3", message(11), false))
        .await
        .expect_err("send fails");
    assert!(matches!(err, TransportError::Rejected { method: "sendPhoto", .. }));

    let calls = shop.transport().calls().await;
    assert_eq!(calls.len(), 2);
    assert!(!calls.iter().any(|call| matches!(call, Call::Delete(_))));
}

#[tokio::test]
async fn failed_delete_keeps_the_new_screen() {
    let shop = storefront(RecordingTransport {
        fail_delete: true,
        ..Default::default()
    });
    let delivery = shop
        .handle_interaction(&tap("cb-4", "product_B_p3", message(11), false))
        .await
        .expect("deliver");
    assert_eq!(
        delivery,
        Delivery::Replaced {
            created: message(1),
            deleted: false,
        }
    );
}

#[tokio::test]
async fn photo_origin_is_replaced_instead_of_edited() {
    let shop = storefront(RecordingTransport::default());
    shop.handle_interaction(&tap("cb-5", "category_A", message(20), true))
        .await
        .expect("deliver");

    let calls = shop.transport().calls().await;
    assert_eq!(
        calls[1..],
        [
            Call::SendText {
                chat_id: CHAT,
                text: "Showing products in A:".into(),
                tokens: tokens(&["product_A_p1", "product_A_p2", "back_categories"]),
            },
            Call::Delete(message(20)),
        ]
    );
}

#[tokio::test]
async fn unknown_tokens_and_cart_presses_are_only_acknowledged() {
    let shop = storefront(RecordingTransport::default());
    let ignored = shop
        .handle_interaction(&tap("cb-6", "xyz_foo", message(10), false))
        .await
        .expect("ignored");
    let added = shop
        .handle_interaction(&tap("cb-7", "add_A_p1", message(10), true))
        .await
        .expect("acknowledged");

    assert_eq!(ignored, Delivery::Ignored);
    assert_eq!(added, Delivery::Acknowledged);
    assert_eq!(
        shop.transport().calls().await,
        vec![Call::Ack("cb-6".into()), Call::Ack("cb-7".into())]
    );
}

#[tokio::test]
async fn acknowledgement_failure_does_not_abort_navigation() {
    let shop = storefront(RecordingTransport {
        fail_ack: true,
        ..Default::default()
    });
    let delivery = shop
        .handle_interaction(&tap("cb-8", "back_categories", message(10), false))
        .await
        .expect("deliver");
    assert_eq!(delivery, Delivery::Edited(message(10)));
}

#[tokio::test]
async fn unchanged_edit_counts_as_delivered() {
    let shop = storefront(RecordingTransport {
        edit_not_modified: true,
        ..Default::default()
    });
    let delivery = shop
        .handle_interaction(&tap("cb-9", "back_categories", message(10), false))
        .await
        .expect("deliver");
    assert_eq!(delivery, Delivery::Edited(message(10)));
}

#[tokio::test]
async fn interaction_without_origin_is_dropped_after_ack() {
    let shop = storefront(RecordingTransport::default());
    let mut interaction = tap("cb-10", "category_A", message(10), false);
    interaction.origin = None;

    let delivery = shop.handle_interaction(&interaction).await.expect("deliver");
    assert_eq!(delivery, Delivery::NoOrigin);
    assert_eq!(
        shop.transport().calls().await,
        vec![Call::Ack("cb-10".into())]
    );
}

#[tokio::test]
async fn not_found_screen_replaces_a_photo_origin() {
    let shop = storefront(RecordingTransport::default());
    shop.handle_interaction(&tap("cb-11", "category_gone", message(30), true))
        .await
        .expect("deliver");

    let calls = shop.transport().calls().await;
    assert_eq!(
        calls[1],
        Call::SendText {
            chat_id: CHAT,
            text: "Sorry, category not found.".into(),
            tokens: Vec::new(),
        }
    );
    assert_eq!(calls[2], Call::Delete(message(30)));
}

#[tokio::test]
async fn browse_session_round_trip() {
    let shop = storefront(RecordingTransport::default());

    let Delivery::Sent(menu) = shop.start(CHAT, &user()).await.expect("start") else {
        panic!("start should send");
    };
    shop.handle_interaction(&tap("1", "category_A", menu, false))
        .await
        .expect("list");
    let Delivery::Replaced { created: detail, .. } = shop
        .handle_interaction(&tap("2", "product_A_p1", menu, false))
        .await
        .expect("detail")
    else {
        panic!("detail should replace");
    };
    let Delivery::Replaced { created: list, .. } = shop
        .handle_interaction(&tap("3", "category_A", detail, true))
        .await
        .expect("back to list")
    else {
        panic!("photo origin should be replaced");
    };
    shop.handle_interaction(&tap("4", "back_categories", list, false))
        .await
        .expect("menu");

    let screens: Vec<Vec<String>> = shop
        .transport()
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            Call::SendText { tokens, .. }
            | Call::EditText { tokens, .. }
            | Call::SendPhoto { tokens, .. } => Some(tokens),
            _ => None,
        })
        .collect();

    assert_eq!(
        screens,
        vec![
            tokens(&["category_A", "category_B"]),
            tokens(&["product_A_p1", "product_A_p2", "back_categories"]),
            tokens(&["add_A_p1", "category_A"]),
            tokens(&["product_A_p1", "product_A_p2", "back_categories"]),
            tokens(&["category_A", "category_B"]),
        ]
    );
}
