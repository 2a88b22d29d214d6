use async_trait::async_trait;
use shared::{
    domain::ChatId,
    protocol::{Keyboard, MessageRef, ParseMode},
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} request failed: {source}")]
    Request {
        method: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{method} rejected ({code:?}): {description}")]
    Rejected {
        method: &'static str,
        code: Option<i64>,
        description: String,
    },
    #[error("message is not modified")]
    NotModified,
}

/// Outbound half of the chat transport. Implementations own delivery,
/// rendering of controls and any retry policy.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageRef, TransportError>;

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat_id: ChatId,
        image: &Url,
        caption: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageRef, TransportError>;

    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError>;

    async fn acknowledge_interaction(&self, interaction_id: &str) -> Result<(), TransportError>;
}
