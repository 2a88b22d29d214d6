use shared::{
    domain::{ChatId, UserProfile},
    protocol::{Interaction, MessageRef, Screen, ScreenBody},
};
use tracing::{info, warn};

pub mod render;
mod router;
mod transport;

pub use router::{Router, Transition};
pub use transport::{Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub shop_name: String,
    pub currency_symbol: String,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            shop_name: "SpiritedSHE".into(),
            currency_symbol: "$".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent(MessageRef),
    Edited(MessageRef),
    /// A new message was created; `deleted` reports whether the
    /// originating message was removed afterwards.
    Replaced { created: MessageRef, deleted: bool },
    Acknowledged,
    Ignored,
    /// The transport did not say which message the control belonged to.
    NoOrigin,
}

/// Applies router transitions through a transport, one interaction at a time.
pub struct Storefront<T> {
    router: Router,
    transport: T,
}

impl<T: Transport> Storefront<T> {
    pub fn new(router: Router, transport: T) -> Self {
        Self { router, transport }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn start(
        &self,
        chat_id: ChatId,
        user: &UserProfile,
    ) -> Result<Delivery, TransportError> {
        let screen = self.router.start_screen(user);
        let sent = self.send_screen(chat_id, &screen).await?;
        info!(user_id = user.user_id.0, chat_id = chat_id.0, "category menu sent");
        Ok(Delivery::Sent(sent))
    }

    pub async fn handle_interaction(
        &self,
        interaction: &Interaction,
    ) -> Result<Delivery, TransportError> {
        // Clears the client's loading indicator whatever the outcome.
        if let Err(error) = self.transport.acknowledge_interaction(&interaction.id).await {
            warn!(interaction_id = %interaction.id, %error, "failed to acknowledge interaction");
        }

        let (screen, replace) = match self.router.handle_token(&interaction.token) {
            Transition::Edit(screen) => (screen, false),
            Transition::Replace(screen) => (screen, true),
            Transition::Acknowledge => return Ok(Delivery::Acknowledged),
            Transition::Ignore => return Ok(Delivery::Ignored),
        };

        let Some(origin) = interaction.origin else {
            warn!(
                interaction_id = %interaction.id,
                token = %interaction.token,
                "interaction has no originating message"
            );
            return Ok(Delivery::NoOrigin);
        };

        // Media messages cannot be edited into text, so they are replaced too.
        if replace || origin.has_media || !matches!(screen.body, ScreenBody::Text(_)) {
            return self.replace(origin.message, &screen).await;
        }

        match self.edit_screen(origin.message, &screen).await {
            Ok(()) | Err(TransportError::NotModified) => Ok(Delivery::Edited(origin.message)),
            Err(error) => Err(error),
        }
    }

    /// Create-then-delete. The origin is only deleted once the transport has
    /// confirmed the replacement exists.
    async fn replace(
        &self,
        origin: MessageRef,
        screen: &Screen,
    ) -> Result<Delivery, TransportError> {
        let created = self.send_screen(origin.chat_id, screen).await?;

        let deleted = match self.transport.delete_message(origin).await {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    chat_id = origin.chat_id.0,
                    message_id = origin.message_id.0,
                    %error,
                    "replacement sent but originating message was not deleted"
                );
                false
            }
        };

        Ok(Delivery::Replaced { created, deleted })
    }

    async fn send_screen(
        &self,
        chat_id: ChatId,
        screen: &Screen,
    ) -> Result<MessageRef, TransportError> {
        match &screen.body {
            ScreenBody::Text(text) => {
                self.transport
                    .send_text(chat_id, text, &screen.keyboard, screen.parse_mode)
                    .await
            }
            ScreenBody::Photo { image, caption } => {
                self.transport
                    .send_photo(chat_id, image, caption, &screen.keyboard, screen.parse_mode)
                    .await
            }
        }
    }

    async fn edit_screen(&self, message: MessageRef, screen: &Screen) -> Result<(), TransportError> {
        self.transport
            .edit_text(message, screen.text_body(), &screen.keyboard, screen.parse_mode)
            .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
