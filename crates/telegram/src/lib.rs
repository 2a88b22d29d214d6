use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::ChatId,
    protocol::{Keyboard, MessageRef, ParseMode},
};
use storefront::{Transport, TransportError};
use tracing::debug;
use url::Url;

mod types;

pub use types::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Incoming, Message, PhotoSize,
    Update, User,
};
use types::{
    parse_mode_name, AnswerCallbackQueryRequest, ApiResponse, DeleteMessageRequest,
    EditMessageTextRequest, GetUpdatesRequest, SendMessageRequest, SendPhotoRequest,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Slack on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];
const NOT_MODIFIED: &str = "message is not modified";

/// Bot API client. The token is part of every request path and is never
/// logged or included in errors.
#[derive(Clone)]
pub struct BotApi {
    http: Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for BotApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotApi")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BotApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_seconds: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let payload = GetUpdatesRequest {
            offset,
            timeout: timeout_seconds,
            allowed_updates: ALLOWED_UPDATES,
        };
        let request = self
            .request("getUpdates", &payload)
            .timeout(Duration::from_secs(timeout_seconds) + POLL_GRACE);
        self.execute("getUpdates", request).await
    }

    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message, TransportError> {
        let payload = SendMessageRequest {
            chat_id: chat_id.0,
            text,
            parse_mode: parse_mode_name(parse_mode),
            reply_markup: InlineKeyboardMarkup::from_keyboard(keyboard),
        };
        self.call("sendMessage", &payload).await
    }

    pub async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TransportError> {
        let payload = EditMessageTextRequest {
            chat_id: message.chat_id.0,
            message_id: message.message_id.0,
            text,
            parse_mode: parse_mode_name(parse_mode),
            reply_markup: InlineKeyboardMarkup::from_keyboard(keyboard),
        };
        // The result is the edited message, or `true` for inline messages.
        let _: serde_json::Value = self.call("editMessageText", &payload).await?;
        Ok(())
    }

    pub async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &Url,
        caption: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message, TransportError> {
        let payload = SendPhotoRequest {
            chat_id: chat_id.0,
            photo: photo.as_str(),
            caption,
            parse_mode: parse_mode_name(parse_mode),
            reply_markup: InlineKeyboardMarkup::from_keyboard(keyboard),
        };
        self.call("sendPhoto", &payload).await
    }

    pub async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError> {
        let payload = DeleteMessageRequest {
            chat_id: message.chat_id.0,
            message_id: message.message_id.0,
        };
        let _: bool = self.call("deleteMessage", &payload).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TransportError> {
        let payload = AnswerCallbackQueryRequest { callback_query_id };
        let _: bool = self.call("answerCallbackQuery", &payload).await?;
        Ok(())
    }

    fn request<P: Serialize + ?Sized>(&self, method: &'static str, payload: &P) -> RequestBuilder {
        self.http
            .post(format!("{}/bot{}/{method}", self.base_url, self.token))
            .json(payload)
    }

    async fn call<P, R>(&self, method: &'static str, payload: &P) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.request(method, payload).timeout(REQUEST_TIMEOUT);
        self.execute(method, request).await
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> Result<R, TransportError> {
        // Failures come back as a JSON envelope with a 4xx status, so the
        // body is read regardless of status.
        let response = request
            .send()
            .await
            .map_err(|error| request_failed(method, error))?;
        let status = response.status();
        let envelope: ApiResponse<R> = response
            .json()
            .await
            .map_err(|error| request_failed(method, error))?;
        debug!(method, %status, ok = envelope.ok, "bot api call finished");

        if envelope.ok {
            return envelope.result.ok_or_else(|| TransportError::Rejected {
                method,
                code: None,
                description: "response carried no result".into(),
            });
        }

        let description = envelope.description.unwrap_or_default();
        if description.contains(NOT_MODIFIED) {
            return Err(TransportError::NotModified);
        }
        Err(TransportError::Rejected {
            method,
            code: envelope.error_code.or(Some(i64::from(status.as_u16()))),
            description,
        })
    }
}

fn request_failed(method: &'static str, error: reqwest::Error) -> TransportError {
    TransportError::Request {
        method,
        // The url embeds the bot token.
        source: Box::new(error.without_url()),
    }
}

#[async_trait]
impl Transport for BotApi {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageRef, TransportError> {
        let message = self.send_message(chat_id, text, keyboard, parse_mode).await?;
        Ok(message.message_ref())
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TransportError> {
        self.edit_message_text(message, text, keyboard, parse_mode)
            .await
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        image: &Url,
        caption: &str,
        keyboard: &Keyboard,
        parse_mode: Option<ParseMode>,
    ) -> Result<MessageRef, TransportError> {
        let message = BotApi::send_photo(self, chat_id, image, caption, keyboard, parse_mode).await?;
        Ok(message.message_ref())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError> {
        BotApi::delete_message(self, message).await
    }

    async fn acknowledge_interaction(&self, interaction_id: &str) -> Result<(), TransportError> {
        self.answer_callback_query(interaction_id).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
