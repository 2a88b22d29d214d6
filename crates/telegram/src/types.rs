use serde::{Deserialize, Serialize};
use shared::{
    domain::{ChatId, MessageId, UserId, UserProfile},
    protocol::{Interaction, Keyboard, MessageRef, Origin, ParseMode},
};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: UserId(self.id),
            first_name: self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl Message {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: ChatId(self.chat.id),
            message_id: MessageId(self.message_id),
        }
    }

    fn is_start_command(&self) -> bool {
        let Some(command) = self
            .text
            .as_deref()
            .and_then(|text| text.split_whitespace().next())
        else {
            return false;
        };
        command == "/start" || command.starts_with("/start@")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// The two kinds of update the storefront reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Start { chat_id: ChatId, user: UserProfile },
    Interaction(Interaction),
}

impl Update {
    pub fn incoming(&self) -> Option<Incoming> {
        if let Some(query) = &self.callback_query {
            return Some(Incoming::Interaction(Interaction {
                id: query.id.clone(),
                user: query.from.profile(),
                // No data still needs an answer; an empty token decodes
                // to an unknown verb and is only acknowledged.
                token: query.data.clone().unwrap_or_default(),
                origin: query.message.as_ref().map(|message| Origin {
                    message: message.message_ref(),
                    has_media: message.photo.is_some(),
                }),
            }));
        }

        let message = self.message.as_ref()?;
        if !message.is_start_command() {
            return None;
        }
        Some(Incoming::Start {
            chat_id: ChatId(message.chat.id),
            user: message.from.as_ref()?.profile(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// `None` for an empty keyboard; Telegram then drops any existing controls.
    pub fn from_keyboard(keyboard: &Keyboard) -> Option<Self> {
        if keyboard.is_empty() {
            return None;
        }
        Some(Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| InlineKeyboardButton {
                            text: button.label.clone(),
                            callback_data: button.token(),
                        })
                        .collect()
                })
                .collect(),
        })
    }
}

pub(crate) fn parse_mode_name(parse_mode: Option<ParseMode>) -> Option<&'static str> {
    parse_mode.map(|mode| match mode {
        ParseMode::MarkdownV2 => "MarkdownV2",
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditMessageTextRequest<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendPhotoRequest<'a> {
    pub chat_id: i64,
    pub photo: &'a str,
    pub caption: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteMessageRequest {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
