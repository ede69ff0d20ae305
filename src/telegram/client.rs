use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::bot::Screen;
use crate::telegram::types::{
    AnswerCallbackQuery, ApiResponse, DeleteMessage, EditMessageText, GetUpdates,
    InlineKeyboardMarkup, Message, SendMessage, Update,
};

const MARKDOWN: &str = "Markdown";
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];
// Slack on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("telegram transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("telegram {method} failed ({code:?}): {description}")]
    Api {
        method: &'static str,
        code: Option<i32>,
        description: String,
    },

    #[error("telegram {0} returned no result")]
    EmptyResult(&'static str),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs embed the bot token.
        Self::Transport(err.without_url())
    }
}

/// Minimal Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, TelegramError> {
        let http = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<P, T>(&self, method: &'static str, params: &P) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call_with_timeout(method, params, REQUEST_TIMEOUT).await
    }

    async fn call_with_timeout<P, T>(
        &self,
        method: &'static str,
        params: &P,
        timeout: Duration,
    ) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method, "telegram call");
        // Error replies carry a JSON envelope too, whatever the HTTP status.
        let envelope: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(params)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                method,
                code: envelope.error_code,
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope.result.ok_or(TelegramError::EmptyResult(method))
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: ALLOWED_UPDATES,
        };
        let timeout = Duration::from_secs(u64::from(timeout_secs)) + POLL_GRACE;
        self.call_with_timeout("getUpdates", &params, timeout).await
    }

    pub async fn send_message(&self, chat_id: i64, screen: &Screen) -> Result<Message, TelegramError> {
        let params = SendMessage {
            chat_id,
            text: &screen.text,
            parse_mode: screen.markdown.then_some(MARKDOWN),
            reply_markup: InlineKeyboardMarkup::from(&screen.keyboard),
        };
        self.call("sendMessage", &params).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        screen: &Screen,
    ) -> Result<Message, TelegramError> {
        let params = EditMessageText {
            chat_id,
            message_id,
            text: &screen.text,
            parse_mode: screen.markdown.then_some(MARKDOWN),
            reply_markup: InlineKeyboardMarkup::from(&screen.keyboard),
        };
        self.call("editMessageText", &params).await
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, TelegramError> {
        self.call(
            "deleteMessage",
            &DeleteMessage {
                chat_id,
                message_id,
            },
        )
        .await
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<bool, TelegramError> {
        self.call(
            "answerCallbackQuery",
            &AnswerCallbackQuery {
                callback_query_id,
                text,
            },
        )
        .await
    }
}
