use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use crate::bot::{Action, Event, Responder};
use crate::fetcher::backoff::retry_delay;
use crate::telegram::client::{TelegramClient, TelegramError};
use crate::telegram::types::{CallbackQuery, Message, Update};

const POLL_TIMEOUT_SECS: u32 = 30;
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Where a reply goes and which button press it answers.
#[derive(Debug, Clone)]
struct Origin {
    chat_id: i64,
    message_id: Option<i64>,
    callback_id: Option<String>,
}

/// Long-polling loop feeding Telegram updates to a [`Responder`].
pub struct Poller {
    client: TelegramClient,
    responder: Responder,
    poll_timeout_secs: u32,
}

impl Poller {
    pub fn new(client: TelegramClient, responder: Responder) -> Self {
        Self {
            client,
            responder,
            poll_timeout_secs: POLL_TIMEOUT_SECS,
        }
    }

    pub fn with_poll_timeout(mut self, secs: u32) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// Poll until `shutdown` is cancelled. Updates are handled one at a time.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!("polling for telegram updates");
        let mut offset = 0;
        let mut failures = 0;

        loop {
            let polled = tokio::select! {
                _ = shutdown.cancelled() => break,
                polled = self.client.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    failures = 0;
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let span = info_span!("update", id = update.update_id);
                        if let Err(e) = self.handle_update(update).instrument(span).await {
                            warn!(error = %e, "failed to handle update");
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    let delay = retry_delay(failures, ERROR_BACKOFF);
                    error!(error = %e, failures, "getUpdates failed");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        info!("polling stopped");
        Ok(())
    }

    /// Translate one update into an event, respond, and deliver the reply.
    /// Updates that are neither `/start` nor a button press are ignored.
    pub async fn handle_update(&self, update: Update) -> Result<(), TelegramError> {
        match classify(update) {
            Some(Incoming::Event(event, origin)) => {
                let action = self.responder.respond(&event, &mut rand::thread_rng());
                self.deliver(action, &origin).await
            }
            Some(Incoming::Orphan(callback_id)) => {
                self.client.answer_callback_query(&callback_id, None).await?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Show the reply, then answer the button press even if showing failed.
    async fn deliver(&self, action: Action, origin: &Origin) -> Result<(), TelegramError> {
        let shown = self.show(action, origin).await;
        let Some(callback_id) = &origin.callback_id else {
            return shown.map(drop);
        };

        let notice = shown.as_ref().ok().and_then(Option::as_deref);
        let answered = self.client.answer_callback_query(callback_id, notice).await;
        shown?;
        answered?;
        Ok(())
    }

    /// Returns the notice to attach to the callback answer, if any.
    async fn show(&self, action: Action, origin: &Origin) -> Result<Option<String>, TelegramError> {
        match action {
            Action::Send(screen) => {
                self.client.send_message(origin.chat_id, &screen).await?;
            }
            Action::Edit(screen) => match origin.message_id {
                Some(message_id) => {
                    if let Err(e) = self
                        .client
                        .edit_message_text(origin.chat_id, message_id, &screen)
                        .await
                    {
                        // Usually "message is not modified"; a fresh list still helps.
                        warn!(error = %e, "edit failed, sending a new message");
                        self.client.send_message(origin.chat_id, &screen).await?;
                    }
                }
                None => {
                    self.client.send_message(origin.chat_id, &screen).await?;
                }
            },
            Action::Replace(screen) => {
                if let Some(message_id) = origin.message_id
                    && let Err(e) = self.client.delete_message(origin.chat_id, message_id).await
                {
                    warn!(error = %e, "could not delete previous message");
                }
                self.client.send_message(origin.chat_id, &screen).await?;
            }
            Action::Ack(text) => return Ok(text),
        }
        Ok(None)
    }
}

#[derive(Debug)]
enum Incoming {
    Event(Event, Origin),
    /// Button press on a message Telegram no longer includes; only the
    /// callback can be answered.
    Orphan(String),
}

fn classify(update: Update) -> Option<Incoming> {
    if let Some(CallbackQuery { id, data, message }) = update.callback_query {
        let Some(message) = message else {
            return Some(Incoming::Orphan(id));
        };
        let origin = Origin {
            chat_id: message.chat.id,
            message_id: Some(message.message_id),
            callback_id: Some(id),
        };
        return Some(Incoming::Event(Event::Callback(data.unwrap_or_default()), origin));
    }

    let Message { chat, text, .. } = update.message?;
    if !is_start_command(text.as_deref()?) {
        return None;
    }
    Some(Incoming::Event(
        Event::Start,
        Origin {
            chat_id: chat.id,
            message_id: None,
            callback_id: None,
        },
    ))
}

/// `/start`, `/start@SomeBot` and `/start payload` all count.
fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split('@').next().unwrap_or_default();
    command == "/start"
}
