use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError, ChatResponse, ChatSource, ChatTurn};
use crate::core::chat_stream::{FragmentStream, StreamFragment};
use crate::core::message::{ChatMessage, ChatRole};
use crate::core::mock_reply::mock_reply;

/// How many trailing messages travel with each request as context.
pub const HISTORY_WINDOW: usize = 10;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<ChatResponse, ApiError>;

    async fn chat_stream(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<FragmentStream, ApiError>;
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<ChatResponse, ApiError> {
        ApiClient::chat(self, message, history).await
    }

    async fn chat_stream(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<FragmentStream, ApiError> {
        ApiClient::chat_stream(self, message, history).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or a request was already in flight.
    Skipped,
    /// The backend answered.
    Answered,
    /// The backend failed and a canned reply was used instead.
    Fallback,
    /// The stream broke after some of the reply had arrived; the partial
    /// reply is kept.
    Interrupted,
}

/// Clears the loading flag when dropped.
struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A send that has passed the guards and is waiting on the backend.
///
/// Holding one keeps the session in the loading state; dropping it, for
/// example by abandoning the future that owns it, ends that state.
pub struct PendingSend {
    message: String,
    history: Vec<ChatTurn>,
    _loading: LoadingGuard,
}

/// Chat widget state: history, open/closed and one request at a time.
#[derive(Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    is_open: bool,
    loading: Arc<AtomicBool>,
    sources: Vec<ChatSource>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sources cited by the most recent streamed reply.
    pub fn sources(&self) -> &[ChatSource] {
        &self.sources
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.sources.clear();
    }

    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    /// Check the guards, record the user's message and enter the loading
    /// state. Returns `None` when the send should be skipped.
    pub fn begin_send(&mut self, content: &str) -> Option<PendingSend> {
        let trimmed = content.trim();
        if trimmed.is_empty() || self.is_loading() {
            return None;
        }

        self.add_message(ChatRole::User, trimmed);
        self.loading.store(true, Ordering::SeqCst);

        let start = self.messages.len().saturating_sub(HISTORY_WINDOW);
        let history = self.messages[start..]
            .iter()
            .map(ChatMessage::to_turn)
            .collect();

        Some(PendingSend {
            message: content.to_string(),
            history,
            _loading: LoadingGuard {
                flag: Arc::clone(&self.loading),
            },
        })
    }

    /// Record the backend's answer, or a canned reply if it failed.
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<ChatResponse, ApiError>,
    ) -> SendOutcome {
        let outcome = match result {
            Ok(response) => {
                self.add_message(ChatRole::Assistant, response.response);
                SendOutcome::Answered
            }
            Err(err) => {
                info!(error = %err, "Chat backend unavailable, using canned reply");
                self.add_message(ChatRole::Assistant, mock_reply(&pending.message));
                SendOutcome::Fallback
            }
        };
        drop(pending);
        outcome
    }

    pub async fn send_message(&mut self, backend: &dyn ChatBackend, content: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(content) else {
            return SendOutcome::Skipped;
        };
        let result = backend.chat(&pending.message, &pending.history).await;
        self.finish_send(pending, result)
    }

    /// Like [`send_message`](Self::send_message) but over the streaming
    /// endpoint. Content fragments are appended to a single assistant
    /// message and passed to `on_content` as they arrive.
    pub async fn stream_message(
        &mut self,
        backend: &dyn ChatBackend,
        content: &str,
        mut on_content: impl FnMut(&str) + Send,
    ) -> SendOutcome {
        let Some(pending) = self.begin_send(content) else {
            return SendOutcome::Skipped;
        };

        let mut stream = match backend.chat_stream(&pending.message, &pending.history).await {
            Ok(stream) => stream,
            Err(err) => {
                info!(error = %err, "Chat stream unavailable, using canned reply");
                let reply = mock_reply(&pending.message);
                on_content(reply);
                self.add_message(ChatRole::Assistant, reply);
                return SendOutcome::Fallback;
            }
        };

        self.sources.clear();
        self.add_message(ChatRole::Assistant, String::new());
        let reply_index = self.messages.len() - 1;

        let mut failure = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(StreamFragment::Content(text)) => {
                    on_content(&text);
                    self.messages[reply_index].content.push_str(&text);
                }
                Ok(StreamFragment::Sources(sources)) => self.sources = sources,
                Ok(StreamFragment::Other(value)) => {
                    debug!(fragment = %value, "Ignoring unrecognised stream fragment");
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let outcome = match failure {
            None => SendOutcome::Answered,
            Some(err) if self.messages[reply_index].content.is_empty() => {
                info!(error = %err, "Chat stream failed, using canned reply");
                let reply = mock_reply(&pending.message);
                on_content(reply);
                self.messages[reply_index].content = reply.to_string();
                SendOutcome::Fallback
            }
            Some(err) => {
                info!(error = %err, "Chat stream interrupted");
                SendOutcome::Interrupted
            }
        };
        drop(pending);
        outcome
    }
}
