//! Session context driving the chat state machine.
//!
//! Holds the gateway, history store, active session, context length, and
//! generation state. Transitions:
//!
//! - `submit`: append user message, `Idle -> AwaitingGeneration`
//! - `submit_attachment`: append file message, state unchanged
//! - `regenerate`: drop trailing assistant reply, `-> AwaitingGeneration`
//! - `begin_generation`: `AwaitingGeneration -> Streaming -> Idle`, or back to
//!   `AwaitingGeneration` when the stream fails or the call is abandoned

use std::sync::Arc;

use futures_util::StreamExt;
use rcommon::ChatId;
use rprovider::{ChatGateway, ChatOptions};
use tracing::{debug, warn};

use crate::attachment::{AttachmentError, IncludeCommand, read_attachment};
use crate::{
    ChatError, ChatMessage, ChatSession, ChatSummary, GenerationState, HistoryStore, StoredChat,
    compose,
};

pub const DEFAULT_MAX_NUM_CTX: u32 = 8192;
pub const DEFAULT_RECENT_CHATS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContextConfig {
    /// Upper bound for `num_ctx` regardless of the model's context length.
    pub max_num_ctx: u32,
    pub recent_chats_limit: usize,
    /// Seeded as the first message of every new session.
    pub system_prompt: Option<String>,
    /// Used at startup when the directory lists it; otherwise the first model.
    pub preferred_model: Option<String>,
}

impl Default for ChatContextConfig {
    fn default() -> Self {
        Self {
            max_num_ctx: DEFAULT_MAX_NUM_CTX,
            recent_chats_limit: DEFAULT_RECENT_CHATS_LIMIT,
            system_prompt: None,
            preferred_model: None,
        }
    }
}

impl ChatContextConfig {
    pub fn with_max_num_ctx(mut self, max_num_ctx: u32) -> Self {
        self.max_num_ctx = max_num_ctx;
        self
    }

    pub fn with_recent_chats_limit(mut self, limit: usize) -> Self {
        self.recent_chats_limit = limit;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_preferred_model(mut self, model: impl Into<String>) -> Self {
        self.preferred_model = Some(model.into());
        self
    }
}

/// Result of [`ChatContext::handle_prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// A user message was appended; a generation is pending.
    AwaitingGeneration,
    /// Files were attached; read failures are returned as notices.
    Included {
        attached: usize,
        notices: Vec<AttachmentError>,
    },
}

pub struct ChatContext {
    gateway: Arc<ChatGateway>,
    store: Arc<dyn HistoryStore>,
    session: ChatSession,
    state: GenerationState,
    context_length: u32,
    config: ChatContextConfig,
}

impl ChatContext {
    /// Binds a fresh session to the preferred model, or the first listed one.
    pub async fn start(
        gateway: Arc<ChatGateway>,
        store: Arc<dyn HistoryStore>,
        config: ChatContextConfig,
    ) -> Result<Self, ChatError> {
        let models = gateway.list();
        let model = config
            .preferred_model
            .as_ref()
            .filter(|preferred| models.contains(preferred))
            .or_else(|| models.first())
            .cloned()
            .ok_or_else(|| ChatError::invalid_state("no models available from any backend"))?;

        let context_length = gateway.show(&model).await?.context_length;
        let session = ChatSession::new(model, config.system_prompt.as_deref());
        debug!(chat_id = %session.id(), model = %session.model, context_length, "chat context started");

        Ok(Self {
            gateway,
            store,
            session,
            state: GenerationState::Idle,
            context_length,
            config,
        })
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn context_length(&self) -> u32 {
        self.context_length
    }

    pub fn config(&self) -> &ChatContextConfig {
        &self.config
    }

    pub fn gateway(&self) -> &ChatGateway {
        &self.gateway
    }

    /// Context window requested from local backends.
    pub fn num_ctx(&self) -> u32 {
        self.config.max_num_ctx.min(self.context_length)
    }

    /// Replaces the active session with a fresh one on the same model.
    pub fn new_chat(&mut self) {
        self.session = ChatSession::new(
            self.session.model.clone(),
            self.config.system_prompt.as_deref(),
        );
        self.state = GenerationState::Idle;
        debug!(chat_id = %self.session.id(), "new chat");
    }

    /// Loads a stored chat; `false` when no chat has that id.
    ///
    /// A stored model that is no longer listed is rebound to the active model.
    pub async fn load_chat(&mut self, id: &ChatId) -> Result<bool, ChatError> {
        let Some(stored) = self.store.get_chat(id).await? else {
            return Ok(false);
        };

        let mut session = stored.into_session();
        if !self.gateway.directory().contains(&session.model) {
            warn!(
                chat_id = %id,
                model = %session.model,
                fallback = %self.session.model,
                "stored model is not available; rebinding"
            );
            session.model = self.session.model.clone();
        }

        self.context_length = self.gateway.show(&session.model).await?.context_length;
        self.session = session;
        self.state = GenerationState::Idle;
        debug!(chat_id = %id, model = %self.session.model, "chat loaded");

        Ok(true)
    }

    /// Rebinds the session and refreshes the context length.
    pub async fn change_model(&mut self, model: &str) -> Result<(), ChatError> {
        let info = self.gateway.show(model).await?;
        self.session.model = info.name;
        self.context_length = info.context_length;
        debug!(model, context_length = self.context_length, "model changed");

        Ok(())
    }

    pub async fn recent_chats(&self) -> Result<Vec<ChatSummary>, ChatError> {
        self.store
            .get_recent_chats(self.config.recent_chats_limit)
            .await
    }

    pub fn submit(&mut self, prompt: impl Into<String>) -> Result<(), ChatError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ChatError::invalid_request("prompt must not be empty"));
        }
        self.ensure_not_streaming()?;

        self.session.push(ChatMessage::user(prompt));
        self.state = GenerationState::AwaitingGeneration;
        Ok(())
    }

    pub fn submit_attachment(
        &mut self,
        name: impl Into<String>,
        ext: impl Into<String>,
        data: impl Into<String>,
    ) -> Result<(), ChatError> {
        self.ensure_not_streaming()?;
        self.session.push(ChatMessage::file(name, ext, data));
        Ok(())
    }

    /// Dispatches `/include` commands to attachment handling, else submits.
    pub fn handle_prompt(&mut self, prompt: &str) -> Result<PromptOutcome, ChatError> {
        let Some(command) = IncludeCommand::parse(prompt) else {
            self.submit(prompt)?;
            return Ok(PromptOutcome::AwaitingGeneration);
        };

        let command = command?;
        let mut attached = 0;
        let mut notices = Vec::new();
        for path in command.resolve() {
            match path.and_then(|path| read_attachment(&path)) {
                Ok(attachment) => {
                    self.submit_attachment(attachment.name, attachment.ext, attachment.data)?;
                    attached += 1;
                }
                Err(notice) => {
                    warn!(path = %notice.path.display(), kind = ?notice.kind, "attachment skipped");
                    notices.push(notice);
                }
            }
        }

        Ok(PromptOutcome::Included { attached, notices })
    }

    pub fn regenerate(&mut self) -> Result<(), ChatError> {
        self.ensure_not_streaming()?;
        self.session.remove_last_assistant()?;
        self.state = GenerationState::AwaitingGeneration;
        Ok(())
    }

    /// Streams one assistant reply into the session.
    ///
    /// Each fragment is appended to a new assistant message and passed to
    /// `on_fragment`. If the stream fails, or the returned future is dropped
    /// before the stream ends, the partial reply is discarded and the state
    /// returns to `AwaitingGeneration`, so the turn can be retried.
    ///
    /// A completed reply is returned even when saving it to the history store
    /// fails; the failure is logged and the session keeps the reply.
    pub async fn begin_generation<F>(&mut self, mut on_fragment: F) -> Result<String, ChatError>
    where
        F: FnMut(&str),
    {
        if self.state != GenerationState::AwaitingGeneration {
            return Err(ChatError::invalid_state(format!(
                "generation requires AwaitingGeneration, current state is {:?}",
                self.state
            )));
        }

        let gateway = Arc::clone(&self.gateway);
        let messages = compose(self.session.messages());
        let options = ChatOptions::default().with_num_ctx(self.num_ctx());
        let mut stream = gateway.chat(&self.session.model, messages, options).await?;

        let mut turn = StreamingTurn::begin(&mut self.session, &mut self.state);
        debug!(chat_id = %turn.session.id(), model = %turn.session.model, "streaming started");

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => {
                    warn!(chat_id = %turn.session.id(), error = %error, "streaming failed");
                    return Err(error.into());
                }
            };

            turn.session.append_fragment(chunk.content())?;
            on_fragment(chunk.content());
        }

        let reply = turn.finish();
        if self.persist().await.is_err() {
            debug!(chat_id = %self.session.id(), "reply kept in session only");
        }

        Ok(reply)
    }

    pub async fn generate(&mut self) -> Result<String, ChatError> {
        self.begin_generation(|_| {}).await
    }

    async fn persist(&self) -> Result<(), ChatError> {
        if self.session.non_system_count() <= 1 {
            return Ok(());
        }

        self.store
            .save_chat(StoredChat::from_session(&self.session))
            .await
            .inspect_err(|error| warn!(chat_id = %self.session.id(), error = %error, "chat not saved"))?;
        debug!(chat_id = %self.session.id(), "chat saved");

        Ok(())
    }

    fn ensure_not_streaming(&self) -> Result<(), ChatError> {
        if self.state == GenerationState::Streaming {
            return Err(ChatError::invalid_state("a reply is currently streaming"));
        }

        Ok(())
    }
}

/// The assistant message of an in-flight reply.
///
/// Dropping it before [`StreamingTurn::finish`] removes the partial reply and
/// restores `AwaitingGeneration`.
struct StreamingTurn<'a> {
    session: &'a mut ChatSession,
    state: &'a mut GenerationState,
    finished: bool,
}

impl<'a> StreamingTurn<'a> {
    fn begin(session: &'a mut ChatSession, state: &'a mut GenerationState) -> Self {
        *state = GenerationState::Streaming;
        session.push(ChatMessage::assistant(""));
        Self {
            session,
            state,
            finished: false,
        }
    }

    fn finish(mut self) -> String {
        self.finished = true;
        *self.state = GenerationState::Idle;
        self.session
            .last()
            .and_then(ChatMessage::content)
            .unwrap_or_default()
            .to_string()
    }
}

impl Drop for StreamingTurn<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if self.session.remove_last_assistant().is_ok() {
            debug!(chat_id = %self.session.id(), "partial reply discarded");
        }
        *self.state = GenerationState::AwaitingGeneration;
    }
}
