use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use rprovider::{
    BackendKind, ChatGateway, ChatOptions, ChatRequest, FragmentStream, GatewayHooks, Message,
    ModelBackend, ModelDirectory, ModelInfo, ProviderError, ProviderErrorKind, ProviderFuture,
    Role, VecFragmentStream,
};

struct FakeBackend {
    kind: BackendKind,
    models: Vec<&'static str>,
    context_length: u32,
    fragments: Vec<Result<String, ProviderError>>,
    list_error: Option<ProviderError>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl FakeBackend {
    fn new(kind: BackendKind, models: Vec<&'static str>) -> Self {
        Self {
            kind,
            models,
            context_length: 4096,
            fragments: Vec::new(),
            list_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_fragments(mut self, fragments: Vec<Result<String, ProviderError>>) -> Self {
        self.fragments = fragments;
        self
    }
}

impl ModelBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            if let Some(error) = &self.list_error {
                return Err(error.clone());
            }
            Ok(self.models.iter().map(|model| model.to_string()).collect())
        })
    }

    fn show<'a>(&'a self, model: &'a str) -> ProviderFuture<'a, Result<ModelInfo, ProviderError>> {
        Box::pin(async move { Ok(ModelInfo::new(model, self.context_length)) })
    }

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.calls.lock().expect("calls lock").push(request);
            Ok(Box::pin(VecFragmentStream::new(self.fragments.clone())) as FragmentStream<'a>)
        })
    }
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl GatewayHooks for RecordingHooks {
    fn on_request_start(&self, backend: BackendKind, operation: &str, model: &str) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("start:{backend}:{operation}:{model}"));
    }

    fn on_stream_complete(
        &self,
        backend: BackendKind,
        model: &str,
        fragments: u64,
        _elapsed: Duration,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("complete:{backend}:{model}:{fragments}"));
    }

    fn on_failure(
        &self,
        backend: BackendKind,
        operation: &str,
        model: &str,
        error: &ProviderError,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("failure:{backend}:{operation}:{model}:{:?}", error.kind));
    }
}

#[tokio::test]
async fn directory_lists_local_models_before_remote_models() {
    let remote: Arc<dyn ModelBackend> = Arc::new(FakeBackend::new(
        BackendKind::Anthropic,
        vec!["claude-3-5-haiku-latest"],
    ));
    let local: Arc<dyn ModelBackend> =
        Arc::new(FakeBackend::new(BackendKind::Ollama, vec!["llama3:latest"]));

    let directory = ModelDirectory::discover(vec![remote, local])
        .await
        .expect("discovery should succeed");

    assert_eq!(
        directory.list(),
        vec!["llama3:latest", "claude-3-5-haiku-latest"]
    );
    assert_eq!(
        directory.binding("claude-3-5-haiku-latest"),
        Ok(BackendKind::Anthropic)
    );
    assert_eq!(directory.len(), 2);
}

#[tokio::test]
async fn directory_rejects_duplicate_model_names() {
    let local: Arc<dyn ModelBackend> =
        Arc::new(FakeBackend::new(BackendKind::Ollama, vec!["shared"]));
    let remote: Arc<dyn ModelBackend> =
        Arc::new(FakeBackend::new(BackendKind::Anthropic, vec!["shared"]));

    let error = ModelDirectory::discover(vec![local, remote])
        .await
        .expect_err("duplicate names must fail");

    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
}

#[tokio::test]
async fn directory_surfaces_unreachable_backend() {
    let mut local = FakeBackend::new(BackendKind::Ollama, Vec::new());
    local.list_error = Some(ProviderError::unavailable("connection refused"));
    let local: Arc<dyn ModelBackend> = Arc::new(local);

    let error = ModelDirectory::discover(vec![local])
        .await
        .expect_err("unreachable backend must surface");

    assert_eq!(error.kind, ProviderErrorKind::Unavailable);
}

#[tokio::test]
async fn unknown_model_is_rejected_before_any_upstream_call() {
    let local = Arc::new(FakeBackend::new(BackendKind::Ollama, vec!["llama3:latest"]));
    let gateway = ChatGateway::discover(
        vec![local.clone() as Arc<dyn ModelBackend>],
        Arc::new(RecordingHooks::default()),
    )
    .await
    .expect("discovery should succeed");

    let result = gateway
        .chat(
            "claude-3-5-haiku-latest",
            vec![Message::new(Role::User, "Hi")],
            ChatOptions::default(),
        )
        .await;

    let error = match result {
        Ok(_) => panic!("unknown model must fail"),
        Err(error) => error,
    };
    assert_eq!(error.kind, ProviderErrorKind::UnknownModel);
    assert!(local.calls.lock().expect("calls lock").is_empty());

    let show_error = gateway
        .show("claude-3-5-haiku-latest")
        .await
        .expect_err("unknown model must fail");
    assert_eq!(show_error.kind, ProviderErrorKind::UnknownModel);
}

#[tokio::test]
async fn chat_normalizes_fragments_and_reports_hooks() {
    let local = Arc::new(
        FakeBackend::new(BackendKind::Ollama, vec!["llama3:latest"])
            .with_fragments(vec![Ok("Hel".to_string()), Ok("lo".to_string())]),
    );
    let hooks = Arc::new(RecordingHooks::default());
    let gateway = ChatGateway::discover(vec![local.clone() as Arc<dyn ModelBackend>], hooks.clone())
        .await
        .expect("discovery should succeed");

    let mut stream = gateway
        .chat(
            "llama3:latest",
            vec![Message::new(Role::User, "Hi")],
            ChatOptions::default().with_num_ctx(2048),
        )
        .await
        .expect("chat should start");

    let mut content = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("chunk should be ok");
        assert_eq!(chunk.message.role, Role::Assistant);
        content.push_str(chunk.content());
    }

    assert_eq!(content, "Hello");
    let calls = local.calls.lock().expect("calls lock");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].options.num_ctx, Some(2048));

    let events = hooks.events.lock().expect("events lock").clone();
    assert_eq!(
        events,
        vec![
            "start:ollama:list:*",
            "start:ollama:chat:llama3:latest",
            "complete:ollama:llama3:latest:2",
        ]
    );
}

#[tokio::test]
async fn chat_stream_errors_terminate_and_report_failure() {
    let local = Arc::new(
        FakeBackend::new(BackendKind::Ollama, vec!["llama3:latest"]).with_fragments(vec![
            Ok("Hel".to_string()),
            Err(ProviderError::transport("connection reset")),
        ]),
    );
    let hooks = Arc::new(RecordingHooks::default());
    let gateway = ChatGateway::discover(vec![local as Arc<dyn ModelBackend>], hooks.clone())
        .await
        .expect("discovery should succeed");

    let mut stream = gateway
        .chat(
            "llama3:latest",
            vec![Message::new(Role::User, "Hi")],
            ChatOptions::default(),
        )
        .await
        .expect("chat should start");

    assert!(stream.next().await.expect("first item").is_ok());
    let error = stream
        .next()
        .await
        .expect("second item")
        .expect_err("second item should fail");
    assert_eq!(error.kind, ProviderErrorKind::Transport);
    assert!(stream.next().await.is_none());

    let events = hooks.events.lock().expect("events lock").clone();
    assert_eq!(
        events.last().map(String::as_str),
        Some("failure:ollama:chat:llama3:latest:Transport")
    );
}

#[tokio::test]
async fn show_delegates_to_the_bound_backend() {
    let mut local = FakeBackend::new(BackendKind::Ollama, vec!["llama3:latest"]);
    local.context_length = 131_072;
    let gateway = ChatGateway::new(
        ModelDirectory::discover(vec![Arc::new(local) as Arc<dyn ModelBackend>])
            .await
            .expect("discovery should succeed"),
    );

    let info = gateway.show("llama3:latest").await.expect("show should succeed");

    assert_eq!(info, ModelInfo::new("llama3:latest", 131_072));
    assert_eq!(gateway.list(), vec!["llama3:latest"]);
}
