//! Backend adapters, model directory, and streaming chat gateway.
//!
//! ```rust
//! use rprovider::{BackendKind, ChatRequest, Message, Role};
//!
//! let request = ChatRequest::new("llama3:latest", vec![Message::new(Role::User, "hello")])
//!     .with_num_ctx(4096);
//!
//! assert!(request.validate().is_ok());
//! assert_eq!(BackendKind::Ollama.to_string(), "ollama");
//! ```

pub mod adapters;
pub mod backend;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod hooks;
pub mod model;
pub mod prelude;
pub mod stream;

pub use backend::{ModelBackend, ProviderFuture};
pub use credentials::{SecretString, SecureCredentialManager};
pub use directory::{ModelDirectory, ModelEntry};
pub use error::{ProviderError, ProviderErrorKind};
pub use gateway::ChatGateway;
pub use hooks::{GatewayHooks, NoopGatewayHooks};
pub use model::{BackendKind, ChatOptions, ChatRequest, Message, ModelInfo, Role};
pub use stream::{ChatChunk, ChatChunkStream, FragmentStream, VecFragmentStream};
