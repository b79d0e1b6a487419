mod backend;
mod transport;
mod types;

pub use backend::OllamaBackend;
pub use transport::{OLLAMA_HOST_URL, OllamaChunkStream, OllamaHttpTransport, OllamaTransport};
pub use types::{
    OllamaChatChunk, OllamaChatRequest, OllamaMessage, OllamaModelDetails, OllamaModelTag,
    OllamaOptions, OllamaShowRequest, OllamaShowResponse, OllamaTagsResponse,
};
