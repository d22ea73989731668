pub mod completion;
pub mod llm_client;

pub use completion::CompletionService;
pub use llm_client::LlmClient;
