// src/services/mod.rs
//
// Clients for the external collaborators: the AI completion service and the
// OAuth identity provider

pub mod completion;
pub mod gemini;
pub mod google;
pub mod oauth;

// Re-export commonly used types for convenience
pub use completion::CompletionClient;
pub use gemini::GeminiService;
pub use google::GoogleService;
pub use oauth::IdentityProvider;
