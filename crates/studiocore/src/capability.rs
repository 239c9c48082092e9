//! Contracts for the external services nodes call into.
//!
//! Each capability wraps one provider call. Built-in nodes hold them behind
//! `Arc<dyn ...>` so a run can be driven by stubs.

use crate::NodeError;
use async_trait::async_trait;

/// Single-turn text completion
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the completion text, or an empty string when the provider
    /// answered without any.
    async fn generate_text(&self, prompt: &str) -> Result<String, NodeError>;
}

/// Prompt to image, returning the URL of the generated image
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<String, NodeError>;
}

/// OCR over a base64 or data-URL encoded image
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize_text(&self, image: &str) -> Result<String, NodeError>;
}
