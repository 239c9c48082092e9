//! Standard node library
//!
//! The five built-in node kinds and the provider adapters behind them.

mod config;
mod file;
mod image;
pub mod ocr_space;
pub mod openai;
mod output;
pub mod replicate;
mod text;
mod vision;

pub use config::ProviderConfig;
pub use file::{FileToTextNode, FileToTextNodeFactory};
pub use image::{ImageGenerationNode, ImageGenerationNodeFactory};
pub use ocr_space::OcrSpaceRecognizer;
pub use openai::OpenAiTextGenerator;
pub use output::{OutputNode, OutputNodeFactory};
pub use replicate::{PollPolicy, ReplicateImageGenerator};
pub use text::{TextGenerationNode, TextGenerationNodeFactory};
pub use vision::{ImageToTextNode, ImageToTextNodeFactory, NO_IMAGE};

use std::sync::Arc;
use studiocore::{ImageGenerator, TextGenerator, TextRecognizer};
use studioruntime::NodeRegistry;

/// External services the built-in nodes call
#[derive(Clone)]
pub struct Capabilities {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub ocr: Arc<dyn TextRecognizer>,
}

impl Capabilities {
    /// OpenAI, Replicate and OCR.space adapters
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            text: Arc::new(OpenAiTextGenerator::new(config.openai_api_key.clone())),
            image: Arc::new(ReplicateImageGenerator::new(
                config.replicate_api_key.clone(),
                config.replicate_version.clone(),
                config.poll,
            )),
            ocr: Arc::new(OcrSpaceRecognizer::new(config.ocr_space_api_key.clone())),
        }
    }
}

/// Register all standard nodes with a registry
pub fn register_all(registry: &mut NodeRegistry, capabilities: &Capabilities) {
    registry.register(Arc::new(TextGenerationNodeFactory::new(capabilities.text.clone())));
    registry.register(Arc::new(ImageGenerationNodeFactory::new(capabilities.image.clone())));
    registry.register(Arc::new(FileToTextNodeFactory));
    registry.register(Arc::new(ImageToTextNodeFactory::new(capabilities.ocr.clone())));
    registry.register(Arc::new(OutputNodeFactory));
}
