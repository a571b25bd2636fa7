//! Generative model backends and model-backed artifact generators.

pub mod artifacts;
#[cfg(feature = "openai")]
pub mod openai;

pub use artifacts::ModelArtifactGenerator;
#[cfg(feature = "openai")]
pub use openai::OpenAIModel;
