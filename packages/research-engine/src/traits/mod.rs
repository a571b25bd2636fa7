//! Collaborator traits: search, page extraction, generation, artifacts.

pub mod artifact;
pub mod extractor;
pub mod model;
pub mod searcher;

pub use artifact::ArtifactGenerator;
pub use extractor::PageExtractor;
pub use model::GenerativeModel;
pub use searcher::WebSearcher;
