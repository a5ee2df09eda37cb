//! Canvass Core — domain models, collaborator traits, errors, and the
//! language/taxonomy normalizers shared by every other crate.

pub mod delivery;
pub mod error;
pub mod language;
pub mod models;
pub mod projection;
pub mod repository;
pub mod taxonomy;
pub mod validation;

pub use error::{CanvassError, CanvassResult};
pub use language::{FallbackChain, LanguageSignals, detect_language, fallback_chain};
pub use taxonomy::TaxonomyKey;
