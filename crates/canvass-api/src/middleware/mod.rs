pub mod language;

pub use language::{RequestLanguage, detect_request_language};
