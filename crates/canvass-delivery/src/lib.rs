//! Canvass Delivery — outbound mail and uploaded-file storage behind
//! the `canvass-core` collaborator traits.

pub mod error;
pub mod mail;
pub mod storage;

pub use error::DeliveryError;
pub use mail::{BREVO_SEND_URL, BrevoConfig, BrevoMailer, LogMailer};
pub use storage::LocalFileStorage;
