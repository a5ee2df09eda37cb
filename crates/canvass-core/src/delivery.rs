//! Out-of-band collaborators: transactional mail and file storage.

use crate::error::CanvassResult;

/// Sends account emails. Implementations receive the raw token, which
/// exists only between issuance and this call.
pub trait Mailer: Send + Sync {
    fn send_activation_email(
        &self,
        email: &str,
        raw_token: &str,
        name: &str,
    ) -> impl Future<Output = CanvassResult<()>> + Send;

    fn send_password_reset_email(
        &self,
        email: &str,
        raw_token: &str,
        name: &str,
    ) -> impl Future<Output = CanvassResult<()>> + Send;
}

/// Stores uploaded files and returns an opaque path for later deletion.
pub trait FileStorage: Send + Sync {
    /// Persist `bytes` under `namespace` (e.g. `avatars`). The returned
    /// path is what callers store on their records.
    fn save(
        &self,
        namespace: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = CanvassResult<String>> + Send;

    /// Remove a stored file. Callers treat failures as non-fatal.
    fn delete(&self, path: &str) -> impl Future<Output = CanvassResult<()>> + Send;
}
