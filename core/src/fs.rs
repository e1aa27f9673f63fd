use crate::Result;
use std::fmt::Debug;

/// FileRead is used to read the file content entirely in `Vec<u8>`.
///
/// Implementations must report a missing file as
/// [`ErrorKind::ConfigNotFound`](crate::ErrorKind::ConfigNotFound) so that
/// callers can tell "absent" apart from "unreadable".
#[async_trait::async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the file content entirely in `Vec<u8>`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}
