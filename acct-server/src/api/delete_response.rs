use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// False when the target did not exist; deletion is idempotent either way.
    pub deleted: bool,
}
