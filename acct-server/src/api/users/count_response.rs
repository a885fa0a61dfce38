use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}
