use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Required; validated in the handler so the caller gets a 400 with a
    /// field name rather than a body-rejection.
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub picture: Option<String>,
}
