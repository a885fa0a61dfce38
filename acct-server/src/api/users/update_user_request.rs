use acct_core::UserPatch;

use serde::Deserialize;

/// Partial profile update. Only these fields are patchable; identity fields
/// sent in the body are simply not representable and get dropped by serde.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub picture: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            name: r.name,
            picture: r.picture,
            access_token: r.access_token,
            refresh_token: r.refresh_token,
        }
    }
}
