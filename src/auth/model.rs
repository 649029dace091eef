use serde::{Deserialize, Serialize};

/// Claims carried by a Supabase access token. Only `sub` is relied upon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
