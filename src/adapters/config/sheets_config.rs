use std::time::Duration;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Absent until the deployment provides credentials; the client then fails
    /// with an authentication error instead of at startup.
    #[serde(default)]
    pub service_account: Option<ServiceAccountCredential>,
    #[serde(default = "default_client_ttl_secs")]
    pub client_ttl_secs: u64,
    #[serde(default = "default_read_ttl_secs")]
    pub read_ttl_secs: u64,
}

fn default_client_ttl_secs() -> u64 {
    3600
}

fn default_read_ttl_secs() -> u64 {
    300
}

impl SheetsConfig {
    pub fn client_ttl(&self) -> Duration {
        Duration::from_secs(self.client_ttl_secs)
    }

    pub fn read_ttl(&self) -> Duration {
        Duration::from_secs(self.read_ttl_secs)
    }
}

/// The fields of a Google service-account JSON key, as pasted into the config
/// store. `private_key` may arrive mangled and is normalized before use.
#[derive(Deserialize, Clone)]
pub struct ServiceAccountCredential {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl std::fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}
