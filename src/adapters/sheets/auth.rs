use error_stack::{report, ResultExt};
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use serde_json::json;
use tracing::instrument;

use crate::adapters::config::sheets_config::{ServiceAccountCredential, SheetsConfig};
use crate::domain::credentials;
use crate::ports::tabular_store::{Result, SheetStoreError};

use super::http_client::{HttpClient, HttpsConnector};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Builds the service-account key the authenticator expects, with the private
/// key repaired first.
pub fn service_account_key(
    credential: &ServiceAccountCredential,
) -> Result<oauth2::ServiceAccountKey> {
    let private_key = credentials::normalize(&credential.private_key)
        .change_context(SheetStoreError::MalformedKey)?;

    let key = json!({
        "type": "service_account",
        "project_id": credential.project_id,
        "private_key_id": credential.private_key_id,
        "private_key": private_key.as_str(),
        "client_email": credential.client_email,
        "client_id": credential.client_id,
        "token_uri": credential.token_uri,
    });

    serde_json::from_value(key)
        .change_context(SheetStoreError::Authentication)
        .attach_printable("Service account fields do not form a valid key")
}

/// The configured service-account key, repaired. Checked before any
/// connection is opened.
pub fn configured_key(config: &SheetsConfig) -> Result<oauth2::ServiceAccountKey> {
    let credential = config
        .service_account
        .as_ref()
        .ok_or_else(|| report!(SheetStoreError::Authentication))
        .attach_printable("No [sheets.service_account] entry in the configuration")?;

    service_account_key(credential)
}

#[instrument(skip_all, fields(client_email = %secret.client_email))]
pub async fn auth(
    secret: oauth2::ServiceAccountKey,
    client: HttpClient,
) -> Result<Authenticator<HttpsConnector>> {
    let authenticator = oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SheetStoreError::Authentication)
        .attach_printable("Could not create an authenticator from the service account")?;

    // First token request doubles as the handshake check.
    authenticator
        .token(&[SPREADSHEETS_SCOPE])
        .await
        .change_context(SheetStoreError::RemoteService)
        .attach_printable("Token handshake rejected")?;

    Ok(authenticator)
}
