use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use crate::services::store::{CellAddress, StoreError, TabularStore};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
/// Tokens are refreshed this many seconds before Google says they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The subset of a service-account key file we need.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.into()
}

/// Claims of the self-signed assertion exchanged for an access token.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Google Sheets v4 client for one spreadsheet.
///
/// Holds a single reusable HTTP client and lazily acquires a service-account
/// access token on first use. The token lock is only held while a token is
/// looked up or refreshed.
pub struct SheetsClient {
    client: Client,
    spreadsheet_id: String,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl SheetsClient {
    pub fn new(service_account_json: &str, spreadsheet_id: &str) -> anyhow::Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(service_account_json)
            .map_err(|e| anyhow::anyhow!("Invalid service account key: {}", e))?;
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid service account private key: {}", e))?;

        Ok(Self {
            client: Client::new(),
            spreadsheet_id: spreadsheet_id.to_string(),
            key,
            signing_key,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch_token(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self, now: i64) -> Result<CachedToken, StoreError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| StoreError::Unavailable(format!("signing token request: {e}")))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!(
                "token endpoint returned {status}: {text}"
            )));
        }

        let body: TokenResponse = response.json().await.map_err(unavailable)?;
        debug!("Sheets: acquired access token valid for {}s", body.expires_in);
        Ok(CachedToken {
            value: body.access_token,
            expires_at: now + body.expires_in,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(SHEETS_API).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("invalid Sheets API base URL".into()))?
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, StoreError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!(
                "Sheets API returned {status}: {text}"
            )));
        }

        response.json().await.map_err(unavailable)
    }

    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let meta: SpreadsheetMeta = self
            .get_json(self.url(&[])?, &[("fields", "sheets.properties.title")])
            .await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }
}

impl TabularStore for SheetsClient {
    async fn get_table(&self, name: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let titles = self.sheet_titles().await?;
        if !titles.iter().any(|title| title == name) {
            debug!("Sheets: '{}' not among {:?}", name, titles);
            return Err(StoreError::TableNotFound(name.to_string()));
        }

        let range = quote_sheet(name);
        let values: ValueRange = self.get_json(self.url(&["values", range.as_str()])?, &[]).await?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn read_cell(&self, table: &str, addr: CellAddress) -> Result<String, StoreError> {
        let range = a1_range(table, addr);
        let values: ValueRange = self.get_json(self.url(&["values", range.as_str()])?, &[]).await?;
        Ok(values
            .values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .map(cell_text)
            .unwrap_or_default())
    }

    async fn write_cell(
        &self,
        table: &str,
        addr: CellAddress,
        value: &str,
    ) -> Result<(), StoreError> {
        let range = a1_range(table, addr);
        let url = self.url(&["values", range.as_str()])?;
        let token = self.access_token().await?;

        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [[value]],
            }))
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!(
                "Sheets API returned {status} writing {range}: {text}"
            )));
        }
        Ok(())
    }
}

fn unavailable(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Sheet titles like `2` would otherwise parse as a row reference.
fn quote_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn a1_range(table: &str, addr: CellAddress) -> String {
    format!("{}!{}", quote_sheet(table), addr)
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
