//! ArcGIS Online item source.
//!
//! An item is captured as its description (`/content/items/{id}`) and its
//! data (`/content/items/{id}/data`), combined into one JSON document.

use crate::{FetchedItem, ItemSource, SourceError, SourceResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// Portal used when none is configured.
pub const DEFAULT_PORTAL_URL: &str = "https://www.arcgis.com";

/// User agent for requests
const USER_AGENT: &str = concat!("itemvault/", env!("CARGO_PKG_VERSION"));

/// Description fields that change without the item itself changing.
const VOLATILE_FIELDS: &[&str] = &["numViews"];

/// Account used to read items.
#[derive(Debug, Clone)]
pub struct ArcGisCredentials {
    pub username: String,
    pub token: String,
}

impl ArcGisCredentials {
    /// Create credentials, rejecting empty values.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> SourceResult<Self> {
        let username = username.into();
        let token = token.into();
        if username.is_empty() {
            return Err(SourceError::missing_credentials("username"));
        }
        if token.is_empty() {
            return Err(SourceError::missing_credentials("token"));
        }
        Ok(Self { username, token })
    }
}

/// Fetches items from an ArcGIS portal's sharing REST API.
#[derive(Debug)]
pub struct ArcGisSource {
    client: reqwest::Client,
    portal: Url,
    credentials: ArcGisCredentials,
}

impl ArcGisSource {
    /// Create a source for the given portal URL.
    pub fn new(portal_url: &str, credentials: ArcGisCredentials) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let portal = Url::parse(portal_url)?;
        if portal.cannot_be_a_base() {
            return Err(SourceError::unsupported_portal(portal_url));
        }

        Ok(Self {
            client,
            portal,
            credentials,
        })
    }

    /// Create a source for ArcGIS Online.
    pub fn online(credentials: ArcGisCredentials) -> SourceResult<Self> {
        Self::new(DEFAULT_PORTAL_URL, credentials)
    }

    /// URL of an item resource, e.g. `["data"]` for the item data.
    fn item_url(&self, item_id: &str, suffix: &[&str]) -> SourceResult<Url> {
        let mut url = self.portal.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SourceError::unsupported_portal(self.portal.as_str()))?;
            segments
                .pop_if_empty()
                .extend(["sharing", "rest", "content", "items", item_id])
                .extend(suffix);
        }
        Ok(url)
    }

    /// GET a JSON document, failing on HTTP errors and on `{"error": ...}` bodies.
    async fn get_json(&self, url: Url) -> SourceResult<Value> {
        debug!(url = %url, user = %self.credentials.username, "Fetching");

        let response = self
            .client
            .get(url.clone())
            .query(&[("f", "json"), ("token", self.credentials.token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let value: Value = serde_json::from_str(&text)?;
        check_api_error(&value)?;
        Ok(value)
    }
}

/// Turn an ArcGIS error body into an error.
fn check_api_error(value: &Value) -> SourceResult<()> {
    match value.get("error") {
        Some(error) => Err(SourceError::Api {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }),
        None => Ok(()),
    }
}

/// Reset fields that change on every read so identical items hash identically.
///
/// Volatile fields are always present in the result, set to zero.
fn normalize_description(description: &mut Value) -> SourceResult<()> {
    let object = description
        .as_object_mut()
        .ok_or_else(|| SourceError::invalid_response("item description is not a JSON object"))?;
    for field in VOLATILE_FIELDS {
        object.insert((*field).to_string(), json!(0));
    }
    Ok(())
}

#[async_trait]
impl ItemSource for ArcGisSource {
    fn name(&self) -> &str {
        "arcgis"
    }

    async fn fetch(&self, item_id: &str) -> SourceResult<FetchedItem> {
        let mut description = self.get_json(self.item_url(item_id, &[])?).await?;
        normalize_description(&mut description)?;
        let data = self.get_json(self.item_url(item_id, &["data"])?).await?;

        let combined = json!({
            "description": description,
            "data": data,
        });
        let payload = serde_json::to_vec(&combined)?;

        Ok(FetchedItem::new(item_id, payload, description))
    }
}
