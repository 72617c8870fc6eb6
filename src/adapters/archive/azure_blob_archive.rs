//! Azure Blob Storage Archive - Implementation of TranscriptArchive over the
//! Blob service REST API.
//!
//! Uploads each transcript with `Put Blob` as a block blob named after the
//! session id. `Put Blob` replaces any existing blob, so re-uploading a
//! session overwrites it.
//!
//! # Authentication
//!
//! Accepts a standard storage connection string, either with an account key
//! (requests are signed with Shared Key, HMAC-SHA256) or with a
//! `SharedAccessSignature` (appended to the request URL).
//!
//! ```text
//! DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=<base64>;EndpointSuffix=core.windows.net
//! BlobEndpoint=https://acct.blob.core.windows.net;SharedAccessSignature=sv=2022-11-02&sig=...
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::interview::ChatMessage;
use crate::ports::{to_ndjson, ArchiveError, TranscriptArchive};

/// Blob service REST API version sent with every request.
pub const BLOB_API_VERSION: &str = "2021-08-06";

const CONTENT_TYPE_NDJSON: &str = "application/x-ndjson";

/// How requests are authorized.
#[derive(Debug, Clone)]
pub enum BlobCredentials {
    /// Base64 account key.
    SharedKey { key: Secret<String> },
    /// SAS token without the leading `?`.
    Sas { token: Secret<String> },
}

/// Parsed storage connection string.
#[derive(Debug, Clone)]
pub struct BlobConnection {
    pub account: String,
    pub endpoint: Url,
    pub credentials: BlobCredentials,
}

impl BlobConnection {
    /// Parses a storage connection string.
    pub fn parse(connection_string: &str) -> Result<Self, ArchiveError> {
        let mut parts: BTreeMap<String, String> = BTreeMap::new();
        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                ArchiveError::Configuration(format!("malformed connection string segment '{}'", key_of(part)))
            })?;
            parts.insert(key.to_ascii_lowercase(), value.to_string());
        }

        let account = parts.get("accountname").cloned();
        let endpoint = match parts.get("blobendpoint") {
            Some(endpoint) => endpoint.clone(),
            None => {
                let account = account.as_deref().ok_or_else(|| {
                    ArchiveError::Configuration("connection string has no AccountName".to_string())
                })?;
                let protocol = parts
                    .get("defaultendpointsprotocol")
                    .map(String::as_str)
                    .unwrap_or("https");
                let suffix = parts
                    .get("endpointsuffix")
                    .map(String::as_str)
                    .unwrap_or("core.windows.net");
                format!("{}://{}.blob.{}", protocol, account, suffix)
            }
        };
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| ArchiveError::Configuration(format!("invalid blob endpoint: {}", e)))?;

        let credentials = if let Some(key) = parts.get("accountkey") {
            decode_key(key)?;
            BlobCredentials::SharedKey {
                key: Secret::new(key.clone()),
            }
        } else if let Some(sas) = parts.get("sharedaccesssignature") {
            BlobCredentials::Sas {
                token: Secret::new(sas.trim_start_matches('?').to_string()),
            }
        } else {
            return Err(ArchiveError::Configuration(
                "connection string needs AccountKey or SharedAccessSignature".to_string(),
            ));
        };

        let account = match (account, &credentials) {
            (Some(account), _) => account,
            (None, BlobCredentials::Sas { .. }) => endpoint
                .host_str()
                .and_then(|h| h.split('.').next())
                .unwrap_or_default()
                .to_string(),
            (None, BlobCredentials::SharedKey { .. }) => {
                return Err(ArchiveError::Configuration(
                    "Shared Key auth needs AccountName".to_string(),
                ))
            }
        };

        Ok(Self {
            account,
            endpoint,
            credentials,
        })
    }
}

fn decode_key(key: &str) -> Result<Vec<u8>, ArchiveError> {
    BASE64_STANDARD
        .decode(key)
        .map_err(|e| ArchiveError::Configuration(format!("AccountKey is not base64: {}", e)))
}

/// Only the key part of a segment, so account keys never reach logs.
fn key_of(part: &str) -> &str {
    part.split_once('=').map(|(k, _)| k).unwrap_or(part)
}

/// Archive backed by one Azure Blob Storage container.
pub struct AzureBlobArchive {
    connection: BlobConnection,
    container: String,
    client: Client,
}

impl AzureBlobArchive {
    pub fn new(
        connection: BlobConnection,
        container: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ArchiveError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArchiveError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            connection,
            container: container.into(),
            client,
        })
    }

    /// Parses `connection_string` and builds the archive.
    pub fn from_connection_string(
        connection_string: &str,
        container: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ArchiveError> {
        Self::new(BlobConnection::parse(connection_string)?, container, timeout)
    }

    /// URL of the blob for `session`, without any SAS query.
    fn blob_url(&self, session: &SessionId) -> Result<Url, ArchiveError> {
        let mut url = self.connection.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ArchiveError::Configuration("blob endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push(&self.container)
            .push(session.as_str());
        Ok(url)
    }

    /// Builds the signed `Put Blob` request.
    fn build_request(
        &self,
        session: &SessionId,
        body: String,
        now: Timestamp,
    ) -> Result<reqwest::Request, ArchiveError> {
        let mut url = self.blob_url(session)?;

        let mut ms_headers = BTreeMap::new();
        ms_headers.insert("x-ms-blob-type", "BlockBlob".to_string());
        ms_headers.insert("x-ms-date", now.to_http_date());
        ms_headers.insert("x-ms-version", BLOB_API_VERSION.to_string());

        let mut headers = HeaderMap::new();
        for (name, value) in &ms_headers {
            headers.insert(*name, header_value(value)?);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_NDJSON));

        match &self.connection.credentials {
            BlobCredentials::SharedKey { key } => {
                let to_sign = string_to_sign(
                    "PUT",
                    body.len(),
                    CONTENT_TYPE_NDJSON,
                    &ms_headers,
                    &canonical_resource(&self.connection.account, &url),
                );
                let signature = sign(&decode_key(key.expose_secret())?, &to_sign)?;
                headers.insert(
                    AUTHORIZATION,
                    header_value(&format!("SharedKey {}:{}", self.connection.account, signature))?,
                );
            }
            BlobCredentials::Sas { token } => {
                url.set_query(Some(token.expose_secret()));
            }
        }

        self.client
            .put(url)
            .headers(headers)
            .body(body)
            .build()
            .map_err(|e| ArchiveError::Configuration(format!("failed to build request: {}", e)))
    }
}

#[async_trait]
impl TranscriptArchive for AzureBlobArchive {
    async fn upload(
        &self,
        session: &SessionId,
        messages: &[ChatMessage],
    ) -> Result<(), ArchiveError> {
        let body = to_ndjson(messages)?;
        let request = self.build_request(session, body, Timestamp::now())?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ArchiveError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ArchiveError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(
            session = %session,
            container = %self.container,
            records = messages.len(),
            "Uploaded transcript to blob storage"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "azure-blob"
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ArchiveError> {
    HeaderValue::from_str(value)
        .map_err(|e| ArchiveError::Configuration(format!("invalid header value: {}", e)))
}

/// `/{account}{url path}`, as required by Shared Key signing.
fn canonical_resource(account: &str, url: &Url) -> String {
    format!("/{}{}", account, url.path())
}

/// Shared Key string-to-sign for the Blob service.
///
/// Standard headers we do not send are empty lines. Content-Length is empty
/// when zero.
fn string_to_sign(
    verb: &str,
    content_length: usize,
    content_type: &str,
    ms_headers: &BTreeMap<&str, String>,
    canonical_resource: &str,
) -> String {
    let length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };
    let canonical_headers: String = ms_headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();

    format!(
        "{verb}\n\n\n{length}\n\n{content_type}\n\n\n\n\n\n\n{canonical_headers}{canonical_resource}"
    )
}

fn sign(key: &[u8], string_to_sign: &str) -> Result<String, ArchiveError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| ArchiveError::Configuration(format!("invalid account key: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}
