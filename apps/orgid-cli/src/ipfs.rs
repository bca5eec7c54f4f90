// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! web3.storage uploads and document fetching by URI.
//!
//! Documents are referenced as `ipfs://<cid>`, `http(s)://...` or a local
//! path relative to the project directory.

use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Fetch timeout for gateway and HTTP documents.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum IpfsError {
    #[error("IPFS upload failed: {0}")]
    Upload(String),

    #[error("Failed to fetch {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    #[error("Invalid document at {uri}: {reason}")]
    InvalidDocument { uri: String, reason: String },
}

/// Where a document URI points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentUri {
    Ipfs(String),
    Http(String),
    File(PathBuf),
}

pub fn parse_uri(uri: &str) -> DocumentUri {
    if let Some(cid) = uri.strip_prefix("ipfs://") {
        DocumentUri::Ipfs(cid.trim_matches('/').to_string())
    } else if uri.starts_with("http://") || uri.starts_with("https://") {
        DocumentUri::Http(uri.to_string())
    } else {
        DocumentUri::File(PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri)))
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    cid: String,
}

/// Client for the pinning API and the IPFS gateway.
#[derive(Debug, Clone)]
pub struct IpfsClient {
    api_url: String,
    gateway_url: String,
    client: reqwest::Client,
}

impl IpfsClient {
    pub fn new(api_url: &str, gateway_url: &str) -> Result<Self, IpfsError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| IpfsError::Fetch {
                uri: gateway_url.to_string(),
                reason: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self::with_client(api_url, gateway_url, client))
    }

    fn with_client(api_url: &str, gateway_url: &str, client: reqwest::Client) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Gateway URL serving `cid`.
    pub fn gateway_link(&self, cid: &str) -> String {
        format!("{}/ipfs/{cid}", self.gateway_url)
    }

    /// Upload and pin a file, returning its CID.
    pub async fn upload(
        &self,
        api_key: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<String, IpfsError> {
        let url = format!("{}/upload", self.api_url);
        tracing::debug!(%url, file_name, size = content.len(), "Uploading to IPFS");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("X-Name", file_name)
            .body(content)
            .send()
            .await
            .map_err(|e| IpfsError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IpfsError::Upload(format!("{status}: {body}")));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| IpfsError::Upload(format!("Invalid upload response: {e}")))?;

        Ok(upload.cid)
    }

    /// Fetch a JSON document over IPFS or HTTP(S).
    ///
    /// Local paths are not read here; callers resolve them against the
    /// project directory.
    pub async fn fetch_json<T: DeserializeOwned>(&self, uri: &str) -> Result<T, IpfsError> {
        let url = match parse_uri(uri) {
            DocumentUri::Ipfs(cid) => self.gateway_link(&cid),
            DocumentUri::Http(url) => url,
            DocumentUri::File(path) => {
                return Err(IpfsError::Fetch {
                    uri: uri.to_string(),
                    reason: format!("{} is a local path", path.display()),
                })
            }
        };

        let fetch_error = |reason: String| IpfsError::Fetch {
            uri: uri.to_string(),
            reason,
        };

        let response = self
            .fetch_request(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(status.to_string()));
        }

        response.json().await.map_err(|e| IpfsError::InvalidDocument {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
    }

    /// Document GET bounded by [`FETCH_TIMEOUT`]. Uploads carry no deadline.
    fn fetch_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url).timeout(FETCH_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    use super::*;

    /// Serve one canned HTTP response on a local port; the handle yields the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (base, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn local_client(base: &str) -> IpfsClient {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        IpfsClient::with_client(base, base, client)
    }

    #[test]
    fn uri_kinds() {
        assert_eq!(parse_uri("ipfs://bafy123"), DocumentUri::Ipfs("bafy123".to_string()));
        assert_eq!(
            parse_uri("https://example.com/vc.json"),
            DocumentUri::Http("https://example.com/vc.json".to_string())
        );
        assert_eq!(
            parse_uri("orgJson.vc.json"),
            DocumentUri::File(PathBuf::from("orgJson.vc.json"))
        );
        assert_eq!(
            parse_uri("file:///tmp/vc.json"),
            DocumentUri::File(PathBuf::from("/tmp/vc.json"))
        );
    }

    #[test]
    fn gateway_link_trims_slash() {
        let client = IpfsClient::new("https://api.web3.storage/", "https://w3s.link/").unwrap();
        assert_eq!(client.gateway_link("bafy"), "https://w3s.link/ipfs/bafy");
    }

    #[tokio::test]
    async fn local_paths_are_not_fetched() {
        let client = IpfsClient::new("https://api.web3.storage", "https://w3s.link").unwrap();
        let result = client.fetch_json::<serde_json::Value>("./vc.json").await;
        assert!(matches!(result, Err(IpfsError::Fetch { .. })));
    }

    #[test]
    fn only_fetches_carry_a_timeout() {
        let client = IpfsClient::new("https://api.web3.storage", "https://w3s.link").unwrap();

        let fetch = client
            .fetch_request("https://w3s.link/ipfs/bafy")
            .build()
            .unwrap();
        assert_eq!(fetch.timeout(), Some(&FETCH_TIMEOUT));

        let upload = client.client.post("https://api.web3.storage/upload").build().unwrap();
        assert_eq!(upload.timeout(), None);
    }

    #[tokio::test]
    async fn missing_document_is_a_fetch_error() {
        let (base, server) = serve_once("404 Not Found", "").await;
        let client = local_client(&base);

        let result = client
            .fetch_json::<serde_json::Value>(&format!("{base}/vc.json"))
            .await;

        match result {
            Err(IpfsError::Fetch { uri, reason }) => {
                assert_eq!(uri, format!("{base}/vc.json"));
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(server.await.unwrap().starts_with("GET /vc.json "));
    }

    #[tokio::test]
    async fn malformed_gateway_document_is_invalid() {
        let (base, server) = serve_once("200 OK", "{\"id\": ").await;
        let client = local_client(&base);

        let result = client.fetch_json::<serde_json::Value>("ipfs://bafy123").await;

        assert!(matches!(
            result,
            Err(IpfsError::InvalidDocument { ref uri, .. }) if uri == "ipfs://bafy123"
        ));
        assert!(server.await.unwrap().starts_with("GET /ipfs/bafy123 "));
    }

    #[tokio::test]
    async fn gateway_document_is_decoded() {
        let (base, server) = serve_once("200 OK", "{\"id\":\"did:orgid:5:0x01\"}").await;
        let client = local_client(&base);

        let document: serde_json::Value = client.fetch_json("ipfs://bafy123/").await.unwrap();

        assert_eq!(document["id"], "did:orgid:5:0x01");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn upload_returns_the_cid() {
        let (base, server) = serve_once("200 OK", "{\"cid\":\"bafyupload\"}").await;
        let client = local_client(&base);

        let cid = client
            .upload("w3s-token", "orgJson.vc.json", b"{}".to_vec())
            .await
            .unwrap();
        assert_eq!(cid, "bafyupload");

        let request = server.await.unwrap();
        let lowered = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /upload "));
        assert!(lowered.contains("authorization: bearer w3s-token"));
        assert!(lowered.contains("x-name: orgjson.vc.json"));
        assert!(request.ends_with("\r\n\r\n{}"));
    }

    #[tokio::test]
    async fn rejected_upload_keeps_the_status() {
        let (base, server) = serve_once("401 Unauthorized", "{\"message\":\"bad token\"}").await;
        let client = local_client(&base);

        let result = client.upload("wrong", "vc.json", b"{}".to_vec()).await;

        match result {
            Err(IpfsError::Upload(reason)) => {
                assert!(reason.starts_with("401"));
                assert!(reason.contains("bad token"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        server.await.unwrap();
    }
}
