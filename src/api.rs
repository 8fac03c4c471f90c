// API client module: a small blocking client for the Predicta Search
// service. It builds the request, attaches the API key, checks the status
// and decodes the JSON body. Nothing else: no retries, no caching.
//
// The actual HTTP call sits behind the `Transport` trait so the client can
// be driven by a substitute transport in tests.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Config, API_KEY_VAR};
use crate::error::{Error, Result};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// One platform's worth of data about an identifier, kept as received. The
/// schema is owned by the service; normally a mapping whose `platform` (or
/// `source`) names the network it came from, but any JSON value is accepted.
pub type SearchRecord = Value;

/// Supported networks keyed by name, in the order the service sent them.
pub type NetworkCatalog = Map<String, Value>;

/// Kind of identifier being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Email,
    Phone,
}

/// Search payload POSTed to `/search`. `networks` is left out entirely when
/// no filter applies so the service default is used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub input: String,
    pub query_type: QueryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<String>>,
}

impl SearchQuery {
    /// Build a query for `input`, copying the optional network filter.
    pub fn new(input: impl Into<String>, query_type: QueryType, networks: Option<&[String]>) -> Self {
        Self {
            input: input.into(),
            query_type,
            networks: networks.map(|n| n.to_vec()),
        }
    }
}

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully built outbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub api_key: String,
    pub body: Option<Value>,
}

/// Raw response as seen by the client: status code and undecoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response. Implementations report
/// connection, TLS and timeout failures as `Error::Transport`; status
/// handling and decoding are left to the client.
pub trait Transport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).execute(request)
    }
}

/// Blocking `reqwest` transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the underlying blocking client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client })
    }

    fn headers(request: &ApiRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key_header(&request.api_key)?);
        Ok(headers)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        let mut builder = builder.headers(Self::headers(request)?);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let res = builder.send()?;
        let status = res.status().as_u16();
        let body = res.text()?;
        Ok(ApiResponse { status, body })
    }
}

fn api_key_header(api_key: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(api_key).map_err(|_| {
        Error::Configuration(format!("{} contains characters not allowed in an HTTP header", API_KEY_VAR))
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Fails with a configuration error unless the config carries a usable key.
fn require_api_key(config: &Config) -> Result<String> {
    let key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::Configuration(format!("{} is not set", API_KEY_VAR)))?;
    api_key_header(key)?;
    Ok(key.to_string())
}

/// Client for the Predicta Search API. Holds the base URL, the API key and
/// the transport; all three are fixed at construction.
#[derive(Clone)]
pub struct PredictaClient<T = HttpTransport> {
    transport: T,
    base_url: String,
    api_key: String,
}

impl PredictaClient<HttpTransport> {
    /// Create a client that talks HTTP. The credential is checked before the
    /// HTTP client is built.
    pub fn from_config(config: &Config) -> Result<Self> {
        require_api_key(config)?;
        let transport = HttpTransport::new(config.timeout)?;
        Self::new(config, transport)
    }
}

impl<T: Transport> PredictaClient<T> {
    /// Create a client over an arbitrary transport. Fails immediately with
    /// `Error::Configuration` when the API key is missing or empty.
    pub fn new(config: &Config, transport: T) -> Result<Self> {
        let api_key = require_api_key(config)?;
        Ok(PredictaClient {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Base URL every endpoint path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search the digital footprint of an email address. The address is
    /// forwarded as-is; only an empty string is rejected locally.
    pub fn search_by_email(&self, email: &str, networks: Option<&[String]>) -> Result<Vec<SearchRecord>> {
        self.search(&SearchQuery::new(email, QueryType::Email, networks))
    }

    /// Search the digital footprint of a phone number. Prefixes and
    /// punctuation are passed through verbatim.
    pub fn search_by_phone(&self, phone: &str, networks: Option<&[String]>) -> Result<Vec<SearchRecord>> {
        self.search(&SearchQuery::new(phone, QueryType::Phone, networks))
    }

    /// Run a prepared search query.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchRecord>> {
        if query.input.is_empty() {
            return Err(Error::InvalidQuery("identifier must not be empty".into()));
        }
        let body = serde_json::to_value(query)?;
        debug!(query_type = ?query.query_type, networks = ?query.networks, "searching");
        self.send(Method::Post, "search", Some(body))
    }

    /// Fetch the catalog of networks the service can query.
    pub fn get_supported_networks(&self) -> Result<NetworkCatalog> {
        self.send(Method::Get, "networks", None)
    }

    fn send<R: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<R> {
        let request = ApiRequest {
            method,
            url: format!("{}/{}", self.base_url, path),
            api_key: self.api_key.clone(),
            body,
        };
        debug!(method = ?request.method, url = %request.url, "sending request");

        let res = self.transport.execute(&request)?;
        debug!(status = res.status, bytes = res.body.len(), "received response");
        if !res.is_success() {
            warn!(status = res.status, url = %request.url, "request failed");
            return Err(Error::Status {
                status: res.status,
                url: request.url,
            });
        }

        Ok(serde_json::from_str(&res.body)?)
    }
}

/// Parse a comma-separated list of network names. Entries are trimmed and
/// blank ones dropped; a list with nothing left means no filter at all.
pub fn parse_network_filters(value: Option<&str>) -> Option<Vec<String>> {
    let networks: Vec<String> = value?
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect();
    if networks.is_empty() {
        None
    } else {
        Some(networks)
    }
}
