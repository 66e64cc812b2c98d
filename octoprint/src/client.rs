//! Request plumbing shared by every endpoint.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{route::Route, Error, Result};

const API_KEY_HEADER: &str = "X-Api-Key";

/// Client is a handle to a single OctoPrint instance.
///
/// It is immutable once built and cheap to clone; clones share the
/// underlying connection pool, so concurrent calls are fine.
#[derive(Clone, Debug)]
pub struct Client {
    url_base: Url,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Create a new Client for the OctoPrint instance at `url_base`, without
    /// an api key. This is enough for the authorization workflow.
    pub fn new(url_base: &str) -> Result<Self> {
        Self::with_http_client(url_base, reqwest::Client::new())
    }

    /// Create a new Client reusing an existing [reqwest::Client].
    pub fn with_http_client(url_base: &str, http: reqwest::Client) -> Result<Self> {
        let mut url_base = Url::parse(url_base)?;
        if !url_base.path().ends_with('/') {
            let path = format!("{}/", url_base.path());
            url_base.set_path(&path);
        }

        Ok(Self {
            url_base,
            api_key: None,
            http,
        })
    }

    /// Attach an api key, sent as `X-Api-Key` on every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Base url of the OctoPrint instance.
    pub fn url_base(&self) -> &Url {
        &self.url_base
    }

    /// The configured api key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub(crate) fn request(&self, method: Method, route: Route<'_>) -> Result<RequestBuilder> {
        let url = route.url(&self.url_base)?;
        let builder = self.http.request(method, url);

        Ok(match &self.api_key {
            Some(api_key) => builder.header(API_KEY_HEADER, api_key),
            None => builder,
        })
    }

    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let (http, request) = builder.build_split();
        let request = request?;
        let method = request.method().clone();

        let response = http.execute(request).await?;
        tracing::debug!(%method, url = %response.url(), status = %response.status(), "received response");
        Ok(response)
    }

    /// GET a route and decode a `200 OK` body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, route: Route<'_>) -> Result<T> {
        let response = self.send(self.request(Method::GET, route)?).await?;
        match response.status() {
            StatusCode::OK => decode(response).await,
            StatusCode::FORBIDDEN => Err(Error::InvalidCredentials),
            status => Err(unexpected_status(route, status)),
        }
    }
}

/// Decode a json response body. Any decode failure is an
/// [Error::InvalidResponse].
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;

    serde_json::from_slice(&body).map_err(|err| {
        let body = String::from_utf8_lossy(&body).into_owned();
        tracing::warn!(
            "error decoding response: {}",
            format_serde_error::SerdeError::new(body, err)
        );
        Error::InvalidResponse
    })
}

pub(crate) fn unexpected_status(route: Route<'_>, status: StatusCode) -> Error {
    tracing::warn!(path = %route.path(), %status, "unexpected status");
    Error::InvalidResponse
}
