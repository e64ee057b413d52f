//! Conversion of host-supplied values into WebSocket endpoints.
//!
//! Every dial starts here: whatever the caller hands in (a string, a parsed
//! [`Url`], or a JavaScript value when the `wasm-bindgen` feature is on) is
//! turned into an [`Endpoint`] before any network activity happens.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// A validated `ws://` or `wss://` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parse and validate a WebSocket URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the text does not parse, the scheme is
    /// not `ws`/`wss`, or no host is present.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim()).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))?;
        Self::from_url(url)
    }

    fn from_url(url: Url) -> Result<Self> {
        // `Url` lowercases the scheme while parsing.
        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(Error::InvalidUrl(format!(
                    "unsupported scheme `{other}`, expected ws or wss"
                )));
            }
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::InvalidUrl(format!("{url}: missing host")));
        }
        Ok(Self { url })
    }

    /// The URL scheme, `ws` or `wss`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The host part of the URL.
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Whether the endpoint uses TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "wss"
    }

    /// Borrow the parsed URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// The URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Consume the endpoint, returning the URL.
    #[must_use]
    pub fn into_url(self) -> Url {
        self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Values that can name a WebSocket endpoint.
pub trait IntoWsUrl {
    /// Convert into a validated endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] when the value cannot be read as a
    /// `ws://` or `wss://` URL.
    fn into_ws_url(self) -> Result<Endpoint>;
}

impl IntoWsUrl for Endpoint {
    fn into_ws_url(self) -> Result<Endpoint> {
        Ok(self)
    }
}

impl IntoWsUrl for &str {
    fn into_ws_url(self) -> Result<Endpoint> {
        Endpoint::parse(self)
    }
}

impl IntoWsUrl for String {
    fn into_ws_url(self) -> Result<Endpoint> {
        Endpoint::parse(&self)
    }
}

impl IntoWsUrl for &String {
    fn into_ws_url(self) -> Result<Endpoint> {
        Endpoint::parse(self)
    }
}

impl IntoWsUrl for Url {
    fn into_ws_url(self) -> Result<Endpoint> {
        Endpoint::from_url(self)
    }
}

impl IntoWsUrl for &Url {
    fn into_ws_url(self) -> Result<Endpoint> {
        Endpoint::from_url(self.clone())
    }
}

#[cfg(feature = "wasm-bindgen")]
impl IntoWsUrl for wasm_bindgen::JsValue {
    fn into_ws_url(self) -> Result<Endpoint> {
        self.as_string()
            .ok_or_else(|| Error::InvalidUrl("value is not a string".into()))?
            .into_ws_url()
    }
}

#[cfg(feature = "wasm-bindgen")]
impl IntoWsUrl for &wasm_bindgen::JsValue {
    fn into_ws_url(self) -> Result<Endpoint> {
        self.as_string()
            .ok_or_else(|| Error::InvalidUrl("value is not a string".into()))?
            .into_ws_url()
    }
}
