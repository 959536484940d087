#![forbid(unsafe_code)]

//! Decoding of fetch responses into [`PageResult`]s.
//!
//! The endpoint answers with `{"messages": [...], "pageToken": "..."}`; the
//! token is absent on the last page. Every decoding failure is reported as a
//! [`TransportError`] so the scroller treats it like a failed fetch and
//! leaves its state untouched.

use infiniscroll_widgets::{PageResult, PageSource, TransportError};
use serde::de::DeserializeOwned;

/// Decode a response body.
pub fn decode_page<R: DeserializeOwned>(body: &str) -> Result<PageResult<R>, TransportError> {
    serde_json::from_str(body).map_err(|e| TransportError::new(format!("invalid page body: {e}")))
}

/// Decode a response, rejecting non-success HTTP statuses first.
pub fn decode_response<R: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<PageResult<R>, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::new(format!("HTTP {status}")));
    }
    decode_page(body)
}

/// [`PageSource`] over a raw transport returning `(status, body)`.
///
/// Lets any blocking HTTP client drive the scroller without this crate
/// depending on one.
pub struct JsonPageSource<F> {
    transport: F,
}

impl<F> JsonPageSource<F>
where
    F: FnMut(&str) -> Result<(u16, String), TransportError>,
{
    pub fn new(transport: F) -> Self {
        Self { transport }
    }
}

impl<R, F> PageSource<R> for JsonPageSource<F>
where
    R: DeserializeOwned,
    F: FnMut(&str) -> Result<(u16, String), TransportError>,
{
    fn fetch(&mut self, url: &str) -> Result<PageResult<R>, TransportError> {
        let (status, body) = (self.transport)(url)?;
        let page = decode_response(status, &body);
        if let Err(e) = &page {
            tracing::warn!(url, status, error = %e, "undecodable page response");
        }
        page
    }
}
