// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP/1.1 request frames for the enclave IPC socket.
//!
//! The enclave speaks plain HTTP over a Unix socket, so requests are rendered
//! by hand into the exact bytes written to the channel:
//!
//! ```text
//! POST /storeraw HTTP/1.1\r\n
//! Host: localhost\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 12\r\n
//! c11n-from: <sender key>\r\n
//! c11n-to: <key1>,<key2>\r\n
//! \r\n
//! <payload>
//! ```

use std::fmt;

use super::error::{EnclaveError, EnclaveResult};

/// Host header value sent on every request. The socket has no real host.
pub const IPC_HOST: &str = "localhost";

/// Header carrying the sender's enclave public key on raw requests.
pub const HEADER_FROM: &str = "c11n-from";

/// Header carrying the comma-joined recipient keys on raw requests.
pub const HEADER_TO: &str = "c11n-to";

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A single request, built per call and rendered once.
///
/// Headers keep insertion order; the enclave never sees them reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestFrame {
    fn new(method: Method, path: &str) -> EnclaveResult<Self> {
        if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(EnclaveError::InvalidRequest(format!(
                "path {path:?} contains whitespace or control characters"
            )));
        }
        Ok(Self {
            method,
            path: normalize_path(path),
            headers: vec![("Host".to_string(), IPC_HOST.to_string())],
            body: None,
        })
    }

    fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Append a header whose value comes from the caller.
    ///
    /// CR or LF in the value would end the header line early, letting the
    /// value inject headers or split the request.
    fn checked_header(self, name: &str, value: impl Into<String>) -> EnclaveResult<Self> {
        let value = value.into();
        if value.contains(['\r', '\n']) {
            return Err(EnclaveError::InvalidRequest(format!(
                "{name} header value contains a line break"
            )));
        }
        Ok(self.header(name, value))
    }

    fn json_body(self, body: &str) -> Self {
        let mut frame = self
            .header("Content-Type", "application/json")
            .header("Content-Length", body.len().to_string());
        frame.body = Some(body.to_string());
        frame
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Render the frame into wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for RequestFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/1.1\r\n", self.method, self.path)?;
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        write!(f, "\r\n")?;
        if let Some(body) = &self.body {
            write!(f, "{body}")?;
        }
        Ok(())
    }
}

fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Build a GET frame with no body.
pub fn encode_get_request(path: &str) -> EnclaveResult<RequestFrame> {
    RequestFrame::new(Method::Get, path)
}

/// Build a JSON POST frame.
///
/// `Content-Length` is the UTF-8 byte length of `payload`.
pub fn encode_json_request(path: &str, payload: &str) -> EnclaveResult<RequestFrame> {
    Ok(RequestFrame::new(Method::Post, path)?.json_body(payload))
}

/// Build a raw POST frame carrying sender and recipient headers.
///
/// Used by the `storeraw`/`sendraw` endpoints, which take the payload as-is
/// instead of a wrapped JSON envelope.
///
/// # Arguments
/// * `path` - Endpoint path, with or without a leading `/`
/// * `payload` - Body sent verbatim
/// * `from` - Sender's enclave public key
/// * `to` - Recipient public keys, comma-joined into one header
///
/// # Returns
/// * `Ok(RequestFrame)` - The frame ready to render
/// * `Err(EnclaveError::InvalidRequest)` - If a key contains CR or LF
pub fn encode_raw_json_request(
    path: &str,
    payload: &str,
    from: &str,
    to: &[String],
) -> EnclaveResult<RequestFrame> {
    RequestFrame::new(Method::Post, path)?
        .json_body(payload)
        .checked_header(HEADER_FROM, from)?
        .checked_header(HEADER_TO, to.join(","))
}
