// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enclave IPC client.
//!
//! Every call follows the same pipeline: build a frame, write it to the
//! channel, read the response, strip the chunked framing and hand back the
//! body (deserialized for typed calls).

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use super::channel::EnclaveChannel;
use super::error::{EnclaveError, EnclaveResult};
use super::request::{
    encode_get_request, encode_json_request, encode_raw_json_request, RequestFrame,
};
use super::response::parse_chunked_response;

/// Client for the enclave's HTTP-over-IPC interface.
///
/// The channel sits behind a mutex held for each write/read pair, so a shared
/// client never interleaves two requests on one stream.
pub struct EnclaveIpcClient<C> {
    channel: Mutex<C>,
}

impl<C: EnclaveChannel> EnclaveIpcClient<C> {
    /// Create a client over the given channel.
    pub fn new(channel: C) -> Self {
        Self {
            channel: Mutex::new(channel),
        }
    }

    /// Give the channel back.
    pub fn into_channel(self) -> C {
        self.channel.into_inner()
    }

    /// Typed JSON round-trip: serialize `request`, POST it to `path` and
    /// deserialize the response body.
    pub async fn call<Req, Resp>(&self, request: &Req, path: &str) -> EnclaveResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_string(request).map_err(EnclaveError::encode)?;
        let body = self.send_json(&payload, path).await?;
        serde_json::from_str(&body).map_err(EnclaveError::decode)
    }

    /// Fire-and-forget POST. Returns `true` iff the enclave answered with an
    /// empty body, which is how it acknowledges success.
    pub async fn notify<Req>(&self, request: &Req, path: &str) -> EnclaveResult<bool>
    where
        Req: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(request).map_err(EnclaveError::encode)?;
        Ok(self.send_json(&payload, path).await?.is_empty())
    }

    /// POST an already serialized JSON payload and return the raw body.
    pub async fn send_json(&self, payload: &str, path: &str) -> EnclaveResult<String> {
        self.perform_io(encode_json_request(path, payload)?).await
    }

    /// POST a payload with `c11n-from`/`c11n-to` headers and return the raw
    /// body.
    pub async fn send_raw_json(
        &self,
        payload: &str,
        path: &str,
        from: &str,
        to: &[String],
    ) -> EnclaveResult<String> {
        self.perform_io(encode_raw_json_request(path, payload, from, to)?)
            .await
    }

    /// GET `path` and return the raw body.
    pub async fn get(&self, path: &str) -> EnclaveResult<String> {
        self.perform_io(encode_get_request(path)?).await
    }

    async fn perform_io(&self, frame: RequestFrame) -> EnclaveResult<String> {
        let data = frame.to_bytes();
        let mut channel = self.channel.lock().await;

        channel.write(&data).await?;
        tracing::debug!(
            method = %frame.method(),
            path = %frame.path(),
            frame = %String::from_utf8_lossy(&data),
            ">> enclave request"
        );

        let response = channel.read().await?;
        drop(channel);

        let body = parse_chunked_response(&response)?;
        tracing::debug!(path = %frame.path(), body = %body, "<< enclave response");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enclave::channel::testing::ScriptedChannel;
    use crate::enclave::error::SerdeDirection;
    use serde::Deserialize;

    #[derive(Debug, Serialize)]
    struct Ping<'a> {
        message: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<u32>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        echo: String,
    }

    #[tokio::test]
    async fn typed_call_round_trip() {
        let channel = ScriptedChannel::new();
        channel.respond(r#"{"echo":"hi"}"#);
        let client = EnclaveIpcClient::new(channel.clone());

        let pong: Pong = client
            .call(&Ping { message: "hi", tag: None }, "ping")
            .await
            .unwrap();
        assert_eq!(pong, Pong { echo: "hi".to_string() });

        let written = channel.written();
        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with("POST /ping HTTP/1.1\r\n"));
        // Absent optional fields are omitted from the payload.
        assert!(written[0].ends_with("\r\n\r\n{\"message\":\"hi\"}"));
    }

    #[tokio::test]
    async fn decode_failure_is_tagged() {
        let channel = ScriptedChannel::new();
        channel.respond("not json");
        let client = EnclaveIpcClient::new(channel);

        let err = client
            .call::<_, Pong>(&Ping { message: "hi", tag: Some(1) }, "ping")
            .await
            .unwrap_err();
        match err {
            EnclaveError::Serialization { direction, .. } => {
                assert_eq!(direction, SerdeDirection::Decode)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn encode_failure_is_tagged_and_sends_nothing() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1u8);

        let channel = ScriptedChannel::new();
        let client = EnclaveIpcClient::new(channel.clone());
        let err = client.call::<_, Pong>(&bad, "ping").await.unwrap_err();

        assert!(matches!(
            err,
            EnclaveError::Serialization { direction: SerdeDirection::Encode, .. }
        ));
        assert!(channel.written().is_empty());
    }

    #[tokio::test]
    async fn notify_reports_empty_body_as_success() {
        let channel = ScriptedChannel::new();
        channel.respond("").respond("error: unknown key");
        let client = EnclaveIpcClient::new(channel);

        let ping = Ping { message: "delete", tag: None };
        assert!(client.notify(&ping, "delete").await.unwrap());
        assert!(!client.notify(&ping, "delete").await.unwrap());
    }

    #[tokio::test]
    async fn get_returns_body() {
        let channel = ScriptedChannel::new();
        channel.respond("I'm up!");
        let client = EnclaveIpcClient::new(channel.clone());

        assert_eq!(client.get("upcheck").await.unwrap(), "I'm up!");
        assert_eq!(
            channel.written(),
            vec!["GET /upcheck HTTP/1.1\r\nHost: localhost\r\n\r\n".to_string()]
        );
    }

    #[tokio::test]
    async fn raw_json_carries_headers() {
        let channel = ScriptedChannel::new();
        channel.respond("0xabc");
        let client = EnclaveIpcClient::new(channel.clone());

        let to = vec!["r1".to_string(), "r2".to_string()];
        let body = client
            .send_raw_json("0xf86c", "sendraw", "sender", &to)
            .await
            .unwrap();
        assert_eq!(body, "0xabc");

        let frame = &channel.written()[0];
        assert!(frame.contains("c11n-from: sender\r\n"));
        assert!(frame.contains("c11n-to: r1,r2\r\n"));
        assert!(frame.ends_with("\r\n\r\n0xf86c"));
    }

    #[tokio::test]
    async fn header_injection_is_refused_before_writing() {
        let channel = ScriptedChannel::new();
        let client = EnclaveIpcClient::new(channel.clone());

        let to = vec!["r1\r\nX-Injected: yes".to_string()];
        let err = client
            .send_raw_json("0xf86c", "sendraw", "sender", &to)
            .await
            .unwrap_err();
        assert!(matches!(err, EnclaveError::InvalidRequest(_)));
        assert!(channel.written().is_empty());
        assert_eq!(channel.reads(), 0);
    }

    #[tokio::test]
    async fn failed_write_skips_read() {
        let channel = ScriptedChannel::failing_writes();
        let client = EnclaveIpcClient::new(channel.clone());

        let err = client.get("upcheck").await.unwrap_err();
        assert!(matches!(err, EnclaveError::Io(_)));
        assert_eq!(channel.reads(), 0);
    }

    #[tokio::test]
    async fn failed_read_is_io_error() {
        // Nothing scripted: the read fails.
        let client = EnclaveIpcClient::new(ScriptedChannel::new());
        assert!(matches!(
            client.get("upcheck").await,
            Err(EnclaveError::Io(_))
        ));
    }

    #[tokio::test]
    async fn malformed_response_propagates() {
        let channel = ScriptedChannel::new();
        channel.respond_raw(b"HTTP/1.1 200 OK\r\n\r\nZZ\r\n".to_vec());
        let client = EnclaveIpcClient::new(channel);

        assert!(matches!(
            client.send_json("{}", "send").await,
            Err(EnclaveError::MalformedResponse(_))
        ));
    }
}
