// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Byte-stream channels to the enclave.
//!
//! The IPC client only needs a way to write a request frame and read back the
//! matching response. Transports implement [`EnclaveChannel`]; the Unix domain
//! socket used by Tessera-style enclaves is provided here.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use super::response::ResponseProgress;

/// Read buffer size for socket channels.
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// A request/response byte channel.
///
/// Each `write` is followed by exactly one `read` returning the response to
/// that write. Callers sharing a channel must not interleave requests.
pub trait EnclaveChannel: Send {
    /// Write a full request frame.
    fn write(&mut self, frame: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Read the full response to the last frame written.
    fn read(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

/// Channel over a Unix domain socket (e.g. `tm.ipc`).
///
/// The connection is opened lazily and kept for subsequent requests. After an
/// I/O failure it is dropped and the next write reconnects.
#[derive(Debug)]
pub struct UnixSocketChannel {
    path: PathBuf,
    stream: Option<UnixStream>,
}

impl UnixSocketChannel {
    /// Create a channel for the socket at `path` without connecting yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stream: None,
        }
    }

    /// Create a channel and connect immediately.
    pub async fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut channel = Self::new(path);
        channel.stream = Some(UnixStream::connect(&channel.path).await?);
        Ok(channel)
    }

    /// Socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn stream(&mut self) -> io::Result<&mut UnixStream> {
        if self.stream.is_none() {
            tracing::debug!(path = %self.path.display(), "Connecting to enclave socket");
            self.stream = Some(UnixStream::connect(&self.path).await?);
        }
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "socket not connected"))
    }
}

impl EnclaveChannel for UnixSocketChannel {
    async fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        let stream = self.stream().await?;
        let result = match stream.write_all(frame).await {
            Ok(()) => stream.flush().await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.stream = None;
        }
        result
    }

    async fn read(&mut self) -> io::Result<Vec<u8>> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "read before any request was written",
            ));
        };

        let mut response = Vec::new();
        let mut progress = ResponseProgress::new();
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = match stream.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    self.stream = None;
                    return Err(e);
                }
            };
            if n == 0 {
                // Peer closed; hand over what arrived and reconnect next time.
                self.stream = None;
                if response.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "enclave closed the connection without responding",
                    ));
                }
                return Ok(response);
            }
            response.extend_from_slice(&buf[..n]);
            if progress.is_complete(&response) {
                return Ok(response);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory channel for client tests.

    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::EnclaveChannel;

    /// Builds a chunked HTTP response carrying `body` in a single chunk.
    pub(crate) fn chunked_ok(body: &str) -> Vec<u8> {
        let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
        if !body.is_empty() {
            raw.extend_from_slice(format!("{:x}\r\n{body}\r\n", body.len()).as_bytes());
        }
        raw.extend_from_slice(b"0\r\n\r\n");
        raw
    }

    #[derive(Default)]
    struct Script {
        responses: VecDeque<Vec<u8>>,
        written: Vec<Vec<u8>>,
        reads: usize,
    }

    /// Channel that records every frame and replays queued responses.
    ///
    /// Clones share the same script so tests can inspect traffic after
    /// handing the channel to a client.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedChannel {
        script: Arc<Mutex<Script>>,
        fail_writes: bool,
    }

    impl ScriptedChannel {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn failing_writes() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub(crate) fn respond(&self, body: &str) -> &Self {
            self.respond_raw(chunked_ok(body))
        }

        pub(crate) fn respond_raw(&self, raw: Vec<u8>) -> &Self {
            self.script.lock().unwrap().responses.push_back(raw);
            self
        }

        pub(crate) fn written(&self) -> Vec<String> {
            self.script
                .lock()
                .unwrap()
                .written
                .iter()
                .map(|frame| String::from_utf8_lossy(frame).into_owned())
                .collect()
        }

        pub(crate) fn reads(&self) -> usize {
            self.script.lock().unwrap().reads
        }
    }

    impl EnclaveChannel for ScriptedChannel {
        async fn write(&mut self, frame: &[u8]) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write refused"));
            }
            self.script.lock().unwrap().written.push(frame.to_vec());
            Ok(())
        }

        async fn read(&mut self) -> io::Result<Vec<u8>> {
            let mut script = self.script.lock().unwrap();
            script.reads += 1;
            script
                .responses
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted response"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::chunked_ok;
    use super::*;
    use tempfile::TempDir;
    use tokio::net::UnixListener;

    #[tokio::test]
    async fn socket_round_trip_in_pieces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tm.ipc");
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();

            // Dribble the response out to exercise the completeness check.
            let response = chunked_ok("I'm up!");
            let (head, tail) = response.split_at(response.len() / 2);
            socket.write_all(head).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            socket.write_all(tail).await.unwrap();
            request
        });

        let mut channel = UnixSocketChannel::connect(&path).await.unwrap();
        channel.write(b"GET /upcheck HTTP/1.1\r\n\r\n").await.unwrap();
        let response = channel.read().await.unwrap();

        assert_eq!(response, chunked_ok("I'm up!"));
        assert_eq!(server.await.unwrap(), "GET /upcheck HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn connect_to_missing_socket_fails() {
        let dir = TempDir::new().unwrap();
        let mut channel = UnixSocketChannel::new(dir.path().join("absent.ipc"));
        let err = channel.write(b"GET / HTTP/1.1\r\n\r\n").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn read_without_write_is_an_error() {
        let mut channel = UnixSocketChannel::new("/nonexistent/tm.ipc");
        let err = channel.read().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }
}
