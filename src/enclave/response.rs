// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chunked HTTP response parsing.
//!
//! The enclave answers every request with `Transfer-Encoding: chunked`
//! (RFC 7230 §4.1). Status and headers carry nothing the client needs, so they
//! are skipped and only the reassembled body is returned.

use super::error::{EnclaveError, EnclaveResult};

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

/// Outcome of walking the chunk sequence of a body.
enum Chunks {
    /// Zero-length chunk seen. Holds the body.
    Complete(Vec<u8>),
    /// Input ran out before the zero-length chunk.
    Truncated,
}

/// Parse a raw chunked response into its body.
///
/// Fails with [`EnclaveError::MalformedResponse`] when the header block never
/// ends, a chunk size is not hexadecimal, chunk data is not followed by CRLF,
/// the stream ends before the zero-length chunk, or the body is not UTF-8.
pub fn parse_chunked_response(raw: &[u8]) -> EnclaveResult<String> {
    let body_start = body_offset(raw)
        .ok_or_else(|| EnclaveError::malformed("response header block is not terminated"))?;

    match walk_chunks(&raw[body_start..])? {
        Chunks::Complete(body) => String::from_utf8(body)
            .map_err(|e| EnclaveError::malformed(format!("body is not valid UTF-8: {e}"))),
        Chunks::Truncated => Err(EnclaveError::malformed(
            "stream ended before the terminating zero-length chunk",
        )),
    }
}

/// Whether `raw` already holds a full chunked response.
///
/// A response that can never become valid also counts as complete so the
/// reader stops and the parser reports the error. Readers that grow a buffer
/// should keep a [`ResponseProgress`] instead of calling this on every read.
pub fn is_complete_response(raw: &[u8]) -> bool {
    ResponseProgress::new().is_complete(raw)
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    /// Looking for the blank line; everything before `scanned` was searched.
    Headers { scanned: usize },
    /// Headers done; the next chunk-size line starts at `next`.
    Chunks { next: usize },
    /// Zero chunk seen; trailers start at `start`.
    Trailers { start: usize },
    Done,
}

/// Resumable completeness check for a response arriving in pieces.
///
/// Each call resumes where the previous one stopped: the header terminator is
/// searched only in new bytes and chunk data already stepped over is never
/// revisited, so a stream reader does linear work overall.
#[derive(Debug, Clone)]
pub struct ResponseProgress {
    stage: Stage,
}

impl Default for ResponseProgress {
    fn default() -> Self {
        Self {
            stage: Stage::Headers { scanned: 0 },
        }
    }
}

impl ResponseProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `raw` holds a full response.
    ///
    /// `raw` must start with the bytes passed on earlier calls. Malformed
    /// input counts as complete, as for [`is_complete_response`].
    pub fn is_complete(&mut self, raw: &[u8]) -> bool {
        loop {
            match self.stage {
                Stage::Headers { scanned } => {
                    // Back up so a terminator split across reads is still found.
                    let from = scanned.saturating_sub(HEADER_END.len() - 1);
                    let Some(rest) = raw.get(from..) else {
                        return false;
                    };
                    match find(rest, HEADER_END) {
                        Some(at) => {
                            self.stage = Stage::Chunks {
                                next: from + at + HEADER_END.len(),
                            }
                        }
                        None => {
                            self.stage = Stage::Headers { scanned: raw.len() };
                            return false;
                        }
                    }
                }
                Stage::Chunks { next } => {
                    let Some(rest) = raw.get(next..) else {
                        return false;
                    };
                    let Some(line_len) = find(rest, CRLF) else {
                        return false;
                    };
                    let Ok(size) = parse_chunk_size(&rest[..line_len]) else {
                        self.stage = Stage::Done;
                        continue;
                    };
                    let data_start = next + line_len + CRLF.len();
                    if size == 0 {
                        self.stage = Stage::Trailers { start: data_start };
                        continue;
                    }

                    let Some(data_end) = data_start.checked_add(size) else {
                        self.stage = Stage::Done;
                        continue;
                    };
                    let Some(crlf) = raw.get(data_end..data_end.saturating_add(CRLF.len())) else {
                        return false;
                    };
                    self.stage = if crlf == CRLF {
                        Stage::Chunks {
                            next: data_end + CRLF.len(),
                        }
                    } else {
                        Stage::Done
                    };
                }
                Stage::Trailers { start } => {
                    let trailers = raw.get(start..).unwrap_or_default();
                    if trailers.starts_with(CRLF) || find(trailers, HEADER_END).is_some() {
                        self.stage = Stage::Done;
                        continue;
                    }
                    return false;
                }
                Stage::Done => return true,
            }
        }
    }
}

fn body_offset(raw: &[u8]) -> Option<usize> {
    find(raw, HEADER_END).map(|pos| pos + HEADER_END.len())
}

fn walk_chunks(body: &[u8]) -> EnclaveResult<Chunks> {
    let mut decoded = Vec::new();
    let mut pos = 0;

    loop {
        let Some(line_len) = find(&body[pos..], CRLF) else {
            return Ok(Chunks::Truncated);
        };
        let size = parse_chunk_size(&body[pos..pos + line_len])?;
        pos += line_len + CRLF.len();

        if size == 0 {
            return Ok(Chunks::Complete(decoded));
        }

        let data_end = pos
            .checked_add(size)
            .ok_or_else(|| EnclaveError::malformed("chunk size overflows"))?;
        if body.len() < data_end + CRLF.len() {
            return Ok(Chunks::Truncated);
        }
        decoded.extend_from_slice(&body[pos..data_end]);

        if &body[data_end..data_end + CRLF.len()] != CRLF {
            return Err(EnclaveError::malformed(format!(
                "chunk of {size} bytes is not followed by CRLF"
            )));
        }
        pos = data_end + CRLF.len();
    }
}

fn parse_chunk_size(line: &[u8]) -> EnclaveResult<usize> {
    let line = std::str::from_utf8(line)
        .map_err(|_| EnclaveError::malformed("chunk size line is not ASCII"))?;
    // Chunk extensions (`;name=value`) are ignored.
    let digits = line.split(';').next().unwrap_or_default().trim();
    usize::from_str_radix(digits, 16)
        .map_err(|_| EnclaveError::malformed(format!("invalid chunk size {line:?}")))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
