//! Streaming speech-synthesis session.
//!
//! A [`SynthesisSession`] wraps one request against a bidirectional
//! synthesis stream: the voice/language configuration and the input text
//! are sent once, the send direction is closed, and a single background
//! task drains the backend's audio-chunk messages into a bounded queue.
//! The consumer pulls bytes out with [`SynthesisSession::read`] and stops
//! on end-of-stream, on the first error, or on cancellation, whichever
//! comes first.
//!
//! Data, completion, and failure travel through one ordered queue with a
//! sum-typed payload (`Ok(chunk)` / `Err(error)` / channel closed = done),
//! so the consumer never has to arbitrate between racing side-channels.

pub mod error;
pub mod validation;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use crate::error::SessionError;
use crate::validation::validate_request;

/// Capacity of the pending-chunk queue. A full queue blocks the receiver
/// task, which is the backpressure mechanism against a fast backend.
pub const CHUNK_QUEUE_CAPACITY: usize = 100;

/// An already-authenticated bidirectional stream to the synthesis backend.
///
/// The session owns the stream exclusively once it is opened; nothing else
/// may receive on it concurrently.
#[async_trait]
pub trait SynthesisStream: Send {
    /// Send the one-time voice/language configuration message.
    async fn send_config(&mut self, voice: &str, language_code: &str) -> anyhow::Result<()>;

    /// Send the one-time text input message.
    async fn send_text(&mut self, text: &str) -> anyhow::Result<()>;

    /// Close the send direction. No further messages may be sent.
    async fn close_send(&mut self) -> anyhow::Result<()>;

    /// Receive the next audio chunk. `Ok(None)` means end-of-stream.
    async fn recv(&mut self) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Outcome of a single [`SynthesisSession::read`].
#[derive(Debug, PartialEq, Eq)]
pub enum SessionRead {
    /// This many bytes were copied into the caller's buffer.
    Data(usize),
    /// The backend finished the utterance; no more data will arrive.
    Done,
}

/// One synthesis request's audio, pulled as ordered byte chunks.
#[derive(Debug)]
pub struct SynthesisSession {
    chunks: mpsc::Receiver<Result<Vec<u8>, SessionError>>,
    cancel: CancellationToken,
    // Remainder of a chunk that did not fit the caller's buffer.
    pending: Vec<u8>,
    pending_off: usize,
}

impl SynthesisSession {
    /// Open a session: validate the request, send configuration and text,
    /// close the send side, and start the background receiver.
    ///
    /// This is a one-shot request/response-stream pattern; no further text
    /// can be sent on the returned session.
    pub async fn open<S>(
        mut stream: S,
        text: &str,
        voice: &str,
        language_code: &str,
    ) -> Result<Self, SessionError>
    where
        S: SynthesisStream + 'static,
    {
        validate_request(text, voice, language_code)?;

        stream
            .send_config(voice, language_code)
            .await
            .map_err(SessionError::Config)?;
        stream.send_text(text).await.map_err(SessionError::Config)?;
        stream.close_send().await.map_err(SessionError::Config)?;

        let (tx, rx) = mpsc::channel(CHUNK_QUEUE_CAPACITY);
        let cancel = CancellationToken::new();
        tokio::spawn(receive_loop(stream, tx, cancel.clone()));

        debug!(voice, language_code, "synthesis session opened");
        Ok(Self {
            chunks: rx,
            cancel,
            pending: Vec::new(),
            pending_off: 0,
        })
    }

    /// Copy the next available audio bytes into `buf`.
    ///
    /// Suspends until a chunk is available, the stream finishes, an error
    /// is published, or the session is cancelled. A chunk larger than
    /// `buf` is retained and drained across successive reads; no bytes are
    /// dropped.
    ///
    /// A receive error is surfaced exactly once; reads after that observe
    /// [`SessionRead::Done`].
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<SessionRead, SessionError> {
        if buf.is_empty() {
            return Ok(SessionRead::Data(0));
        }

        // Drain the remainder of a partially-consumed chunk first.
        if self.pending_off < self.pending.len() {
            let n = self.copy_pending(buf);
            return Ok(SessionRead::Data(n));
        }

        let item = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SessionError::Cancelled),
            item = self.chunks.recv() => item,
        };

        match item {
            Some(Ok(chunk)) => {
                self.pending = chunk;
                self.pending_off = 0;
                let n = self.copy_pending(buf);
                Ok(SessionRead::Data(n))
            }
            Some(Err(e)) => Err(e),
            None => Ok(SessionRead::Done),
        }
    }

    /// Cancel the session and stop the background receiver.
    ///
    /// Idempotent; safe to call concurrently with an in-flight
    /// [`read`](Self::read), which will return [`SessionError::Cancelled`].
    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn copy_pending(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.pending[self.pending_off..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pending_off += n;
        if self.pending_off == self.pending.len() {
            self.pending.clear();
            self.pending_off = 0;
        }
        n
    }
}

impl Drop for SynthesisSession {
    fn drop(&mut self) {
        // The receiver task must never outlive the session.
        self.cancel.cancel();
    }
}

/// Background receiver: one per session.
///
/// Pushes `Ok(chunk)` per audio message, `Err(_)` exactly once on a receive
/// failure, and closes the queue (by dropping `tx`) on end-of-stream.
/// Every wait is pre-emptible by cancellation, including a push blocked on
/// a full queue.
async fn receive_loop<S: SynthesisStream>(
    mut stream: S,
    tx: mpsc::Sender<Result<Vec<u8>, SessionError>>,
    cancel: CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            msg = stream.recv() => msg,
        };

        match msg {
            Ok(Some(chunk)) => {
                // A zero-length payload is not data and must not be
                // mistaken for end-of-stream downstream.
                if chunk.is_empty() {
                    continue;
                }
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    sent = tx.send(Ok(chunk)) => {
                        if sent.is_err() {
                            // Consumer dropped the session.
                            return;
                        }
                    }
                }
            }
            Ok(None) => {
                debug!("synthesis stream reached end of stream");
                return;
            }
            Err(e) => {
                warn!("synthesis stream receive failed: {e}");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = tx.send(Err(SessionError::Receive(e))) => {}
                }
                return;
            }
        }
    }
}
