//! Real-time relay from a synthesis session to a local WebRTC audio track.
//!
//! An [`AudioRelay`] owns an outbound Opus track attached to a peer
//! connection. [`AudioRelay::stream`] drains a
//! [`SynthesisSession`](synth_core::SynthesisSession) chunk by chunk,
//! re-packages each read as a timed sample (duration derived from the
//! actual payload length), and writes it to the track until end-of-stream,
//! an error, or cancellation.
//!
//! Offer/answer signaling and ICE relay run outside this crate against the
//! peer connection handle exposed by [`AudioRelay::peer_connection`].

pub mod config;
pub mod error;
pub mod track;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use webrtc::api::media_engine::{MediaEngine, MIME_TYPE_OPUS};
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_local::TrackLocal;

use synth_core::{SessionRead, SynthesisSession};

pub use crate::config::RelayConfig;
pub use crate::error::RelayError;
pub use crate::track::SampleSink;

/// Sample rate of the synthesis backend's audio (Hz).
pub const SAMPLE_RATE: u32 = 24_000;
/// Channel count of the synthesis backend's audio.
pub const CHANNELS: u16 = 1;
/// Read-buffer size: one 20 ms pacing frame.
pub const FRAME_BUF_BYTES: usize = 960;

/// Bridges synthesized audio onto an outbound WebRTC track.
///
/// One relay writes to one track; the track and peer connection are owned
/// exclusively by this relay.
pub struct AudioRelay {
    peer_connection: Arc<RTCPeerConnection>,
    track: Arc<TrackLocalStaticSample>,
    shutdown: CancellationToken,
}

impl AudioRelay {
    /// Create the outbound Opus track and attach it to a fresh peer
    /// connection built from `config`.
    ///
    /// On failure no partial state is kept; the half-built peer connection
    /// is closed before the error is returned.
    pub async fn attach(config: RelayConfig) -> Result<Self, RelayError> {
        let mut media = MediaEngine::default();
        media
            .register_default_codecs()
            .map_err(|e| RelayError::Transport(e.into()))?;
        let api = APIBuilder::new().with_media_engine(media).build();

        let rtc_config = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: config.stun_servers.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| RelayError::Transport(e.into()))?,
        );

        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: SAMPLE_RATE,
                channels: CHANNELS,
                ..Default::default()
            },
            config.track_id.clone(),
            config.stream_id.clone(),
        ));

        if let Err(e) = peer_connection
            .add_track(Arc::clone(&track) as Arc<dyn TrackLocal + Send + Sync>)
            .await
        {
            let _ = peer_connection.close().await;
            return Err(RelayError::Transport(e.into()));
        }

        info!(track = %config.track_id, "outbound audio track attached");
        Ok(Self {
            peer_connection,
            track,
            shutdown: CancellationToken::new(),
        })
    }

    /// Peer connection handle for the signaling layer.
    pub fn peer_connection(&self) -> Arc<RTCPeerConnection> {
        Arc::clone(&self.peer_connection)
    }

    /// Drain `session` into the track until end-of-stream, an error, or
    /// cancellation.
    ///
    /// `cancel` is the caller's stop signal; a concurrent
    /// [`close`](Self::close) also interrupts the loop promptly. The
    /// session is closed on every exit path.
    pub async fn stream(
        &self,
        session: SynthesisSession,
        cancel: &CancellationToken,
    ) -> Result<(), RelayError> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(RelayError::Cancelled),
            result = relay_chunks(session, self.track.as_ref(), cancel) => result,
        }
    }

    /// Cancel an in-flight [`stream`](Self::stream) and close the owned
    /// peer connection. Idempotent; safe before `stream` ever ran.
    pub async fn close(&self) -> Result<(), RelayError> {
        self.shutdown.cancel();
        self.peer_connection
            .close()
            .await
            .map_err(|e| RelayError::Transport(e.into()))?;
        Ok(())
    }
}

/// Core relay loop: read chunks, write timed samples.
///
/// Each sample's duration is `bytes_read / SAMPLE_RATE` seconds, so a short
/// final chunk keeps downstream pacing correct. There is no wall-clock
/// sleep between writes: chunk sizes already represent real-time
/// proportional audio, and the sink buffers internally.
pub async fn relay_chunks(
    mut session: SynthesisSession,
    sink: &dyn SampleSink,
    cancel: &CancellationToken,
) -> Result<(), RelayError> {
    let mut buf = [0u8; FRAME_BUF_BYTES];
    let mut written = 0usize;

    let result = loop {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Err(RelayError::Cancelled),
            read = session.read(&mut buf) => read,
        };

        match read {
            Ok(SessionRead::Done) => {
                debug!(samples = written, "synthesis stream drained");
                break Ok(());
            }
            Ok(SessionRead::Data(n)) => {
                let duration = Duration::from_secs_f64(n as f64 / SAMPLE_RATE as f64);
                if let Err(e) = sink.write(&buf[..n], duration).await {
                    // The track is assumed broken or closed; no retry.
                    warn!("track write failed: {e}");
                    break Err(RelayError::Track(e));
                }
                written += 1;
            }
            Err(e) => break Err(RelayError::Session(e)),
        }
    };

    session.close();
    result
}
