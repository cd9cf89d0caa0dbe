//! Timed-sample sink over the outbound WebRTC track.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use webrtc::media::Sample;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Sink for timed audio samples.
///
/// [`AudioRelay::stream`](crate::AudioRelay::stream) writes through this
/// seam; the production implementation is the local WebRTC track.
#[async_trait]
pub trait SampleSink: Send + Sync {
    /// Write one sample with its playback duration.
    async fn write(&self, data: &[u8], duration: Duration) -> anyhow::Result<()>;
}

#[async_trait]
impl SampleSink for TrackLocalStaticSample {
    async fn write(&self, data: &[u8], duration: Duration) -> anyhow::Result<()> {
        self.write_sample(&Sample {
            data: Bytes::copy_from_slice(data),
            duration,
            ..Default::default()
        })
        .await?;
        Ok(())
    }
}
