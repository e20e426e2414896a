use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tandem_client::{MediaError, MediaSource, MediaStream};
use tandem_core::{MediaConstraints, TrackKind};
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const VIDEO_FRAME_INTERVAL: Duration = Duration::from_millis(33);
const AUDIO_FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// A 20 ms Opus frame of silence.
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

/// Media source with no device behind it.
///
/// Video tracks repeat a blank VP8 key frame header at ~30 fps, audio tracks
/// repeat Opus silence. Enough for negotiation and RTP flow, nothing to watch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticCamera;

#[async_trait]
impl MediaSource for SyntheticCamera {
    type Stream = RtcStream;

    async fn acquire(&mut self, constraints: &MediaConstraints) -> Result<RtcStream, MediaError> {
        if constraints.is_empty() {
            return Err(MediaError::NothingRequested);
        }

        let id = format!("tandem-{}", Uuid::new_v4());
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tracks = Vec::new();

        if let Some(video) = constraints.video {
            let track = new_track(TrackKind::Video, &id);
            spawn_writer(
                track.clone(),
                vp8_key_frame(video.width, video.height),
                VIDEO_FRAME_INTERVAL,
                stop_rx.clone(),
            );
            tracks.push(track);
        }
        if constraints.audio {
            let track = new_track(TrackKind::Audio, &id);
            spawn_writer(
                track.clone(),
                Bytes::from_static(&OPUS_SILENCE),
                AUDIO_FRAME_INTERVAL,
                stop_rx,
            );
            tracks.push(track);
        }

        info!("Synthetic stream {} started with {} tracks", id, tracks.len());
        Ok(RtcStream {
            id,
            tracks,
            stop_tx,
        })
    }
}

/// Local stream whose tracks can be bound to an [`crate::RtcPeer`].
pub struct RtcStream {
    id: String,
    tracks: Vec<Arc<TrackLocalStaticSample>>,
    stop_tx: watch::Sender<bool>,
}

impl RtcStream {
    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }
}

impl MediaStream for RtcStream {
    type Track = Arc<TrackLocalStaticSample>;

    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<TrackLocalStaticSample>> {
        self.tracks.clone()
    }

    fn stop(&mut self) {
        if !self.is_stopped() {
            self.stop_tx.send_replace(true);
            info!("Synthetic stream {} stopped", self.id);
        }
    }
}

fn new_track(kind: TrackKind, stream_id: &str) -> Arc<TrackLocalStaticSample> {
    let codec = match kind {
        TrackKind::Video => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            clock_rate: 90000,
            channels: 0,
            sdp_fmtp_line: String::new(),
            rtcp_feedback: vec![],
        },
        TrackKind::Audio => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            sdp_fmtp_line: String::new(),
            rtcp_feedback: vec![],
        },
    };
    Arc::new(TrackLocalStaticSample::new(
        codec,
        kind.to_string(),
        stream_id.to_owned(),
    ))
}

fn spawn_writer(
    track: Arc<TrackLocalStaticSample>,
    frame: Bytes,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                // Also fires when the stream is dropped without stop().
                _ = async { let _ = stop.wait_for(|stopped| *stopped).await; } => break,
                _ = ticker.tick() => {
                    let sample = Sample {
                        data: frame.clone(),
                        duration: interval,
                        ..Default::default()
                    };
                    if let Err(e) = track.write_sample(&sample).await {
                        debug!("Sample writer stopped: {}", e);
                        break;
                    }
                }
            }
        }
    });
}

/// Uncompressed VP8 key frame header (RFC 6386 9.1) with an empty first partition.
fn vp8_key_frame(width: u32, height: u32) -> Bytes {
    let width = (width.min(0x3fff) as u16).to_le_bytes();
    let height = (height.min(0x3fff) as u16).to_le_bytes();
    // Frame tag: key frame, version 0, shown.
    Bytes::from(vec![
        0x10, 0x00, 0x00, 0x9d, 0x01, 0x2a, width[0], width[1], height[0], height[1],
    ])
}
