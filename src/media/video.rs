//! External video codec configuration for the media engine.
//!
//! The engine only needs the negotiated codec set; encoded frame production
//! and consumption stay with the application.

use webrtc::api::media_engine::{MIME_TYPE_H264, MIME_TYPE_VP8, MIME_TYPE_VP9};
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTCRtpCodecParameters};

/// Video codecs the default configuration can negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    Vp8,
    Vp9,
    H264,
}

impl VideoCodec {
    fn parameters(self) -> RTCRtpCodecParameters {
        let (mime_type, fmtp, payload_type) = match self {
            VideoCodec::Vp8 => (MIME_TYPE_VP8, "", 96),
            VideoCodec::Vp9 => (MIME_TYPE_VP9, "profile-id=0", 98),
            VideoCodec::H264 => (
                MIME_TYPE_H264,
                "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f",
                102,
            ),
        };
        RTCRtpCodecParameters {
            capability: RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                clock_rate: 90000,
                channels: 0,
                sdp_fmtp_line: fmtp.to_owned(),
                rtcp_feedback: vec![],
            },
            payload_type,
            ..Default::default()
        }
    }
}

/// Provider of the encoder- and decoder-side codec sets for the media
/// engine. Supplied externally so embedders can restrict or extend the
/// negotiated set.
pub trait VideoFactoryConfig: Send + Sync + 'static {
    /// Codec parameters offered for sending.
    fn encoder_codecs(&self) -> Vec<RTCRtpCodecParameters>;

    /// Codec parameters accepted for receiving.
    fn decoder_codecs(&self) -> Vec<RTCRtpCodecParameters>;
}

/// Default configuration: symmetric VP8, VP9, and H.264.
#[derive(Debug, Clone)]
pub struct DefaultVideoFactoryConfig {
    codecs: Vec<VideoCodec>,
}

impl DefaultVideoFactoryConfig {
    pub fn new(codecs: Vec<VideoCodec>) -> Self {
        Self { codecs }
    }
}

impl Default for DefaultVideoFactoryConfig {
    fn default() -> Self {
        Self {
            codecs: vec![VideoCodec::Vp8, VideoCodec::Vp9, VideoCodec::H264],
        }
    }
}

impl VideoFactoryConfig for DefaultVideoFactoryConfig {
    fn encoder_codecs(&self) -> Vec<RTCRtpCodecParameters> {
        self.codecs.iter().map(|c| c.parameters()).collect()
    }

    fn decoder_codecs(&self) -> Vec<RTCRtpCodecParameters> {
        self.codecs.iter().map(|c| c.parameters()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_config_offers_three_codecs() {
        let config = DefaultVideoFactoryConfig::default();
        assert_eq!(config.encoder_codecs().len(), 3);
        assert_eq!(config.decoder_codecs().len(), 3);
    }

    #[test]
    fn payload_types_are_unique() {
        let config = DefaultVideoFactoryConfig::default();
        let payload_types: HashSet<u8> = config
            .encoder_codecs()
            .iter()
            .map(|c| c.payload_type)
            .collect();
        assert_eq!(payload_types.len(), 3);
    }

    #[test]
    fn all_codecs_use_video_clock() {
        for codec in DefaultVideoFactoryConfig::default().encoder_codecs() {
            assert!(codec.capability.mime_type.starts_with("video/"));
            assert_eq!(codec.capability.clock_rate, 90000);
        }
    }

    #[test]
    fn restricted_config_keeps_selection() {
        let config = DefaultVideoFactoryConfig::new(vec![VideoCodec::Vp8]);
        let codecs = config.encoder_codecs();
        assert_eq!(codecs.len(), 1);
        assert_eq!(codecs[0].capability.mime_type, MIME_TYPE_VP8);
    }
}
