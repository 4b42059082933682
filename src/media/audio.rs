//! Audio-side dependencies: the device module, processing defaults, and the
//! builtin codec set.

use std::thread::{self, ThreadId};

use tracing::debug;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_PCMA, MIME_TYPE_PCMU};
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTCRtpCodecParameters};

/// Audio backends the device module can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioBackend {
    /// No-op capture and render. The engine does not touch real hardware;
    /// applications feed media through tracks instead.
    #[default]
    Dummy,
}

/// Device-level audio processing settings, default-constructed for every
/// instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioProcessingConfig {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioProcessingConfig {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// The audio device handle.
///
/// Single-thread affinity: the device is created, used, and destroyed on
/// the worker thread. The handle records its owning thread so teardown can
/// assert the contract.
#[derive(Debug)]
pub struct AudioDeviceModule {
    backend: AudioBackend,
    processing: AudioProcessingConfig,
    owner: ThreadId,
}

impl AudioDeviceModule {
    /// Create the device on the calling thread, which becomes its owner.
    pub fn new(backend: AudioBackend, processing: AudioProcessingConfig) -> Self {
        debug!(?backend, "audio device module created");
        Self {
            backend,
            processing,
            owner: thread::current().id(),
        }
    }

    pub fn backend(&self) -> AudioBackend {
        self.backend
    }

    pub fn processing(&self) -> &AudioProcessingConfig {
        &self.processing
    }

    /// Whether the caller is on the device's owning thread.
    pub fn on_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Release the device. Affinity is a hard requirement of real platform
    /// backends; the dummy backend only asserts it.
    pub(crate) fn terminate(self) {
        debug_assert!(
            self.on_owner_thread(),
            "audio device released off its owning thread"
        );
        debug!(backend = ?self.backend, "audio device module terminated");
    }
}

/// Builtin audio codec set registered on every media engine: Opus plus the
/// G.711 fallbacks.
pub(crate) fn builtin_audio_codecs() -> Vec<RTCRtpCodecParameters> {
    vec![
        RTCRtpCodecParameters {
            capability: RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                sdp_fmtp_line: "minptime=10;useinbandfec=1".to_owned(),
                rtcp_feedback: vec![],
            },
            payload_type: 111,
            ..Default::default()
        },
        RTCRtpCodecParameters {
            capability: RTCRtpCodecCapability {
                mime_type: MIME_TYPE_PCMU.to_owned(),
                clock_rate: 8000,
                channels: 1,
                sdp_fmtp_line: String::new(),
                rtcp_feedback: vec![],
            },
            payload_type: 0,
            ..Default::default()
        },
        RTCRtpCodecParameters {
            capability: RTCRtpCodecCapability {
                mime_type: MIME_TYPE_PCMA.to_owned(),
                clock_rate: 8000,
                channels: 1,
                sdp_fmtp_line: String::new(),
                rtcp_feedback: vec![],
            },
            payload_type: 8,
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn device_tracks_owner_thread() {
        let device = AudioDeviceModule::new(AudioBackend::Dummy, AudioProcessingConfig::default());
        assert!(device.on_owner_thread());

        let off_thread = thread::spawn(move || device.on_owner_thread());
        assert!(!off_thread.join().unwrap());
    }

    #[test]
    fn builtin_codecs_include_opus() {
        let codecs = builtin_audio_codecs();
        let opus = codecs
            .iter()
            .find(|c| c.capability.mime_type == MIME_TYPE_OPUS)
            .expect("opus registered");
        assert_eq!(opus.capability.clock_rate, 48000);
        assert_eq!(opus.capability.channels, 2);
    }

    #[test]
    fn builtin_codec_payload_types_are_unique() {
        let codecs = builtin_audio_codecs();
        let payload_types: HashSet<u8> = codecs.iter().map(|c| c.payload_type).collect();
        assert_eq!(payload_types.len(), codecs.len());
    }
}
