//! The production engine driver, backed by webrtc-rs.
//!
//! `create_factory` assembles the full dependency bundle in order: the event
//! log over a task queue, the media engine (builtin audio codecs plus the
//! externally supplied video set), the default interceptor stack for
//! per-call RTP/RTCP machinery, and the setting engine carrying the fixed
//! security profile.

use std::sync::Arc;

use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::api::APIBuilder;
use webrtc::dtls::extension::extension_use_srtp::SrtpProtectionProfile;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecParameters, RTPCodecType};

use super::audio::{builtin_audio_codecs, AudioBackend, AudioDeviceModule, AudioProcessingConfig};
use super::event_log::EventLog;
use super::factory::WebRtcFactory;
use super::video::{DefaultVideoFactoryConfig, VideoFactoryConfig};
use crate::config::EngineConfig;
use crate::driver::{EngineDriver, FactoryContext, SecurityOptions, SslVersion};
use crate::error::{Error, Result};

/// Production driver wiring the lifecycle core to webrtc-rs.
pub struct WebRtcDriver {
    config: EngineConfig,
    video: Arc<dyn VideoFactoryConfig>,
}

impl WebRtcDriver {
    /// Create a driver with a validated connection context.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            video: Arc::new(DefaultVideoFactoryConfig::default()),
        })
    }

    /// Replace the video codec provider.
    pub fn with_video_config(mut self, video: Arc<dyn VideoFactoryConfig>) -> Self {
        self.video = video;
        self
    }
}

impl Default for WebRtcDriver {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            video: Arc::new(DefaultVideoFactoryConfig::default()),
        }
    }
}

impl EngineDriver for WebRtcDriver {
    type Factory = WebRtcFactory;
    type AudioDevice = AudioDeviceModule;

    fn init_transport(&self) -> Result<()> {
        // The DTLS/SRTP stack is pure Rust and keeps no process-global
        // state; the hook still marks the epoch boundary for observability.
        debug!("secure transport initialized");
        Ok(())
    }

    fn cleanup_transport(&self) {
        debug!("secure transport cleaned up");
    }

    fn create_audio_device(&self) -> Result<AudioDeviceModule> {
        Ok(AudioDeviceModule::new(
            AudioBackend::Dummy,
            AudioProcessingConfig::default(),
        ))
    }

    fn destroy_audio_device(&self, device: AudioDeviceModule) {
        device.terminate();
    }

    fn create_factory(&self, ctx: FactoryContext<'_, Self>) -> Result<WebRtcFactory> {
        // Event logging drains through the signaling queue.
        let event_log = EventLog::new(ctx.threads.signaling().queue());

        let mut media_engine = MediaEngine::default();
        for codec in builtin_audio_codecs() {
            media_engine
                .register_codec(codec, RTPCodecType::Audio)
                .map_err(|e| Error::MediaEngine(format!("failed to register audio codec: {e}")))?;
        }
        for codec in video_codecs(self.video.as_ref()) {
            media_engine
                .register_codec(codec, RTPCodecType::Video)
                .map_err(|e| Error::MediaEngine(format!("failed to register video codec: {e}")))?;
        }
        // No audio mixer: mixing is delegated to the device layer.
        debug!(
            audio_backend = ?ctx.audio_device.backend(),
            "media dependencies assembled"
        );

        let registry = register_default_interceptors(Default::default(), &mut media_engine)
            .map_err(|e| Error::MediaEngine(format!("failed to register interceptors: {e}")))?;

        let mut setting_engine = SettingEngine::default();
        apply_security(&mut setting_engine, ctx.security)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .with_setting_engine(setting_engine)
            .build();

        info!("engine factory constructed");
        Ok(WebRtcFactory::new(
            api,
            self.config.clone(),
            ctx.security.clone(),
            event_log,
        ))
    }
}

/// Union of the provider's encoder and decoder codec sets, deduplicated by
/// payload type. webrtc-rs keeps one codec table for both directions.
fn video_codecs(video: &dyn VideoFactoryConfig) -> Vec<RTCRtpCodecParameters> {
    let mut codecs = video.encoder_codecs();
    for codec in video.decoder_codecs() {
        if !codecs.iter().any(|c| c.payload_type == codec.payload_type) {
            codecs.push(codec);
        }
    }
    codecs
}

/// Pin the fixed transport profile onto the setting engine.
fn apply_security(setting_engine: &mut SettingEngine, security: &SecurityOptions) -> Result<()> {
    if security.disable_encryption {
        return Err(Error::SecurityConfig(
            "encryption cannot be disabled".to_string(),
        ));
    }
    if security.max_ssl_version != SslVersion::Dtls12 {
        return Err(Error::SecurityConfig(
            "the transport stack is fixed at DTLS 1.2".to_string(),
        ));
    }
    let mut profiles = vec![SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_80];
    if security.enable_gcm_crypto_suites {
        profiles.insert(0, SrtpProtectionProfile::Srtp_Aead_Aes_128_Gcm);
    }
    setting_engine.set_srtp_protection_profiles(profiles);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_rejects_disabled_encryption() {
        let mut engine = SettingEngine::default();
        let options = SecurityOptions {
            disable_encryption: true,
            ..Default::default()
        };
        assert!(matches!(
            apply_security(&mut engine, &options),
            Err(Error::SecurityConfig(_))
        ));
    }

    #[test]
    fn security_rejects_legacy_dtls() {
        let mut engine = SettingEngine::default();
        let options = SecurityOptions {
            max_ssl_version: SslVersion::Dtls10,
            ..Default::default()
        };
        assert!(matches!(
            apply_security(&mut engine, &options),
            Err(Error::SecurityConfig(_))
        ));
    }

    #[test]
    fn security_accepts_fixed_profile() {
        let mut engine = SettingEngine::default();
        assert!(apply_security(&mut engine, &SecurityOptions::default()).is_ok());
    }

    #[test]
    fn video_codec_union_dedupes_by_payload_type() {
        let config = DefaultVideoFactoryConfig::default();
        // Encoder and decoder sets are symmetric, so the union stays at 3.
        assert_eq!(video_codecs(&config).len(), 3);
    }
}
