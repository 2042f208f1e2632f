use serde::{Deserialize, Serialize};

pub const CODEC_BEST_QUALITY: &str = "BEST_QUALITY";
pub const CODEC_DEFAULT: &str = "DEFAULT";

/// Codec ordering hint applied to outgoing video before the offer is sent.
/// The mime type may be one of the two presets above instead of a real
/// `video/*` type; `resolve_placeholder` maps presets to concrete values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferredCodec {
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_fmtp_line: Option<String>,
}

impl PreferredCodec {
    pub fn best_quality() -> Self {
        Self {
            mime_type: CODEC_BEST_QUALITY.into(),
            sdp_fmtp_line: None,
        }
    }

    pub fn browser_default() -> Self {
        Self {
            mime_type: CODEC_DEFAULT.into(),
            sdp_fmtp_line: None,
        }
    }

    /// Resolves the preset placeholders: best quality maps to VP9 profile 2,
    /// browser default means no preference at all.
    pub fn resolve_placeholder(&self) -> Option<PreferredCodec> {
        match self.mime_type.as_str() {
            CODEC_BEST_QUALITY => Some(PreferredCodec {
                mime_type: "video/VP9".into(),
                sdp_fmtp_line: Some("profile-id=2".into()),
            }),
            CODEC_DEFAULT => None,
            _ => Some(self.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VideoDisplayMode {
    #[default]
    FitToWindow,
    FitWidth,
    FitHeight,
    OriginalSize,
}

/// Locally persisted client settings, consumed here as opaque configuration.
/// The JSON shape matches what the UI stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub name: Option<String>,
    pub display_mode: VideoDisplayMode,
    pub prefer_codec: Option<PreferredCodec>,
    pub framerate: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: None,
            display_mode: VideoDisplayMode::FitToWindow,
            prefer_codec: Some(PreferredCodec::browser_default()),
            framerate: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_quality_resolves_to_vp9_profile_2() {
        let resolved = PreferredCodec::best_quality().resolve_placeholder().unwrap();
        assert_eq!(resolved.mime_type, "video/VP9");
        assert_eq!(resolved.sdp_fmtp_line.as_deref(), Some("profile-id=2"));
    }

    #[test]
    fn browser_default_resolves_to_no_preference() {
        assert_eq!(PreferredCodec::browser_default().resolve_placeholder(), None);
    }

    #[test]
    fn concrete_codec_resolves_to_itself() {
        let codec = PreferredCodec {
            mime_type: "video/H264".into(),
            sdp_fmtp_line: Some("profile-level-id=42e01f".into()),
        };
        assert_eq!(codec.resolve_placeholder(), Some(codec.clone()));
    }

    #[test]
    fn settings_parse_the_stored_json_shape() {
        let settings: Settings = serde_json::from_str(
            r#"{"name":"ada","displayMode":"FitWidth","preferCodec":{"mimeType":"BEST_QUALITY"},"framerate":60}"#,
        )
        .unwrap();
        assert_eq!(settings.name.as_deref(), Some("ada"));
        assert_eq!(settings.display_mode, VideoDisplayMode::FitWidth);
        assert_eq!(settings.framerate, 60);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.framerate, 30);
        assert_eq!(settings.display_mode, VideoDisplayMode::FitToWindow);
        assert_eq!(
            settings.prefer_codec,
            Some(PreferredCodec::browser_default())
        );
    }
}
