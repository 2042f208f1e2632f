use crate::settings::PreferredCodec;
use serde::{Deserialize, Serialize};

/// One entry of `RTCRtpSender.getCapabilities('video').codecs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodecCapability {
    pub mime_type: String,
    pub clock_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_fmtp_line: Option<String>,
}

fn rank(codec: &CodecCapability, preference: &PreferredCodec) -> u8 {
    if codec.mime_type != preference.mime_type {
        return 2;
    }
    if codec.sdp_fmtp_line == preference.sdp_fmtp_line {
        0
    } else {
        1
    }
}

/// Reorders a capability list so exact mimeType+fmtp matches of the
/// preference come first, same-mimeType entries next, everything else last.
/// The sort is stable, so the result is a permutation of the input and the
/// relative order inside each group is untouched.
pub fn order_by_preference(
    mut codecs: Vec<CodecCapability>,
    preference: &PreferredCodec,
) -> Vec<CodecCapability> {
    codecs.sort_by_key(|codec| rank(codec, preference));
    codecs
}
