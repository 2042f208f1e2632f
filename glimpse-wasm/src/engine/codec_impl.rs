use std::cell::RefCell;
use std::rc::Rc;

use glimpse_core::codec::{CodecCapability, order_by_preference};
use wasm_bindgen::prelude::*;

use crate::RoomEngine;
use crate::engine::EngineInner;
use crate::logger::Logger;

impl RoomEngine {
    /// Reorders the outgoing video codec list according to the configured
    /// preference before the offer is created. Browsers without the
    /// capability query or `setCodecPreferences` get the default order;
    /// that fallback is logged so it is observable, never silent.
    pub(crate) fn apply_codec_preference(
        inner: &Rc<RefCell<EngineInner>>,
        pc: &web_sys::RtcPeerConnection,
    ) {
        let preference = inner
            .borrow()
            .settings
            .prefer_codec
            .as_ref()
            .and_then(|codec| codec.resolve_placeholder());
        let Some(preference) = preference else {
            // Browser default requested; leave the order untouched.
            return;
        };

        let codecs = match Self::video_sender_capabilities() {
            Some(codecs) => codecs,
            None => {
                Logger::warn("codec preference unsupported: capability query unavailable");
                return;
            }
        };
        let ordered = order_by_preference(codecs, &preference);

        for transceiver in pc.get_transceivers().iter() {
            let transceiver: web_sys::RtcRtpTransceiver = transceiver.unchecked_into();
            let is_video_sender = transceiver
                .sender()
                .track()
                .map(|track| track.kind() == "video")
                .unwrap_or(false);
            if !is_video_sender {
                continue;
            }

            let set_preferences =
                js_sys::Reflect::get(&transceiver, &"setCodecPreferences".into()).ok();
            let Some(set_preferences) = set_preferences.filter(|f| f.is_function()) else {
                Logger::warn("codec preference unsupported: setCodecPreferences unavailable");
                return;
            };
            let set_preferences: js_sys::Function = set_preferences.unchecked_into();

            let list = match serde_wasm_bindgen::to_value(&ordered) {
                Ok(list) => list,
                Err(e) => {
                    Logger::warn(&format!("failed to build codec list: {}", e));
                    return;
                }
            };
            if let Err(e) = set_preferences.call1(&transceiver, &list) {
                Logger::error(&e);
            }
        }
    }

    /// `RTCRtpSender.getCapabilities('video')`, queried through reflection
    /// so older runtimes degrade to `None` instead of failing the build of
    /// the whole session.
    fn video_sender_capabilities() -> Option<Vec<CodecCapability>> {
        let sender = js_sys::Reflect::get(&js_sys::global(), &"RTCRtpSender".into()).ok()?;
        let get_capabilities = js_sys::Reflect::get(&sender, &"getCapabilities".into()).ok()?;
        if !get_capabilities.is_function() {
            return None;
        }
        let get_capabilities: js_sys::Function = get_capabilities.unchecked_into();
        let capabilities = get_capabilities.call1(&sender, &"video".into()).ok()?;
        if capabilities.is_null() || capabilities.is_undefined() {
            return None;
        }
        let codecs = js_sys::Reflect::get(&capabilities, &"codecs".into()).ok()?;
        serde_wasm_bindgen::from_value(codecs).ok()
    }
}
