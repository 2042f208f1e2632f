use std::cell::RefCell;
use std::rc::Rc;

use glimpse_core::EngineError;
use glimpse_core::model::OutgoingMessage;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::MediaStream;

use crate::RoomEngine;
use crate::engine::EngineInner;

#[wasm_bindgen]
impl RoomEngine {
    /// Captures the display and announces the share. The returned promise
    /// resolves once capture is running or aborted; capture failures are
    /// surfaced through the notification callback and leave no state
    /// behind.
    pub fn share(&self) -> js_sys::Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            let devices = web_sys::window().and_then(|w| w.navigator().media_devices().ok());
            let Some(devices) = devices else {
                Self::notify(
                    &inner,
                    &EngineError::Capability(
                        "Could not start presentation. (mediaDevices undefined) \
                         Are you using https?"
                            .into(),
                    ),
                );
                return Ok(JsValue::UNDEFINED);
            };

            let constraints = web_sys::DisplayMediaStreamConstraints::new();
            let video = js_sys::Object::new();
            let framerate = inner.borrow().settings.framerate;
            js_sys::Reflect::set(
                &video,
                &"frameRate".into(),
                &JsValue::from_f64(framerate as f64),
            )?;
            constraints.set_video(&video.into());

            let capture = match devices.get_display_media_with_constraints(&constraints) {
                Ok(promise) => JsFuture::from(promise).await,
                Err(e) => Err(e),
            };
            let stream: MediaStream = match capture {
                Ok(stream) => stream.unchecked_into(),
                Err(_) => {
                    Self::notify(
                        &inner,
                        &EngineError::Capability(
                            "Could not start presentation. (display capture denied \
                             or unsupported)"
                                .into(),
                        ),
                    );
                    return Ok(JsValue::UNDEFINED);
                }
            };

            // Stopping the capture through the browser or OS UI must stop
            // the share as well.
            for track in stream.get_tracks().iter() {
                let track: web_sys::MediaStreamTrack = track.unchecked_into();
                let onended = {
                    let inner = inner.clone();
                    Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
                        Self::do_stop_share(&inner);
                    }))
                };
                track.set_onended(Some(onended.as_ref().unchecked_ref()));
                onended.forget();
            }

            // Restarting the share replaces the capture; the previous one
            // must not keep recording.
            let previous = inner.borrow_mut().stream.replace(stream.clone());
            if let Some(previous) = previous {
                for track in previous.get_tracks().iter() {
                    track.unchecked_into::<web_sys::MediaStreamTrack>().stop();
                }
            }
            if let Some(room) = inner.borrow_mut().state.connected_mut() {
                room.set_host_stream(stream);
            }
            Self::send_on(&inner, &OutgoingMessage::Share {});
            Self::emit_change(&inner);
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Ends the share: closes every outbound session, stops the capture and
    /// tells the server. Safe to call with no active stream.
    #[wasm_bindgen(js_name = stopShare)]
    pub fn stop_share(&self) {
        Self::do_stop_share(&self.inner);
    }
}

impl RoomEngine {
    pub(crate) fn do_stop_share(inner: &Rc<RefCell<EngineInner>>) {
        let (sessions, stream) = {
            let mut inner = inner.borrow_mut();
            (inner.host.drain(), inner.stream.take())
        };
        for (_, pc) in sessions {
            pc.close();
        }
        if let Some(stream) = stream {
            for track in stream.get_tracks().iter() {
                track.unchecked_into::<web_sys::MediaStreamTrack>().stop();
            }
        }
        if let Some(room) = inner.borrow_mut().state.connected_mut() {
            room.clear_host_stream();
        }
        Self::send_on(inner, &OutgoingMessage::StopShare {});
        Self::emit_change(inner);
    }
}
