use std::cell::RefCell;
use std::rc::Rc;

use glimpse_core::EngineError;
use glimpse_core::model::{OutgoingMessage, RoomRequest};
use glimpse_core::state::RoomState;
use wasm_bindgen::prelude::*;
use web_sys::WebSocket;

use crate::RoomEngine;
use crate::engine::EngineInner;
use crate::logger::Logger;

#[wasm_bindgen]
impl RoomEngine {
    /// Opens the signaling socket and sends the create/join request as the
    /// first frame. The returned promise resolves once the first inbound
    /// frame has been classified, or when the socket dies before that;
    /// callers never hang. Success or failure is reported through the
    /// notification callback, not the promise value.
    pub fn connect(&self, request: JsValue) -> Result<js_sys::Promise, JsValue> {
        let mut request: RoomRequest = serde_wasm_bindgen::from_value(request)
            .map_err(|e| JsValue::from_str(&format!("invalid room request: {}", e)))?;
        request.set_username(self.inner.borrow().settings.name.clone());

        let inner = self.inner.clone();
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            inner.borrow_mut().pending_connect = Some(resolve);
        });

        self.open_socket(request)?;
        Ok(promise)
    }
}

impl RoomEngine {
    fn open_socket(&self, request: RoomRequest) -> Result<(), JsValue> {
        // A lingering socket from an earlier connect must not feed its
        // close event into the new session.
        let previous = self.inner.borrow_mut().ws.take();
        if let Some(old) = previous {
            old.set_onopen(None);
            old.set_onmessage(None);
            old.set_onclose(None);
            old.set_onerror(None);
            let _ = old.close();
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let location = window.location();
        let scheme = if location.protocol()?.starts_with("https") {
            "wss"
        } else {
            "ws"
        };
        let url = format!("{}://{}/stream", scheme, location.host()?);

        let ws = WebSocket::new(&url)?;
        let first_frame = OutgoingMessage::from(request.clone())
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        {
            let mut inner = self.inner.borrow_mut();
            inner.first = true;
            inner.joining = request.is_join();
        }

        let onopen = {
            let ws = ws.clone();
            Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
                Logger::info("signaling socket open");
                let _ = ws.send_with_str(&first_frame);
            }))
        };
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let onmessage = {
            let inner = self.inner.clone();
            Closure::<dyn FnMut(web_sys::MessageEvent)>::wrap(Box::new(
                move |e: web_sys::MessageEvent| {
                    if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                        Self::handle_frame(&inner, String::from(text));
                    }
                },
            ))
        };
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let onclose = {
            let inner = self.inner.clone();
            Closure::<dyn FnMut(web_sys::CloseEvent)>::wrap(Box::new(
                move |e: web_sys::CloseEvent| {
                    let reason = if e.reason().is_empty() {
                        format!("connection closed (code {})", e.code())
                    } else {
                        e.reason()
                    };
                    Self::handle_socket_down(&inner, reason);
                },
            ))
        };
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        let onerror = {
            let inner = self.inner.clone();
            Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
                Self::handle_socket_down(&inner, "connection error".to_string());
            }))
        };
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        self.inner.borrow_mut().ws = Some(ws);
        Ok(())
    }

    /// Resolves the pending connect promise, if any. Called at most once
    /// per connect: on first-frame classification or on socket death.
    pub(crate) fn resolve_connect(inner: &Rc<RefCell<EngineInner>>) {
        let resolve = inner.borrow_mut().pending_connect.take();
        if let Some(resolve) = resolve {
            let _ = resolve.call0(&JsValue::NULL);
        }
    }

    /// Socket closed or errored: reset to disconnected and cascade-close
    /// every peer session so no media track outlives the room.
    pub(crate) fn handle_socket_down(inner: &Rc<RefCell<EngineInner>>, reason: String) {
        Self::resolve_connect(inner);

        let (hosts, clients, stream) = {
            let mut inner = inner.borrow_mut();
            inner.first = false;
            inner.state = RoomState::Disconnected;
            (inner.host.drain(), inner.client.drain(), inner.stream.take())
        };
        for (_, pc) in hosts.into_iter().chain(clients) {
            pc.close();
        }
        if let Some(stream) = stream {
            for track in stream.get_tracks().iter() {
                track.unchecked_into::<web_sys::MediaStreamTrack>().stop();
            }
        }

        Self::notify(inner, &EngineError::Transport(reason));
        Self::emit_change(inner);
    }
}
