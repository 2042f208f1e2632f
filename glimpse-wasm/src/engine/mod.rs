use glimpse_core::model::{OutgoingMessage, RoomInfo, SessionId};
use glimpse_core::state::{RoomState, SessionRegistry};
use glimpse_core::{EngineError, Settings};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{MediaStream, RtcPeerConnection, WebSocket};

use crate::logger::Logger;

mod client_session_impl;
mod codec_impl;
mod create_pc_impl;
mod handle_signal_impl;
mod host_session_impl;
mod share_impl;
mod ws_setup_impl;

pub(crate) struct EngineInner {
    pub ws: Option<WebSocket>,
    /// Outbound sessions, one per viewer, while this client is sharing.
    pub host: SessionRegistry<RtcPeerConnection>,
    /// Inbound sessions, one per remote broadcaster.
    pub client: SessionRegistry<RtcPeerConnection>,
    /// The local display capture, at most one.
    pub stream: Option<MediaStream>,
    pub state: RoomState<MediaStream>,
    pub settings: Settings,
    /// True until the first frame on the current socket has been classified.
    pub first: bool,
    /// Whether the current connect call is a join (for the success note).
    pub joining: bool,
    /// Resolver of the promise returned by `connect`.
    pub pending_connect: Option<js_sys::Function>,
    /// Relay-only ICE policy, from `?forceTurn=true` in the page URL.
    pub force_relay: bool,
    pub on_notify: Option<js_sys::Function>,
    pub on_change: Option<js_sys::Function>,
}

/// Serializable snapshot handed to the UI on every state change. Stream
/// handles are not part of it; they are fetched through the getters below.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateView {
    connected: bool,
    info: Option<RoomInfo>,
    sharing: bool,
    client_streams: Vec<ClientStreamView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientStreamView {
    id: String,
    peer_id: String,
    peer_name: Option<String>,
}

/// The room session coordinator: owns the signaling socket, both peer
/// session registries and the observable room state, and routes every
/// signaling message to the session it belongs to.
#[wasm_bindgen]
pub struct RoomEngine {
    inner: Rc<RefCell<EngineInner>>,
}

#[wasm_bindgen]
impl RoomEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<RoomEngine, JsValue> {
        let settings: Settings = if settings.is_undefined() || settings.is_null() {
            Settings::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| JsValue::from_str(&format!("invalid settings: {}", e)))?
        };

        let force_relay = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .map(|search| search.contains("forceTurn=true"))
            .unwrap_or(false);

        Ok(RoomEngine {
            inner: Rc::new(RefCell::new(EngineInner {
                ws: None,
                host: SessionRegistry::new(),
                client: SessionRegistry::new(),
                stream: None,
                state: RoomState::Disconnected,
                settings,
                first: true,
                joining: false,
                pending_connect: None,
                force_relay,
                on_notify: None,
                on_change: None,
            })),
        })
    }

    /// Callback for user-facing notifications: `(severity, message)` where
    /// severity is `"transient"` or `"persistent"`.
    #[wasm_bindgen(js_name = onNotify)]
    pub fn on_notify(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_notify = Some(callback);
    }

    /// Callback invoked with a state snapshot after every room mutation.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_change = Some(callback);
    }

    #[wasm_bindgen(js_name = state)]
    pub fn state_snapshot(&self) -> JsValue {
        let view = Self::view(&self.inner);
        serde_wasm_bindgen::to_value(&view).unwrap_or(JsValue::NULL)
    }

    /// The local outgoing capture, if sharing.
    #[wasm_bindgen(js_name = hostStream)]
    pub fn host_stream(&self) -> Option<MediaStream> {
        self.inner
            .borrow()
            .state
            .connected()
            .and_then(|room| room.host_stream.clone())
    }

    /// The remote stream of one session, if present.
    #[wasm_bindgen(js_name = clientStream)]
    pub fn client_stream(&self, sid: String) -> Option<MediaStream> {
        let sid = SessionId::from(sid);
        self.inner.borrow().state.connected().and_then(|room| {
            room.client_streams
                .iter()
                .find(|s| s.id == sid)
                .map(|s| s.stream.clone())
        })
    }

    /// Asks the server to rename this user. The server echoes the change
    /// back through a `room` update; local state is not touched here.
    #[wasm_bindgen(js_name = setName)]
    pub fn set_name(&self, name: String) {
        Self::send_on(&self.inner, &OutgoingMessage::Name { username: name });
    }
}

impl RoomEngine {
    fn view(inner: &Rc<RefCell<EngineInner>>) -> StateView {
        let inner = inner.borrow();
        match inner.state.connected() {
            Some(room) => StateView {
                connected: true,
                info: Some(room.info.clone()),
                sharing: room.host_stream.is_some(),
                client_streams: room
                    .client_streams
                    .iter()
                    .map(|s| ClientStreamView {
                        id: s.id.to_string(),
                        peer_id: s.peer_id.to_string(),
                        peer_name: room.user_for(&s.peer_id).map(|u| u.name.clone()),
                    })
                    .collect(),
            },
            None => StateView {
                connected: false,
                info: None,
                sharing: false,
                client_streams: Vec::new(),
            },
        }
    }

    /// Serializes and writes a message if the socket is open; silently
    /// drops it otherwise.
    pub(crate) fn send_on(inner: &Rc<RefCell<EngineInner>>, message: &OutgoingMessage) {
        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                Logger::warn(&format!("failed to serialize message: {}", e));
                return;
            }
        };
        let ws = inner.borrow().ws.clone();
        if let Some(ws) = ws {
            if ws.ready_state() == WebSocket::OPEN {
                let _ = ws.send_with_str(&json);
            }
        }
    }

    /// Surfaces an engine failure to the UI.
    pub(crate) fn notify(inner: &Rc<RefCell<EngineInner>>, error: &EngineError) {
        Self::notify_text(
            inner,
            match error.severity() {
                glimpse_core::Severity::Transient => "transient",
                glimpse_core::Severity::Persistent => "persistent",
            },
            &error.to_string(),
        );
    }

    pub(crate) fn notify_text(inner: &Rc<RefCell<EngineInner>>, severity: &str, text: &str) {
        let callback = inner.borrow().on_notify.clone();
        if let Some(callback) = callback {
            let _ = callback.call2(
                &JsValue::NULL,
                &JsValue::from_str(severity),
                &JsValue::from_str(text),
            );
        }
    }

    /// Pushes a fresh snapshot to the UI. The borrow is released before the
    /// callback runs, so the callback may call back into the engine.
    pub(crate) fn emit_change(inner: &Rc<RefCell<EngineInner>>) {
        let view = Self::view(inner);
        let callback = inner.borrow().on_change.clone();
        if let Some(callback) = callback {
            let snapshot = serde_wasm_bindgen::to_value(&view).unwrap_or(JsValue::NULL);
            let _ = callback.call1(&JsValue::NULL, &snapshot);
        }
    }
}
