use std::cell::RefCell;
use std::rc::Rc;

use glimpse_core::model::IceServer;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use crate::RoomEngine;
use crate::engine::EngineInner;

impl RoomEngine {
    /// Builds a peer connection from the ICE servers the signaling server
    /// handed out for this session. Both session roles construct their
    /// connection here.
    pub(crate) fn create_pc(
        inner: &Rc<RefCell<EngineInner>>,
        ice_servers: &[IceServer],
    ) -> Result<web_sys::RtcPeerConnection, JsValue> {
        let rtc_config = web_sys::RtcConfiguration::new();
        let ice_servers_arr = js_sys::Array::new();

        for server in ice_servers {
            let rtc_ice_server = web_sys::RtcIceServer::new();

            let urls = js_sys::Array::new();
            for url in &server.urls {
                urls.push(&JsValue::from_str(url));
            }
            rtc_ice_server.set_urls(&urls);

            if !server.username.is_empty() {
                rtc_ice_server.set_username(&server.username);
            }
            if !server.credential.is_empty() {
                rtc_ice_server.set_credential(&server.credential);
            }

            ice_servers_arr.push(&rtc_ice_server);
        }

        rtc_config.set_ice_servers(&ice_servers_arr);

        if inner.borrow().force_relay {
            rtc_config.set_ice_transport_policy(web_sys::RtcIceTransportPolicy::Relay);
        }

        web_sys::RtcPeerConnection::new_with_configuration(&rtc_config)
    }

    /// Wires a connection-state watcher that closes the connection and runs
    /// `teardown` exactly once when the connection reaches
    /// closed/disconnected/failed.
    pub(crate) fn watch_connection_state(
        pc: &web_sys::RtcPeerConnection,
        mut teardown: impl FnMut() + 'static,
    ) {
        let done = std::cell::Cell::new(false);
        let pc_clone = pc.clone();
        let onstatechange = Closure::wrap(Box::new(move |_: JsValue| {
            match pc_clone.connection_state() {
                web_sys::RtcPeerConnectionState::Closed
                | web_sys::RtcPeerConnectionState::Disconnected
                | web_sys::RtcPeerConnectionState::Failed => {
                    if done.get() {
                        return;
                    }
                    done.set(true);
                    pc_clone.close();
                    teardown();
                }
                _ => {}
            }
        }) as Box<dyn FnMut(JsValue)>);

        pc.set_onconnectionstatechange(Some(onstatechange.as_ref().unchecked_ref()));
        onstatechange.forget();
    }
}
