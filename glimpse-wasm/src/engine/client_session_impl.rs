use std::cell::RefCell;
use std::rc::Rc;

use glimpse_core::model::{IceCandidate, IceServer, OutgoingMessage, P2pMessage, SessionId, UserId};
use glimpse_core::state::ClientStream;
use wasm_bindgen::prelude::*;

use crate::RoomEngine;
use crate::engine::EngineInner;

impl RoomEngine {
    /// Starts one inbound session from a remote broadcaster. The session
    /// produces no offer; it waits for the host's offer to be routed to it
    /// and surfaces the received track as a new client stream.
    pub(crate) fn start_client_session(
        inner: &Rc<RefCell<EngineInner>>,
        sid: SessionId,
        peer: UserId,
        ice_servers: Vec<IceServer>,
    ) -> Result<(), JsValue> {
        let pc = Self::create_pc(inner, &ice_servers)?;

        let onice = {
            let inner = inner.clone();
            let sid = sid.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcPeerConnectionIceEvent| {
                let Some(candidate) = ev.candidate() else {
                    return;
                };
                Self::send_on(
                    &inner,
                    &OutgoingMessage::ClientIce(P2pMessage {
                        sid: sid.clone(),
                        value: IceCandidate {
                            candidate: candidate.candidate(),
                            sdp_mid: candidate.sdp_mid(),
                            sdp_m_line_index: candidate.sdp_m_line_index(),
                            username_fragment: None,
                        },
                    }),
                );
            }) as Box<dyn FnMut(web_sys::RtcPeerConnectionIceEvent)>)
        };
        pc.set_onicecandidate(Some(onice.as_ref().unchecked_ref()));
        onice.forget();

        let ontrack = {
            let inner = inner.clone();
            let sid = sid.clone();
            let peer = peer.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcTrackEvent| {
                let stream = match web_sys::MediaStream::new() {
                    Ok(stream) => stream,
                    Err(e) => {
                        crate::logger::Logger::error(&e);
                        return;
                    }
                };
                stream.add_track(&ev.track());
                if let Some(room) = inner.borrow_mut().state.connected_mut() {
                    room.add_client_stream(ClientStream {
                        id: sid.clone(),
                        peer_id: peer.clone(),
                        stream,
                    });
                }
                Self::emit_change(&inner);
            }) as Box<dyn FnMut(web_sys::RtcTrackEvent)>)
        };
        pc.set_ontrack(Some(ontrack.as_ref().unchecked_ref()));
        ontrack.forget();

        {
            let inner = inner.clone();
            let sid = sid.clone();
            let this_pc = pc.clone();
            Self::watch_connection_state(&pc, move || {
                // A replacement session may own this id by now; only the
                // connection that registered the entry may take it out.
                let removed = inner
                    .borrow_mut()
                    .client
                    .remove_if(&sid, |current| current == &this_pc)
                    .is_some();
                if !removed {
                    return;
                }
                if let Some(room) = inner.borrow_mut().state.connected_mut() {
                    room.remove_session(&sid);
                }
                Self::emit_change(&inner);
            });
        }

        if let Some(previous) = inner.borrow_mut().client.insert(sid, pc) {
            previous.close();
        }
        Ok(())
    }
}
