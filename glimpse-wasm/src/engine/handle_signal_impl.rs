use std::cell::RefCell;
use std::rc::Rc;

use glimpse_core::EngineError;
use glimpse_core::model::{IceCandidate, IncomingMessage, OutgoingMessage, P2pMessage, SessionId};
use glimpse_core::state::{ConnectedRoom, RoomState};
use wasm_bindgen::prelude::*;

use crate::RoomEngine;
use crate::engine::EngineInner;
use crate::logger::Logger;

impl RoomEngine {
    pub(crate) fn handle_frame(inner: &Rc<RefCell<EngineInner>>, text: String) {
        let first = inner.borrow().first;

        let msg = match IncomingMessage::parse(&text) {
            Ok(msg) => msg,
            Err(e) => {
                Logger::warn(&format!("dropping frame: {}", e));
                if first {
                    Self::reject_first_frame(inner, "malformed");
                }
                return;
            }
        };

        if first {
            inner.borrow_mut().first = false;
            match msg.into_first_frame() {
                Ok(info) => {
                    Self::resolve_connect(inner);
                    let joining = inner.borrow().joining;
                    Self::record_room_id(&info.id);
                    inner.borrow_mut().state = RoomState::Connected(ConnectedRoom::new(info));
                    Self::notify_text(
                        inner,
                        "transient",
                        if joining { "Joined" } else { "Room Created" },
                    );
                    Self::emit_change(inner);
                }
                Err(tag) => Self::reject_first_frame(inner, tag),
            }
            return;
        }

        match msg {
            IncomingMessage::Room(info) => {
                if let Some(room) = inner.borrow_mut().state.connected_mut() {
                    room.merge_info(info);
                }
                Self::emit_change(inner);
            }
            IncomingMessage::HostSession(session) => {
                // Without a local stream there is nothing to offer; the
                // server may still announce sessions while we are idle.
                let stream = {
                    let inner = inner.borrow();
                    if inner.state.can_start_host_session() {
                        inner.stream.clone()
                    } else {
                        None
                    }
                };
                let Some(stream) = stream else {
                    return;
                };
                if let Err(e) =
                    Self::start_host_session(inner, session.id, session.ice_servers, stream)
                {
                    Logger::error(&e);
                }
            }
            IncomingMessage::ClientSession(session) => {
                if let Err(e) =
                    Self::start_client_session(inner, session.id, session.peer, session.ice_servers)
                {
                    Logger::error(&e);
                }
            }
            IncomingMessage::ClientIce(P2pMessage { sid, value }) => {
                let pc = inner.borrow().host.get(&sid).cloned();
                if let Some(pc) = pc {
                    Self::add_remote_candidate(&pc, value);
                }
            }
            IncomingMessage::ClientAnswer(P2pMessage { sid, value }) => {
                let pc = inner.borrow().host.get(&sid).cloned();
                if let Some(pc) = pc {
                    let desc = web_sys::RtcSessionDescriptionInit::new(
                        web_sys::RtcSdpType::Answer,
                    );
                    desc.set_sdp(&value.sdp);
                    let promise = pc.set_remote_description(&desc);
                    wasm_bindgen_futures::spawn_local(async move {
                        if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                            Logger::error(&e);
                        }
                    });
                }
            }
            IncomingMessage::HostOffer(P2pMessage { sid, value }) => {
                let pc = inner.borrow().client.get(&sid).cloned();
                let Some(pc) = pc else {
                    return;
                };
                let inner = inner.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = Self::answer_host_offer(&inner, &pc, sid, value.sdp).await {
                        Logger::error(&e);
                    }
                });
            }
            IncomingMessage::HostIce(P2pMessage { sid, value }) => {
                let pc = inner.borrow().client.get(&sid).cloned();
                if let Some(pc) = pc {
                    Self::add_remote_candidate(&pc, value);
                }
            }
            IncomingMessage::EndShare(sid) => {
                Self::end_session(inner, &sid);
            }
            IncomingMessage::Error(error) => {
                // Post-join server errors carry no session to clean up.
                Logger::warn(&format!("server error: {}", error.message));
            }
        }
    }

    /// The first frame on a connection must announce the room.
    fn reject_first_frame(inner: &Rc<RefCell<EngineInner>>, tag: &str) {
        inner.borrow_mut().first = false;
        Self::resolve_connect(inner);
        Self::notify(
            inner,
            &EngineError::Protocol(format!("unknown event: {}", tag)),
        );
        let ws = inner.borrow().ws.clone();
        if let Some(ws) = ws {
            let _ = ws.close_with_code_and_reason(1000, "received unknown event");
        }
    }

    /// Closes and removes the named session from whichever registry holds
    /// it and drops its stream from the room state. Idempotent.
    pub(crate) fn end_session(inner: &Rc<RefCell<EngineInner>>, sid: &SessionId) {
        let (host_pc, client_pc) = {
            let mut inner = inner.borrow_mut();
            (inner.host.remove(sid), inner.client.remove(sid))
        };
        if let Some(pc) = host_pc {
            pc.close();
        }
        if let Some(pc) = client_pc {
            pc.close();
        }
        if let Some(room) = inner.borrow_mut().state.connected_mut() {
            room.remove_session(sid);
        }
        Self::emit_change(inner);
    }

    fn add_remote_candidate(pc: &web_sys::RtcPeerConnection, candidate: IceCandidate) {
        let init = web_sys::RtcIceCandidateInit::new(&candidate.candidate);
        if let Some(mid) = candidate.sdp_mid {
            init.set_sdp_mid(Some(&mid));
        }
        if let Some(index) = candidate.sdp_m_line_index {
            init.set_sdp_m_line_index(Some(index));
        }

        let promise = pc.add_ice_candidate_with_opt_rtc_ice_candidate_init(Some(&init));
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                Logger::warn(&format!("error adding ICE candidate: {:?}", e));
            }
        });
    }

    async fn answer_host_offer(
        inner: &Rc<RefCell<EngineInner>>,
        pc: &web_sys::RtcPeerConnection,
        sid: SessionId,
        remote_sdp: String,
    ) -> Result<(), JsValue> {
        let offer = web_sys::RtcSessionDescriptionInit::new(web_sys::RtcSdpType::Offer);
        offer.set_sdp(&remote_sdp);
        wasm_bindgen_futures::JsFuture::from(pc.set_remote_description(&offer)).await?;

        let answer = wasm_bindgen_futures::JsFuture::from(pc.create_answer()).await?;
        let answer_sdp = js_sys::Reflect::get(&answer, &"sdp".into())?
            .as_string()
            .ok_or_else(|| JsValue::from_str("answer has no sdp"))?;

        let local = web_sys::RtcSessionDescriptionInit::new(web_sys::RtcSdpType::Answer);
        local.set_sdp(&answer_sdp);
        wasm_bindgen_futures::JsFuture::from(pc.set_local_description(&local)).await?;

        Self::send_on(
            inner,
            &OutgoingMessage::ClientAnswer(P2pMessage {
                sid,
                value: glimpse_core::model::SessionDescription {
                    kind: glimpse_core::model::SdpKind::Answer,
                    sdp: answer_sdp,
                },
            }),
        );
        Ok(())
    }

    /// Keeps the room id in the address bar so a reload rejoins.
    fn record_room_id(id: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(&format!("?room={}", id)));
        }
    }
}
