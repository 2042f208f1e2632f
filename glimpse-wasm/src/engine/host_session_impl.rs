use std::cell::RefCell;
use std::rc::Rc;

use glimpse_core::model::{IceCandidate, IceServer, OutgoingMessage, P2pMessage, SessionId};
use glimpse_core::model::{SdpKind, SessionDescription};
use wasm_bindgen::prelude::*;
use web_sys::MediaStream;

use crate::RoomEngine;
use crate::engine::EngineInner;
use crate::logger::Logger;

impl RoomEngine {
    /// Starts one outbound session towards a viewer: attaches the local
    /// capture, applies the codec preference, then offers. The connection
    /// is registered before the asynchronous offer work so that answer and
    /// ICE frames for this session always find it.
    pub(crate) fn start_host_session(
        inner: &Rc<RefCell<EngineInner>>,
        sid: SessionId,
        ice_servers: Vec<IceServer>,
        stream: MediaStream,
    ) -> Result<(), JsValue> {
        let pc = Self::create_pc(inner, &ice_servers)?;

        let onice = {
            let inner = inner.clone();
            let sid = sid.clone();
            Closure::wrap(Box::new(move |ev: web_sys::RtcPeerConnectionIceEvent| {
                // The null candidate marks end-of-candidates.
                let Some(candidate) = ev.candidate() else {
                    return;
                };
                Self::send_on(
                    &inner,
                    &OutgoingMessage::HostIce(P2pMessage {
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

        {
            let inner = inner.clone();
            let sid = sid.clone();
            let this_pc = pc.clone();
            Self::watch_connection_state(&pc, move || {
                // A replacement session may own this id by now; only the
                // connection that registered the entry may take it out.
                inner
                    .borrow_mut()
                    .host
                    .remove_if(&sid, |current| current == &this_pc);
            });
        }

        for track in stream.get_tracks().iter() {
            let track: web_sys::MediaStreamTrack = track.unchecked_into();
            pc.add_track(&track, &stream, &js_sys::Array::new());
        }

        Self::apply_codec_preference(inner, &pc);

        if let Some(previous) = inner.borrow_mut().host.insert(sid.clone(), pc.clone()) {
            previous.close();
        }

        let inner = inner.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = Self::send_host_offer(&inner, &pc, sid).await {
                Logger::error(&e);
            }
        });
        Ok(())
    }

    async fn send_host_offer(
        inner: &Rc<RefCell<EngineInner>>,
        pc: &web_sys::RtcPeerConnection,
        sid: SessionId,
    ) -> Result<(), JsValue> {
        let options = web_sys::RtcOfferOptions::new();
        options.set_offer_to_receive_video(true);

        let offer =
            wasm_bindgen_futures::JsFuture::from(pc.create_offer_with_rtc_offer_options(&options))
                .await?;
        let offer_sdp = js_sys::Reflect::get(&offer, &"sdp".into())?
            .as_string()
            .ok_or_else(|| JsValue::from_str("offer has no sdp"))?;

        let local = web_sys::RtcSessionDescriptionInit::new(web_sys::RtcSdpType::Offer);
        local.set_sdp(&offer_sdp);
        wasm_bindgen_futures::JsFuture::from(pc.set_local_description(&local)).await?;

        Self::send_on(
            inner,
            &OutgoingMessage::HostOffer(P2pMessage {
                sid,
                value: SessionDescription {
                    kind: SdpKind::Offer,
                    sdp: offer_sdp,
                },
            }),
        );
        Ok(())
    }
}
