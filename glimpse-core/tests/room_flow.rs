use glimpse_core::model::{
    CreateRoom, IncomingMessage, OutgoingMessage, P2pMessage, RoomRequest, SdpKind,
    SessionDescription,
};
use glimpse_core::state::{ClientStream, ConnectedRoom, RoomState, SessionRegistry};
use glimpse_core::{RoomMode, SessionId};

/// Stand-in for a peer connection handle; records whether it was closed.
#[derive(Debug, PartialEq)]
struct FakePeer {
    closed: bool,
}

impl FakePeer {
    fn new() -> Self {
        Self { closed: false }
    }
}

#[test]
fn create_room_handshake() {
    // The coordinator sends the create request as the first frame.
    let mut request = RoomRequest::Create(CreateRoom {
        id: "alpha-blue-fox".into(),
        mode: RoomMode::Turn,
        close_on_owner_leave: true,
        join_if_exist: true,
        username: None,
    });
    request.set_username(Some("ada".into()));
    let json = OutgoingMessage::from(request).to_json().unwrap();
    assert!(json.contains(r#""type":"create""#));
    assert!(json.contains(r#""username":"ada""#));

    // The first inbound frame must be a room message; it populates the state.
    let first = IncomingMessage::parse(
        r#"{"type":"room","payload":{"id":"alpha-blue-fox","share":"Everyone","mode":"turn","users":[{"id":"u1","name":"ada","streaming":false,"you":true,"owner":true}]}}"#,
    )
    .unwrap();
    let info = first.into_first_frame().expect("room opens the session");
    assert_eq!(info.id, "alpha-blue-fox");
    let state: RoomState<String> = RoomState::Connected(ConnectedRoom::new(info));
    assert!(state.connected().is_some());
}

#[test]
fn unexpected_first_message_is_rejected_with_its_tag() {
    let first =
        IncomingMessage::parse(r#"{"type":"Error","payload":{"message":"bad room"}}"#).unwrap();
    // Classification fails, surfacing the offending tag for the close
    // reason; no room state comes out of it.
    assert_eq!(first.into_first_frame(), Err("Error"));

    let first = IncomingMessage::parse(r#"{"type":"endshare","payload":"s1"}"#).unwrap();
    assert_eq!(first.into_first_frame(), Err("endshare"));
}

#[test]
fn hostsession_without_a_local_stream_starts_no_session() {
    let announced = IncomingMessage::parse(
        r#"{"type":"hostsession","payload":{"id":"s1","peer":"u9","iceServers":[]}}"#,
    )
    .unwrap();
    let IncomingMessage::HostSession(session) = announced else {
        panic!("expected hostsession");
    };

    let mut state: RoomState<&'static str> = RoomState::Connected(ConnectedRoom::new(
        serde_json::from_str(
            r#"{"id":"alpha-blue-fox","share":"Everyone","mode":"turn","users":[]}"#,
        )
        .unwrap(),
    ));
    let mut host: SessionRegistry<FakePeer> = SessionRegistry::new();

    // Nothing to offer yet: the announcement is dropped on the floor.
    assert!(!state.can_start_host_session());
    if state.can_start_host_session() {
        host.insert(session.id.clone(), FakePeer::new());
    }
    assert!(host.is_empty());

    // Once a capture exists, the same announcement starts a session.
    state
        .connected_mut()
        .unwrap()
        .set_host_stream("display-capture");
    assert!(state.can_start_host_session());
    if state.can_start_host_session() {
        host.insert(session.id.clone(), FakePeer::new());
    }
    assert_eq!(host.len(), 1);

    // Disconnected clients never offer.
    let gone: RoomState<&'static str> = RoomState::Disconnected;
    assert!(!gone.can_start_host_session());
}

#[test]
fn endshare_removes_session_from_either_registry_and_the_stream_list() {
    let mut host: SessionRegistry<FakePeer> = SessionRegistry::new();
    let mut client: SessionRegistry<FakePeer> = SessionRegistry::new();
    host.insert("s1".into(), FakePeer::new());
    client.insert("s2".into(), FakePeer::new());

    let mut room: ConnectedRoom<&'static str> = ConnectedRoom::new(
        serde_json::from_str(
            r#"{"id":"alpha-blue-fox","share":"Everyone","mode":"turn","users":[]}"#,
        )
        .unwrap(),
    );
    room.add_client_stream(ClientStream {
        id: "s2".into(),
        peer_id: "u9".into(),
        stream: "remote",
    });

    let end = |sid: &SessionId,
               host: &mut SessionRegistry<FakePeer>,
               client: &mut SessionRegistry<FakePeer>,
               room: &mut ConnectedRoom<&'static str>| {
        for registry in [host, client] {
            if let Some(mut peer) = registry.remove(sid) {
                peer.closed = true;
            }
        }
        room.remove_session(sid);
    };

    end(&"s2".into(), &mut host, &mut client, &mut room);
    assert!(client.is_empty());
    assert_eq!(host.len(), 1);
    assert!(room.client_streams.is_empty());

    // Ending an absent session is a no-op.
    end(&"s2".into(), &mut host, &mut client, &mut room);
    assert_eq!(host.len(), 1);
}

#[test]
fn viewer_answers_a_host_offer_for_a_known_session() {
    let mut client: SessionRegistry<FakePeer> = SessionRegistry::new();
    client.insert("s2".into(), FakePeer::new());

    let offer = IncomingMessage::parse(
        r#"{"type":"hostoffer","payload":{"sid":"s2","value":{"type":"offer","sdp":"v=0\r\n"}}}"#,
    )
    .unwrap();
    let IncomingMessage::HostOffer(P2pMessage { sid, value }) = offer else {
        panic!("expected hostoffer");
    };
    assert!(client.contains(&sid));
    assert_eq!(value.kind, SdpKind::Offer);

    let answer = OutgoingMessage::ClientAnswer(P2pMessage {
        sid,
        value: SessionDescription {
            kind: SdpKind::Answer,
            sdp: "v=0\r\n".into(),
        },
    });
    let json = answer.to_json().unwrap();
    assert!(json.contains(r#""type":"clientanswer""#));
    assert!(json.contains(r#""sid":"s2""#));
}

#[test]
fn stop_share_drains_every_host_session() {
    let mut host: SessionRegistry<FakePeer> = SessionRegistry::new();
    host.insert("s1".into(), FakePeer::new());
    host.insert("s3".into(), FakePeer::new());

    let mut closed = 0;
    for (_, mut peer) in host.drain() {
        peer.closed = true;
        closed += 1;
    }
    assert_eq!(closed, 2);
    assert!(host.is_empty());
}
