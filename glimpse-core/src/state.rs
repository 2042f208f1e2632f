use crate::model::{RoomInfo, RoomUser, SessionId, UserId};
use std::collections::HashMap;

/// One incoming remote stream, keyed by its negotiation session.
/// `peer_id` may transiently not resolve to a user (the user already left);
/// lookups tolerate that.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientStream<S> {
    pub id: SessionId,
    pub peer_id: UserId,
    pub stream: S,
}

/// Everything the UI observes about the room the client is currently in.
/// `S` is the media-stream handle type; the browser engine instantiates it
/// with `web_sys::MediaStream`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedRoom<S> {
    pub info: RoomInfo,
    pub host_stream: Option<S>,
    pub client_streams: Vec<ClientStream<S>>,
}

impl<S> ConnectedRoom<S> {
    pub fn new(info: RoomInfo) -> Self {
        Self {
            info,
            host_stream: None,
            client_streams: Vec::new(),
        }
    }

    /// Replaces the room metadata, keeping the stream collections.
    pub fn merge_info(&mut self, info: RoomInfo) {
        self.info = info;
    }

    /// Appends a stream, replacing any previous one for the same session.
    pub fn add_client_stream(&mut self, stream: ClientStream<S>) {
        self.remove_session(&stream.id);
        self.client_streams.push(stream);
    }

    /// Drops the stream belonging to a session. Idempotent.
    pub fn remove_session(&mut self, id: &SessionId) {
        self.client_streams.retain(|s| &s.id != id);
    }

    /// Installs the outgoing capture, handing back any previous one so the
    /// caller can stop its tracks. There is at most one outgoing stream.
    pub fn set_host_stream(&mut self, stream: S) -> Option<S> {
        self.host_stream.replace(stream)
    }

    pub fn clear_host_stream(&mut self) -> Option<S> {
        self.host_stream.take()
    }

    pub fn user_for(&self, id: &UserId) -> Option<&RoomUser> {
        self.info.users.iter().find(|user| &user.id == id)
    }

    pub fn me(&self) -> Option<&RoomUser> {
        self.info.users.iter().find(|user| user.you)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RoomState<S> {
    #[default]
    Disconnected,
    Connected(ConnectedRoom<S>),
}

impl<S> RoomState<S> {
    pub fn connected(&self) -> Option<&ConnectedRoom<S>> {
        match self {
            RoomState::Connected(room) => Some(room),
            RoomState::Disconnected => None,
        }
    }

    pub fn connected_mut(&mut self) -> Option<&mut ConnectedRoom<S>> {
        match self {
            RoomState::Connected(room) => Some(room),
            RoomState::Disconnected => None,
        }
    }

    /// Whether an announced outbound session may start. Without a joined
    /// room and a local capture there is nothing to offer; the server may
    /// still announce sessions after sharing stopped.
    pub fn can_start_host_session(&self) -> bool {
        self.connected()
            .is_some_and(|room| room.host_stream.is_some())
    }
}

/// Which stream the UI has selected for the large view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedStream {
    /// The client's own outgoing capture.
    Mine,
    /// A remote stream, by session id.
    Remote(SessionId),
}

/// Coordinator-owned map of session id to connection handle for one role
/// (host side or viewer side; a session is never in both). Ids are unique:
/// inserting an existing id hands the previous handle back so the caller
/// can close it.
#[derive(Debug)]
pub struct SessionRegistry<H> {
    sessions: HashMap<SessionId, H>,
}

impl<H> SessionRegistry<H> {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: SessionId, handle: H) -> Option<H> {
        self.sessions.insert(id, handle)
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<H> {
        self.sessions.remove(id)
    }

    /// Removes the entry only if `matches` approves the stored handle.
    /// A torn-down session that was already replaced under the same id
    /// must not evict its replacement.
    pub fn remove_if(
        &mut self,
        id: &SessionId,
        matches: impl FnOnce(&H) -> bool,
    ) -> Option<H> {
        if self.sessions.get(id).map(matches).unwrap_or(false) {
            self.sessions.remove(id)
        } else {
            None
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<&H> {
        self.sessions.get(id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Empties the registry, handing every handle back for closing.
    pub fn drain(&mut self) -> Vec<(SessionId, H)> {
        self.sessions.drain().collect()
    }
}

impl<H> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoomMode, ShareMode};

    fn info(users: Vec<RoomUser>) -> RoomInfo {
        RoomInfo {
            id: "alpha-blue-fox".into(),
            share: ShareMode::Everyone,
            mode: RoomMode::Turn,
            users,
        }
    }

    fn user(id: &str, you: bool) -> RoomUser {
        RoomUser {
            id: id.into(),
            name: id.to_uppercase(),
            streaming: false,
            you,
            owner: false,
        }
    }

    #[test]
    fn registry_keeps_one_entry_per_id() {
        let mut registry: SessionRegistry<&'static str> = SessionRegistry::new();
        assert!(registry.insert("s1".into(), "a").is_none());
        assert!(registry.insert("s2".into(), "b").is_none());
        // Re-announcing an id replaces the handle and surfaces the old one.
        assert_eq!(registry.insert("s1".into(), "c"), Some("a"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&"s1".into()), Some(&"c"));
    }

    #[test]
    fn registry_remove_is_idempotent() {
        let mut registry: SessionRegistry<u8> = SessionRegistry::new();
        registry.insert("s1".into(), 1);
        assert_eq!(registry.remove(&"s1".into()), Some(1));
        assert_eq!(registry.remove(&"s1".into()), None);
    }

    #[test]
    fn stale_teardown_cannot_evict_replacement() {
        let mut registry: SessionRegistry<&'static str> = SessionRegistry::new();
        registry.insert("s1".into(), "old");
        assert_eq!(registry.insert("s1".into(), "new"), Some("old"));
        // The replaced connection's teardown fires later; its handle no
        // longer matches, so the entry stays.
        assert_eq!(registry.remove_if(&"s1".into(), |h| *h == "old"), None);
        assert_eq!(registry.get(&"s1".into()), Some(&"new"));
        // The live connection's own teardown still removes it.
        assert_eq!(registry.remove_if(&"s1".into(), |h| *h == "new"), Some("new"));
        assert!(registry.is_empty());
    }

    #[test]
    fn replacing_the_host_stream_hands_back_the_old_one() {
        let mut room: ConnectedRoom<&'static str> = ConnectedRoom::new(info(vec![]));
        assert_eq!(room.set_host_stream("first"), None);
        assert_eq!(room.set_host_stream("second"), Some("first"));
        assert_eq!(room.host_stream, Some("second"));
        assert_eq!(room.clear_host_stream(), Some("second"));
        assert_eq!(room.clear_host_stream(), None);
    }

    #[test]
    fn drain_hands_back_every_handle() {
        let mut registry: SessionRegistry<u8> = SessionRegistry::new();
        registry.insert("s1".into(), 1);
        registry.insert("s2".into(), 2);
        let mut drained = registry.drain();
        drained.sort_by(|a, b| a.0.0.cmp(&b.0.0));
        assert_eq!(drained, vec![("s1".into(), 1), ("s2".into(), 2)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn add_client_stream_replaces_same_session() {
        let mut room: ConnectedRoom<&'static str> = ConnectedRoom::new(info(vec![]));
        room.add_client_stream(ClientStream {
            id: "s1".into(),
            peer_id: "u1".into(),
            stream: "first",
        });
        room.add_client_stream(ClientStream {
            id: "s1".into(),
            peer_id: "u1".into(),
            stream: "second",
        });
        assert_eq!(room.client_streams.len(), 1);
        assert_eq!(room.client_streams[0].stream, "second");
    }

    #[test]
    fn remove_session_is_idempotent() {
        let mut room: ConnectedRoom<u8> = ConnectedRoom::new(info(vec![]));
        room.add_client_stream(ClientStream {
            id: "s1".into(),
            peer_id: "u1".into(),
            stream: 0,
        });
        room.remove_session(&"s1".into());
        room.remove_session(&"s1".into());
        assert!(room.client_streams.is_empty());
    }

    #[test]
    fn merge_info_keeps_streams() {
        let mut room: ConnectedRoom<u8> = ConnectedRoom::new(info(vec![user("u1", true)]));
        room.add_client_stream(ClientStream {
            id: "s1".into(),
            peer_id: "u2".into(),
            stream: 0,
        });
        room.merge_info(info(vec![user("u1", true), user("u2", false)]));
        assert_eq!(room.client_streams.len(), 1);
        assert_eq!(room.info.users.len(), 2);
    }

    #[test]
    fn user_lookup_tolerates_absent_peer() {
        let room: ConnectedRoom<u8> = ConnectedRoom::new(info(vec![user("u1", true)]));
        assert!(room.user_for(&"gone".into()).is_none());
        assert_eq!(room.me().map(|u| u.id.clone()), Some("u1".into()));
    }

    #[test]
    fn selected_stream_distinguishes_mine_from_remote() {
        assert_ne!(SelectedStream::Mine, SelectedStream::Remote("s1".into()));
        assert_eq!(
            SelectedStream::Remote("s1".into()),
            SelectedStream::Remote("s1".into())
        );
    }

    #[test]
    fn disconnected_state_has_no_room() {
        let mut state: RoomState<u8> = RoomState::default();
        assert!(state.connected().is_none());
        assert!(state.connected_mut().is_none());
        state = RoomState::Connected(ConnectedRoom::new(info(vec![])));
        assert!(state.connected().is_some());
    }
}
