//! User identity -> open channels.

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::channel::ChannelHandle;

/// Maps each user identity to its ordered list of open channels.
///
/// The registry is the sole mutator of the mapping; connection handlers go
/// through [`attach`](Self::attach)/[`detach`](Self::detach) and never hold
/// a private copy. Mutations for one user serialize on that user's map
/// entry; [`channels_for`](Self::channels_for) returns a snapshot that is
/// safe to iterate while a concurrent detach runs.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    channels: DashMap<String, Vec<ChannelHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a channel to the user's list, creating the list on first
    /// attach. Duplicate channels per user are allowed, one per client
    /// window.
    pub fn attach(&self, user_id: impl Into<String>, channel: ChannelHandle) {
        let user_id = user_id.into();
        debug!("Attaching channel {} for user {}", channel.id(), user_id);
        self.channels.entry(user_id).or_default().push(channel);
    }

    /// Remove a channel if present. Idempotent: detaching an already-absent
    /// channel is a no-op. A user whose last channel detaches is removed
    /// from the registry entirely.
    pub fn detach(&self, user_id: &str, channel_id: Uuid) {
        let emptied = match self.channels.get_mut(user_id) {
            Some(mut entry) => {
                entry.retain(|c| c.id() != channel_id);
                entry.is_empty()
            }
            None => return,
        };
        if emptied {
            self.channels
                .remove_if(user_id, |_, channels| channels.is_empty());
            debug!("User {} has no channels left, removed", user_id);
        }
    }

    /// Snapshot of the user's channels in attach order; empty when the user
    /// has none.
    pub fn channels_for(&self, user_id: &str) -> Vec<ChannelHandle> {
        self.channels
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// All user identities with at least one open channel.
    pub fn users(&self) -> Vec<String> {
        self.channels.iter().map(|e| e.key().clone()).collect()
    }

    pub fn user_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of open channels for one user.
    pub fn channel_count(&self, user_id: &str) -> usize {
        self.channels.get(user_id).map(|e| e.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::ServerFrame;
    use tokio::sync::mpsc;

    fn test_channel() -> (ChannelHandle, mpsc::UnboundedReceiver<ServerFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelHandle::new(tx), rx)
    }

    #[test]
    fn test_attach_preserves_insertion_order() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = test_channel();
        let (b, _rx_b) = test_channel();
        let (c, _rx_c) = test_channel();
        let ids = [a.id(), b.id(), c.id()];

        registry.attach("user-1", a);
        registry.attach("user-1", b);
        registry.attach("user-1", c);

        let snapshot = registry.channels_for("user-1");
        let snapshot_ids: Vec<_> = snapshot.iter().map(|c| c.id()).collect();
        assert_eq!(snapshot_ids, ids);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let registry = SessionRegistry::new();
        let (a, _rx) = test_channel();
        let id = a.id();
        registry.attach("user-1", a);

        registry.detach("user-1", id);
        registry.detach("user-1", id); // already gone: no-op
        registry.detach("nobody", id); // unknown user: no-op

        assert_eq!(registry.channel_count("user-1"), 0);
    }

    #[test]
    fn test_last_detach_removes_the_user_entry() {
        let registry = SessionRegistry::new();
        let (a, _rx) = test_channel();
        let id = a.id();
        registry.attach("user-1", a);
        assert_eq!(registry.users(), vec!["user-1".to_string()]);

        registry.detach("user-1", id);
        assert!(registry.channels_for("user-1").is_empty());
        assert!(registry.users().is_empty());
        assert_eq!(registry.user_count(), 0);
    }

    #[tokio::test]
    async fn test_fan_out_reaches_all_channels_in_attach_order() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = test_channel();
        let (b, mut rx_b) = test_channel();
        let (c, mut rx_c) = test_channel();
        registry.attach("user-1", a);
        registry.attach("user-1", b);
        registry.attach("user-1", c);

        for channel in registry.channels_for("user-1") {
            channel.send(ServerFrame::system("update")).unwrap();
        }

        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            match rx.recv().await.unwrap() {
                ServerFrame::SystemMessage { text } => assert_eq!(text, "update"),
                other => panic!("unexpected frame: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_send_mid_broadcast_does_not_abort_delivery() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = test_channel();
        let (b, rx_b) = test_channel();
        let (c, mut rx_c) = test_channel();
        registry.attach("user-1", a);
        registry.attach("user-1", b);
        registry.attach("user-1", c);

        // Simulate the middle client vanishing before the broadcast.
        drop(rx_b);

        let mut delivered = 0;
        for channel in registry.channels_for("user-1") {
            match channel.send(ServerFrame::narrative("the story continues")) {
                Ok(()) => delivered += 1,
                Err(_) => registry.detach("user-1", channel.id()),
            }
        }

        assert_eq!(delivered, 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_c.recv().await.is_some());
        assert_eq!(registry.channel_count("user-1"), 2);
    }
}
