//! Messages a session posts on its own, outside any command reply.

use std::sync::Arc;

use serenity::all::{ChannelId, CreateMessage, Http};
use tracing::warn;

use super::embedded_messages;

/// Something a session reports to the text channel of the last play request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    /// The queue advanced to this track.
    NowPlaying { title: String },
    /// A queued track was passed over because it could not be resolved or started.
    Unplayable { title: String },
}

/// Delivers announcements. Must not block: sessions call this from their
/// command loop.
pub trait Announcer: Send + Sync {
    fn announce(&self, channel: ChannelId, announcement: Announcement);
}

/// Posts announcements as embeds through the Discord HTTP API.
pub struct ChannelAnnouncer {
    http: Arc<Http>,
}

impl ChannelAnnouncer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl Announcer for ChannelAnnouncer {
    fn announce(&self, channel: ChannelId, announcement: Announcement) {
        let http = self.http.clone();

        tokio::spawn(async move {
            let message =
                CreateMessage::new().embed(embedded_messages::announcement(&announcement));

            if let Err(e) = channel.send_message(http, message).await {
                warn!("Failed to post {:?} in channel {}: {}", announcement, channel, e);
            }
        });
    }
}
