//! Plain-data registry shared by the store backends.
//!
//! Holds every collection in creation order; ids come from a single
//! monotonically increasing sequence, so records are never renumbered.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{
    Canteen, CanteenId, CanteenState, Feed, FeedId, Message, MessageBody, Source, SourceId,
    Subject,
};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Registry {
    next_id: i64,
    feeds: Vec<Feed>,
    sources: Vec<Source>,
    canteens: Vec<Canteen>,
    messages: Vec<Message>,
}

impl Registry {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn feed(&self, id: FeedId) -> Option<Feed> {
        self.feeds.iter().find(|f| f.id == id).cloned()
    }

    pub fn feeds(&self) -> Vec<Feed> {
        self.feeds.clone()
    }

    pub fn add_feed(&mut self, name: &str, index_url: &str) -> Feed {
        let feed = Feed {
            id: self.next_id(),
            name: name.to_string(),
            index_url: index_url.to_string(),
        };
        self.feeds.push(feed.clone());
        feed
    }

    pub fn update_feed_url(&mut self, id: FeedId, new_url: &str) -> Result<()> {
        let feed = self
            .feeds
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::storage(format!("no feed with id {id}")))?;
        feed.index_url = new_url.to_string();
        Ok(())
    }

    pub fn sources_by_feed(&self, feed_id: FeedId) -> Vec<Source> {
        self.sources
            .iter()
            .filter(|s| s.feed_id == feed_id)
            .cloned()
            .collect()
    }

    pub fn add_source(
        &mut self,
        feed_id: FeedId,
        name: &str,
        meta_url: Option<&str>,
    ) -> Result<Source> {
        if self.feed(feed_id).is_none() {
            return Err(AppError::storage(format!("no feed with id {feed_id}")));
        }
        if self
            .sources
            .iter()
            .any(|s| s.feed_id == feed_id && s.name == name)
        {
            return Err(AppError::storage(format!(
                "feed {feed_id} already has a source named '{name}'"
            )));
        }

        let canteen = Canteen {
            id: self.next_id(),
            name: name.to_string(),
            state: CanteenState::Wanted,
        };
        let source = Source {
            id: self.next_id(),
            feed_id,
            canteen_id: canteen.id,
            name: name.to_string(),
            meta_url: meta_url.map(str::to_string),
        };
        self.canteens.push(canteen);
        self.sources.push(source.clone());
        Ok(source)
    }

    pub fn update_source_url(&mut self, id: SourceId, meta_url: Option<&str>) -> Result<()> {
        let source = self
            .sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::storage(format!("no source with id {id}")))?;
        source.meta_url = meta_url.map(str::to_string);
        Ok(())
    }

    pub fn canteen(&self, id: CanteenId) -> Option<Canteen> {
        self.canteens.iter().find(|c| c.id == id).cloned()
    }

    pub fn set_canteen_state(&mut self, id: CanteenId, state: CanteenState) -> Result<()> {
        let canteen = self
            .canteens
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::storage(format!("no canteen with id {id}")))?;
        canteen.state = state;
        Ok(())
    }

    pub fn append_message(&mut self, subject: Subject, body: MessageBody) -> Message {
        let message = Message {
            id: self.next_id(),
            subject,
            body,
            created_at: Utc::now(),
        };
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self, subject: Subject) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.subject == subject)
            .rev()
            .cloned()
            .collect()
    }
}
