use std::sync::Arc;
use tokio::sync::watch;
use crate::core::{Matcher, MatchError};
use crate::models::{MatchResult, UserProfile};

/// Shared snapshot of the candidate pool
pub type Snapshot = Arc<Vec<UserProfile>>;

/// Publish/subscribe channel for candidate-pool snapshots
///
/// Whatever listens to the profile store publishes a fresh snapshot on every
/// change; each subscription re-ranks against the latest one. Receivers only
/// ever see the newest snapshot, so a slow subscriber skips intermediate
/// ones instead of holding the publisher back.
pub struct ProfileFeed {
    sender: watch::Sender<Snapshot>,
}

impl ProfileFeed {
    pub fn new(initial: Vec<UserProfile>) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Replace the current snapshot and wake every subscription
    pub fn publish(&self, snapshot: Vec<UserProfile>) {
        let size = snapshot.len();
        self.sender.send_replace(Arc::new(snapshot));
        tracing::debug!(
            "Published snapshot of {} profiles to {} subscribers",
            size,
            self.sender.receiver_count()
        );
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Follow the pool on behalf of `requester`
    pub fn subscribe(&self, requester: UserProfile, matcher: Matcher) -> MatchSubscription {
        MatchSubscription {
            requester,
            matcher,
            receiver: self.sender.subscribe(),
        }
    }
}

/// Ranked matches for one requester, refreshed per snapshot
pub struct MatchSubscription {
    requester: UserProfile,
    matcher: Matcher,
    receiver: watch::Receiver<Snapshot>,
}

impl MatchSubscription {
    /// Rank the latest snapshot without waiting for a new one
    pub fn current(&mut self) -> Result<Vec<MatchResult>, MatchError> {
        let snapshot = self.receiver.borrow_and_update().clone();
        self.matcher.rank_matches(&self.requester, &snapshot)
    }

    /// Wait for the next snapshot and rank it
    ///
    /// Returns `None` once the feed has been dropped and every published
    /// snapshot has been seen.
    pub async fn next(&mut self) -> Option<Result<Vec<MatchResult>, MatchError>> {
        self.receiver.changed().await.ok()?;
        Some(self.current())
    }

    /// Swap in the requester's updated profile; takes effect on the next ranking
    pub fn update_requester(&mut self, requester: UserProfile) {
        self.requester = requester;
    }

    pub fn requester(&self) -> &UserProfile {
        &self.requester
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_profile(uid: &str, teach: &[&str], learn: &[&str]) -> UserProfile {
        UserProfile::new(
            uid,
            teach.iter().map(|s| s.to_string()).collect(),
            learn.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_subscription_reranks_on_publish() {
        let feed = ProfileFeed::new(vec![]);
        let requester = create_profile("u1", &["Guitar"], &["Spanish"]);
        let mut sub = feed.subscribe(requester, Matcher::with_default_weights());

        assert!(sub.current().unwrap().is_empty());

        feed.publish(vec![create_profile("u2", &["Spanish"], &["Guitar"])]);

        let matches = sub.next().await.unwrap().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.uid, "u2");
        assert_eq!(matches[0].score, 20);
    }

    #[tokio::test]
    async fn test_slow_subscriber_sees_latest_snapshot() {
        let feed = ProfileFeed::new(vec![]);
        let requester = create_profile("u1", &["Guitar"], &["Spanish"]);
        let mut sub = feed.subscribe(requester, Matcher::with_default_weights());

        feed.publish(vec![create_profile("u2", &["Spanish"], &["Guitar"])]);
        feed.publish(vec![
            create_profile("u2", &["Spanish"], &["Guitar"]),
            create_profile("u3", &["Spanish"], &["Guitar"]),
        ]);

        let matches = sub.next().await.unwrap().unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_feed_ends_subscription() {
        let feed = ProfileFeed::new(vec![]);
        let mut sub = feed.subscribe(
            create_profile("u1", &["Guitar"], &["Spanish"]),
            Matcher::with_default_weights(),
        );
        assert_eq!(feed.subscriber_count(), 1);

        drop(feed);

        assert!(sub.next().await.is_none());
    }

    #[test]
    fn test_requester_update_applies_to_next_ranking() {
        let feed = ProfileFeed::new(vec![create_profile("u2", &["Chess"], &["Cooking"])]);
        let mut sub = feed.subscribe(
            create_profile("u1", &["Guitar"], &["Spanish"]),
            Matcher::with_default_weights(),
        );
        assert!(sub.current().unwrap().is_empty());

        sub.update_requester(create_profile("u1", &["Cooking"], &["Chess"]));

        assert_eq!(sub.current().unwrap().len(), 1);
        assert_eq!(sub.requester().skills_to_teach, vec!["Cooking"]);
        assert_eq!(feed.snapshot().len(), 1);
    }
}
