// Service exports
pub mod appwrite;
pub mod cache;
pub mod feed;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use cache::{CacheManager, CacheKey, CacheError};
pub use feed::{ProfileFeed, MatchSubscription, Snapshot};
