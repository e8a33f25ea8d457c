// Cache module.
// Key/value stores with max-age, the repository snapshot, and the clock they share.

pub mod clock;
pub mod entry;
pub mod paths;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use entry::{
    CACHE_KEY, CacheEntry, DEFAULT_TTL, FeedData, SNAPSHOT_RETENTION, read_entry, write_entry,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
