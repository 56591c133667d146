pub mod kv;
pub mod model;
pub mod ranking;
pub mod storage;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use model::{Record, SessionInfo, User, UserType};
pub use ranking::{ModeFilter, Ranking, rank_label};
pub use storage::Storage;
