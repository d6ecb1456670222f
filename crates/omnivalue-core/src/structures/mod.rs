/// Core reusable data structures
pub mod shared_buffer;
pub mod map_pool;
pub mod map_store;

// Export the main types
pub use shared_buffer::SharedBuffer;
pub use map_pool::{map_pool, MapPool, PoolStats};
pub use map_store::{EntryEdit, MapEntry, MapStore};
