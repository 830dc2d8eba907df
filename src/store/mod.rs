//! Read-only access to the collector's channel database.

pub mod channels;
pub mod pool;
pub mod rows;

#[cfg(test)]
pub(crate) mod test_fixture;

pub use channels::{ChannelStore, ReadSnapshot};
