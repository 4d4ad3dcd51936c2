//! Collective communication for hodmock
//!
//! This crate moves row sets between ranks:
//! - Communicator: byte-level collectives (gather, scatter, all-reduce)
//! - LocalCluster: in-process transport, one handle per rank
//! - wire: checksummed frames carrying a shard or an abort
//! - partition: balanced contiguous row partitioning
//! - Gatherer / ScatterDistributor: row-set level gather-to-one and
//!   scatter-evenly built on the above
//!
//! A gather followed by a scatter with nothing in between is a
//! content-preserving identity: gather concatenates in rank order and
//! scatter partitions in that same order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod communicator;
pub mod gather;
pub mod local;
pub mod partition;
pub mod scatter;
pub mod wire;

pub use communicator::Communicator;
pub use gather::Gatherer;
pub use local::{LocalCluster, LocalComm};
pub use partition::{balanced_counts, balanced_ranges};
pub use scatter::ScatterDistributor;
pub use wire::{decode_frame, encode_abort, encode_shard, Frame};
