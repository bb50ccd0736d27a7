//! A small NBT codec: an order-preserving tag tree, a streaming compound writer, and a reader.

pub mod reader;
pub mod tag;
pub mod writer;

pub use reader::{read_root, ReadError};
pub use tag::{Compound, Kind, List, Tag};
