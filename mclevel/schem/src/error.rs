use nbt_turbo::{Kind, ReadError};
use std::io;
use thiserror::Error;

/// Reasons a structure file cannot be turned into a valid voxel grid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedStructure {
	#[error("not a valid NBT document: {0}")]
	Nbt(#[from] ReadError),
	#[error("missing {0} tag")]
	MissingTag(&'static str),
	#[error("{name} should be {expected}, found {found}")]
	WrongKind { name: String, expected: &'static str, found: Kind },
	#[error("{name} must be a positive integer, found {value}")]
	BadDimension { name: &'static str, value: i64 },
	#[error("block data has {actual} entries, expected {expected} for a {width}x{height}x{length} grid")]
	LengthMismatch { width: u32, height: u32, length: u32, expected: u64, actual: usize },
	#[error("palette entry {name} has index {value}, outside of 0..=255")]
	IndexOutOfRange { name: String, value: i64 },
	#[error("palette index {index} is shared by {first} and {second}")]
	DuplicateIndex { index: u8, first: String, second: String },
	#[error("voxel {offset} uses palette index {index}, which has no palette entry")]
	UnmappedIndex { offset: usize, index: u8 }
}

#[derive(Debug, Error)]
pub enum SchematicError {
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
	#[error("malformed structure: {0}")]
	Malformed(#[from] MalformedStructure),
	#[error("palette entry is {0} bytes long, NBT names hold at most 65535")]
	NameTooLong(usize)
}
