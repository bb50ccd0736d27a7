//! Sponge-style structure files: loading, block replacement, and saving.

pub mod batch;
pub mod block_list;
pub mod error;
pub mod grid;
pub mod gzip;
pub mod mapper;
pub mod mapping;
pub mod schematic;
pub mod spec;

pub use batch::{BatchReport, StructureBatch};
pub use block_list::BlockList;
pub use error::{MalformedStructure, SchematicError};
pub use grid::{Palette, VoxelGrid};
pub use mapper::{replace, ReplaceOutcome};
pub use mapping::{Mapping, MappingSet};
pub use schematic::{Compression, Schematic};
pub use spec::{BlockSpec, SpecError};
