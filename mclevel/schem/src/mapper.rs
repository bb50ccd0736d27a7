//! Block replacement on a single grid.
//!
//! Replacement works on the palette whenever possible. A bare source renames every state of
//! the block and keeps each entry's properties, an exact source re-keys one entry. The block
//! buffer is only rewritten when a renamed entry lands on a key that already exists, in which
//! case the two entries are merged into the existing one.
use crate::grid::VoxelGrid;
use crate::spec::{bare_name, property_suffix, BlockSpec};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReplaceOutcome {
	/// Source and target are the same spec.
	NoOp,
	/// No palette entry matches the source.
	NotFound,
	/// A bare source was given a target with properties while the target block already
	/// appears with properties, which would leave ambiguous states behind.
	ConflictingProperties,
	/// Palette entries were re-keyed in place, the block buffer is untouched.
	Renamed { entries: usize },
	/// At least one entry was folded into an existing entry and its voxels rewritten.
	Merged { entries: usize, voxels: usize }
}

impl ReplaceOutcome {
	/// Number of palette entries changed, if anything changed.
	pub fn affected(&self) -> Option<usize> {
		match *self {
			ReplaceOutcome::Renamed { entries } | ReplaceOutcome::Merged { entries, .. } => Some(entries),
			_ => None
		}
	}

	pub fn is_change(&self) -> bool {
		self.affected().is_some()
	}
}

impl Display for ReplaceOutcome {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match *self {
			ReplaceOutcome::NoOp => f.write_str("source and replacement are identical, nothing to replace"),
			ReplaceOutcome::NotFound => f.write_str("no matching blocks found"),
			ReplaceOutcome::ConflictingProperties => f.write_str("remove the properties of the replacement block to prevent conflicts"),
			ReplaceOutcome::Renamed { entries } => write!(f, "replaced {} palette {}", entries, plural(entries)),
			ReplaceOutcome::Merged { entries, voxels } => write!(f, "replaced {} palette {}, {} voxels merged", entries, plural(entries), voxels)
		}
	}
}

fn plural(count: usize) -> &'static str {
	if count == 1 { "entry" } else { "entries" }
}

/// Replaces `source` with `target` in the grid.
///
/// The grid is left untouched unless the outcome is `Renamed` or `Merged`.
pub fn replace(grid: &mut VoxelGrid, source: &BlockSpec, target: &BlockSpec) -> ReplaceOutcome {
	let palette = grid.palette();

	if !source.has_properties() && target.has_properties() {
		let conflict = palette.iter()
			.any(|(entry, _)| bare_name(entry) == target.bare() && entry.len() != target.bare().len());

		if conflict {
			return ReplaceOutcome::ConflictingProperties;
		}
	}

	if source == target {
		return ReplaceOutcome::NoOp;
	}

	// Collect first, then mutate.
	let changes: Vec<(String, u8, String)> = palette.iter()
		.filter(|(entry, _)| source.matches(entry))
		.map(|(entry, index)| (entry.to_owned(), index, renamed(entry, source, target)))
		.collect();

	if changes.is_empty() {
		return ReplaceOutcome::NotFound;
	}

	let entries = changes.len();
	let mut voxels = 0;
	let mut merged = false;

	for (old, index, new) in changes {
		match grid.palette().get(&new) {
			Some(existing) => {
				voxels += grid.remap(index, existing);
				grid.palette_mut().remove(&old);
				merged = true;
			},
			None => {
				grid.palette_mut().rename(&old, new);
			}
		}
	}

	if merged {
		ReplaceOutcome::Merged { entries, voxels }
	} else {
		ReplaceOutcome::Renamed { entries }
	}
}

/// New palette key for an entry matched by `source`.
fn renamed(entry: &str, source: &BlockSpec, target: &BlockSpec) -> String {
	if source.has_properties() {
		target.as_str().to_owned()
	} else {
		// Only the block name changes, each state keeps its own properties.
		format!("{}{}", target.bare(), property_suffix(entry))
	}
}
