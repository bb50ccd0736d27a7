use crate::error::SchematicError;
use crate::mapper::{self, ReplaceOutcome};
use crate::mapping::{Mapping, MappingSet};
use crate::schematic::Schematic;
use crate::spec::bare_name;
use log::{error, info};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// A loaded structure, or the reason it could not be loaded.
#[derive(Debug)]
pub struct BatchEntry {
	pub path: PathBuf,
	pub structure: Result<Schematic, SchematicError>
}

/// Structures that are edited together. Each structure is independent: one that fails to
/// load or save never stops the others.
#[derive(Debug, Default)]
pub struct StructureBatch {
	entries: Vec<BatchEntry>,
	unsaved_changes: bool
}

impl StructureBatch {
	pub fn load<I, P>(paths: I) -> Self where I: IntoIterator<Item = P>, P: Into<PathBuf> {
		let entries = paths.into_iter().map(|path| {
			let path = path.into();
			let structure = Schematic::load(&path);

			match structure {
				Ok(ref schematic) => info!("loaded {} ({} palette entries)", path.display(), schematic.grid().palette_max()),
				Err(ref e) => error!("failed to load {}: {}", path.display(), e)
			}

			BatchEntry { path, structure }
		}).collect();

		StructureBatch { entries, unsaved_changes: false }
	}

	pub fn from_entries(entries: Vec<BatchEntry>) -> Self {
		StructureBatch { entries, unsaved_changes: false }
	}

	pub fn entries(&self) -> &[BatchEntry] {
		&self.entries
	}

	/// Successfully loaded structures.
	pub fn structures(&self) -> impl Iterator<Item = (&Path, &Schematic)> {
		self.entries.iter().filter_map(|entry| entry.structure.as_ref().ok().map(|schematic| (entry.path.as_path(), schematic)))
	}

	pub fn unsaved_changes(&self) -> bool {
		self.unsaved_changes
	}

	/// Applies every mapping, in order, to every loaded structure.
	pub fn apply(&mut self, mappings: &MappingSet) -> BatchReport {
		let mut lines = Vec::new();

		for entry in &mut self.entries {
			let schematic = match entry.structure {
				Ok(ref mut schematic) => schematic,
				Err(ref e) => {
					lines.push(ReportLine { path: entry.path.clone(), mapping: None, result: Err(e.to_string()) });
					continue;
				}
			};

			for mapping in mappings {
				let outcome = mapper::replace(schematic.grid_mut(), &mapping.source, &mapping.target);

				if outcome.is_change() {
					self.unsaved_changes = true;
				}

				lines.push(ReportLine { path: entry.path.clone(), mapping: Some(mapping.clone()), result: Ok(outcome) });
			}
		}

		BatchReport { lines }
	}

	/// Overwrites the original files.
	pub fn save(&mut self) -> Vec<(PathBuf, Result<(), SchematicError>)> {
		self.save_with(|path| path.to_path_buf())
	}

	/// Writes `<stem>_copy.schem` next to each original file.
	pub fn save_copies(&mut self) -> Vec<(PathBuf, Result<(), SchematicError>)> {
		self.save_with(copy_path)
	}

	fn save_with<F>(&mut self, destination: F) -> Vec<(PathBuf, Result<(), SchematicError>)> where F: Fn(&Path) -> PathBuf {
		let results: Vec<_> = self.structures().map(|(path, schematic)| {
			let destination = destination(path);
			let result = schematic.save(&destination);

			match result {
				Ok(()) => info!("saved {}", destination.display()),
				Err(ref e) => error!("failed to save {}: {}", destination.display(), e)
			}

			(destination, result)
		}).collect();

		if results.iter().all(|(_, result)| result.is_ok()) {
			self.unsaved_changes = false;
		}

		results
	}

	/// Every palette entry across the loaded structures, sorted by name without namespace.
	pub fn unique_blocks(&self) -> Vec<String> {
		let unique: BTreeSet<&str> = self.structures()
			.flat_map(|(_, schematic)| schematic.grid().palette().iter().map(|(name, _)| name))
			.collect();

		let mut blocks: Vec<String> = unique.into_iter().map(str::to_owned).collect();
		blocks.sort_by(|a, b| without_namespace(a).cmp(without_namespace(b)).then_with(|| a.cmp(b)));

		blocks
	}

	/// Bare block names across the loaded structures, for the known block list.
	pub fn unique_bare_blocks(&self) -> BTreeSet<String> {
		self.structures()
			.flat_map(|(_, schematic)| schematic.grid().palette().iter().map(|(name, _)| bare_name(name).to_owned()))
			.collect()
	}
}

fn without_namespace(name: &str) -> &str {
	match name.find(':') {
		Some(colon) => &name[colon + 1..],
		None => name
	}
}

pub fn copy_path(path: &Path) -> PathBuf {
	let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();

	path.with_file_name(format!("{}_copy.schem", stem))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
	pub path: PathBuf,
	/// Absent when the structure itself could not be loaded.
	pub mapping: Option<Mapping>,
	pub result: Result<ReplaceOutcome, String>
}

impl Display for ReportLine {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		let name = self.path.file_name().map(|name| name.to_string_lossy()).unwrap_or_else(|| self.path.to_string_lossy());

		match (&self.mapping, &self.result) {
			(Some(mapping), Ok(outcome)) => write!(f, "{}: {}: {}", name, mapping, outcome),
			(Some(mapping), Err(e)) => write!(f, "{}: {}: {}", name, mapping, e),
			(None, Ok(outcome)) => write!(f, "{}: {}", name, outcome),
			(None, Err(e)) => write!(f, "{}: {}", name, e)
		}
	}
}

/// Outcome of every (structure, mapping) pair, in the order they were processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
	pub lines: Vec<ReportLine>
}

impl BatchReport {
	pub fn changed(&self) -> usize {
		self.lines.iter().filter(|line| matches!(line.result, Ok(outcome) if outcome.is_change())).count()
	}

	pub fn failed(&self) -> usize {
		self.lines.iter().filter(|line| line.result.is_err()).count()
	}
}

impl Display for BatchReport {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		for line in &self.lines {
			writeln!(f, "{}", line)?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schematic::tests::structure;
	use std::env;
	use std::fs;
	use std::process;

	fn scratch_dir(name: &str) -> PathBuf {
		let dir = env::temp_dir().join(format!("schem-batch-{}-{}", name, process::id()));
		fs::create_dir_all(&dir).unwrap();

		dir
	}

	#[test]
	fn failures_are_isolated() {
		let dir = scratch_dir("isolated");
		let good = dir.join("house.schem");
		let bad = dir.join("broken.schem");
		let missing = dir.join("missing.schem");

		fs::write(&good, structure(2, 1, 1, &[("minecraft:air", 0), ("minecraft:oak_log[axis=y]", 1)], &[1, 0])).unwrap();
		fs::write(&bad, structure(2, 2, 2, &[("minecraft:air", 0)], &[0; 3])).unwrap();

		let mut batch = StructureBatch::load(vec![bad.clone(), missing.clone(), good.clone()]);
		assert_eq!(batch.structures().count(), 1);

		let mut mappings = MappingSet::new();
		mappings.push_str("minecraft:oak_log", "minecraft:birch_log").unwrap();
		mappings.push_str("minecraft:stone", "minecraft:dirt").unwrap();

		let report = batch.apply(&mappings);

		assert_eq!(report.lines.len(), 4);
		assert_eq!(report.failed(), 2);
		assert_eq!(report.changed(), 1);
		assert_eq!(report.lines[0].path, bad);
		assert_eq!(report.lines[2].result, Ok(ReplaceOutcome::Renamed { entries: 1 }));
		assert_eq!(report.lines[3].result, Ok(ReplaceOutcome::NotFound));
		assert_eq!(report.lines[2].to_string(), "house.schem: minecraft:oak_log -> minecraft:birch_log: replaced 1 palette entry");
		assert!(batch.unsaved_changes());

		let saved = batch.save_copies();
		assert_eq!(saved.len(), 1);
		assert_eq!(saved[0].0, dir.join("house_copy.schem"));
		assert!(saved[0].1.is_ok());
		assert!(!batch.unsaved_changes());

		let copy = Schematic::load(dir.join("house_copy.schem")).unwrap();
		assert_eq!(copy.grid().get(0, 0, 0), Some("minecraft:birch_log[axis=y]"));

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn unique_blocks_sort_without_namespace() {
		let dir = scratch_dir("unique");
		let first = dir.join("a.schem");
		let second = dir.join("b.schem");

		fs::write(&first, structure(2, 1, 1, &[("minecraft:stone", 0), ("create:andesite_casing", 1)], &[0, 1])).unwrap();
		fs::write(&second, structure(2, 1, 1, &[("minecraft:air", 0), ("minecraft:stone", 1)], &[0, 1])).unwrap();

		let batch = StructureBatch::load(vec![first, second]);

		assert_eq!(batch.unique_blocks(), ["minecraft:air", "create:andesite_casing", "minecraft:stone"]);
		assert_eq!(batch.unique_bare_blocks().len(), 3);

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn copy_path_replaces_extension() {
		assert_eq!(copy_path(Path::new("builds/house.schem")), Path::new("builds/house_copy.schem"));
	}
}
