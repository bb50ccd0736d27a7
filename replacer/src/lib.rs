//! Commands behind the `schem-replacer` binary.
//!
//! Every command works per structure: a file that fails to load, render or save is reported and
//! the remaining files are still processed. Only problems with the shared inputs (mappings,
//! color table, output directory) abort a command.
use image::ImageError;
use log::{info, warn};
use preview::renderer::{render_preview, upscale};
use preview::{ColorError, ColorTable};
use rayon::prelude::*;
use schem::{BatchReport, BlockList, MappingSet, Schematic, SchematicError, SpecError, StructureBatch};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
	#[error("{0}")]
	Spec(#[from] SpecError),
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
	#[error("{0}")]
	Schematic(#[from] SchematicError),
	#[error("cannot load color table: {0}")]
	Color(#[from] ColorError),
	#[error("cannot write image: {0}")]
	Image(#[from] ImageError),
	#[error("no mappings given, use --map or --preset")]
	NoMappings,
	#[error("preview is too large to scale by {0}")]
	ScaleTooLarge(u32)
}

#[derive(Debug, Clone, Default)]
pub struct ReplaceOptions {
	pub files: Vec<PathBuf>,
	/// (source, target) pairs from the command line, applied after the preset.
	pub mappings: Vec<(String, String)>,
	pub preset: Option<PathBuf>,
	pub save_preset: Option<PathBuf>,
	/// Write `<stem>_copy.schem` files instead of overwriting.
	pub copy: bool,
	pub dry_run: bool,
	pub block_list: Option<PathBuf>
}

pub struct ReplaceSummary {
	pub report: BatchReport,
	pub saved: Vec<(PathBuf, Result<(), SchematicError>)>,
	pub new_block_names: usize
}

pub fn mapping_set(options: &ReplaceOptions) -> Result<MappingSet, CommandError> {
	let mut set = match options.preset {
		Some(ref preset) => MappingSet::read_preset(preset)?,
		None => MappingSet::new()
	};

	for (source, target) in &options.mappings {
		set.push_str(source, target)?;
	}

	if set.is_empty() {
		return Err(CommandError::NoMappings);
	}

	Ok(set)
}

pub fn replace(options: &ReplaceOptions) -> Result<ReplaceSummary, CommandError> {
	let mappings = mapping_set(options)?;

	info!("applying {} mapping(s) to {} file(s)", mappings.len(), options.files.len());

	let mut batch = StructureBatch::load(options.files.iter().cloned());
	let report = batch.apply(&mappings);

	let saved = if options.dry_run {
		Vec::new()
	} else if !batch.unsaved_changes() {
		info!("nothing changed, no files written");
		Vec::new()
	} else if options.copy {
		batch.save_copies()
	} else {
		batch.save()
	};

	let new_block_names = match options.block_list {
		Some(ref path) if !options.dry_run => BlockList::open(path)?.append(batch.unique_bare_blocks())?,
		_ => 0
	};

	if let Some(ref path) = options.save_preset {
		mappings.write_preset(path)?;
	}

	Ok(ReplaceSummary { report, saved, new_block_names })
}

/// Lists every block state used by the given structures.
pub fn unique_blocks(files: &[PathBuf]) -> (Vec<String>, StructureBatch) {
	let batch = StructureBatch::load(files.iter().cloned());

	(batch.unique_blocks(), batch)
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
	pub files: Vec<PathBuf>,
	pub colors: PathBuf,
	pub output: PathBuf,
	pub scale: u32
}

/// Renders a `<stem>.png` preview per structure, in parallel.
pub fn render(options: &RenderOptions) -> Result<Vec<(PathBuf, Result<PathBuf, CommandError>)>, CommandError> {
	let colors = ColorTable::load(&options.colors)?;

	if colors.is_empty() {
		warn!("color table {} is empty, every block will be magenta", options.colors.display());
	}

	fs::create_dir_all(&options.output)?;

	Ok(options.files.par_iter().map(|path| {
		let result = render_file(path, &colors, &options.output, options.scale);

		(path.clone(), result)
	}).collect())
}

pub fn render_file(path: &Path, colors: &ColorTable, output: &Path, scale: u32) -> Result<PathBuf, CommandError> {
	let schematic = Schematic::load(path)?;
	let image = upscale(&render_preview(schematic.grid(), colors), scale).ok_or(CommandError::ScaleTooLarge(scale))?;

	let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_else(|| "structure".to_owned());
	let destination = output.join(format!("{}.png", stem));

	image.save(&destination)?;
	info!("rendered {} to {}", path.display(), destination.display());

	Ok(destination)
}

#[cfg(test)]
mod tests {
	use super::*;
	use nbt_turbo::writer::CompoundWriter;
	use schem::ReplaceOutcome;
	use std::env;
	use std::process;

	fn scratch_dir(name: &str) -> PathBuf {
		let dir = env::temp_dir().join(format!("schem-replacer-{}-{}", name, process::id()));
		fs::create_dir_all(&dir).unwrap();

		dir
	}

	fn write_house(path: &Path) {
		let data = CompoundWriter::write("Schematic", Vec::new(), |writer| {
			writer
				.i32("Version", 2)
				.i16("Width", 2)
				.i16("Height", 2)
				.i16("Length", 1)
				.compound("Palette", |writer| {
					writer
						.i32("minecraft:air", 0)
						.i32("minecraft:oak_planks", 1)
						.i32("minecraft:glass", 2);
				})
				.i32("PaletteMax", 3)
				.u8_array("BlockData", &[1, 1, 2, 0]);
		});

		fs::write(path, data).unwrap();
	}

	#[test]
	fn replace_writes_copies_and_block_list() {
		let dir = scratch_dir("replace");
		let house = dir.join("house.schem");
		let preset = dir.join("preset.tsv");
		let list = dir.join("minecraft_blocks.txt");
		write_house(&house);
		fs::write(&preset, "minecraft:glass\tminecraft:air\n").unwrap();

		let options = ReplaceOptions {
			files: vec![house.clone(), dir.join("missing.schem")],
			mappings: vec![("minecraft:oak_planks".to_owned(), "minecraft:spruce_planks".to_owned())],
			preset: Some(preset),
			copy: true,
			block_list: Some(list.clone()),
			..ReplaceOptions::default()
		};

		let summary = replace(&options).unwrap();

		assert_eq!(summary.report.lines.len(), 3);
		assert_eq!(summary.report.lines[0].result, Ok(ReplaceOutcome::Merged { entries: 1, voxels: 1 }));
		assert_eq!(summary.report.lines[1].result, Ok(ReplaceOutcome::Renamed { entries: 1 }));
		assert_eq!(summary.report.failed(), 1);
		assert_eq!(summary.saved.len(), 1);
		assert_eq!(summary.new_block_names, 2);

		let copy = Schematic::load(dir.join("house_copy.schem")).unwrap();
		assert_eq!(copy.grid().blocks(), [1, 1, 0, 0]);
		assert_eq!(copy.grid().get(0, 0, 0), Some("minecraft:spruce_planks"));
		assert_eq!(fs::read_to_string(&list).unwrap(), "minecraft:air\nminecraft:spruce_planks\n");

		// the original is untouched
		let original = Schematic::load(&house).unwrap();
		assert_eq!(original.grid().get(0, 0, 0), Some("minecraft:oak_planks"));

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn dry_run_writes_nothing() {
		let dir = scratch_dir("dry-run");
		let house = dir.join("house.schem");
		let list = dir.join("minecraft_blocks.txt");
		write_house(&house);
		let before = fs::read(&house).unwrap();

		let options = ReplaceOptions {
			files: vec![house.clone()],
			mappings: vec![("minecraft:glass".to_owned(), "minecraft:air".to_owned())],
			dry_run: true,
			block_list: Some(list.clone()),
			..ReplaceOptions::default()
		};

		let summary = replace(&options).unwrap();

		assert_eq!(summary.report.changed(), 1);
		assert!(summary.saved.is_empty());
		assert_eq!(summary.new_block_names, 0);
		assert!(!list.exists());
		assert_eq!(fs::read(&house).unwrap(), before);

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn replace_needs_mappings() {
		let options = ReplaceOptions { files: vec![PathBuf::from("house.schem")], ..ReplaceOptions::default() };

		assert!(matches!(replace(&options), Err(CommandError::NoMappings)));
	}

	#[test]
	fn invalid_mapping_aborts() {
		let options = ReplaceOptions {
			mappings: vec![("minecraft:stone".to_owned(), "minecraft:stone".to_owned())],
			..ReplaceOptions::default()
		};

		assert!(matches!(mapping_set(&options), Err(CommandError::Spec(SpecError::SelfMapping(_)))));
	}

	#[test]
	fn oversized_scale_fails_per_file() {
		let dir = scratch_dir("oversized");
		let house = dir.join("house.schem");
		write_house(&house);

		let colors = ColorTable::new();
		let result = render_file(&house, &colors, &dir, 1_000_000_000);

		assert!(matches!(result, Err(CommandError::ScaleTooLarge(1_000_000_000))));

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn render_writes_previews() {
		let dir = scratch_dir("render");
		let house = dir.join("house.schem");
		let colors = dir.join("colors.csv");
		write_house(&house);
		fs::write(&colors, "name,colour\nminecraft:oak_planks,FFA2834F\n").unwrap();

		let options = RenderOptions {
			files: vec![house, dir.join("missing.schem")],
			colors,
			output: dir.join("out"),
			scale: 2
		};

		let results = render(&options).unwrap();
		assert_eq!(results.len(), 2);
		assert!(results[1].1.is_err());

		let written = results[0].1.as_ref().unwrap();
		assert_eq!(written, &dir.join("out").join("house.png"));

		let image = image::open(written).unwrap().to_rgba8();
		assert_eq!(image.dimensions(), ((1 + 2 + 2 + 2) * 2, 2 * 2));

		fs::remove_dir_all(&dir).unwrap();
	}
}
