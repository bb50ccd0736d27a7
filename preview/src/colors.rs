use fxhash::FxHashMap;
use log::warn;
use schem::spec::bare_name;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Rgb {
	pub red: u8,
	pub green: u8,
	pub blue: u8
}

impl Rgb {
	pub const fn new(red: u8, green: u8, blue: u8) -> Self {
		Rgb { red, green, blue }
	}

	pub fn max_channel(self) -> u8 {
		self.red.max(self.green).max(self.blue)
	}
}

impl From<Rgb> for image::Rgba<u8> {
	fn from(color: Rgb) -> Self {
		image::Rgba([color.red, color.green, color.blue, 255])
	}
}

/// Painted for blocks missing from the table.
pub const UNKNOWN: Rgb = Rgb::new(255, 0, 255);

#[derive(Debug, Error)]
pub enum ColorError {
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
	#[error("invalid color table: {0}")]
	Json(#[from] serde_json::Error)
}

/// Display colors by bare block name.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
	colors: FxHashMap<String, Rgb>
}

impl ColorTable {
	pub fn new() -> Self {
		ColorTable::default()
	}

	/// Parses `name,colour` rows where `colour` is 8 hex digits of ARGB. A header row is
	/// optional and may list the columns in either order. Bad rows are logged and skipped.
	pub fn parse_csv(text: &str) -> Self {
		let mut table = ColorTable::new();
		let mut columns = (0, 1);
		let mut width = 2;

		for (number, line) in text.lines().enumerate() {
			let line = line.trim();
			if line.is_empty() {
				continue;
			}

			let fields: Vec<&str> = line.split(',').map(str::trim).collect();

			if number == 0 {
				let name = fields.iter().position(|field| field.eq_ignore_ascii_case("name"));
				let colour = fields.iter().position(|field| field.eq_ignore_ascii_case("colour") || field.eq_ignore_ascii_case("color"));

				if let (Some(name), Some(colour)) = (name, colour) {
					columns = (name, colour);
					width = fields.len();
					continue;
				}
			}

			if fields.len() != width {
				warn!("color table row {}: expected {} fields, found {}", number + 1, width, fields.len());
				continue;
			}

			let (name, colour) = (fields[columns.0], fields[columns.1]);

			match parse_argb(colour) {
				Some(color) if !name.is_empty() => table.insert(name, color),
				_ => warn!("color table row {}: cannot parse {:?}", number + 1, line)
			}
		}

		table
	}

	pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self, ColorError> {
		Ok(ColorTable::parse_csv(&fs::read_to_string(path)?))
	}

	/// Parses the `{"data": [{"name": ..., "color": "#RRGGBB"}]}` block color format.
	pub fn parse_json(text: &str) -> Result<Self, ColorError> {
		#[derive(Deserialize)]
		struct Document {
			#[serde(default)]
			data: Vec<Entry>
		}

		#[derive(Deserialize)]
		struct Entry {
			name: String,
			#[serde(default)]
			color: Option<String>
		}

		let document: Document = serde_json::from_str(text)?;
		let mut table = ColorTable::new();

		for entry in document.data {
			let hex = entry.color.as_deref().unwrap_or("#000000");

			match parse_rgb(hex) {
				Some(color) => table.insert(&entry.name, color),
				None => warn!("color table entry {}: cannot parse {:?}", entry.name, hex)
			}
		}

		Ok(table)
	}

	pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ColorError> {
		ColorTable::parse_json(&fs::read_to_string(path)?)
	}

	/// Picks the loader from the file extension, CSV unless it is `.json`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ColorError> {
		let path = path.as_ref();

		match path.extension().and_then(|extension| extension.to_str()) {
			Some(extension) if extension.eq_ignore_ascii_case("json") => ColorTable::load_json(path),
			_ => ColorTable::load_csv(path)
		}
	}

	pub fn insert(&mut self, name: &str, color: Rgb) {
		self.colors.insert(bare_name(name).to_owned(), color);
	}

	/// Color of a block, ignoring its properties.
	pub fn get(&self, block: &str) -> Option<Rgb> {
		self.colors.get(bare_name(block)).copied()
	}

	/// Like `get`, but substitutes `UNKNOWN` for unmapped blocks.
	pub fn lookup(&self, block: &str) -> Rgb {
		self.get(block).unwrap_or(UNKNOWN)
	}

	pub fn len(&self) -> usize {
		self.colors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}
}

fn parse_argb(hex: &str) -> Option<Rgb> {
	let hex = hex.trim_start_matches('#');

	if hex.len() != 8 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
		return None;
	}

	let argb = u32::from_str_radix(hex, 16).ok()?;

	Some(Rgb::new((argb >> 16) as u8, (argb >> 8) as u8, argb as u8))
}

fn parse_rgb(hex: &str) -> Option<Rgb> {
	let hex = hex.trim_start_matches('#');

	if hex.len() != 6 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
		return None;
	}

	let rgb = u32::from_str_radix(hex, 16).ok()?;

	Some(Rgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn csv_skips_malformed_rows() {
		let table = ColorTable::parse_csv("name,colour\n\
			minecraft:stone,FF7D7D7D\n\
			minecraft:dirt,FF866043,extra\n\
			minecraft:grass_block,zz00ff00\n\
			minecraft:sand,FFDBCF\n\
			minecraft:oak_planks,#FFA2834F\n");

		assert_eq!(table.len(), 2);
		assert_eq!(table.get("minecraft:stone"), Some(Rgb::new(0x7D, 0x7D, 0x7D)));
		assert_eq!(table.get("minecraft:oak_planks"), Some(Rgb::new(0xA2, 0x83, 0x4F)));
		assert_eq!(table.get("minecraft:dirt"), None);
	}

	#[test]
	fn csv_header_column_order() {
		let table = ColorTable::parse_csv("colour,name\nFF000010,minecraft:water\n");

		assert_eq!(table.get("minecraft:water"), Some(Rgb::new(0, 0, 0x10)));
	}

	#[test]
	fn lookup_strips_properties() {
		let mut table = ColorTable::new();
		table.insert("minecraft:oak_log", Rgb::new(1, 2, 3));

		assert_eq!(table.lookup("minecraft:oak_log[axis=y]"), Rgb::new(1, 2, 3));
		assert_eq!(table.lookup("minecraft:birch_log"), UNKNOWN);
	}

	#[test]
	fn json_table() {
		let table = ColorTable::parse_json(r##"{"data": [
			{"name": "minecraft:stone", "color": "#7d7d7d", "alpha": 255},
			{"name": "minecraft:glass", "color": "#c0f5fe", "alpha": 0.3},
			{"name": "minecraft:obsidian"},
			{"name": "minecraft:broken", "color": "#12"}
		]}"##).unwrap();

		assert_eq!(table.len(), 3);
		assert_eq!(table.get("minecraft:glass"), Some(Rgb::new(0xC0, 0xF5, 0xFE)));
		assert_eq!(table.get("minecraft:obsidian"), Some(Rgb::new(0, 0, 0)));
	}

	#[test]
	fn json_rejects_garbage() {
		assert!(matches!(ColorTable::parse_json("not json"), Err(ColorError::Json(_))));
	}
}
