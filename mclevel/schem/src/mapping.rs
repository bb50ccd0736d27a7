use crate::spec::{BlockSpec, SpecError};
use log::warn;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
	pub source: BlockSpec,
	pub target: BlockSpec
}

impl Display for Mapping {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{} -> {}", self.source, self.target)
	}
}

/// Ordered replacement pairs. Never holds self-mappings or empty specs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSet {
	mappings: Vec<Mapping>
}

impl MappingSet {
	pub fn new() -> Self {
		MappingSet::default()
	}

	pub fn push(&mut self, source: BlockSpec, target: BlockSpec) -> Result<(), SpecError> {
		if source == target {
			return Err(SpecError::SelfMapping(source.into_string()));
		}

		self.mappings.push(Mapping { source, target });
		Ok(())
	}

	pub fn push_str(&mut self, source: &str, target: &str) -> Result<(), SpecError> {
		self.push(BlockSpec::parse(source)?, BlockSpec::parse(target)?)
	}

	/// Builds a set from (original, replacement) table rows. Rows without a replacement are
	/// skipped, any other invalid row fails the whole set.
	pub fn from_rows<'a, I>(rows: I) -> Result<Self, SpecError> where I: IntoIterator<Item = (&'a str, &'a str)> {
		let mut set = MappingSet::new();

		for (source, target) in rows {
			if target.trim().is_empty() {
				continue;
			}

			set.push_str(source.trim(), target.trim())?;
		}

		Ok(set)
	}

	/// Parses preset text: one `source<TAB>target` pair per line.
	/// Blank lines, lines with an empty target and malformed lines are skipped.
	pub fn parse_preset(text: &str) -> Self {
		let mut set = MappingSet::new();

		for (number, line) in text.lines().enumerate() {
			let line = line.trim_end_matches('\r');

			if line.trim().is_empty() {
				continue;
			}

			let (source, target) = match line.find('\t') {
				Some(tab) => (line[..tab].trim(), line[tab + 1..].trim()),
				None => {
					warn!("preset line {}: expected source<TAB>target, skipping {:?}", number + 1, line);
					continue;
				}
			};

			if target.is_empty() {
				continue;
			}

			if let Err(error) = set.push_str(source, target) {
				warn!("preset line {}: {}, skipping", number + 1, error);
			}
		}

		set
	}

	pub fn read_preset<P: AsRef<Path>>(path: P) -> io::Result<Self> {
		Ok(MappingSet::parse_preset(&fs::read_to_string(path)?))
	}

	pub fn to_preset(&self) -> String {
		let mut text = String::new();

		for mapping in &self.mappings {
			text.push_str(mapping.source.as_str());
			text.push('\t');
			text.push_str(mapping.target.as_str());
			text.push('\n');
		}

		text
	}

	pub fn write_preset<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
		fs::write(path, self.to_preset())
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<Mapping> {
		self.mappings.iter()
	}
}

impl<'a> IntoIterator for &'a MappingSet {
	type Item = &'a Mapping;
	type IntoIter = std::slice::Iter<'a, Mapping>;

	fn into_iter(self) -> Self::IntoIter {
		self.mappings.iter()
	}
}
