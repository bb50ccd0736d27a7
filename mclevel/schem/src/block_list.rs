use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// The newline-delimited list of known block names used for suggestions.
#[derive(Debug, Clone)]
pub struct BlockList {
	path: PathBuf,
	names: BTreeSet<String>
}

impl BlockList {
	/// Reads the list at `path`. A missing file is an empty list.
	pub fn open<P: Into<PathBuf>>(path: P) -> io::Result<Self> {
		let path = path.into();

		let names = match fs::read_to_string(&path) {
			Ok(text) => text.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_owned).collect(),
			Err(ref error) if error.kind() == ErrorKind::NotFound => BTreeSet::new(),
			Err(error) => return Err(error)
		};

		Ok(BlockList { path, names })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn contains(&self, name: &str) -> bool {
		self.names.contains(name)
	}

	/// Known names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.names.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Known names starting with `prefix`, for autocompletion.
	pub fn suggestions<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.names().filter(move |name| name.starts_with(prefix))
	}

	/// Adds names not seen before and rewrites the file if anything was added.
	/// Returns the number of new names.
	pub fn append<I, S>(&mut self, names: I) -> io::Result<usize> where I: IntoIterator<Item = S>, S: AsRef<str> {
		let mut added = 0;

		for name in names {
			let name = name.as_ref().trim();

			if !name.is_empty() && self.names.insert(name.to_owned()) {
				added += 1;
			}
		}

		if added > 0 {
			let mut text = String::new();

			for name in &self.names {
				text.push_str(name);
				text.push('\n');
			}

			fs::write(&self.path, text)?;
			debug!("added {} block names to {}", added, self.path.display());
		}

		Ok(added)
	}
}
