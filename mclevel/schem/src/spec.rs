use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
	#[error("block spec is empty")]
	Empty,
	#[error("block spec {0:?} is not of the form namespace:name")]
	MissingNamespace(String),
	#[error("block spec {0:?} has an unterminated property list")]
	UnterminatedProperties(String),
	#[error("{0} is mapped to itself")]
	SelfMapping(String),
	#[error("block spec is {0} bytes long, the limit is 65535")]
	TooLong(usize)
}

/// Longest string an NBT tag name can hold.
pub const MAX_SPEC_LEN: usize = u16::MAX as usize;

/// Strips the bracketed property list from a block state string, if there is one.
///
/// `minecraft:oak_log[axis=y]` becomes `minecraft:oak_log`.
pub fn bare_name(spec: &str) -> &str {
	match spec.find('[') {
		Some(start) => &spec[..start],
		None => spec
	}
}

/// The property suffix of a block state string including the brackets, or an empty string.
pub fn property_suffix(spec: &str) -> &str {
	&spec[bare_name(spec).len()..]
}

/// A block identifier of the form `namespace:name`, optionally followed by `[key=value,...]`.
///
/// Whether a spec carries properties decides how it matches palette entries: a bare spec matches
/// every state of the block, a spec with properties matches one state verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockSpec(String);

impl BlockSpec {
	pub fn parse(spec: &str) -> Result<Self, SpecError> {
		if spec.is_empty() {
			return Err(SpecError::Empty);
		}

		if spec.len() > MAX_SPEC_LEN {
			return Err(SpecError::TooLong(spec.len()));
		}

		let bare = bare_name(spec);

		match bare.find(':') {
			Some(colon) if colon > 0 && colon + 1 < bare.len() => (),
			_ => return Err(SpecError::MissingNamespace(spec.to_owned()))
		}

		if bare.len() != spec.len() && !spec.ends_with(']') {
			return Err(SpecError::UnterminatedProperties(spec.to_owned()));
		}

		Ok(BlockSpec(spec.to_owned()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn bare(&self) -> &str {
		bare_name(&self.0)
	}

	pub fn has_properties(&self) -> bool {
		self.0.len() != self.bare().len()
	}

	/// Contents of the property list without brackets.
	pub fn properties(&self) -> Option<&str> {
		if self.has_properties() {
			let suffix = property_suffix(&self.0);

			Some(&suffix[1..suffix.len() - 1])
		} else {
			None
		}
	}

	/// Tests a palette entry against this spec: by bare name if this spec is bare, verbatim otherwise.
	pub fn matches(&self, entry: &str) -> bool {
		if self.has_properties() {
			entry == self.0
		} else {
			bare_name(entry) == self.0
		}
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl FromStr for BlockSpec {
	type Err = SpecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		BlockSpec::parse(s)
	}
}

impl Display for BlockSpec {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for BlockSpec {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
