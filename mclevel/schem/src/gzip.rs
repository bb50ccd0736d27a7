use deflate::Compression;
use deflate::write::GzEncoder;
use flate2::read::GzDecoder;
use nbt_turbo::writer::Output;
use std::io::{self, Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

pub fn is_gzip(data: &[u8]) -> bool {
	data.starts_with(&GZIP_MAGIC)
}

pub fn decompress(data: &[u8]) -> io::Result<Vec<u8>> {
	let mut decoder = GzDecoder::new(data);
	let mut out = Vec::with_capacity(data.len() * 4);

	decoder.read_to_end(&mut out)?;

	Ok(out)
}

/// An NBT output sink that gzips everything pushed into it.
///
/// Small writes are batched in front of the encoder. Writes into a Vec cannot fail, but the
/// encoder API is fallible, so the first error is kept and reported by `finish`.
pub struct GzipOutput {
	buffer: Vec<u8>,
	writer: GzEncoder<Vec<u8>>,
	error: Option<io::Error>
}

impl GzipOutput {
	pub fn new() -> Self {
		Self::with_capacity(4096)
	}

	pub fn with_capacity(capacity: usize) -> Self {
		GzipOutput {
			buffer: Vec::with_capacity(256),
			writer: GzEncoder::new(Vec::with_capacity(capacity), Compression::Default),
			error: None
		}
	}

	fn write(&mut self, slice: &[u8]) {
		if self.error.is_none() {
			if let Err(error) = self.writer.write_all(slice) {
				self.error = Some(error);
			}
		}
	}

	fn flush(&mut self) {
		let buffer = std::mem::take(&mut self.buffer);
		self.write(&buffer);

		self.buffer = buffer;
		self.buffer.clear();
	}

	fn maybe_flush(&mut self) {
		if self.buffer.len() > 255 {
			self.flush();
		}
	}

	pub fn finish(mut self) -> io::Result<Vec<u8>> {
		self.flush();

		match self.error {
			Some(error) => Err(error),
			None => self.writer.finish()
		}
	}
}

impl Default for GzipOutput {
	fn default() -> Self {
		GzipOutput::new()
	}
}

impl Output for GzipOutput {
	fn push(&mut self, byte: u8) {
		self.buffer.push(byte);
		self.maybe_flush();
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		if slice.len() < 128 {
			self.buffer.extend_from_slice(slice);
			self.maybe_flush();
		} else {
			self.flush();
			self.write(slice);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compressed_output_decompresses() {
		let mut output = GzipOutput::new();
		let payload: Vec<u8> = (0..2000u32).map(|value| (value % 7) as u8).collect();

		output.push(10);
		output.extend_from_slice(&payload[..50]);
		output.extend_from_slice(&payload[50..]);

		let compressed = output.finish().unwrap();
		assert!(is_gzip(&compressed));

		let data = decompress(&compressed).unwrap();
		assert_eq!(data[0], 10);
		assert_eq!(&data[1..], &payload[..]);
	}
}
