//! Orthographic previews of a voxel grid.
//!
//! The canvas holds three views side by side, separated by one transparent column:
//! front (looking along +X), side (looking along +Z) and top (looking down -Y).
//! Each pixel shows the first non-air voxel its ray hits, darkened by how deep it sits.
use crate::colors::{ColorTable, Rgb};
use fxhash::FxHashSet;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::warn;
use schem::grid::VoxelGrid;
use schem::spec::bare_name;
use std::cmp;

pub const AIR: &str = "minecraft:air";
pub const CAVE_AIR: &str = "minecraft:cave_air";

/// Canvas size for a grid: `(L + W + W + 2) x max(W, L, H)`.
pub fn canvas_size(grid: &VoxelGrid) -> (u32, u32) {
	let (width, height, length) = grid.dimensions();

	(length + width + width + 2, cmp::max(width, cmp::max(length, height)))
}

/// Renders the front, side and top views of a grid onto one transparent canvas.
pub fn render_preview(grid: &VoxelGrid, colors: &ColorTable) -> RgbaImage {
	let (width, height, length) = grid.dimensions();
	let (canvas_width, canvas_height) = canvas_size(grid);
	let mut canvas = RgbaImage::new(canvas_width, canvas_height);

	let resolved = resolve_colors(grid, colors);
	let blocks = grid.blocks();

	let voxel = |x: u32, y: u32, z: u32| -> Option<Rgb> {
		resolved[blocks[grid.index(x, y, z)] as usize]
	};

	// Front
	for y in 0..height {
		for z in 0..length {
			let hit = (0..width).find_map(|x| voxel(x, y, z).map(|color| (color, x)));

			if let Some((color, x)) = hit {
				let depth = x as f64 / width as f64;
				canvas.put_pixel(z, height - 1 - y, shade(color, depth).into());
			}
		}
	}

	// Side
	for y in 0..height {
		for x in 0..width {
			let hit = (0..length).find_map(|z| voxel(x, y, z).map(|color| (color, z)));

			if let Some((color, z)) = hit {
				let depth = z as f64 / length as f64;
				canvas.put_pixel(x + length + 1, height - 1 - y, shade(color, depth).into());
			}
		}
	}

	// Top, the bottom layer is never scanned
	for x in 0..width {
		for z in 0..length {
			let hit = (1..height).rev().find_map(|y| voxel(x, y, z).map(|color| (color, y)));

			if let Some((color, y)) = hit {
				let depth = (height - y) as f64 / height as f64;
				canvas.put_pixel(x + length + width + 2, z, shade(color, depth).into());
			}
		}
	}

	canvas
}

/// Color for every possible voxel byte; `None` for air and unused indices.
fn resolve_colors(grid: &VoxelGrid, colors: &ColorTable) -> Vec<Option<Rgb>> {
	let mut unknown = FxHashSet::default();

	grid.palette().by_index().into_iter().map(|entry| {
		let name = bare_name(entry?);

		if name == AIR || name == CAVE_AIR {
			return None;
		}

		Some(colors.get(name).unwrap_or_else(|| {
			if unknown.insert(name) {
				warn!("no color for {}, drawing it as magenta", name);
			}

			crate::colors::UNKNOWN
		}))
	}).collect()
}

/// Darkens a color by its depth fraction along the view ray.
///
/// The square root keeps the falloff gentle near the viewer. Colors with any channel above 1
/// only darken by up to a quarter; near-black colors use the steeper curve shifted so that
/// they never reach zero.
pub fn shade(color: Rgb, depth: f64) -> Rgb {
	let brightest = color.max_channel() as f64;

	let (factor, shift) = if (brightest + 1.0) * 0.5 > 1.0 {
		(0.25, 0.0)
	} else {
		(0.5, 1.0)
	};

	darken(color, (depth.sqrt() - shift) * factor)
}

/// Scales each channel by `1 - amount`, flooring and clamping to the channel range.
pub fn darken(color: Rgb, amount: f64) -> Rgb {
	let multiplier = (1.0 - amount).max(0.0);
	let channel = |value: u8| (value as f64 * multiplier).floor().min(255.0) as u8;

	Rgb::new(channel(color.red), channel(color.green), channel(color.blue))
}

/// Nearest-neighbour upscale, so that single voxels stay crisp.
///
/// Returns `None` when the scaled image would not fit in memory.
pub fn upscale(image: &RgbaImage, factor: u32) -> Option<RgbaImage> {
	if factor <= 1 {
		return Some(image.clone());
	}

	let width = image.width().checked_mul(factor)?;
	let height = image.height().checked_mul(factor)?;

	(width as usize).checked_mul(height as usize)?.checked_mul(4)?;

	Some(imageops::resize(image, width, height, FilterType::Nearest))
}
