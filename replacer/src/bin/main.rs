extern crate clap;
extern crate env_logger;
extern crate replacer;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use replacer::{RenderOptions, ReplaceOptions};

fn validate_number(number: String) -> Result<(), String> {
	match number.parse::<u32>() {
		Ok(x) => if x == 0 {
			Err("zero values are not a valid argument".to_owned())
		} else {
			Ok(())
		},
		Err(parse) => Err(parse.to_string())
	}
}

fn files(matches: &ArgMatches) -> Vec<PathBuf> {
	matches.values_of("files").map(|values| values.map(PathBuf::from).collect()).unwrap_or_default()
}

fn main() {
	env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or("info")
	).init();

	let files_arg = Arg::with_name("files")
		.value_name("FILE")
		.help("Structure (.schem) files to process")
		.multiple(true)
		.required(true);

	let matches = App::new("Schematic Block Replacer")
		.version("0.1.0")
		.author("coderbot16 <coderbot16@gmail.com>")
		.about("Replaces blocks in .schem structure files and renders previews of them")
		.setting(AppSettings::SubcommandRequiredElseHelp)
		.subcommand(SubCommand::with_name("replace")
			.about("Applies block mappings to every structure, in order")
			.arg(files_arg.clone())
			.arg(Arg::with_name("map")
				.short("m")
				.long("map")
				.value_names(&["SOURCE", "TARGET"])
				.help("Replaces SOURCE with TARGET. A SOURCE without [properties] matches every state of the block")
				.number_of_values(2)
				.multiple(true)
			)
			.arg(Arg::with_name("preset")
				.short("p")
				.long("preset")
				.value_name("PRESET")
				.help("Reads mappings from a file of source<TAB>target lines, applied before --map")
				.takes_value(true)
			)
			.arg(Arg::with_name("save-preset")
				.long("save-preset")
				.value_name("PRESET")
				.help("Writes the combined mappings to a preset file")
				.takes_value(true)
			)
			.arg(Arg::with_name("copy")
				.short("c")
				.long("copy")
				.help("Saves to <name>_copy.schem instead of overwriting the original files")
			)
			.arg(Arg::with_name("dry-run")
				.short("n")
				.long("dry-run")
				.help("Reports what would change without writing any structure")
			)
			.arg(Arg::with_name("blocks")
				.short("b")
				.long("blocks")
				.value_name("LIST")
				.help("Known block list that new block names are added to")
				.default_value("minecraft_blocks.txt")
			)
		)
		.subcommand(SubCommand::with_name("render")
			.about("Renders front, side and top previews of each structure")
			.arg(files_arg.clone())
			.arg(Arg::with_name("colors")
				.short("c")
				.long("colors")
				.value_name("TABLE")
				.help("Block color table, either name,colour CSV or JSON")
				.takes_value(true)
				.required(true)
			)
			.arg(Arg::with_name("output")
				.short("o")
				.long("output")
				.value_name("DIR")
				.help("Directory the <name>.png previews are written to")
				.default_value(".")
			)
			.arg(Arg::with_name("scale")
				.short("s")
				.long("scale")
				.value_name("FACTOR")
				.help("Upscales each preview by an integer factor")
				.default_value("1")
				.validator(validate_number)
			)
		)
		.subcommand(SubCommand::with_name("blocks")
			.about("Lists every block state used by the structures")
			.arg(files_arg)
		)
		.get_matches();

	let success = match matches.subcommand() {
		("replace", Some(matches)) => replace(matches),
		("render", Some(matches)) => render(matches),
		("blocks", Some(matches)) => blocks(matches),
		_ => {
			println!("error: no command specified");
			println!("help: specify a command with replace, render, or blocks");
			false
		}
	};

	if !success {
		process::exit(1);
	}
}

fn replace(matches: &ArgMatches) -> bool {
	let pairs: Vec<&str> = matches.values_of("map").map(|values| values.collect()).unwrap_or_default();

	let options = ReplaceOptions {
		files: files(matches),
		mappings: pairs.chunks(2).map(|pair| (pair[0].to_owned(), pair[1].to_owned())).collect(),
		preset: matches.value_of("preset").map(PathBuf::from),
		save_preset: matches.value_of("save-preset").map(PathBuf::from),
		copy: matches.is_present("copy"),
		dry_run: matches.is_present("dry-run"),
		block_list: matches.value_of("blocks").map(PathBuf::from)
	};

	let summary = match replacer::replace(&options) {
		Ok(summary) => summary,
		Err(e) => {
			println!("error: {}", e);
			return false;
		}
	};

	print!("{}", summary.report);

	let mut success = summary.report.failed() == 0;

	for (path, result) in &summary.saved {
		match result {
			Ok(()) => println!("saved {}", path.display()),
			Err(e) => {
				println!("error: could not save {}: {}", path.display(), e);
				success = false;
			}
		}
	}

	if summary.new_block_names > 0 {
		println!("added {} new block name(s) to the known block list", summary.new_block_names);
	}

	success
}

fn render(matches: &ArgMatches) -> bool {
	let options = RenderOptions {
		files: files(matches),
		colors: matches.value_of("colors").map(PathBuf::from).unwrap_or_default(),
		output: matches.value_of("output").map(PathBuf::from).unwrap_or_default(),
		scale: matches.value_of("scale").and_then(|value| u32::from_str(value).ok()).unwrap_or(1)
	};

	let results = match replacer::render(&options) {
		Ok(results) => results,
		Err(e) => {
			println!("error: {}", e);
			return false;
		}
	};

	let mut success = true;

	for (path, result) in results {
		match result {
			Ok(destination) => println!("{}: {}", path.display(), destination.display()),
			Err(e) => {
				println!("{}: error: {}", path.display(), e);
				success = false;
			}
		}
	}

	success
}

fn blocks(matches: &ArgMatches) -> bool {
	let (blocks, batch) = replacer::unique_blocks(&files(matches));

	let loaded = batch.structures().count();
	if loaded == 1 {
		println!("All unique blocks in 1 file:");
	} else {
		println!("All unique blocks in {} files:", loaded);
	}

	for block in &blocks {
		println!("{}", block);
	}

	let mut success = true;

	for entry in batch.entries() {
		if let Err(ref e) = entry.structure {
			println!("error: {}: {}", entry.path.display(), e);
			success = false;
		}
	}

	success
}
