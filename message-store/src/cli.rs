use std::ffi::OsString;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches};

use crate::config::MessageStoreConfig;

const CONFIG_ARG_ID: &str = "config";
const GENERATE_ARG_ID: &str = "generate";
const URI_ARG_ID: &str = "uri";
const FAIL_IF_EXISTS_ARG_ID: &str = "fail-if-exists";

const DEFAULT_CONFIG_FILE: &str = "./config.toml";

#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
	/// Write the default settings to `path` and exit
	Generate { path: String, contents: String },
	/// Set up the messages collection
	Setup(Matches),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matches {
	pub settings: MessageStoreConfig,
	/// Fail instead of skipping when the collection already exists
	pub fail_if_exists: bool,
}

pub fn command() -> clap::Command {
	clap::Command::new(clap::crate_name!())
		.version(clap::crate_version!())
		.about(clap::crate_description!())
		.arg(
			Arg::new(CONFIG_ARG_ID)
				.long(CONFIG_ARG_ID)
				.short('c')
				.help("The configuration file to use")
				.value_name("FILE")
				.action(ArgAction::Append),
		)
		.arg(
			Arg::new(GENERATE_ARG_ID)
				.long(GENERATE_ARG_ID)
				.help("Generate a configuration file")
				.value_name("FILE")
				.action(ArgAction::Set)
				.num_args(0..=1)
				.default_missing_value(DEFAULT_CONFIG_FILE),
		)
		.arg(
			Arg::new(URI_ARG_ID)
				.long(URI_ARG_ID)
				.help("Override the MongoDB connection string")
				.value_name("URI")
				.action(ArgAction::Set),
		)
		.arg(
			Arg::new(FAIL_IF_EXISTS_ARG_ID)
				.long(FAIL_IF_EXISTS_ARG_ID)
				.help("Fail if the messages collection already exists")
				.action(ArgAction::SetTrue),
		)
}

/// Parses the process arguments, exiting on usage errors.
pub fn parse() -> anyhow::Result<Invocation> {
	from_matches(command().get_matches())
}

pub fn parse_from<I, T>(args: I) -> anyhow::Result<Invocation>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	let args = command().try_get_matches_from(args).context("invalid arguments")?;
	from_matches(args)
}

fn load_file(file: &str, optional: bool) -> anyhow::Result<Option<String>> {
	match std::fs::read_to_string(file) {
		Ok(contents) => Ok(Some(contents)),
		Err(err) if optional && err.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(err) => Err(err).with_context(|| format!("Error reading configuration file: {file}")),
	}
}

fn from_matches(args: ArgMatches) -> anyhow::Result<Invocation> {
	if let Some(path) = args.get_one::<String>(GENERATE_ARG_ID) {
		let contents = MessageStoreConfig::default().to_toml_string()?;
		return Ok(Invocation::Generate {
			path: path.clone(),
			contents,
		});
	}

	let mut files = args
		.get_many::<String>(CONFIG_ARG_ID)
		.map(|files| files.cloned().map(|file| (file, false)).collect::<Vec<_>>())
		.unwrap_or_default();

	if files.is_empty() {
		files.push((DEFAULT_CONFIG_FILE.to_string(), true));
	}

	let mut sources = Vec::with_capacity(files.len());
	for (file, optional) in &files {
		if let Some(contents) = load_file(file, *optional)? {
			sources.push((file.as_str(), contents));
		}
	}

	let mut settings = MessageStoreConfig::from_toml_sources(sources.iter().map(|(_, contents)| contents.as_str()))
		.with_context(|| {
			let files = sources.iter().map(|(file, _)| *file).collect::<Vec<_>>();
			format!("failed to load settings from {files:?}")
		})?;

	if let Some(uri) = args.get_one::<String>(URI_ARG_ID) {
		settings.database.uri = uri.clone();
	}

	Ok(Invocation::Setup(Matches {
		settings,
		fail_if_exists: args.get_flag(FAIL_IF_EXISTS_ARG_ID),
	}))
}
