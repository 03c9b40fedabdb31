use anyhow::Context;
use message_store::cli::{self, Invocation, Matches};
use message_store::database::SetupOutcome;
use message_store::global::Global;
use message_store::logging;

async fn run(matches: Matches) -> anyhow::Result<()> {
	let global = Global::new(matches.settings).await.context("failed to set up global")?;

	global.ping().await.context("database unreachable")?;

	match global.setup(matches.fail_if_exists).await? {
		SetupOutcome::Created => tracing::info!("messages collection created"),
		SetupOutcome::Existing => tracing::info!("messages collection already present"),
	}

	Ok(())
}

#[tokio::main]
async fn main() {
	let matches = match cli::parse() {
		Ok(Invocation::Generate { path, contents }) => {
			if let Err(err) = std::fs::write(&path, contents) {
				eprintln!("Error writing configuration file: {path}: {err}");
				std::process::exit(1);
			}
			println!("Generated configuration file: {path}");
			std::process::exit(0);
		}
		Ok(Invocation::Setup(matches)) => matches,
		Err(err) => {
			eprintln!("{err:#}");
			std::process::exit(1);
		}
	};

	if let Err(err) = logging::init(&matches.settings.logging) {
		eprintln!("{err:#}");
		std::process::exit(1);
	}

	tracing::info!("starting message store setup");

	if let Err(err) = run(matches).await {
		tracing::error!("{:#}", err);
		std::process::exit(1);
	}
}
