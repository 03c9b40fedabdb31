use anyhow::Context;
use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc, FormatTime};
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, LoggingFormat, LoggingTimestamps};

pub enum TimeFormatter {
	Local(ChronoLocal),
	Utc(ChronoUtc),
	None,
}

impl From<LoggingTimestamps> for TimeFormatter {
	fn from(timestamps: LoggingTimestamps) -> Self {
		match timestamps {
			LoggingTimestamps::Local => TimeFormatter::Local(ChronoLocal::rfc_3339()),
			LoggingTimestamps::Utc => TimeFormatter::Utc(ChronoUtc::rfc_3339()),
			LoggingTimestamps::Off => TimeFormatter::None,
		}
	}
}

impl FormatTime for TimeFormatter {
	fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
		match self {
			TimeFormatter::Local(formatter) => formatter.format_time(w),
			TimeFormatter::Utc(formatter) => formatter.format_time(w),
			TimeFormatter::None => ().format_time(w),
		}
	}
}

/// Installs the global subscriber. Fails if the level is not a valid filter
/// directive or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_new(&config.level).with_context(|| format!("invalid log level: {}", config.level))?;

	let layer = tracing_subscriber::fmt::layer()
		.with_file(config.show_file_info)
		.with_line_number(config.show_file_info)
		.with_thread_ids(config.show_thread_id)
		.with_timer(TimeFormatter::from(config.timestamps));

	let layer = match config.format {
		LoggingFormat::Normal => layer.boxed(),
		LoggingFormat::Json => layer.json().boxed(),
		LoggingFormat::Pretty => layer.pretty().boxed(),
		LoggingFormat::Compact => layer.compact().boxed(),
	};

	tracing_subscriber::registry()
		.with(layer.with_filter(filter))
		.try_init()
		.context("failed to install log subscriber")
}
