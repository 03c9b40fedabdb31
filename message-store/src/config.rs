use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageStoreConfig {
	/// MongoDB database configuration
	pub database: DatabaseConfig,
	/// Logging configuration
	pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
	/// The MongoDB connection string
	pub uri: String,
	/// The database to create the collection in, defaults to the database
	/// named in the uri
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Timeout applied to each step that talks to the server
	#[serde(with = "humantime_serde")]
	pub timeout: Duration,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "mongodb://localhost:27017/chat".to_string(),
			name: None,
			timeout: Duration::from_secs(10),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
	/// The log level to filter logs by.
	/// See https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
	pub level: String,
	/// The log format to use.
	pub format: LoggingFormat,
	/// Show timestamps in logs.
	pub timestamps: LoggingTimestamps,
	/// Show the file info in logs.
	pub show_file_info: bool,
	/// Show the thread id in logs.
	pub show_thread_id: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LoggingFormat::default(),
			timestamps: LoggingTimestamps::default(),
			show_file_info: false,
			show_thread_id: false,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
	/// The default human-readable log format.
	#[default]
	Normal,
	/// The JSON log format.
	Json,
	/// The pretty log format.
	Pretty,
	/// The compact log format.
	Compact,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingTimestamps {
	/// Show timestamps in logs in the local timezone.
	#[default]
	Local,
	/// Show timestamps in logs in UTC.
	Utc,
	/// Do not show timestamps in logs.
	Off,
}

impl MessageStoreConfig {
	/// Builds the settings from the defaults with each TOML source merged on
	/// top, in order. Tables merge key by key, anything else is replaced.
	pub fn from_toml_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> anyhow::Result<Self> {
		let mut value = toml::Value::try_from(Self::default()).context("failed to serialize default settings")?;

		for source in sources {
			let incoming = toml::from_str::<toml::Value>(source).context("failed to parse settings")?;
			merge(&mut value, incoming);
		}

		value.try_into().context("invalid settings")
	}

	pub fn to_toml_string(&self) -> anyhow::Result<String> {
		toml::to_string_pretty(self).context("failed to serialize settings")
	}
}

fn merge(base: &mut toml::Value, incoming: toml::Value) {
	match (base, incoming) {
		(toml::Value::Table(base), toml::Value::Table(incoming)) => {
			for (key, value) in incoming {
				match base.get_mut(&key) {
					Some(existing) => merge(existing, value),
					None => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, incoming) => *base = incoming,
	}
}
