use crate::config::LoggingConfig;
use crate::logging;

#[test]
fn invalid_level_is_rejected() {
	let config = LoggingConfig {
		level: "message_store=loud".to_string(),
		..Default::default()
	};

	let err = logging::init(&config).expect_err("level must not parse");
	assert!(
		format!("{err:#}").contains("invalid log level: message_store=loud"),
		"unexpected error: {err:#}"
	);
}
