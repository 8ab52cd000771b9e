// tests/logging_filter.rs

use tracing_subscriber::filter::LevelFilter;

use scriptvisor::cli::LogLevel;
use scriptvisor::logging::build_filter;

#[test]
fn cli_flag_wins_over_the_environment() {
    let filter = build_filter(Some(LogLevel::Debug), Some("error"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn environment_accepts_per_target_directives() {
    let filter = build_filter(None, Some("scriptvisor=trace,tokio=warn"));
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    assert!(filter.to_string().contains("scriptvisor=trace"));
}

#[test]
fn missing_or_malformed_environment_falls_back_to_info() {
    for env in [None, Some(""), Some("   "), Some("scriptvisor=loud")] {
        let filter = build_filter(None, env);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO), "env = {env:?}");
    }
}
