// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile, SupervisorSection};
use crate::errors::{Result, SupervisorError};
use crate::exec::ResolvedCommand;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SupervisorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let supervisor = validate_supervisor(&raw)?;
        let interpreter = validate_interpreter(&raw)?;
        Ok(ConfigFile::new_unchecked(supervisor, interpreter))
    }
}

fn validate_supervisor(cfg: &RawConfigFile) -> Result<SupervisorSection> {
    let escalation_unit = parse_duration(&cfg.supervisor.escalation_unit).map_err(|e| {
        SupervisorError::ConfigError(format!("[supervisor].escalation_unit: {e}"))
    })?;

    if escalation_unit.is_zero() {
        return Err(SupervisorError::ConfigError(
            "[supervisor].escalation_unit must be greater than zero".to_string(),
        ));
    }

    if cfg.supervisor.event_capacity == 0 {
        return Err(SupervisorError::ConfigError(
            "[supervisor].event_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(SupervisorSection {
        escalation_unit,
        event_capacity: cfg.supervisor.event_capacity,
    })
}

fn validate_interpreter(cfg: &RawConfigFile) -> Result<Option<ResolvedCommand>> {
    match cfg.interpreter.command.as_deref() {
        None => Ok(None),
        Some(cmd) => ResolvedCommand::from_interpreter(cmd)
            .map(Some)
            .map_err(|_| {
                SupervisorError::ConfigError("[interpreter].command must not be empty".to_string())
            }),
    }
}

/// Parse a duration like `"250ms"`, `"1s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => secs_scaled(value, 60),
        "h" => secs_scaled(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn secs_scaled(value: u64, factor: u64) -> std::result::Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| "duration out of range".to_string())
}
