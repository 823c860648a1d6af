// src/config/validate.rs

use crate::config::model::{ConfigFile, OutputSection, RawConfigFile, TriggerSettings};
use crate::engine::key::Keying;
use crate::errors::{Result, TriggerError};
use crate::types::{KeyMode, StoreKind};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TriggerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let settings = settings_from_raw(&raw);
        Ok(ConfigFile::new_unchecked(settings, raw.store, raw.context))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_id(cfg)?;
    validate_duration(cfg)?;
    validate_keying(cfg)?;
    validate_store(cfg)?;
    Ok(())
}

fn validate_id(cfg: &RawConfigFile) -> Result<()> {
    if cfg.id.trim().is_empty() {
        return Err(TriggerError::ConfigError(
            "`id` must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_duration(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.duration.is_finite() || cfg.duration < 0.0 {
        return Err(TriggerError::ConfigError(format!(
            "`duration` must be a finite number >= 0 (got {})",
            cfg.duration
        )));
    }
    Ok(())
}

fn validate_keying(cfg: &RawConfigFile) -> Result<()> {
    if cfg.bymode == KeyMode::Each && cfg.by.trim().is_empty() {
        return Err(TriggerError::ConfigError(
            "`by` must name an event field when bymode = \"each\"".to_string(),
        ));
    }
    Ok(())
}

fn validate_store(cfg: &RawConfigFile) -> Result<()> {
    if cfg.store.kind == StoreKind::File && cfg.store.path.as_os_str().is_empty() {
        return Err(TriggerError::ConfigError(
            "[store].path must not be empty for kind = \"file\"".to_string(),
        ));
    }
    Ok(())
}

fn settings_from_raw(raw: &RawConfigFile) -> TriggerSettings {
    let keying = match raw.bymode {
        KeyMode::All => Keying::All,
        KeyMode::Each => Keying::Each {
            field: raw.by.trim().to_string(),
        },
    };

    let reset_match = if raw.reset.is_empty() {
        None
    } else {
        Some(raw.reset.clone())
    };

    TriggerSettings {
        id: raw.id.trim().to_string(),
        mode: raw.mode,
        delay_ms: raw.units.to_millis(raw.duration),
        extend: raw.extend,
        override_delay: raw.override_delay,
        reset_match,
        keying,
        second_output: raw.second_output,
        expiry_policy: raw.expired,
        op1: OutputSection::descriptor(raw.op1.as_ref(), "pay"),
        op2: OutputSection::descriptor(raw.op2.as_ref(), "nothing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::OutputDescriptor;
    use crate::types::{ExpiryPolicy, TriggerMode};

    fn parse(src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse("").unwrap();
        let s = &cfg.settings;
        assert_eq!(s.id, "default");
        assert_eq!(s.mode, TriggerMode::Wait);
        assert_eq!(s.delay_ms, 0);
        assert_eq!(s.keying, Keying::All);
        assert_eq!(s.reset_match, None);
        assert_eq!(s.expiry_policy, ExpiryPolicy::Discard);
        assert_eq!(s.op1, OutputDescriptor::Original);
        assert_eq!(s.op2, OutputDescriptor::Nothing);
        assert_eq!(s.store_key(), "persisted-trigger:default");
    }

    #[test]
    fn full_config_is_translated() {
        let cfg = parse(
            r#"
id = "door"
mode = "resend"
duration = 2
units = "min"
reset = "stop"
bymode = "each"
by = "payload.room"
second_output = true
expired = "flag"

[op1]
type = "num"
value = "42"

[op2]
value = "bye"

[store]
kind = "memory"
"#,
        )
        .unwrap();

        let s = &cfg.settings;
        assert_eq!(s.mode, TriggerMode::Resend);
        assert_eq!(s.delay_ms, 120_000);
        assert_eq!(s.reset_match.as_deref(), Some("stop"));
        assert_eq!(
            s.keying,
            Keying::Each {
                field: "payload.room".to_string()
            }
        );
        assert_eq!(s.op1, OutputDescriptor::Num("42".to_string()));
        // `[op2]` without a type keeps the slot's default tag.
        assert_eq!(s.op2, OutputDescriptor::Nothing);
        assert_eq!(cfg.store.kind, StoreKind::Memory);
    }

    #[test]
    fn each_keying_requires_field() {
        let err = parse("bymode = \"each\"\nby = \"  \"").unwrap_err();
        match err {
            TriggerError::ConfigError(msg) => assert!(msg.contains("by")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert!(matches!(
            parse("duration = -1"),
            Err(TriggerError::ConfigError(_))
        ));
    }

    #[test]
    fn unknown_mode_is_a_toml_error() {
        assert!(matches!(
            parse("mode = \"later\""),
            Err(TriggerError::TomlError(_))
        ));
    }
}
