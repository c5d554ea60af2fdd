//! Schema validation for Carewatch JSON5 layers.
//!
//! Runs on every layer before merging so that errors name the file and key
//! that introduced them.

use crate::ConfigError;
use serde_json::Value;

/// Expected shape of a config value.
enum Kind {
    Str,
    Int,
    Num,
    OneOf(&'static [&'static str]),
    Section(&'static [(&'static str, Kind)]),
}

const RETRY: &[(&str, Kind)] = &[("max_attempts", Kind::Int), ("backoff_ms", Kind::Int)];

const ROOT: &[(&str, Kind)] = &[
    ("$schema", Kind::Str),
    (
        "server",
        Kind::Section(&[("host", Kind::Str), ("port", Kind::Int)]),
    ),
    (
        "storage",
        Kind::Section(&[
            ("backend", Kind::OneOf(&["file", "memory"])),
            ("path", Kind::Str),
        ]),
    ),
    (
        "provider",
        Kind::Section(&[
            ("model", Kind::Str),
            ("api_key_env", Kind::Str),
            ("timeout_secs", Kind::Int),
            ("temperature", Kind::Num),
            ("max_tokens", Kind::Int),
            ("retry", Kind::Section(RETRY)),
        ]),
    ),
    (
        "assessment",
        Kind::Section(&[
            ("history_window", Kind::Int),
            ("trend_threshold", Kind::Num),
            ("concerning_threshold", Kind::Num),
            ("max_suggestions", Kind::Int),
        ]),
    ),
    (
        "checkins",
        Kind::Section(&[
            ("default_limit", Kind::Int),
            ("max_limit", Kind::Int),
            ("notes_max_chars", Kind::Int),
        ]),
    ),
];

/// Validate a single config layer.
pub(super) fn validate_layer(value: &Value, layer: &str) -> Result<(), ConfigError> {
    check(value, &Kind::Section(ROOT), layer, "")
}

fn check(value: &Value, kind: &Kind, layer: &str, path: &str) -> Result<(), ConfigError> {
    match kind {
        Kind::Str if value.is_string() => Ok(()),
        Kind::Str => Err(invalid(layer, path, "expected string")),
        Kind::Int if value.is_u64() => Ok(()),
        Kind::Int => Err(invalid(layer, path, "expected non-negative integer")),
        Kind::Num if value.is_number() => Ok(()),
        Kind::Num => Err(invalid(layer, path, "expected number")),
        Kind::OneOf(allowed) => match value.as_str() {
            Some(text) if allowed.contains(&text) => Ok(()),
            _ => Err(invalid(
                layer,
                path,
                &format!("expected one of: {}", allowed.join(", ")),
            )),
        },
        Kind::Section(fields) => {
            let Some(map) = value.as_object() else {
                return Err(invalid(layer, path, "expected object"));
            };
            for (key, child) in map {
                let child_path = join(path, key);
                let Some((_, child_kind)) =
                    fields.iter().find(|(name, _)| *name == key.as_str())
                else {
                    return Err(invalid(layer, &child_path, "unknown key"));
                };
                check(child, child_kind, layer, &child_path)?;
            }
            Ok(())
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::field(format!("{layer}:{path}"), message)
}
