//! Front matter remapping: parse the extracted YAML block, rework it into
//! the shape Zola expects, and serialize it as TOML with the document's key
//! order preserved.

use std::path::Path;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use toml::value::{Date, Datetime, Offset, Time};
use toml::{Table, Value};

use crate::context::{Context, RuleSet, Zone};
use crate::error::{Error, Result};
use crate::paths;

/// Formats tried, in order, when parsing `date` and `last_modified_at`
/// values. The first matching format wins; later ones are not consulted.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
];

/// Transforms an extracted Jekyll front matter block into serialized Zola
/// front matter: alias injection, date parsing, `last_modified_at` mapping,
/// and classification of every key into the root table, `[taxonomies]`, or
/// `[extra]`. `path` names the source file for alias derivation and error
/// context.
pub fn remap(matter: &str, path: &Path, context: &Context, rules: &RuleSet) -> Result<String> {
    let mut table = parse(matter, path)?;

    if context.aliases {
        let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
        let (year, month, day, slug) = paths::alias_parts(&name)?;
        let alias = format!("{year}/{month}/{day}/{slug}");
        table.insert("aliases".into(), Value::Array(vec![Value::String(alias)]));
    }

    let date = match table.get("date") {
        Some(Value::String(value)) => {
            let parsed = parse_date(value, context.zone).ok_or_else(|| Error::Date {
                path: path.to_path_buf(),
                value: value.clone(),
            })?;
            Some(parsed)
        }
        _ => None,
    };

    if let Some(date) = date {
        table.insert("date".into(), Value::Datetime(date));
    }

    let rendered = toml::to_string(&classify(table, context.zone, rules))
        .map_err(|source| Error::Serialize { path: path.to_path_buf(), source })?;

    Ok(flush_left(&rendered))
}

fn parse(matter: &str, path: &Path) -> Result<Table> {
    let deserialize = |source| Error::Deserialize { path: path.to_path_buf(), source };

    let value: serde_yaml::Value = serde_yaml::from_str(matter).map_err(deserialize)?;
    let mapping = match value {
        // An empty or comment-only block parses as null; treat it as an
        // empty mapping rather than a malformed one.
        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
        value => serde_yaml::from_value(value).map_err(deserialize)?,
    };

    Ok(table_of(mapping))
}

/// Partitions keys into the root table, `[taxonomies]`, and `[extra]`,
/// mapping `last_modified_at` to `updated` on the way through. Document
/// order is preserved; the two sub-tables append at the end.
fn classify(table: Table, zone: Zone, rules: &RuleSet) -> Table {
    let mut root = Table::new();
    let mut taxonomies = Table::new();
    let mut extra = Table::new();
    let mut updated = None;

    for (key, value) in table {
        if key == "last_modified_at" {
            // An unparseable value drops the field without failing the
            // file or producing `updated`.
            if let Value::String(ref value) = value {
                updated = parse_date(value, zone);
            }
            continue;
        }

        if rules.is_taxonomy(&key) {
            taxonomies.insert(key, value);
        } else if rules.is_root(&key) {
            root.insert(key, value);
        } else {
            extra.insert(key, value);
        }
    }

    if let Some(updated) = updated {
        root.insert("updated".into(), Value::Datetime(updated));
    }

    if !extra.is_empty() {
        root.insert("extra".into(), Value::Table(extra));
    }

    if !taxonomies.is_empty() {
        root.insert("taxonomies".into(), Value::Table(taxonomies));
    }

    root
}

/// Converts a YAML mapping into an ordered TOML table. Null values have no
/// TOML representation and are dropped, as are non-scalar keys.
fn table_of(mapping: serde_yaml::Mapping) -> Table {
    let mut table = Table::new();
    for (key, value) in mapping {
        let Some(key) = key_of(key) else { continue };
        match value_of(value) {
            Some(value) => {
                table.insert(key, value);
            }
            None => tracing::debug!(key = %key, "dropping null front matter value"),
        }
    }

    table
}

fn key_of(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(key) => Some(key),
        serde_yaml::Value::Bool(key) => Some(key.to_string()),
        serde_yaml::Value::Number(key) => Some(key.to_string()),
        key => {
            tracing::warn!(?key, "dropping non-scalar front matter key");
            None
        }
    }
}

fn value_of(value: serde_yaml::Value) -> Option<Value> {
    match value {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::Bool(value) => Some(Value::Boolean(value)),
        serde_yaml::Value::Number(value) => number_of(value),
        serde_yaml::Value::String(value) => Some(Value::String(value)),
        serde_yaml::Value::Sequence(values) => {
            Some(Value::Array(values.into_iter().filter_map(value_of).collect()))
        }
        serde_yaml::Value::Mapping(mapping) => Some(Value::Table(table_of(mapping))),
        serde_yaml::Value::Tagged(tagged) => value_of(tagged.value),
    }
}

fn number_of(value: serde_yaml::Number) -> Option<Value> {
    if let Some(value) = value.as_i64() {
        Some(Value::Integer(value))
    } else {
        value.as_f64().map(Value::Float)
    }
}

/// Parses a date string against [`DATE_FORMATS`], in order. Zone-carrying
/// formats take their offset from the value itself; zone-less formats are
/// interpreted in `zone`, falling back to UTC when the zone admits no such
/// wall-clock time. A value whose year cannot be represented in the
/// destination format is unparseable.
fn parse_date(value: &str, zone: Zone) -> Option<Datetime> {
    for format in DATE_FORMATS {
        if format.contains("%z") {
            if let Ok(parsed) = DateTime::parse_from_str(value, format) {
                return datetime_of(parsed);
            }
            continue;
        }

        let naive = if format.contains("%H") {
            NaiveDateTime::parse_from_str(value, format).ok()
        } else {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        };

        if let Some(naive) = naive {
            let resolved = zone
                .resolve(naive)
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive).fixed_offset());
            return datetime_of(resolved);
        }
    }

    None
}

fn datetime_of(instant: DateTime<FixedOffset>) -> Option<Datetime> {
    // chrono admits signed and five-digit years a TOML date cannot carry.
    let year = u16::try_from(instant.year()).ok()?;
    let minutes = instant.offset().local_minus_utc() / 60;
    Some(Datetime {
        date: Some(Date {
            year,
            month: instant.month() as u8,
            day: instant.day() as u8,
        }),
        time: Some(Time {
            hour: instant.hour() as u8,
            minute: instant.minute() as u8,
            second: instant.second() as u8,
            nanosecond: 0,
        }),
        offset: Some(match minutes {
            0 => Offset::Z,
            minutes => Offset::Custom { minutes: minutes as i16 },
        }),
    })
}

/// Flattens serializer indentation so nested tables render flush-left:
/// every line loses its leading spaces and tabs.
fn flush_left(rendered: &str) -> String {
    rendered
        .split('\n')
        .map(|line| line.trim_start_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}
