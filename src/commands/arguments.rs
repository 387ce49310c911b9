//! Positional argument reading.
//!
//! Turns the words left after command resolution into named values following
//! the command's [`ArgumentSpec`]s.

use std::collections::HashMap;

use thiserror::Error;

use crate::commands::{ArgumentKind, ArgumentSpec};

/// Errors raised while reading arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    /// A required argument has no value and no default.
    #[error("missing argument `{0}`")]
    Missing(String),
    /// A number argument could not be parsed.
    #[error("`{value}` is not a valid number for `{name}`")]
    InvalidNumber {
        /// Argument name
        name: String,
        /// Word given by the user
        value: String,
    },
}

/// Reads `words` according to `specs`.
///
/// Missing optional arguments take their default, or are left out of the map
/// when they have none.
///
/// # Errors
///
/// Returns [`ArgumentError::Missing`] for a required argument without value and
/// [`ArgumentError::InvalidNumber`] for a number argument that does not parse.
pub fn parse_arguments(
    specs: &[ArgumentSpec],
    words: &[String],
) -> Result<HashMap<String, String>, ArgumentError> {
    let mut values = HashMap::new();
    let mut words = words.iter();

    for spec in specs {
        let value = match spec.kind {
            ArgumentKind::Rest => {
                let rest: Vec<&str> = words.by_ref().map(String::as_str).collect();
                (!rest.is_empty()).then(|| rest.join(" "))
            }
            ArgumentKind::Word | ArgumentKind::Number => words.next().cloned(),
        };

        let Some(value) = value.or_else(|| spec.default.clone()) else {
            if spec.required {
                return Err(ArgumentError::Missing(spec.name.clone()));
            }
            continue;
        };

        if spec.kind == ArgumentKind::Number && value.parse::<i64>().is_err() {
            return Err(ArgumentError::InvalidNumber {
                name: spec.name.clone(),
                value,
            });
        }

        values.insert(spec.name.clone(), value);
    }

    Ok(values)
}
