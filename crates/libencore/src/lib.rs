#![warn(missing_debug_implementations)]

use std::fmt::{self, Display};

pub mod instrument;

pub mod variants;

pub mod prelude {
    pub mod instrument {
        pub use crate::{
            instrument::{Action, Instrument, Outcome, Player, Profile, UnknownAction},
            variants::{Drums, Guitar, Piano, Record, Violin},
            Attribute, Clips,
        };
    }
}

/// A single `label: value` line shown when an instrument is selected.
///
/// Labels come from the attribute's field name so every variant renders its properties the
/// same way without any reflection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub label: String,
    pub value: String,
}

impl Attribute {
    pub fn new<V: Display>(field: &str, value: V) -> Self {
        Attribute {
            label: label_from_field(field),
            value: value.to_string(),
        }
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// `fretboard_material` -> `Fretboard material`
pub fn label_from_field(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Names of the two clips a variant can play, relative to the clip directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clips {
    pub tuned: &'static str,
    pub untuned: &'static str,
}

impl Clips {
    pub fn select(&self, tuned: bool) -> &'static str {
        if tuned {
            self.tuned
        } else {
            self.untuned
        }
    }
}
