//! Event kinds and how each one is presented.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a calendar entry, parsed from the source's `type` tag.
///
/// Tags the engine does not recognise are kept verbatim in `Unknown` so
/// they still render (with a neutral style) and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Reservation,
    OwnerStay,
    Maintenance,
    Cleaning,
    Blocked,
    Unknown(String),
}

/// Display hints handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub css_class: &'static str,
    pub label: &'static str,
}

impl EventKind {
    /// Parse a type tag. Matching ignores case and treats `-`, `_` and spaces alike.
    pub fn from_tag(tag: &str) -> Self {
        let normalized: String = tag
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "reservation" | "booking" | "guest" => EventKind::Reservation,
            "ownerstay" | "owner" => EventKind::OwnerStay,
            "maintenance" | "repair" => EventKind::Maintenance,
            "cleaning" | "turnover" => EventKind::Cleaning,
            "blocked" | "block" | "hold" => EventKind::Blocked,
            _ => EventKind::Unknown(tag.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            EventKind::Reservation => "reservation",
            EventKind::OwnerStay => "owner_stay",
            EventKind::Maintenance => "maintenance",
            EventKind::Cleaning => "cleaning",
            EventKind::Blocked => "blocked",
            EventKind::Unknown(tag) => tag,
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            EventKind::Reservation => Presentation {
                css_class: "event-reservation",
                label: "Reservation",
            },
            EventKind::OwnerStay => Presentation {
                css_class: "event-owner-stay",
                label: "Owner stay",
            },
            EventKind::Maintenance => Presentation {
                css_class: "event-maintenance",
                label: "Maintenance",
            },
            EventKind::Cleaning => Presentation {
                css_class: "event-cleaning",
                label: "Cleaning",
            },
            EventKind::Blocked => Presentation {
                css_class: "event-blocked",
                label: "Blocked",
            },
            EventKind::Unknown(_) => Presentation {
                css_class: "event-other",
                label: "Event",
            },
        }
    }
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::Unknown(String::new())
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        EventKind::from_tag(&tag)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.tag().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
