#![forbid(unsafe_code)]

//! Editing presentation state machine.
//!
//! The container shows one of two mutually exclusive markers: "at rest" or
//! "editing". Before the first edit it shows neither.
//!
//! ```text
//!            editing            editing
//!  Neutral ──────────► Editing ◄──────── Resting
//!                        │   ▲              ▲
//!                        │   └──────────────┘ (editing)
//!                        └──────────────────┘ (not editing)
//! ```
//!
//! `Neutral` and `Resting` ignore "not editing". The function is pure; the
//! caller decides when to invoke it (the roller does so only when its
//! editing flag actually changes) and how to apply the marker.

use crate::config::MarkerConfig;

/// Presentation state of the roller container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Presentation {
    /// No marker applied yet.
    #[default]
    Neutral,
    Resting,
    Editing,
}

impl Presentation {
    /// Marker name for this state, if any.
    #[must_use]
    pub fn marker<'a>(&self, markers: &'a MarkerConfig) -> Option<&'a str> {
        match self {
            Self::Neutral => None,
            Self::Resting => Some(&markers.resting),
            Self::Editing => Some(&markers.editing),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Resting => "resting",
            Self::Editing => "editing",
        }
    }
}

/// Next presentation given the current one and the new editing flag.
#[must_use]
pub const fn transition(current: Presentation, is_editing: bool) -> Presentation {
    match (current, is_editing) {
        (_, true) => Presentation::Editing,
        (Presentation::Editing, false) => Presentation::Resting,
        (other, false) => other,
    }
}

/// Markers to remove and add when moving from `from` to `to`.
///
/// Returns `(removed, added)`; both are `None` when nothing changes.
#[must_use]
pub fn marker_delta<'a>(
    from: Presentation,
    to: Presentation,
    markers: &'a MarkerConfig,
) -> (Option<&'a str>, Option<&'a str>) {
    if from == to {
        return (None, None);
    }
    (from.marker(markers), to.marker(markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_wins_from_every_state() {
        for state in [
            Presentation::Neutral,
            Presentation::Resting,
            Presentation::Editing,
        ] {
            assert_eq!(transition(state, true), Presentation::Editing);
        }
    }

    #[test]
    fn leaving_edit_mode_rests() {
        assert_eq!(
            transition(Presentation::Editing, false),
            Presentation::Resting
        );
    }

    #[test]
    fn not_editing_without_editing_marker_changes_nothing() {
        assert_eq!(
            transition(Presentation::Neutral, false),
            Presentation::Neutral
        );
        assert_eq!(
            transition(Presentation::Resting, false),
            Presentation::Resting
        );
    }

    #[test]
    fn markers_follow_config() {
        let markers = MarkerConfig::default();
        assert_eq!(Presentation::Neutral.marker(&markers), None);
        assert_eq!(Presentation::Resting.marker(&markers), Some("normal"));
        assert_eq!(Presentation::Editing.marker(&markers), Some("editing"));
    }

    #[test]
    fn delta_swaps_markers() {
        let markers = MarkerConfig::default();
        assert_eq!(
            marker_delta(Presentation::Resting, Presentation::Editing, &markers),
            (Some("normal"), Some("editing"))
        );
        assert_eq!(
            marker_delta(Presentation::Neutral, Presentation::Editing, &markers),
            (None, Some("editing"))
        );
        assert_eq!(
            marker_delta(Presentation::Editing, Presentation::Editing, &markers),
            (None, None)
        );
    }
}
