//! Effect list of the zone light.
//!
//! Scenes and controllers are exposed as light effects, e.g.
//! `Scene: Relax ✅` or `Control: Remote`. The marker flags the current
//! value of each list.

use crate::zone::{ListKind, Zone};

pub const SCENE_PREFIX: &str = "Scene";
pub const CONTROL_PREFIX: &str = "Control";
pub const SELECTED_MARKER: &str = " ✅";

fn prefix(list: ListKind) -> &'static str {
    match list {
        ListKind::Scene => SCENE_PREFIX,
        ListKind::Controller => CONTROL_PREFIX,
    }
}

/// All scenes, then all controllers, as effect names.
#[must_use]
pub fn effect_list(zone: &Zone) -> Vec<String> {
    [ListKind::Scene, ListKind::Controller]
        .into_iter()
        .flat_map(|list| {
            let selection = zone.selection(list);
            selection
                .options()
                .iter()
                .map(|option| {
                    let marker = if selection.current() == Some(option.as_str()) {
                        SELECTED_MARKER
                    } else {
                        ""
                    };
                    format!("{}: {option}{marker}", prefix(list))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Split an effect name into its list and value.
///
/// Returns `None` for unknown prefixes or an empty value.
#[must_use]
pub fn parse_effect(effect: &str) -> Option<(ListKind, String)> {
    let (kind, value) = effect.split_once(": ")?;
    let list = match kind {
        SCENE_PREFIX => ListKind::Scene,
        CONTROL_PREFIX => ListKind::Controller,
        _ => return None,
    };
    let value = value.strip_suffix(SELECTED_MARKER).unwrap_or(value);
    if value.is_empty() {
        return None;
    }
    Some((list, value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneConfig;

    fn zone() -> Zone {
        let config = ZoneConfig::builder()
            .name("Bedroom")
            .light("light.bed")
            .scene("Relax")
            .event_scene("Wake")
            .controller("Remote")
            .build()
            .unwrap();
        Zone::new(&config)
    }

    #[test]
    fn should_list_scenes_then_controllers_with_marker_on_current() {
        let mut zone = zone();
        let _ = zone.select(ListKind::Scene, "Relax");
        assert_eq!(
            effect_list(&zone),
            vec![
                "Scene: Manual",
                "Scene: Relax ✅",
                "Scene: Wake",
                "Control: Manual",
                "Control: Remote",
            ]
        );
    }

    #[test]
    fn should_parse_scene_and_control_effects() {
        assert_eq!(
            parse_effect("Scene: Relax"),
            Some((ListKind::Scene, "Relax".to_string()))
        );
        assert_eq!(
            parse_effect("Control: Remote"),
            Some((ListKind::Controller, "Remote".to_string()))
        );
    }

    #[test]
    fn should_ignore_selection_marker_when_parsing() {
        assert_eq!(
            parse_effect("Scene: Relax ✅"),
            Some((ListKind::Scene, "Relax".to_string()))
        );
    }

    #[test]
    fn should_keep_colons_inside_value() {
        assert_eq!(
            parse_effect("Scene: Movie: Act 2"),
            Some((ListKind::Scene, "Movie: Act 2".to_string()))
        );
    }

    #[test]
    fn should_reject_unknown_prefix_or_missing_separator() {
        assert_eq!(parse_effect("Colorloop"), None);
        assert_eq!(parse_effect("Rainbow: fast"), None);
        assert_eq!(parse_effect("Scene: "), None);
    }
}
