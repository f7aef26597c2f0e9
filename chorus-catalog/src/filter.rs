//! The Model Filter: `isChatCompatible` (spec §4.8).

use chorus_core::{Capabilities, Model};

const REJECTED_NAME_SUBSTRINGS: &[&str] = &["codex", "embedding", "vision"];
const REJECTED_FAMILY_SUBSTRINGS: &[&str] = &["codex", "embedding", "text-embedding"];

/// `true` if `model` may be offered for chat orchestration (spec §4.8).
///
/// When a model carries no capability metadata (all [`Capabilities`] fields at their
/// zero value, i.e. never populated by the user or the Catalog Refresher), the filter
/// falls back to a name-substring heuristic; once metadata is present, it is trusted
/// over the name (spec §4.8: "if metadata present: require toolCall = true and
/// temperatureCap = true...").
#[must_use]
pub fn is_chat_compatible(model: &Model) -> bool {
    let name_lower = model.name.to_lowercase();
    if capabilities_absent(&model.capabilities) {
        return !REJECTED_NAME_SUBSTRINGS.iter().any(|s| name_lower.contains(s));
    }

    if !model.capabilities.tool_call || !model.capabilities.temperature_cap {
        return false;
    }
    if model.capabilities.family.as_deref() == Some("o") {
        return false;
    }
    if let Some(family) = &model.capabilities.family {
        let family_lower = family.to_lowercase();
        if REJECTED_FAMILY_SUBSTRINGS.iter().any(|s| family_lower.contains(s)) {
            return false;
        }
    }
    if REJECTED_NAME_SUBSTRINGS.iter().any(|s| name_lower.contains(s)) {
        return false;
    }
    true
}

/// A [`Model`] created without any capability data set looks identical, on the wire,
/// to one whose author deliberately left everything at its zero value — spec §4.8
/// distinguishes "metadata absent" from "metadata present" without a sentinel, so this
/// treats `Capabilities::default()` as the absent case (recorded as an Open Question
/// resolution in DESIGN.md).
fn capabilities_absent(capabilities: &Capabilities) -> bool {
    capabilities == &Capabilities::default()
}
