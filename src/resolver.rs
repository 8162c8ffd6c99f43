//! The dependency resolver: turns the static dependency table into a list
//! of concrete source documents the user has agreed to pull in.
//!
//! Resolution never fails and never aborts the surrounding workflow. Every
//! prompt the user declines or cancels just means one less dependency; the
//! resulting asset is simply built without that substructure.

use std::path::{Path, PathBuf};

use crate::asset::{self, AssetType, DependencyRule};
use crate::pipeline_session::{CurrentAsset, PipelineSession};

/// File filter shown when picking dependency documents.
const SCENE_FILE_FILTER: &str = "Scene Files (*.ma)";

/// A dependency the user agreed to supply: the table rule it satisfies and
/// the document chosen as its source.
#[derive(Debug, Clone)]
pub struct DependencyChoice {
    pub rule: DependencyRule,
    pub source: PathBuf,
}

/// Resolves the dependencies for a new asset of `new_type`, in table order.
///
/// For each required type the user is first offered the currently open
/// asset when it matches, then asked to pick a different document starting
/// from `browse_from`. Declines and cancels drop the dependency and move
/// on.
pub fn resolve_dependencies(
    session: &mut PipelineSession,
    new_type: AssetType,
    current: Option<&CurrentAsset>,
    browse_from: &Path,
) -> Vec<DependencyChoice> {
    let mut choices = Vec::new();

    for &rule in asset::dependencies_for(new_type) {
        match resolve_one(session, rule, current, browse_from) {
            Some(source) => choices.push(DependencyChoice { rule, source }),
            None => log::debug!("No {} dependency supplied", rule.required),
        }
    }

    choices
}

fn resolve_one(
    session: &mut PipelineSession,
    rule: DependencyRule,
    current: Option<&CurrentAsset>,
    browse_from: &Path,
) -> Option<PathBuf> {
    if let Some(current) = current {
        if current.asset_type == rule.required {
            let message = format!(
                "Do you want to {} the currently opened {}?",
                rule.op, rule.required
            );
            if session.dialogs_mut().confirm(&message).is_yes() {
                return Some(current.path.clone());
            }
        }
    }

    let message = format!("Do you want to {} a {}?", rule.op, rule.required);
    if !session.dialogs_mut().confirm(&message).is_yes() {
        return None;
    }

    let caption = format!("Select {} file", rule.required);
    session
        .dialogs_mut()
        .pick_file(&caption, browse_from, SCENE_FILE_FILTER)
}
