//! Filename conventions and destination-path resolution for asset documents.
//!
//! Path resolution is a pure function of its inputs so the rules stay
//! testable without a live document.

use std::path::{Path, PathBuf};

use crate::asset::AssetType;
use crate::error::Error;

/// Extension used by authoring documents.
pub const SCENE_EXT: &str = ".ma";

/// Extension used by exported exchange files.
pub const EXCHANGE_EXT: &str = ".fbx";

/// Folder under the project root that holds all asset documents.
pub const SCENES_DIR_NAME: &str = "scenes";

/// Subfolder, beside a rig document, that holds the rig's animations.
pub const ANIMATIONS_DIR_NAME: &str = "Animations";

/// If the given string ends with the given suffix, returns the portion of
/// the string before the suffix.
pub fn match_trailing<'a>(input: &'a str, suffix: &str) -> Option<&'a str> {
    if input.ends_with(suffix) {
        let end = input.len().saturating_sub(suffix.len());
        Some(&input[..end])
    } else {
        None
    }
}

/// The document's base name with the scene extension stripped. Used to name
/// exchange files and reference namespaces.
pub fn document_stem(path: &Path) -> Result<&str, Error> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::BadFileName {
            path: path.to_path_buf(),
        })?;

    Ok(match_trailing(file_name, SCENE_EXT).unwrap_or(file_name))
}

/// Resolves the destination path for a new asset of the given type.
///
/// Most types produce `{scenesRoot}/{parentFolder}/{name}/{name}{suffix}.ma`.
/// Animations are named after the rig they animate instead, and live in an
/// `Animations` folder beside that rig: `{rigFolder}/Animations/{rigBase}@{name}.ma`,
/// where `rigBase` is the rig's file name with its extension and `_RIG`
/// suffix stripped.
pub fn new_asset_path(
    scenes_root: &Path,
    asset_type: AssetType,
    parent_folder: &str,
    name: &str,
    rig_path: Option<&Path>,
) -> Result<PathBuf, Error> {
    if name.is_empty() {
        return Err(Error::EmptyAssetName);
    }

    if asset_type == AssetType::Animation {
        let rig_path = rig_path.ok_or(Error::MissingRigPath)?;
        let rig_suffix = AssetType::Rig
            .file_suffix()
            .expect("rigs use the suffix convention");

        let stem = document_stem(rig_path)?;
        let rig_base = match_trailing(stem, rig_suffix).unwrap_or(stem);
        let file_name = format!("{}@{}{}", rig_base, name, SCENE_EXT);

        let rig_folder = rig_path.parent().unwrap_or_else(|| Path::new(""));
        return Ok(rig_folder.join(ANIMATIONS_DIR_NAME).join(file_name));
    }

    if parent_folder.is_empty() {
        return Err(Error::EmptyParentFolder);
    }

    let suffix = asset_type
        .file_suffix()
        .ok_or(Error::NotCreatable(asset_type))?;
    let file_name = format!("{}{}{}", name, suffix, SCENE_EXT);

    Ok(scenes_root.join(parent_folder).join(name).join(file_name))
}
