//! The asset type model: the fixed set of asset classifications, their
//! filename conventions, and the static dependency table between types.
//!
//! Everything in this module is pure policy. The tables here drive the
//! dependency resolver and the export pipeline, so they are kept as plain
//! data rather than branching logic spread across call sites.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the single top-level node that marks a document as an asset.
pub const ASSET_NODE_NAME: &str = "Asset";

/// Attribute on the asset node holding the asset's type label.
pub const ASSET_TYPE_ATTR: &str = "asset_type";

/// Optional attribute marking a mesh asset as static geometry.
pub const STATIC_ATTR: &str = "static";

/// Optional attribute marking an animation asset as looping.
pub const LOOP_ATTR: &str = "loop";

/// Staging namespace that imported dependency contents land in before they
/// are collapsed under the asset node.
pub const IMPORT_NAMESPACE: &str = "ImportedNodes";

/// Classification of an asset document, stored as a locked string attribute
/// on its asset node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Mesh,
    Skeleton,
    SkinnedMesh,
    Rig,
    Animation,

    /// The explicit absent case: the node carries no recognized type tag.
    /// Documents classified as `None` are not valid assets.
    None,
}

impl AssetType {
    /// The label written to the type attribute and used when renaming
    /// collapsed dependency nodes.
    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Mesh => "Mesh",
            AssetType::Skeleton => "Skeleton",
            AssetType::SkinnedMesh => "SkinnedMesh",
            AssetType::Rig => "Rig",
            AssetType::Animation => "Animation",
            AssetType::None => "None",
        }
    }

    /// Filename suffix for documents of this type, if the type uses the
    /// suffix convention. Animation documents are named after their rig
    /// instead and carry no suffix.
    pub fn file_suffix(&self) -> Option<&'static str> {
        match self {
            AssetType::Mesh => Some("_MSH"),
            AssetType::Skeleton => Some("_SKL"),
            AssetType::SkinnedMesh => Some("_SKM"),
            AssetType::Rig => Some("_RIG"),
            AssetType::Animation | AssetType::None => None,
        }
    }

    /// Name of the exchange-format preset used to export this type, if it
    /// is exportable at all. Rigs and skeletons are intermediate build
    /// material and have no preset.
    pub fn preset_file_name(&self) -> Option<&'static str> {
        match self {
            AssetType::Mesh => Some("mesh.fbxexportpreset"),
            AssetType::SkinnedMesh => Some("skinned_mesh.fbxexportpreset"),
            AssetType::Animation => Some("animation.fbxexportpreset"),
            AssetType::Skeleton | AssetType::Rig | AssetType::None => None,
        }
    }

    pub fn is_exportable(&self) -> bool {
        self.preset_file_name().is_some()
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Mesh" => Ok(AssetType::Mesh),
            "Skeleton" => Ok(AssetType::Skeleton),
            "SkinnedMesh" => Ok(AssetType::SkinnedMesh),
            "Rig" => Ok(AssetType::Rig),
            "Animation" => Ok(AssetType::Animation),
            "None" => Ok(AssetType::None),
            _ => Err(format!("Unknown asset type: {}", value)),
        }
    }
}

/// How a dependency is pulled into a new asset document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyOp {
    /// A one-time copy of the source document's asset subtree, losing the
    /// link to the source.
    Import,

    /// A live link to the source document under a namespace; edits to the
    /// source propagate.
    Reference,
}

impl fmt::Display for DependencyOp {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DependencyOp::Import => "Import",
            DependencyOp::Reference => "Reference",
        };
        formatter.write_str(name)
    }
}

/// One row of the dependency table: a required asset type and the operation
/// used to bring it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRule {
    pub required: AssetType,
    pub op: DependencyOp,
}

const fn rule(required: AssetType, op: DependencyOp) -> DependencyRule {
    DependencyRule { required, op }
}

/// The ordered list of dependencies a new asset of the given type needs,
/// straight from the fixed table:
///
/// * Skeleton ← Reference(Mesh)
/// * SkinnedMesh ← Import(Mesh), Import(Skeleton)
/// * Rig ← Import(SkinnedMesh)
/// * Animation ← Reference(Rig)
///
/// Meshes stand alone and need nothing.
pub fn dependencies_for(asset_type: AssetType) -> &'static [DependencyRule] {
    static SKELETON: [DependencyRule; 1] = [rule(AssetType::Mesh, DependencyOp::Reference)];
    static SKINNED_MESH: [DependencyRule; 2] = [
        rule(AssetType::Mesh, DependencyOp::Import),
        rule(AssetType::Skeleton, DependencyOp::Import),
    ];
    static RIG: [DependencyRule; 1] = [rule(AssetType::SkinnedMesh, DependencyOp::Import)];
    static ANIMATION: [DependencyRule; 1] = [rule(AssetType::Rig, DependencyOp::Reference)];

    match asset_type {
        AssetType::Skeleton => &SKELETON,
        AssetType::SkinnedMesh => &SKINNED_MESH,
        AssetType::Rig => &RIG,
        AssetType::Animation => &ANIMATION,
        AssetType::Mesh | AssetType::None => &[],
    }
}
