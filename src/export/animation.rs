//! The animation export path.
//!
//! Animations are authored against a referenced rig, but the downstream
//! engine only consumes baked joint curves. Getting there is destructive:
//! the rig reference is materialized, the skeleton is pulled out of it,
//! joints are baked, constraints are stripped, and the rig is deleted.
//! None of it can be undone in place. The caller reloads the document
//! afterwards regardless of what happens here, so a failure partway
//! leaves earlier steps applied only until that reload throws them away.

use scenedoc::{ConstraintKind, Document, NodeId, NodeKind};
use std::path::Path;

use crate::asset::AssetType;
use crate::error::Error;
use crate::ops;
use crate::pipeline_session::{CurrentAsset, PipelineSession};

pub fn export_animation(
    session: &PipelineSession,
    current: &CurrentAsset,
    target: &Path,
) -> Result<(), Error> {
    let doc = session.document();

    let rig = ops::first_descendant_of_type(doc, current.node, AssetType::Rig)?
        .ok_or(Error::MissingDependency(AssetType::Rig))?;

    // Materialize the rig reference into plain editable nodes so they can
    // be baked and deleted.
    let reference = doc.reference_for_node(rig)?.ok_or(Error::RigNotReferenced)?;
    doc.import_reference_contents(reference, true)?;

    let skeleton = ops::first_descendant_of_type(doc, rig, AssetType::Skeleton)?
        .ok_or(Error::MissingDependency(AssetType::Skeleton))?;

    // Move the skeleton out from under the rig so it survives the rig's
    // deletion.
    doc.set_locked(skeleton, false)?;
    doc.reparent(skeleton, Some(current.node))?;

    bake_joints(doc, skeleton)?;
    strip_constraints(doc, skeleton)?;

    ops::unlock_subtree(doc, rig)?;
    log::debug!("Deleting the rig subtree");
    doc.delete_nodes(&[rig])?;

    super::write_exchange(session, current, target)
}

/// Bakes every joint under the skeleton across the document's playback
/// range. A skeleton without joints has nothing to bake, which is fine.
fn bake_joints(doc: &Document, skeleton: NodeId) -> Result<(), Error> {
    let mut joints = Vec::new();
    for node in doc.descendants(skeleton)? {
        if doc.node_kind(node)? == NodeKind::Joint {
            joints.push(node);
        }
    }

    if joints.is_empty() {
        log::debug!("No joints to bake");
        return Ok(());
    }

    let range = doc.playback_range()?;
    log::debug!(
        "Baking {} joints across {}..{}",
        joints.len(),
        range.start,
        range.end
    );
    doc.bake_animation(&joints, range)?;

    Ok(())
}

/// Deletes every constraint under the skeleton, one kind at a time in the
/// host's documented order, so constraints driven by earlier kinds are
/// cleared deterministically. There is no rollback: kinds already stripped
/// stay stripped if a later deletion fails.
fn strip_constraints(doc: &Document, skeleton: NodeId) -> Result<(), Error> {
    for kind in ConstraintKind::ALL {
        // Collect before deleting; a constraint nested under another of the
        // same kind goes away with its parent, and its handle with it.
        let mut constraints = Vec::new();
        for node in doc.descendants(skeleton)? {
            if doc.node_kind(node)? == NodeKind::Constraint(kind) {
                log::debug!("Deleting constraint {}", doc.node_name(node)?);
                constraints.push(node);
            }
        }

        if !constraints.is_empty() {
            doc.delete_nodes(&constraints)?;
        }
    }

    Ok(())
}
