//! Primitive operations on the open document's node hierarchy: creating and
//! tagging asset nodes, recursive locking, lock-preserving reparents, and
//! namespace collapse.
//!
//! Each operation stands alone and can be exercised against an in-memory
//! document; the creation workflow and export pipeline are built out of
//! these.

use scenedoc::{AttrValue, Document, NodeId};

use crate::asset::{AssetType, ASSET_NODE_NAME, ASSET_TYPE_ATTR};
use crate::error::Error;

/// Creates an empty node at the top level of the document.
pub fn create_top_level_node(doc: &Document, name: &str) -> Result<NodeId, Error> {
    Ok(doc.create_node(name, None)?)
}

/// Writes an attribute and locks it in one step, working around the owning
/// node's lock if it is set.
pub fn add_locked_attribute(
    doc: &Document,
    node: NodeId,
    name: &str,
    value: impl Into<AttrValue>,
) -> Result<(), Error> {
    let was_locked = doc.is_locked(node)?;
    if was_locked {
        doc.set_locked(node, false)?;
    }

    doc.set_attribute(node, name, value.into(), true)?;

    if was_locked {
        doc.set_locked(node, true)?;
    }

    Ok(())
}

/// Stamps `node` as an asset node of the given type. The tag is written
/// locked; its presence is what downstream validation checks.
pub fn set_type_attribute(
    doc: &Document,
    node: NodeId,
    asset_type: AssetType,
) -> Result<(), Error> {
    add_locked_attribute(doc, node, ASSET_TYPE_ATTR, asset_type.label())
}

/// Locks `node` and every node beneath it. Nodes that are already locked
/// stay locked, so repeated calls are harmless.
pub fn lock_subtree(doc: &Document, node: NodeId) -> Result<(), Error> {
    set_subtree_locked(doc, node, true)
}

/// Unlocks `node` and every node beneath it.
pub fn unlock_subtree(doc: &Document, node: NodeId) -> Result<(), Error> {
    set_subtree_locked(doc, node, false)
}

fn set_subtree_locked(doc: &Document, node: NodeId, locked: bool) -> Result<(), Error> {
    doc.set_locked(node, locked)?;
    for descendant in doc.descendants(node)? {
        doc.set_locked(descendant, locked)?;
    }

    Ok(())
}

/// Moves `node` under `new_parent`, or to the top level. Moving a locked
/// node is a precondition violation; unlock it first or use
/// [`reparent_preserving_lock`].
pub fn reparent(doc: &Document, node: NodeId, new_parent: Option<NodeId>) -> Result<(), Error> {
    if doc.is_locked(node)? {
        return Err(Error::LockedNode {
            name: doc.node_name(node)?,
        });
    }

    Ok(doc.reparent(node, new_parent)?)
}

/// Moves `node` under `new_parent`, unlocking it for the move and restoring
/// the lock afterwards if it was locked before.
pub fn reparent_preserving_lock(
    doc: &Document,
    node: NodeId,
    new_parent: Option<NodeId>,
) -> Result<(), Error> {
    let was_locked = doc.is_locked(node)?;
    if was_locked {
        doc.set_locked(node, false)?;
    }

    doc.reparent(node, new_parent)?;

    if was_locked {
        doc.set_locked(node, true)?;
    }

    Ok(())
}

/// The first top-level node with the given name. Namespaced nodes are
/// skipped: their qualified names carry the namespace prefix, so a plain
/// name only ever matches a node in the root namespace.
pub fn top_level_node_by_name(doc: &Document, name: &str) -> Result<Option<NodeId>, Error> {
    for node in doc.top_level_nodes()? {
        if doc.node_namespace(node)?.is_some() {
            continue;
        }
        if doc.node_name(node)? == name {
            return Ok(Some(node));
        }
    }

    Ok(None)
}

/// The document's asset node: the top-level node named `Asset`, in the root
/// namespace, carrying the type tag attribute. `None` means the document is
/// not a valid asset.
pub fn find_asset_node(doc: &Document) -> Result<Option<NodeId>, Error> {
    let node = match top_level_node_by_name(doc, ASSET_NODE_NAME)? {
        Some(node) => node,
        None => return Ok(None),
    };

    if doc.has_attribute(node, ASSET_TYPE_ATTR)? {
        Ok(Some(node))
    } else {
        log::debug!("Node {} does not carry a type tag", ASSET_NODE_NAME);
        Ok(None)
    }
}

/// Resolves the asset type a node is tagged with. An absent tag classifies
/// as the explicit [`AssetType::None`]; a tag that doesn't parse is an
/// error.
pub fn classify(doc: &Document, node: NodeId) -> Result<AssetType, Error> {
    let value = match doc.attribute(node, ASSET_TYPE_ATTR)? {
        Some(value) => value,
        None => return Ok(AssetType::None),
    };

    let label = match value.as_str() {
        Some(label) => label,
        None => {
            return Err(Error::UnknownTypeTag {
                value: format!("{:?}", value),
            })
        }
    };

    label.parse().map_err(|_| Error::UnknownTypeTag {
        value: label.to_owned(),
    })
}

/// The first descendant of `node` tagged with the given asset type, in
/// depth-first order.
pub fn first_descendant_of_type(
    doc: &Document,
    node: NodeId,
    asset_type: AssetType,
) -> Result<Option<NodeId>, Error> {
    for descendant in doc.descendants(node)? {
        if classify(doc, descendant)? == asset_type {
            log::debug!(
                "Found {} node named {}",
                asset_type,
                doc.node_name(descendant)?
            );
            return Ok(Some(descendant));
        }
    }

    Ok(None)
}

/// Collapses a staging namespace into the asset hierarchy: every top-level
/// node in the namespace is moved under `target_parent` and renamed to its
/// own asset-type label, preserving each node's lock state, and the emptied
/// namespace is removed. Collapsing a namespace that doesn't exist is a
/// no-op.
///
/// Two nodes resolving to the same label would collide on rename, so that
/// case is rejected up front, before anything is mutated.
pub fn collapse_namespace_into_parent(
    doc: &Document,
    namespace: &str,
    target_parent: NodeId,
) -> Result<(), Error> {
    if !doc.namespace_exists(namespace)? {
        return Ok(());
    }

    let nodes = doc.nodes_in_namespace(namespace)?;

    let mut labeled: Vec<(NodeId, &'static str)> = Vec::with_capacity(nodes.len());
    for &node in &nodes {
        let label = classify(doc, node)?.label();

        if let Some(&(first, _)) = labeled.iter().find(|(_, seen)| *seen == label) {
            return Err(Error::DuplicateTypeLabel {
                first: doc.node_name(first)?,
                second: doc.node_name(node)?,
                label: label.to_owned(),
            });
        }

        labeled.push((node, label));
    }

    for (node, label) in labeled {
        let was_locked = doc.is_locked(node)?;
        if was_locked {
            doc.set_locked(node, false)?;
        }

        log::debug!("Moving {} under the asset node", doc.node_name(node)?);
        doc.reparent(node, Some(target_parent))?;
        doc.rename_node(node, label)?;

        if was_locked {
            doc.set_locked(node, true)?;
        }
    }

    // The renames already pulled the roots out of the namespace; nodes
    // deeper in the imported trees may still carry it.
    if doc.namespace_exists(namespace)? {
        doc.remove_namespace(namespace)?;
    }

    Ok(())
}
