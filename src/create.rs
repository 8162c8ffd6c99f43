//! The new-asset creation workflow: validates the request, resolves
//! dependencies, creates the document, builds and tags the asset node, and
//! pulls every agreed dependency in by import or reference.
//!
//! Failures abort the remaining steps but roll nothing back; a document
//! file already written stays on disk for the user to fix or discard.

use std::path::{Path, PathBuf};

use scenedoc::{Document, ExportFormat, NodeId};

use crate::asset::{
    AssetType, DependencyOp, ASSET_NODE_NAME, IMPORT_NAMESPACE, LOOP_ATTR, STATIC_ATTR,
};
use crate::dialog::SaveChoice;
use crate::error::Error;
use crate::naming::{self, SCENE_EXT};
use crate::ops;
use crate::pipeline_session::PipelineSession;
use crate::resolver;

/// What the user asked to create.
#[derive(Debug, Clone)]
pub struct NewAssetRequest {
    pub asset_type: AssetType,
    pub name: String,
    /// Folder under the scenes root the asset lives in. Ignored for
    /// animations, which live beside their rig.
    pub parent_folder: String,
}

/// Result of a creation run that didn't error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The asset document was created and saved at the given path.
    Created { path: PathBuf },
    /// The user backed out at one of the prompts.
    Cancelled,
}

/// Runs the whole creation workflow for `request`.
pub fn create_asset(
    session: &mut PipelineSession,
    request: &NewAssetRequest,
) -> Result<CreateOutcome, Error> {
    if request.name.is_empty() {
        return Err(Error::EmptyAssetName);
    }
    if request.asset_type == AssetType::None {
        return Err(Error::NotCreatable(request.asset_type));
    }
    if request.asset_type != AssetType::Animation && request.parent_folder.is_empty() {
        return Err(Error::EmptyParentFolder);
    }

    log::info!("Creating {} asset {}", request.asset_type, request.name);

    if !ensure_current_document_saved(session)? {
        return Ok(CreateOutcome::Cancelled);
    }

    let current = session.current_asset().ok();
    let browse_from = session.scenes_root().join(&request.parent_folder);
    let choices = resolver::resolve_dependencies(
        session,
        request.asset_type,
        current.as_ref(),
        &browse_from,
    );

    // Animations are named after the rig they reference, so the resolved
    // rig path feeds into the destination.
    let rig_path = choices
        .iter()
        .find(|choice| {
            choice.rule.required == AssetType::Rig && choice.rule.op == DependencyOp::Reference
        })
        .map(|choice| choice.source.clone());

    let destination = naming::new_asset_path(
        &session.scenes_root(),
        request.asset_type,
        &request.parent_folder,
        &request.name,
        rig_path.as_deref(),
    )?;

    if session.document().path_exists(&destination)? {
        let file_name = destination
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let message = format!("{} exists, do you want to overwrite the file?", file_name);
        log::warn!("{} Full path: {}", message, destination.display());

        if !session.dialogs_mut().confirm(&message).is_yes() {
            log::debug!("Cancelled during asset file creation");
            return Ok(CreateOutcome::Cancelled);
        }
    }

    create_document_at(session, &destination)?;

    let doc = session.document();
    let asset_node = ops::create_top_level_node(doc, ASSET_NODE_NAME)?;
    ops::set_type_attribute(doc, asset_node, request.asset_type)?;

    if request.asset_type == AssetType::Mesh {
        let answer = session.dialogs_mut().confirm("Will this be a static mesh?");
        if answer.is_yes() {
            ops::add_locked_attribute(session.document(), asset_node, STATIC_ATTR, true)?;
        }
    }
    if request.asset_type == AssetType::Animation {
        let answer = session.dialogs_mut().confirm("Will this animation loop?");
        if answer.is_yes() {
            ops::add_locked_attribute(session.document(), asset_node, LOOP_ATTR, true)?;
        }
    }

    // Rig asset nodes stay unlocked: a later animation export has to move
    // the skeleton out from beneath the rig.
    if request.asset_type != AssetType::Rig {
        session.document().set_locked(asset_node, true)?;
    }

    let mut reference_namespaces = Vec::new();
    for choice in &choices {
        match choice.rule.op {
            DependencyOp::Import => {
                import_asset_node_from(session, &choice.source, &destination)?
            }
            DependencyOp::Reference => {
                reference_namespaces.push(reference_asset_from(session, &choice.source)?)
            }
        }
    }

    // Imports reopen the document, which invalidates every node handle, so
    // the asset node has to be found again.
    let doc = session.document();
    let asset_node = ops::find_asset_node(doc)?.ok_or_else(|| Error::MissingAssetNode {
        path: destination.clone(),
    })?;

    ops::collapse_namespace_into_parent(doc, IMPORT_NAMESPACE, asset_node)?;

    for namespace in &reference_namespaces {
        attach_reference_root(doc, namespace, asset_node)?;
    }

    doc.save(true)?;

    log::info!("Created asset at: {}", destination.display());
    Ok(CreateOutcome::Created { path: destination })
}

/// Gets outstanding edits onto disk before the workflow starts switching
/// documents. Returns false if the user cancelled.
fn ensure_current_document_saved(session: &mut PipelineSession) -> Result<bool, Error> {
    if session.document().current_path().is_some() {
        // Titled documents are saved quietly to avoid losing work.
        session.document().save(true)?;
        return Ok(true);
    }

    let choice = session
        .dialogs_mut()
        .save_changes("Save changes to untitled document?");

    match choice {
        SaveChoice::Save => {
            let start = session.scenes_root();
            let picked = session
                .dialogs_mut()
                .pick_save_path("Save current document", &start);

            let path = match picked {
                Some(path) => path,
                None => {
                    log::debug!("Cancelled saving the untitled document");
                    return Ok(false);
                }
            };

            session.document().rename_document(&path)?;
            session.document().save(true)?;
            Ok(true)
        }
        SaveChoice::DontSave => Ok(true),
        SaveChoice::Cancel => {
            log::debug!("Cancelled during the unsaved-changes prompt");
            Ok(false)
        }
    }
}

/// Creates and saves a fresh, empty document at `path`. The previous
/// document was saved or explicitly abandoned by this point, so the switch
/// is forced.
fn create_document_at(session: &PipelineSession, path: &Path) -> Result<(), Error> {
    let doc = session.document();
    doc.new_document(true)?;
    doc.rename_document(path)?;
    doc.save(true)?;

    log::info!("Created asset document {}", path.display());
    Ok(())
}

/// Imports the asset node of `source` into the document at `destination`
/// by way of a temporary file: open the source, export just its asset node
/// with references flattened, reopen the destination, import the temporary
/// file under the staging namespace, and delete it.
///
/// A source without an asset node fails here, leaving the source document
/// open like any other non-rolled-back step.
fn import_asset_node_from(
    session: &PipelineSession,
    source: &Path,
    destination: &Path,
) -> Result<(), Error> {
    let doc = session.document();

    log::debug!(
        "Importing the asset node of {} into {}",
        source.display(),
        destination.display()
    );

    // Opening the source would discard unsaved work in the new document.
    doc.save(true)?;
    doc.open(source, true)?;

    let asset_node = ops::find_asset_node(doc)?.ok_or_else(|| Error::MissingAssetNode {
        path: source.to_path_buf(),
    })?;

    let temp_name = format!("{}_AssetNode{}", naming::document_stem(source)?, SCENE_EXT);
    let temp_path = source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(temp_name);

    log::debug!("Exporting the asset node to {}", temp_path.display());
    doc.export_selection(&[asset_node], &temp_path, ExportFormat::Document, false)?;

    doc.open(destination, true)?;
    doc.import_file(&temp_path, IMPORT_NAMESPACE)?;

    log::debug!("Deleting {}", temp_path.display());
    doc.remove_file(&temp_path)?;
    doc.save(true)?;

    Ok(())
}

/// Creates a live reference to `source` under a namespace derived from its
/// file name, and returns that namespace.
fn reference_asset_from(session: &PipelineSession, source: &Path) -> Result<String, Error> {
    let namespace = naming::document_stem(source)?.to_owned();

    log::debug!("Referencing {} as {}", source.display(), namespace);
    let doc = session.document();
    doc.create_reference(source, &namespace)?;
    doc.save(true)?;

    Ok(namespace)
}

/// Moves the reference's root node under the asset node, preserving the
/// root's lock state.
fn attach_reference_root(
    doc: &Document,
    namespace: &str,
    asset_node: NodeId,
) -> Result<(), Error> {
    let nodes = doc.nodes_in_namespace(namespace)?;
    let root = *nodes.first().ok_or_else(|| Error::EmptyReference {
        namespace: namespace.to_owned(),
    })?;

    ops::reparent_preserving_lock(doc, root, Some(asset_node))
}
