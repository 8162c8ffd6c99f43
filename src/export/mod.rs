//! The export pipeline: writes the current asset out in the exchange
//! format consumed downstream.
//!
//! Every export runs as validate, save, dispatch by type, then a forced
//! reload of the document. The reload is unconditional: the type-specific
//! steps (especially the animation path) mutate the open document freely,
//! and the reload is what guarantees none of it ever persists. The only
//! externally visible effect of a successful export is the written
//! exchange file.

mod animation;

use std::path::{Path, PathBuf};

use scenedoc::ExportFormat;

use crate::asset::AssetType;
use crate::error::Error;
use crate::naming::{self, EXCHANGE_EXT};
use crate::pipeline_session::{CurrentAsset, PipelineSession};

/// Outcome of an export that asks the user where to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The exchange file was written to the given path.
    Exported(PathBuf),
    /// The user backed out of the destination picker.
    Cancelled,
}

/// Exports the current asset to its standard destination: the document's
/// folder, mirrored from the scenes tree into the configured export root.
pub fn export_current(session: &mut PipelineSession) -> Result<PathBuf, Error> {
    let current = session.current_asset()?;
    ensure_exportable(&current)?;

    let folder = standard_export_folder(session, &current)?;
    run_export(session, current, &folder)
}

/// Exports the current asset into the given folder.
pub fn export_current_to(session: &mut PipelineSession, folder: &Path) -> Result<PathBuf, Error> {
    let current = session.current_asset()?;
    ensure_exportable(&current)?;

    run_export(session, current, folder)
}

/// Exports the current asset, asking the user which folder to write into.
/// The picker starts at the export root when one is configured.
pub fn export_current_interactive(session: &mut PipelineSession) -> Result<ExportOutcome, Error> {
    let current = session.current_asset()?;
    ensure_exportable(&current)?;

    let start_dir = session
        .export_root()
        .unwrap_or_else(|_| session.document().project_root());

    let folder = match session
        .dialogs_mut()
        .pick_folder("Select path to export asset to.", &start_dir)
    {
        Some(folder) => folder,
        None => {
            log::debug!("Cancelled choosing an export destination");
            return Ok(ExportOutcome::Cancelled);
        }
    };

    run_export(session, current, &folder).map(ExportOutcome::Exported)
}

fn ensure_exportable(current: &CurrentAsset) -> Result<(), Error> {
    if !current.asset_type.is_exportable() {
        return Err(Error::NotExportable(current.asset_type));
    }

    Ok(())
}

fn standard_export_folder(
    session: &PipelineSession,
    current: &CurrentAsset,
) -> Result<PathBuf, Error> {
    let export_root = session.export_root()?;
    let scenes_root = session.scenes_root();

    let relative = current
        .path
        .strip_prefix(&scenes_root)
        .map_err(|_| Error::OutsideScenesRoot {
            path: current.path.clone(),
        })?;

    Ok(match relative.parent() {
        Some(parent) => export_root.join(parent),
        None => export_root,
    })
}

fn run_export(
    session: &PipelineSession,
    current: CurrentAsset,
    folder: &Path,
) -> Result<PathBuf, Error> {
    // Persist outstanding edits first; the reload below rolls the document
    // back to this point.
    session.document().save(true)?;

    let stem = naming::document_stem(&current.path)?.to_owned();
    let target = folder.join(format!("{}{}", stem, EXCHANGE_EXT));

    log::info!(
        "Exporting {} asset to {}",
        current.asset_type,
        target.display()
    );

    let result = match current.asset_type {
        AssetType::Animation => animation::export_animation(session, &current, &target),
        _ => write_exchange(session, &current, &target),
    };

    let revert = session.document().open(&current.path, true);
    if let Err(err) = &revert {
        log::error!(
            "Failed to reload {} after export: {}",
            current.path.display(),
            err
        );
    }

    result?;
    revert?;

    log::info!("Exported {}", target.display());
    Ok(target)
}

/// Selects the asset node and writes it to `target` using the preset for
/// the asset's type.
fn write_exchange(
    session: &PipelineSession,
    current: &CurrentAsset,
    target: &Path,
) -> Result<(), Error> {
    let preset = session.preset_path(current.asset_type)?;

    session.document().export_selection(
        &[current.node],
        target,
        ExportFormat::Exchange { preset },
        false,
    )?;

    Ok(())
}
