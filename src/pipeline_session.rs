//! A running pipeline session: the open document plus the host
//! collaborators every workflow needs.
//!
//! There is no global application state; workflow entry points take an
//! explicit `&mut PipelineSession`. The exclusive borrow also keeps
//! workflows from interleaving; a document reopen mid-flight would
//! invalidate another workflow's node handles.

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use scenedoc::{Document, DocumentEvent, NodeId};

use crate::asset::AssetType;
use crate::dialog::Dialogs;
use crate::error::Error;
use crate::naming::SCENES_DIR_NAME;
use crate::ops;
use crate::settings::{SettingKey, SettingsStore};

/// The current document's resolved asset identity.
#[derive(Debug, Clone)]
pub struct CurrentAsset {
    /// Where the document is saved.
    pub path: PathBuf,
    /// Its asset node. Invalidated, like every node handle, by any reopen.
    pub node: NodeId,
    pub asset_type: AssetType,
}

/// Everything a workflow invocation runs against: the open document, the
/// host's dialog surface, the settings store, and the directory holding the
/// exchange-format presets.
pub struct PipelineSession {
    document: Document,
    dialogs: Box<dyn Dialogs>,
    settings: Box<dyn SettingsStore>,
    presets_dir: PathBuf,
}

impl PipelineSession {
    pub fn new<D, S, P>(document: Document, dialogs: D, settings: S, presets_dir: P) -> Self
    where
        D: Dialogs + 'static,
        S: SettingsStore + 'static,
        P: Into<PathBuf>,
    {
        PipelineSession {
            document,
            dialogs: Box::new(dialogs),
            settings: Box::new(settings),
            presets_dir: presets_dir.into(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn dialogs_mut(&mut self) -> &mut dyn Dialogs {
        &mut *self.dialogs
    }

    /// The settings write path; reads go through typed accessors like
    /// [`PipelineSession::export_root`].
    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        &mut *self.settings
    }

    /// The folder under the project root that asset documents live in.
    pub fn scenes_root(&self) -> PathBuf {
        self.document.project_root().join(SCENES_DIR_NAME)
    }

    /// The preset file used to export the given asset type.
    pub fn preset_path(&self, asset_type: AssetType) -> Result<PathBuf, Error> {
        let file_name = asset_type
            .preset_file_name()
            .ok_or(Error::NotExportable(asset_type))?;

        Ok(self.presets_dir.join(file_name))
    }

    /// The configured export destination root. Unset (or empty) is an
    /// error; exporting has nowhere to go without it.
    pub fn export_root(&self) -> Result<PathBuf, Error> {
        match self.settings.read(SettingKey::ExportRoot) {
            Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
            _ => Err(Error::ExportRootUnset),
        }
    }

    /// Resolves the current document as an asset, or explains why it isn't
    /// one.
    pub fn current_asset(&self) -> Result<CurrentAsset, Error> {
        let path = match self.document.current_path() {
            Some(path) => path,
            None => {
                log::debug!("The current document is not a valid asset: it has never been saved");
                return Err(Error::DocumentNeverSaved);
            }
        };

        let node = match ops::find_asset_node(&self.document)? {
            Some(node) => node,
            None => {
                log::debug!("The current document is not a valid asset: no asset node");
                return Err(Error::NotAnAsset);
            }
        };

        let asset_type = ops::classify(&self.document, node)?;
        if asset_type == AssetType::None {
            return Err(Error::NotAnAsset);
        }

        Ok(CurrentAsset {
            path,
            node,
            asset_type,
        })
    }

    /// Events the document backend raises when the open document changes
    /// identity, for host integrations that mirror pipeline activity.
    pub fn document_events(&self) -> Receiver<DocumentEvent> {
        self.document.event_receiver()
    }
}
