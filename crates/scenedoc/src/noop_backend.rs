use std::io;
use std::path::{Path, PathBuf};

use crate::{
    AttrValue, DocumentBackend, DocumentEvent, ExportFormat, NodeId, NodeKind, PlaybackRange, RefId,
};

/// `DocumentBackend` that returns an error on every operation, for contexts
/// where no host application is attached.
#[non_exhaustive]
pub struct NoopDocument;

impl NoopDocument {
    pub fn new() -> Self {
        Self
    }
}

fn noop<T>() -> io::Result<T> {
    Err(io::Error::other("NoopDocument doesn't do anything"))
}

impl DocumentBackend for NoopDocument {
    fn current_path(&mut self) -> Option<PathBuf> {
        None
    }

    fn project_root(&mut self) -> PathBuf {
        PathBuf::new()
    }

    fn new_document(&mut self, _force: bool) -> io::Result<()> {
        noop()
    }

    fn rename_document(&mut self, _path: &Path) -> io::Result<()> {
        noop()
    }

    fn save(&mut self, _force: bool) -> io::Result<()> {
        noop()
    }

    fn open(&mut self, _path: &Path, _force: bool) -> io::Result<()> {
        noop()
    }

    fn path_exists(&mut self, _path: &Path) -> io::Result<bool> {
        noop()
    }

    fn remove_file(&mut self, _path: &Path) -> io::Result<()> {
        noop()
    }

    fn create_node(&mut self, _name: &str, _parent: Option<NodeId>) -> io::Result<NodeId> {
        noop()
    }

    fn node_name(&mut self, _node: NodeId) -> io::Result<String> {
        noop()
    }

    fn rename_node(&mut self, _node: NodeId, _name: &str) -> io::Result<()> {
        noop()
    }

    fn node_kind(&mut self, _node: NodeId) -> io::Result<NodeKind> {
        noop()
    }

    fn top_level_nodes(&mut self) -> io::Result<Vec<NodeId>> {
        noop()
    }

    fn children(&mut self, _node: NodeId) -> io::Result<Vec<NodeId>> {
        noop()
    }

    fn descendants(&mut self, _node: NodeId) -> io::Result<Vec<NodeId>> {
        noop()
    }

    fn reparent(&mut self, _node: NodeId, _new_parent: Option<NodeId>) -> io::Result<()> {
        noop()
    }

    fn delete_nodes(&mut self, _nodes: &[NodeId]) -> io::Result<()> {
        noop()
    }

    fn is_locked(&mut self, _node: NodeId) -> io::Result<bool> {
        noop()
    }

    fn set_locked(&mut self, _node: NodeId, _locked: bool) -> io::Result<()> {
        noop()
    }

    fn has_attribute(&mut self, _node: NodeId, _name: &str) -> io::Result<bool> {
        noop()
    }

    fn attribute(&mut self, _node: NodeId, _name: &str) -> io::Result<Option<AttrValue>> {
        noop()
    }

    fn set_attribute(
        &mut self,
        _node: NodeId,
        _name: &str,
        _value: AttrValue,
        _lock: bool,
    ) -> io::Result<()> {
        noop()
    }

    fn node_namespace(&mut self, _node: NodeId) -> io::Result<Option<String>> {
        noop()
    }

    fn namespace_exists(&mut self, _namespace: &str) -> io::Result<bool> {
        noop()
    }

    fn nodes_in_namespace(&mut self, _namespace: &str) -> io::Result<Vec<NodeId>> {
        noop()
    }

    fn remove_namespace(&mut self, _namespace: &str) -> io::Result<()> {
        noop()
    }

    fn create_reference(&mut self, _path: &Path, _namespace: &str) -> io::Result<RefId> {
        noop()
    }

    fn reference_for_node(&mut self, _node: NodeId) -> io::Result<Option<RefId>> {
        noop()
    }

    fn reference_namespace(&mut self, _reference: RefId) -> io::Result<String> {
        noop()
    }

    fn import_reference_contents(
        &mut self,
        _reference: RefId,
        _remove_namespace: bool,
    ) -> io::Result<()> {
        noop()
    }

    fn import_file(&mut self, _path: &Path, _namespace: &str) -> io::Result<()> {
        noop()
    }

    fn export_selection(
        &mut self,
        _nodes: &[NodeId],
        _path: &Path,
        _format: ExportFormat,
        _preserve_references: bool,
    ) -> io::Result<()> {
        noop()
    }

    fn playback_range(&mut self) -> io::Result<PlaybackRange> {
        noop()
    }

    fn bake_animation(&mut self, _nodes: &[NodeId], _range: PlaybackRange) -> io::Result<()> {
        noop()
    }

    fn event_receiver(&self) -> crossbeam_channel::Receiver<DocumentEvent> {
        crossbeam_channel::never()
    }
}

impl Default for NoopDocument {
    fn default() -> Self {
        Self::new()
    }
}
