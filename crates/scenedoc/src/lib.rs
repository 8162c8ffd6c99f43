/*!
Implementation of a virtual authoring document with a configurable backend.

scenedoc models the slice of a DCC host application that an asset pipeline
needs to drive: one open document made of a hierarchy of nodes with lockable
attributes, namespaces, live file references, selection export and animation
baking. The pipeline talks to a [`Document`], which forwards every call to a
[`DocumentBackend`].

## Current Features
* `InMemoryDocument`, a self-contained emulation of the host document engine,
  useful for testing pipeline code without a running host
* `NoopDocument`, which always returns errors, for contexts where no host is
  attached
* Fixture loading through [`NodeSnapshot`] trees
* A `crossbeam-channel` receiver of [`DocumentEvent`]s raised when documents
  are opened, saved or exported

A backend bridging to a real host application lives with the host
integration, not in this crate.
*/

mod in_memory_document;
mod noop_backend;
mod snapshot;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

pub use in_memory_document::{ExchangeRecord, InMemoryDocument};
pub use noop_backend::NoopDocument;
pub use snapshot::NodeSnapshot;

/// Handle to a node in the currently open document.
///
/// Handles are only meaningful for the document they were obtained from; any
/// open, reload or new-document operation invalidates previously returned
/// handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

/// Handle to a live file reference in the currently open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefId(u64);

impl RefId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

/// The host-side classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A plain transform/group node.
    Transform,
    /// A skeleton joint.
    Joint,
    /// A constraint node of one of the host's constraint types.
    Constraint(ConstraintKind),
}

impl NodeKind {
    pub fn is_transform(&self) -> bool {
        matches!(self, NodeKind::Transform)
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Transform
    }
}

/// The constraint node types the host distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Aim,
    Orient,
    Scale,
    Parent,
    Point,
    PoleVector,
}

impl ConstraintKind {
    /// Every constraint kind, in the order the host documents them.
    pub const ALL: [ConstraintKind; 6] = [
        ConstraintKind::Aim,
        ConstraintKind::Orient,
        ConstraintKind::Scale,
        ConstraintKind::Parent,
        ConstraintKind::Point,
        ConstraintKind::PoleVector,
    ];

    /// The host's node type name for this constraint kind.
    pub fn node_type_name(self) -> &'static str {
        match self {
            ConstraintKind::Aim => "aimConstraint",
            ConstraintKind::Orient => "orientConstraint",
            ConstraintKind::Scale => "scaleConstraint",
            ConstraintKind::Parent => "parentConstraint",
            ConstraintKind::Point => "pointConstraint",
            ConstraintKind::PoleVector => "poleVectorConstraint",
        }
    }
}

/// A value stored in a node attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

/// An attribute together with its lock state.
///
/// Locking applies to the attribute itself, independently of whether the
/// owning node is locked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: AttrValue,
    pub locked: bool,
}

/// The playback time range of the current document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRange {
    pub start: f64,
    pub end: f64,
}

impl PlaybackRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

impl Default for PlaybackRange {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 120.0,
        }
    }
}

/// The output format for [`Document::export_selection`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExportFormat {
    /// The host's own document format; the result can be imported or
    /// referenced again.
    Document,
    /// The interchange format consumed downstream, configured by the named
    /// preset file.
    Exchange { preset: PathBuf },
}

/// An event a document backend can raise when the open document changes
/// identity on disk.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum DocumentEvent {
    /// A document was opened (or force-reloaded) from the given path.
    Opened(PathBuf),
    /// The current document was saved to the given path.
    Saved(PathBuf),
    /// A selection was exported to the given path.
    Exported(PathBuf),
}

/// Backend that can be used to create a [`Document`].
pub trait DocumentBackend: Send + 'static {
    // Document lifecycle.
    fn current_path(&mut self) -> Option<PathBuf>;
    fn project_root(&mut self) -> PathBuf;
    fn new_document(&mut self, force: bool) -> io::Result<()>;
    fn rename_document(&mut self, path: &Path) -> io::Result<()>;
    fn save(&mut self, force: bool) -> io::Result<()>;
    fn open(&mut self, path: &Path, force: bool) -> io::Result<()>;
    fn path_exists(&mut self, path: &Path) -> io::Result<bool>;
    fn remove_file(&mut self, path: &Path) -> io::Result<()>;

    // Nodes.
    fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> io::Result<NodeId>;
    fn node_name(&mut self, node: NodeId) -> io::Result<String>;
    fn rename_node(&mut self, node: NodeId, name: &str) -> io::Result<()>;
    fn node_kind(&mut self, node: NodeId) -> io::Result<NodeKind>;
    fn top_level_nodes(&mut self) -> io::Result<Vec<NodeId>>;
    fn children(&mut self, node: NodeId) -> io::Result<Vec<NodeId>>;
    fn descendants(&mut self, node: NodeId) -> io::Result<Vec<NodeId>>;
    fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> io::Result<()>;
    fn delete_nodes(&mut self, nodes: &[NodeId]) -> io::Result<()>;

    // Node locks.
    fn is_locked(&mut self, node: NodeId) -> io::Result<bool>;
    fn set_locked(&mut self, node: NodeId, locked: bool) -> io::Result<()>;

    // Attributes.
    fn has_attribute(&mut self, node: NodeId, name: &str) -> io::Result<bool>;
    fn attribute(&mut self, node: NodeId, name: &str) -> io::Result<Option<AttrValue>>;
    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: AttrValue,
        lock: bool,
    ) -> io::Result<()>;

    // Namespaces.
    fn node_namespace(&mut self, node: NodeId) -> io::Result<Option<String>>;
    fn namespace_exists(&mut self, namespace: &str) -> io::Result<bool>;
    fn nodes_in_namespace(&mut self, namespace: &str) -> io::Result<Vec<NodeId>>;
    fn remove_namespace(&mut self, namespace: &str) -> io::Result<()>;

    // References and imports.
    fn create_reference(&mut self, path: &Path, namespace: &str) -> io::Result<RefId>;
    fn reference_for_node(&mut self, node: NodeId) -> io::Result<Option<RefId>>;
    fn reference_namespace(&mut self, reference: RefId) -> io::Result<String>;
    fn import_reference_contents(
        &mut self,
        reference: RefId,
        remove_namespace: bool,
    ) -> io::Result<()>;
    fn import_file(&mut self, path: &Path, namespace: &str) -> io::Result<()>;

    // Export and animation.
    fn export_selection(
        &mut self,
        nodes: &[NodeId],
        path: &Path,
        format: ExportFormat,
        preserve_references: bool,
    ) -> io::Result<()>;
    fn playback_range(&mut self) -> io::Result<PlaybackRange>;
    fn bake_animation(&mut self, nodes: &[NodeId], range: PlaybackRange) -> io::Result<()>;

    fn event_receiver(&self) -> crossbeam_channel::Receiver<DocumentEvent>;
}

struct DocumentInner {
    backend: Box<dyn DocumentBackend>,
}

/// An authoring document with a configurable backend.
///
/// All operations take a lock on the internal backend, so a `Document` can be
/// shared by reference without threading `&mut` through every caller.
pub struct Document {
    inner: Mutex<DocumentInner>,
}

impl Document {
    /// Creates a new `Document` with the given backend.
    pub fn new<B: DocumentBackend>(backend: B) -> Self {
        Self {
            inner: Mutex::new(DocumentInner {
                backend: Box::new(backend),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap()
    }

    /// The path of the currently open document, if it has ever been saved.
    #[inline]
    pub fn current_path(&self) -> Option<PathBuf> {
        self.lock().backend.current_path()
    }

    /// The root directory of the host project/workspace.
    #[inline]
    pub fn project_root(&self) -> PathBuf {
        self.lock().backend.project_root()
    }

    /// Discards the current document and starts an empty, untitled one.
    #[inline]
    pub fn new_document(&self, force: bool) -> io::Result<()> {
        self.lock().backend.new_document(force)
    }

    /// Assigns a file path to the current document without writing it.
    #[inline]
    pub fn rename_document<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.lock().backend.rename_document(path.as_ref())
    }

    /// Writes the current document to its assigned path.
    #[inline]
    pub fn save(&self, force: bool) -> io::Result<()> {
        self.lock().backend.save(force)
    }

    /// Opens the document stored at `path`, discarding the current one when
    /// `force` is set. Opening the current path again is the host's forced
    /// reload.
    #[inline]
    pub fn open<P: AsRef<Path>>(&self, path: P, force: bool) -> io::Result<()> {
        self.lock().backend.open(path.as_ref(), force)
    }

    /// Whether any document or exported file exists at `path`.
    #[inline]
    pub fn path_exists<P: AsRef<Path>>(&self, path: P) -> io::Result<bool> {
        self.lock().backend.path_exists(path.as_ref())
    }

    /// Removes the file stored at `path`.
    #[inline]
    pub fn remove_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.lock().backend.remove_file(path.as_ref())
    }

    /// Creates an empty transform node under `parent`, or at the top level.
    #[inline]
    pub fn create_node(&self, name: &str, parent: Option<NodeId>) -> io::Result<NodeId> {
        self.lock().backend.create_node(name, parent)
    }

    #[inline]
    pub fn node_name(&self, node: NodeId) -> io::Result<String> {
        self.lock().backend.node_name(node)
    }

    /// Renames a node. Renaming drops the node out of its namespace, the way
    /// the host treats explicit renames.
    #[inline]
    pub fn rename_node(&self, node: NodeId, name: &str) -> io::Result<()> {
        self.lock().backend.rename_node(node, name)
    }

    #[inline]
    pub fn node_kind(&self, node: NodeId) -> io::Result<NodeKind> {
        self.lock().backend.node_kind(node)
    }

    /// All top-level nodes of the current document, in creation order.
    #[inline]
    pub fn top_level_nodes(&self) -> io::Result<Vec<NodeId>> {
        self.lock().backend.top_level_nodes()
    }

    #[inline]
    pub fn children(&self, node: NodeId) -> io::Result<Vec<NodeId>> {
        self.lock().backend.children(node)
    }

    /// All descendants of `node` in depth-first order, not including `node`.
    #[inline]
    pub fn descendants(&self, node: NodeId) -> io::Result<Vec<NodeId>> {
        self.lock().backend.descendants(node)
    }

    /// Moves `node` under `new_parent`, or to the top level. Fails if the
    /// node is locked.
    #[inline]
    pub fn reparent(&self, node: NodeId, new_parent: Option<NodeId>) -> io::Result<()> {
        self.lock().backend.reparent(node, new_parent)
    }

    /// Deletes the given nodes together with their subtrees. Fails if any
    /// node in a deleted subtree is locked.
    #[inline]
    pub fn delete_nodes(&self, nodes: &[NodeId]) -> io::Result<()> {
        self.lock().backend.delete_nodes(nodes)
    }

    #[inline]
    pub fn is_locked(&self, node: NodeId) -> io::Result<bool> {
        self.lock().backend.is_locked(node)
    }

    #[inline]
    pub fn set_locked(&self, node: NodeId, locked: bool) -> io::Result<()> {
        self.lock().backend.set_locked(node, locked)
    }

    #[inline]
    pub fn has_attribute(&self, node: NodeId, name: &str) -> io::Result<bool> {
        self.lock().backend.has_attribute(node, name)
    }

    #[inline]
    pub fn attribute(&self, node: NodeId, name: &str) -> io::Result<Option<AttrValue>> {
        self.lock().backend.attribute(node, name)
    }

    /// Writes an attribute, optionally locking it. Fails if the owning node
    /// is locked, or if the attribute already exists and is locked.
    #[inline]
    pub fn set_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: AttrValue,
        lock: bool,
    ) -> io::Result<()> {
        self.lock().backend.set_attribute(node, name, value, lock)
    }

    /// The namespace `node` lives in, or `None` for the root namespace.
    #[inline]
    pub fn node_namespace(&self, node: NodeId) -> io::Result<Option<String>> {
        self.lock().backend.node_namespace(node)
    }

    #[inline]
    pub fn namespace_exists(&self, namespace: &str) -> io::Result<bool> {
        self.lock().backend.namespace_exists(namespace)
    }

    /// The top-level nodes that live in `namespace`, matching the host's
    /// assembly listing.
    #[inline]
    pub fn nodes_in_namespace(&self, namespace: &str) -> io::Result<Vec<NodeId>> {
        self.lock().backend.nodes_in_namespace(namespace)
    }

    /// Removes `namespace`, merging any nodes still inside it into the root
    /// namespace.
    #[inline]
    pub fn remove_namespace(&self, namespace: &str) -> io::Result<()> {
        self.lock().backend.remove_namespace(namespace)
    }

    /// Creates a live reference to the document at `path` under `namespace`.
    #[inline]
    pub fn create_reference<P: AsRef<Path>>(&self, path: P, namespace: &str) -> io::Result<RefId> {
        self.lock().backend.create_reference(path.as_ref(), namespace)
    }

    /// The reference a node belongs to, if it came in through one.
    #[inline]
    pub fn reference_for_node(&self, node: NodeId) -> io::Result<Option<RefId>> {
        self.lock().backend.reference_for_node(node)
    }

    #[inline]
    pub fn reference_namespace(&self, reference: RefId) -> io::Result<String> {
        self.lock().backend.reference_namespace(reference)
    }

    /// Converts the reference's content into plain editable nodes, breaking
    /// the link to the source document.
    #[inline]
    pub fn import_reference_contents(
        &self,
        reference: RefId,
        remove_namespace: bool,
    ) -> io::Result<()> {
        self.lock()
            .backend
            .import_reference_contents(reference, remove_namespace)
    }

    /// Imports the document at `path` as a one-time copy under `namespace`.
    #[inline]
    pub fn import_file<P: AsRef<Path>>(&self, path: P, namespace: &str) -> io::Result<()> {
        self.lock().backend.import_file(path.as_ref(), namespace)
    }

    /// Exports the subtrees of `nodes` to `path` in the requested format.
    #[inline]
    pub fn export_selection<P: AsRef<Path>>(
        &self,
        nodes: &[NodeId],
        path: P,
        format: ExportFormat,
        preserve_references: bool,
    ) -> io::Result<()> {
        self.lock()
            .backend
            .export_selection(nodes, path.as_ref(), format, preserve_references)
    }

    /// The playback time range of the current document.
    #[inline]
    pub fn playback_range(&self) -> io::Result<PlaybackRange> {
        self.lock().backend.playback_range()
    }

    /// Bakes the animation of `nodes` into explicit per-frame curves across
    /// `range`.
    #[inline]
    pub fn bake_animation(&self, nodes: &[NodeId], range: PlaybackRange) -> io::Result<()> {
        self.lock().backend.bake_animation(nodes, range)
    }

    /// Retrieve a handle to the event receiver for this `Document`.
    #[inline]
    pub fn event_receiver(&self) -> crossbeam_channel::Receiver<DocumentEvent> {
        self.lock().backend.event_receiver()
    }
}
