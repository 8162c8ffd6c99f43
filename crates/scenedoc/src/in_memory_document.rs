use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    AttrValue, Attribute, DocumentBackend, DocumentEvent, ExportFormat, NodeId, NodeKind,
    NodeSnapshot, PlaybackRange, RefId,
};

/// In-memory document engine that can be used as a `DocumentBackend`.
///
/// Internally reference counted so that one handle can be given to
/// [`Document`](struct.Document.html) while the test keeps another to
/// inspect and mutate the emulated host's state with.
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    inner: Arc<Mutex<InMemoryDocumentInner>>,
}

/// What an `InMemoryDocument` remembers about a selection exported in the
/// exchange format.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRecord {
    /// The preset file the export was configured with.
    pub preset: PathBuf,

    /// Names of the selected top-level nodes of the export.
    pub root_names: Vec<String>,

    /// Names of every exported node, in depth-first order.
    pub node_names: Vec<String>,

    /// Names of exported nodes that carried baked animation, with the range
    /// that was baked.
    pub baked: Vec<(String, PlaybackRange)>,
}

impl InMemoryDocument {
    /// Create a new `InMemoryDocument` with an empty, untitled document open
    /// and nothing stored.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryDocumentInner::new())),
        }
    }

    /// Sets the project root reported by the emulated host.
    pub fn set_project_root<P: Into<PathBuf>>(&mut self, path: P) {
        let mut inner = self.inner.lock().unwrap();
        inner.project_root = path.into();
    }

    /// Stores a document at `path`, as if an earlier session had saved it
    /// there.
    pub fn load_document<P: Into<PathBuf>>(&mut self, path: P, roots: Vec<NodeSnapshot>) {
        let mut inner = self.inner.lock().unwrap();
        let path = path.into();
        inner.exchange.remove(&path);
        inner.saved.insert(path, roots);
    }

    /// Sets the playback range of the currently open document.
    pub fn set_playback_range(&mut self, range: PlaybackRange) {
        let mut inner = self.inner.lock().unwrap();
        inner.current.playback = range;
    }

    /// Snapshots the node graph of the currently open document.
    pub fn snapshot_current(&self) -> Vec<NodeSnapshot> {
        let inner = self.inner.lock().unwrap();
        inner
            .current
            .top_level
            .iter()
            .map(|&id| inner.snapshot_node(id))
            .collect()
    }

    /// Snapshots the document stored at `path`, if one exists.
    pub fn snapshot_saved<P: AsRef<Path>>(&self, path: P) -> Option<Vec<NodeSnapshot>> {
        let inner = self.inner.lock().unwrap();
        inner.saved.get(path.as_ref()).cloned()
    }

    /// The paths of every stored document, sorted.
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        let inner = self.inner.lock().unwrap();
        let mut paths: Vec<PathBuf> = inner.saved.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// The record of the exchange-format export written to `path`, if one
    /// exists.
    pub fn exchange_record<P: AsRef<Path>>(&self, path: P) -> Option<ExchangeRecord> {
        let inner = self.inner.lock().unwrap();
        inner.exchange.get(path.as_ref()).cloned()
    }

    /// The paths of every exchange-format export, sorted.
    pub fn exchange_paths(&self) -> Vec<PathBuf> {
        let inner = self.inner.lock().unwrap();
        let mut paths: Vec<PathBuf> = inner.exchange.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for InMemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct InMemoryDocumentInner {
    project_root: PathBuf,
    saved: HashMap<PathBuf, Vec<NodeSnapshot>>,
    exchange: HashMap<PathBuf, ExchangeRecord>,
    current: WorkingDocument,

    next_node_id: u64,
    next_ref_id: u64,

    event_receiver: Receiver<DocumentEvent>,
    event_sender: Sender<DocumentEvent>,
}

#[derive(Debug)]
struct WorkingDocument {
    path: Option<PathBuf>,
    modified: bool,
    playback: PlaybackRange,
    nodes: HashMap<NodeId, NodeData>,
    top_level: Vec<NodeId>,
    references: HashMap<RefId, ReferenceData>,
}

impl WorkingDocument {
    fn empty() -> Self {
        Self {
            path: None,
            modified: false,
            playback: PlaybackRange::default(),
            nodes: HashMap::new(),
            top_level: Vec::new(),
            references: HashMap::new(),
        }
    }
}

#[derive(Debug)]
struct NodeData {
    name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    locked: bool,
    namespace: Option<String>,
    reference: Option<RefId>,
    attributes: BTreeMap<String, Attribute>,
    baked: Option<PlaybackRange>,
}

#[derive(Debug)]
struct ReferenceData {
    namespace: String,
}

impl InMemoryDocumentInner {
    fn new() -> Self {
        let (event_sender, event_receiver) = crossbeam_channel::unbounded();

        Self {
            project_root: PathBuf::from("/project"),
            saved: HashMap::new(),
            exchange: HashMap::new(),
            current: WorkingDocument::empty(),
            next_node_id: 0,
            next_ref_id: 0,
            event_receiver,
            event_sender,
        }
    }

    // Node handles stay unique across document loads so a handle from before
    // an open or reload can never alias a node in the new document.
    fn alloc_node_id(&mut self) -> NodeId {
        self.next_node_id += 1;
        NodeId::new(self.next_node_id)
    }

    fn alloc_ref_id(&mut self) -> RefId {
        self.next_ref_id += 1;
        RefId::new(self.next_ref_id)
    }

    fn instantiate(
        &mut self,
        snapshot: NodeSnapshot,
        parent: Option<NodeId>,
        namespace: Option<&str>,
        reference: Option<RefId>,
        groups: &HashMap<String, RefId>,
    ) -> NodeId {
        let NodeSnapshot {
            name,
            kind,
            locked,
            namespace: stored_namespace,
            reference_namespace,
            attributes,
            children,
        } = snapshot;

        let id = self.alloc_node_id();
        let resolved_namespace = match namespace {
            Some(namespace) => Some(namespace.to_owned()),
            None => stored_namespace,
        };

        // An explicit reference wins; a node loaded into a fresh reference
        // always belongs to it, regardless of what its file recorded.
        let resolved_reference = match reference {
            Some(reference) => Some(reference),
            None => reference_namespace
                .as_deref()
                .and_then(|group| groups.get(group))
                .copied(),
        };

        self.current.nodes.insert(
            id,
            NodeData {
                name,
                kind,
                parent,
                children: Vec::new(),
                locked,
                namespace: resolved_namespace,
                reference: resolved_reference,
                attributes,
                baked: None,
            },
        );

        match parent {
            Some(parent_id) => self
                .current
                .nodes
                .get_mut(&parent_id)
                .expect("parent node must exist in the current document")
                .children
                .push(id),
            None => self.current.top_level.push(id),
        }

        for child in children {
            self.instantiate(child, Some(id), namespace, reference, groups);
        }

        id
    }

    fn snapshot_node(&self, id: NodeId) -> NodeSnapshot {
        let node = self
            .current
            .nodes
            .get(&id)
            .expect("node must exist in the current document");

        NodeSnapshot {
            name: node.name.clone(),
            kind: node.kind,
            locked: node.locked,
            namespace: node.namespace.clone(),
            reference_namespace: node
                .reference
                .and_then(|id| self.current.references.get(&id))
                .map(|data| data.namespace.clone()),
            attributes: node.attributes.clone(),
            children: node
                .children
                .iter()
                .map(|&child| self.snapshot_node(child))
                .collect(),
        }
    }

    fn append_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.current.nodes.get(&id) {
            for &child in &node.children {
                out.push(child);
                self.append_descendants(child, out);
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.current.nodes.get(&id).and_then(|node| node.parent);

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.current.nodes.get_mut(&parent_id) {
                    parent_node.children.retain(|&child| child != id);
                }
            }
            None => self.current.top_level.retain(|&top| top != id),
        }
    }

    fn collect_exchange_info(&self, id: NodeId, record: &mut ExchangeRecord) {
        let node = self
            .current
            .nodes
            .get(&id)
            .expect("node must exist in the current document");

        record.node_names.push(node.name.clone());
        if let Some(range) = node.baked {
            record.baked.push((node.name.clone(), range));
        }

        for &child in &node.children {
            self.collect_exchange_info(child, record);
        }
    }

    fn raise_event(&self, event: DocumentEvent) {
        self.event_sender.send(event).unwrap();
    }
}

impl DocumentBackend for InMemoryDocument {
    fn current_path(&mut self) -> Option<PathBuf> {
        let inner = self.inner.lock().unwrap();
        inner.current.path.clone()
    }

    fn project_root(&mut self) -> PathBuf {
        let inner = self.inner.lock().unwrap();
        inner.project_root.clone()
    }

    fn new_document(&mut self, force: bool) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if !force && inner.current.modified {
            return unsaved_changes();
        }

        inner.current = WorkingDocument::empty();
        Ok(())
    }

    fn rename_document(&mut self, path: &Path) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.current.path = Some(path.to_owned());
        Ok(())
    }

    fn save(&mut self, _force: bool) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let path = match inner.current.path.clone() {
            Some(path) => path,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "the current document is untitled and cannot be saved",
                ))
            }
        };

        let roots: Vec<NodeSnapshot> = inner
            .current
            .top_level
            .clone()
            .into_iter()
            .map(|id| inner.snapshot_node(id))
            .collect();

        inner.exchange.remove(&path);
        inner.saved.insert(path.clone(), roots);
        inner.current.modified = false;
        inner.raise_event(DocumentEvent::Saved(path));
        Ok(())
    }

    fn open(&mut self, path: &Path, force: bool) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if !force && inner.current.modified {
            return unsaved_changes();
        }
        if inner.exchange.contains_key(path) {
            return must_be_document(path);
        }

        let roots = match inner.saved.get(path) {
            Some(roots) => roots.clone(),
            None => return no_such_file(path),
        };

        inner.current = WorkingDocument::empty();
        inner.current.path = Some(path.to_owned());

        let mut group_names = BTreeSet::new();
        for root in &roots {
            collect_reference_groups(root, &mut group_names);
        }
        let mut groups = HashMap::new();
        for group in group_names {
            let reference = inner.alloc_ref_id();
            inner.current.references.insert(
                reference,
                ReferenceData {
                    namespace: group.clone(),
                },
            );
            groups.insert(group, reference);
        }

        for root in roots {
            inner.instantiate(root, None, None, None, &groups);
        }

        inner.raise_event(DocumentEvent::Opened(path.to_owned()));
        Ok(())
    }

    fn path_exists(&mut self, path: &Path) -> io::Result<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.saved.contains_key(path) || inner.exchange.contains_key(path))
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if inner.saved.remove(path).is_some() || inner.exchange.remove(path).is_some() {
            Ok(())
        } else {
            no_such_file(path)
        }
    }

    fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> io::Result<NodeId> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(parent_id) = parent {
            if !inner.current.nodes.contains_key(&parent_id) {
                return stale_node(parent_id);
            }
        }

        let id = inner.alloc_node_id();
        inner.current.nodes.insert(
            id,
            NodeData {
                name: name.to_owned(),
                kind: NodeKind::Transform,
                parent,
                children: Vec::new(),
                locked: false,
                namespace: None,
                reference: None,
                attributes: BTreeMap::new(),
                baked: None,
            },
        );

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = inner.current.nodes.get_mut(&parent_id) {
                    parent_node.children.push(id);
                }
            }
            None => inner.current.top_level.push(id),
        }

        inner.current.modified = true;
        Ok(id)
    }

    fn node_name(&mut self, node: NodeId) -> io::Result<String> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.name.clone()),
            None => stale_node(node),
        }
    }

    fn rename_node(&mut self, node: NodeId, name: &str) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let data = match inner.current.nodes.get_mut(&node) {
            Some(data) => data,
            None => return stale_node(node),
        };
        if data.locked {
            return node_locked(&data.name);
        }

        data.name = name.to_owned();
        // An explicit rename moves the node back into the root namespace.
        data.namespace = None;
        inner.current.modified = true;
        Ok(())
    }

    fn node_kind(&mut self, node: NodeId) -> io::Result<NodeKind> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.kind),
            None => stale_node(node),
        }
    }

    fn top_level_nodes(&mut self) -> io::Result<Vec<NodeId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.current.top_level.clone())
    }

    fn children(&mut self, node: NodeId) -> io::Result<Vec<NodeId>> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.children.clone()),
            None => stale_node(node),
        }
    }

    fn descendants(&mut self, node: NodeId) -> io::Result<Vec<NodeId>> {
        let inner = self.inner.lock().unwrap();

        if !inner.current.nodes.contains_key(&node) {
            return stale_node(node);
        }

        let mut out = Vec::new();
        inner.append_descendants(node, &mut out);
        Ok(out)
    }

    fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let (locked, name) = match inner.current.nodes.get(&node) {
            Some(data) => (data.locked, data.name.clone()),
            None => return stale_node(node),
        };
        if locked {
            return node_locked(&name);
        }

        if let Some(parent_id) = new_parent {
            if !inner.current.nodes.contains_key(&parent_id) {
                return stale_node(parent_id);
            }

            let mut cursor = Some(parent_id);
            while let Some(current) = cursor {
                if current == node {
                    return Err(io::Error::other(format!(
                        "cannot parent {} beneath its own subtree",
                        name
                    )));
                }
                cursor = inner.current.nodes.get(&current).and_then(|data| data.parent);
            }
        }

        inner.detach(node);
        match new_parent {
            Some(parent_id) => {
                if let Some(parent_node) = inner.current.nodes.get_mut(&parent_id) {
                    parent_node.children.push(node);
                }
            }
            None => inner.current.top_level.push(node),
        }
        if let Some(data) = inner.current.nodes.get_mut(&node) {
            data.parent = new_parent;
        }

        inner.current.modified = true;
        Ok(())
    }

    fn delete_nodes(&mut self, nodes: &[NodeId]) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let mut doomed = BTreeSet::new();
        for &id in nodes {
            if !inner.current.nodes.contains_key(&id) {
                return stale_node(id);
            }
            doomed.insert(id);

            let mut rest = Vec::new();
            inner.append_descendants(id, &mut rest);
            doomed.extend(rest);
        }

        for id in &doomed {
            if let Some(node) = inner.current.nodes.get(id) {
                if node.locked {
                    return node_locked(&node.name);
                }
                if node.reference.is_some() {
                    return Err(io::Error::other(format!(
                        "node {} belongs to a reference and cannot be deleted directly",
                        node.name
                    )));
                }
            }
        }

        for id in &doomed {
            inner.current.nodes.remove(id);
        }
        inner.current.top_level.retain(|id| !doomed.contains(id));
        for node in inner.current.nodes.values_mut() {
            node.children.retain(|id| !doomed.contains(id));
        }

        inner.current.modified = true;
        Ok(())
    }

    fn is_locked(&mut self, node: NodeId) -> io::Result<bool> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.locked),
            None => stale_node(node),
        }
    }

    fn set_locked(&mut self, node: NodeId, locked: bool) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        match inner.current.nodes.get_mut(&node) {
            Some(data) => data.locked = locked,
            None => return stale_node(node),
        }

        inner.current.modified = true;
        Ok(())
    }

    fn has_attribute(&mut self, node: NodeId, name: &str) -> io::Result<bool> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.attributes.contains_key(name)),
            None => stale_node(node),
        }
    }

    fn attribute(&mut self, node: NodeId, name: &str) -> io::Result<Option<AttrValue>> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.attributes.get(name).map(|attr| attr.value.clone())),
            None => stale_node(node),
        }
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: AttrValue,
        lock: bool,
    ) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let data = match inner.current.nodes.get_mut(&node) {
            Some(data) => data,
            None => return stale_node(node),
        };
        if data.locked {
            return node_locked(&data.name);
        }
        if let Some(existing) = data.attributes.get(name) {
            if existing.locked {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("attribute {} on node {} is locked", name, data.name),
                ));
            }
        }

        data.attributes
            .insert(name.to_owned(), Attribute { value, locked: lock });
        inner.current.modified = true;
        Ok(())
    }

    fn node_namespace(&mut self, node: NodeId) -> io::Result<Option<String>> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.namespace.clone()),
            None => stale_node(node),
        }
    }

    fn namespace_exists(&mut self, namespace: &str) -> io::Result<bool> {
        let inner = self.inner.lock().unwrap();

        let in_nodes = inner
            .current
            .nodes
            .values()
            .any(|node| node.namespace.as_deref() == Some(namespace));
        let in_references = inner
            .current
            .references
            .values()
            .any(|reference| reference.namespace == namespace);

        Ok(in_nodes || in_references)
    }

    fn nodes_in_namespace(&mut self, namespace: &str) -> io::Result<Vec<NodeId>> {
        let inner = self.inner.lock().unwrap();

        let ids = inner
            .current
            .top_level
            .iter()
            .copied()
            .filter(|id| {
                inner
                    .current
                    .nodes
                    .get(id)
                    .and_then(|node| node.namespace.as_deref())
                    == Some(namespace)
            })
            .collect();

        Ok(ids)
    }

    fn remove_namespace(&mut self, namespace: &str) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if inner
            .current
            .references
            .values()
            .any(|reference| reference.namespace == namespace)
        {
            return Err(io::Error::other(format!(
                "namespace {} is still in use by a reference",
                namespace
            )));
        }

        let mut found = false;
        for node in inner.current.nodes.values_mut() {
            if node.namespace.as_deref() == Some(namespace) {
                node.namespace = None;
                found = true;
            }
        }
        if !found {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("namespace {} does not exist", namespace),
            ));
        }

        inner.current.modified = true;
        Ok(())
    }

    fn create_reference(&mut self, path: &Path, namespace: &str) -> io::Result<RefId> {
        let mut inner = self.inner.lock().unwrap();

        if inner.exchange.contains_key(path) {
            return must_be_document(path);
        }
        let roots = match inner.saved.get(path) {
            Some(roots) => roots.clone(),
            None => return no_such_file(path),
        };

        let reference = inner.alloc_ref_id();
        inner.current.references.insert(
            reference,
            ReferenceData {
                namespace: namespace.to_owned(),
            },
        );

        // A reference inside the referenced document collapses into the new
        // one instead of nesting.
        let groups = HashMap::new();
        for root in roots {
            inner.instantiate(root, None, Some(namespace), Some(reference), &groups);
        }

        inner.current.modified = true;
        Ok(reference)
    }

    fn reference_for_node(&mut self, node: NodeId) -> io::Result<Option<RefId>> {
        let inner = self.inner.lock().unwrap();

        match inner.current.nodes.get(&node) {
            Some(data) => Ok(data.reference),
            None => stale_node(node),
        }
    }

    fn reference_namespace(&mut self, reference: RefId) -> io::Result<String> {
        let inner = self.inner.lock().unwrap();

        match inner.current.references.get(&reference) {
            Some(data) => Ok(data.namespace.clone()),
            None => stale_reference(reference),
        }
    }

    fn import_reference_contents(
        &mut self,
        reference: RefId,
        remove_namespace: bool,
    ) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if inner.current.references.remove(&reference).is_none() {
            return stale_reference(reference);
        }

        for node in inner.current.nodes.values_mut() {
            if node.reference == Some(reference) {
                node.reference = None;
                if remove_namespace {
                    node.namespace = None;
                }
            }
        }

        inner.current.modified = true;
        Ok(())
    }

    fn import_file(&mut self, path: &Path, namespace: &str) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if inner.exchange.contains_key(path) {
            return must_be_document(path);
        }
        let roots = match inner.saved.get(path) {
            Some(roots) => roots.clone(),
            None => return no_such_file(path),
        };

        // Imports materialize everything as plain local copies; references
        // recorded in the source file do not come along.
        let groups = HashMap::new();
        for root in roots {
            inner.instantiate(root, None, Some(namespace), None, &groups);
        }

        inner.current.modified = true;
        Ok(())
    }

    fn export_selection(
        &mut self,
        nodes: &[NodeId],
        path: &Path,
        format: ExportFormat,
        preserve_references: bool,
    ) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        for &id in nodes {
            if !inner.current.nodes.contains_key(&id) {
                return stale_node(id);
            }
        }

        match format {
            ExportFormat::Document => {
                let mut roots = Vec::with_capacity(nodes.len());
                for &id in nodes {
                    let mut snapshot = inner.snapshot_node(id);
                    if !preserve_references {
                        flatten_references(&mut snapshot);
                    }
                    roots.push(snapshot);
                }

                inner.exchange.remove(path);
                inner.saved.insert(path.to_owned(), roots);
            }
            ExportFormat::Exchange { preset } => {
                let mut record = ExchangeRecord {
                    preset,
                    root_names: Vec::new(),
                    node_names: Vec::new(),
                    baked: Vec::new(),
                };
                for &id in nodes {
                    record.root_names.push(
                        inner
                            .current
                            .nodes
                            .get(&id)
                            .map(|node| node.name.clone())
                            .unwrap_or_default(),
                    );
                    inner.collect_exchange_info(id, &mut record);
                }

                inner.saved.remove(path);
                inner.exchange.insert(path.to_owned(), record);
            }
        }

        inner.raise_event(DocumentEvent::Exported(path.to_owned()));
        Ok(())
    }

    fn playback_range(&mut self) -> io::Result<PlaybackRange> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.current.playback)
    }

    fn bake_animation(&mut self, nodes: &[NodeId], range: PlaybackRange) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if nodes.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no nodes were given to bake",
            ));
        }
        for &id in nodes {
            if !inner.current.nodes.contains_key(&id) {
                return stale_node(id);
            }
        }

        for &id in nodes {
            if let Some(node) = inner.current.nodes.get_mut(&id) {
                node.baked = Some(range);
            }
        }

        inner.current.modified = true;
        Ok(())
    }

    fn event_receiver(&self) -> crossbeam_channel::Receiver<DocumentEvent> {
        let inner = self.inner.lock().unwrap();

        inner.event_receiver.clone()
    }
}

// Exporting without preserved references bakes everything down to plain
// nodes in the root namespace.
fn flatten_references(snapshot: &mut NodeSnapshot) {
    snapshot.namespace = None;
    snapshot.reference_namespace = None;
    for child in &mut snapshot.children {
        flatten_references(child);
    }
}

fn collect_reference_groups(snapshot: &NodeSnapshot, out: &mut BTreeSet<String>) {
    if let Some(group) = &snapshot.reference_namespace {
        out.insert(group.clone());
    }
    for child in &snapshot.children {
        collect_reference_groups(child, out);
    }
}

fn stale_node<T>(id: NodeId) -> io::Result<T> {
    Err(io::Error::other(format!(
        "node handle {:?} does not exist in the current document",
        id
    )))
}

fn stale_reference<T>(id: RefId) -> io::Result<T> {
    Err(io::Error::other(format!(
        "reference handle {:?} does not exist in the current document",
        id
    )))
}

fn node_locked<T>(name: &str) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("node {} is locked", name),
    ))
}

fn no_such_file<T>(path: &Path) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no document stored at {}", path.display()),
    ))
}

fn must_be_document<T>(path: &Path) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} is an exchange file, not a document", path.display()),
    ))
}

fn unsaved_changes<T>() -> io::Result<T> {
    Err(io::Error::other(
        "the current document has unsaved changes",
    ))
}
