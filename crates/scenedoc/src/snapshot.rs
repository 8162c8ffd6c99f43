use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AttrValue, Attribute, ConstraintKind, NodeKind};

/// A description of one node and its subtree. Can be loaded into an
/// [`InMemoryDocument`](struct.InMemoryDocument.html) as the content of a
/// stored document, and is returned when snapshotting one back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,

    #[serde(default, skip_serializing_if = "NodeKind::is_transform")]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// The namespace of the live reference this node belongs to, if it came
    /// in through one. Opening a document that carries these rebuilds the
    /// reference, the way the host stores reference edits in the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// A plain transform node with no children.
    pub fn transform<S: Into<String>>(name: S) -> Self {
        Self::with_kind(name, NodeKind::Transform)
    }

    /// A skeleton joint node.
    pub fn joint<S: Into<String>>(name: S) -> Self {
        Self::with_kind(name, NodeKind::Joint)
    }

    /// A constraint node of the given kind.
    pub fn constraint<S: Into<String>>(name: S, kind: ConstraintKind) -> Self {
        Self::with_kind(name, NodeKind::Constraint(kind))
    }

    pub fn with_kind<S: Into<String>>(name: S, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            locked: false,
            namespace: None,
            reference_namespace: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn in_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Places the node and the children added so far in a live reference
    /// under `namespace`, the way creating a reference brings a document in.
    pub fn referenced<S: Into<String>>(mut self, namespace: S) -> Self {
        self.apply_reference(&namespace.into());
        self
    }

    fn apply_reference(&mut self, namespace: &str) {
        self.namespace = Some(namespace.to_owned());
        self.reference_namespace = Some(namespace.to_owned());
        for child in &mut self.children {
            child.apply_reference(namespace);
        }
    }

    pub fn attribute<S: Into<String>, V: Into<AttrValue>>(
        mut self,
        name: S,
        value: V,
        locked: bool,
    ) -> Self {
        self.attributes.insert(
            name.into(),
            Attribute {
                value: value.into(),
                locked,
            },
        );
        self
    }

    pub fn children<I: IntoIterator<Item = NodeSnapshot>>(mut self, children: I) -> Self {
        self.children = children.into_iter().collect();
        self
    }
}

fn is_false(value: &bool) -> bool {
    !value
}
