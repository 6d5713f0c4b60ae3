//! Change and diff types.
//!
//! A [`Diff`] is an ordered, immutable list of [`Change`]s. Every change
//! names the affected global id; changes read back from history also carry
//! the metadata of the commit that recorded them.
//!
//! JSON shape (one object per change):
//!
//! ```json
//! {"affected": {...}, "change_type": "ValueChanged", "property": "name", "left": ..., "right": ...}
//! ```

use crate::commit::CommitMetadata;
use crate::graph::{GlobalId, PropertyValue};
use serde::{Deserialize, Serialize};

/// Change of one list element. Indices refer to the left list for
/// removals and to the right list for additions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ElementChange {
    ElementAdded {
        index: usize,
        value: PropertyValue,
    },
    ElementRemoved {
        index: usize,
        value: PropertyValue,
    },
    ElementValueChanged {
        index: usize,
        left: PropertyValue,
        right: PropertyValue,
    },
}

impl ElementChange {
    pub fn index(&self) -> usize {
        match self {
            ElementChange::ElementAdded { index, .. }
            | ElementChange::ElementRemoved { index, .. }
            | ElementChange::ElementValueChanged { index, .. } => *index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EntryChange {
    EntryAdded {
        key: String,
        value: PropertyValue,
    },
    EntryRemoved {
        key: String,
        value: PropertyValue,
    },
    EntryValueChanged {
        key: String,
        left: PropertyValue,
        right: PropertyValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change_type")]
pub enum ChangeKind {
    NewObject,
    ObjectRemoved,
    ValueChanged {
        property: String,
        left: PropertyValue,
        right: PropertyValue,
    },
    ReferenceChanged {
        property: String,
        left: Option<GlobalId>,
        right: Option<GlobalId>,
    },
    ListChange {
        property: String,
        elements: Vec<ElementChange>,
    },
    SetChange {
        property: String,
        added: Vec<PropertyValue>,
        removed: Vec<PropertyValue>,
    },
    MapChange {
        property: String,
        entries: Vec<EntryChange>,
    },
}

impl ChangeKind {
    /// Property path for property-level changes
    pub fn property(&self) -> Option<&str> {
        match self {
            ChangeKind::NewObject | ChangeKind::ObjectRemoved => None,
            ChangeKind::ValueChanged { property, .. }
            | ChangeKind::ReferenceChanged { property, .. }
            | ChangeKind::ListChange { property, .. }
            | ChangeKind::SetChange { property, .. }
            | ChangeKind::MapChange { property, .. } => Some(property),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChangeKind::NewObject => "NewObject",
            ChangeKind::ObjectRemoved => "ObjectRemoved",
            ChangeKind::ValueChanged { .. } => "ValueChanged",
            ChangeKind::ReferenceChanged { .. } => "ReferenceChanged",
            ChangeKind::ListChange { .. } => "ListChange",
            ChangeKind::SetChange { .. } => "SetChange",
            ChangeKind::MapChange { .. } => "MapChange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub affected: GlobalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitMetadata>,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(affected: GlobalId, kind: ChangeKind) -> Self {
        Self {
            affected,
            commit: None,
            kind,
        }
    }

    pub fn new_object(affected: GlobalId) -> Self {
        Self::new(affected, ChangeKind::NewObject)
    }

    pub fn object_removed(affected: GlobalId) -> Self {
        Self::new(affected, ChangeKind::ObjectRemoved)
    }

    /// A reference dropped from a to-many relation
    #[deprecated(note = "recorded as a `SetChange` with one removed reference")]
    pub fn reference_removed(
        affected: GlobalId,
        property: impl Into<String>,
        removed: GlobalId,
    ) -> Self {
        Self::new(
            affected,
            ChangeKind::SetChange {
                property: property.into(),
                added: Vec::new(),
                removed: vec![PropertyValue::Reference(removed)],
            },
        )
    }

    pub fn with_commit(mut self, commit: CommitMetadata) -> Self {
        self.commit = Some(commit);
        self
    }

    pub fn property(&self) -> Option<&str> {
        self.kind.property()
    }
}

/// Ordered result of one comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff {
    changes: Vec<Change>,
}

impl Diff {
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Changes affecting one global id, in emission order
    pub fn changes_for<'a>(&'a self, id: &'a GlobalId) -> impl Iterator<Item = &'a Change> + 'a {
        self.changes.iter().filter(move |c| &c.affected == id)
    }
}

impl<'a> IntoIterator for &'a Diff {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl IntoIterator for Diff {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}
