//! Change-log rendering.
//!
//! [`process_change_list`] walks a change list and drives a
//! [`ChangeProcessor`]: one callback when the commit changes, one when the
//! affected object changes, then one per change. [`TextChangeLog`] is the
//! built-in processor producing a plain-text log.

use super::model::{Change, ChangeKind, ElementChange, EntryChange};
use crate::commit::CommitMetadata;
use crate::graph::{GlobalId, PropertyValue};

pub trait ChangeProcessor {
    type Output;

    fn on_commit(&mut self, _commit: &CommitMetadata) {}

    fn on_affected_object(&mut self, _id: &GlobalId) {}

    fn on_new_object(&mut self, _id: &GlobalId) {}

    fn on_object_removed(&mut self, _id: &GlobalId) {}

    fn on_value_changed(&mut self, _property: &str, _left: &PropertyValue, _right: &PropertyValue) {}

    fn on_reference_changed(
        &mut self,
        _property: &str,
        _left: Option<&GlobalId>,
        _right: Option<&GlobalId>,
    ) {
    }

    fn on_list_change(&mut self, _property: &str, _elements: &[ElementChange]) {}

    fn on_set_change(&mut self, _property: &str, _added: &[PropertyValue], _removed: &[PropertyValue]) {}

    fn on_map_change(&mut self, _property: &str, _entries: &[EntryChange]) {}

    fn result(self) -> Self::Output;
}

pub fn process_change_list<P: ChangeProcessor>(changes: &[Change], mut processor: P) -> P::Output {
    let mut current_commit: Option<&CommitMetadata> = None;
    let mut current_object: Option<&GlobalId> = None;

    for change in changes {
        if let Some(commit) = &change.commit {
            if current_commit.map(|c| c.id) != Some(commit.id) {
                processor.on_commit(commit);
                current_commit = Some(commit);
                current_object = None;
            }
        }
        if current_object != Some(&change.affected) {
            processor.on_affected_object(&change.affected);
            current_object = Some(&change.affected);
        }

        match &change.kind {
            ChangeKind::NewObject => processor.on_new_object(&change.affected),
            ChangeKind::ObjectRemoved => processor.on_object_removed(&change.affected),
            ChangeKind::ValueChanged {
                property,
                left,
                right,
            } => processor.on_value_changed(property, left, right),
            ChangeKind::ReferenceChanged {
                property,
                left,
                right,
            } => processor.on_reference_changed(property, left.as_ref(), right.as_ref()),
            ChangeKind::ListChange { property, elements } => {
                processor.on_list_change(property, elements)
            }
            ChangeKind::SetChange {
                property,
                added,
                removed,
            } => processor.on_set_change(property, added, removed),
            ChangeKind::MapChange { property, entries } => {
                processor.on_map_change(property, entries)
            }
        }
    }
    processor.result()
}

/// Plain-text change log, grouped by commit and affected object
#[derive(Debug, Default)]
pub struct TextChangeLog {
    out: String,
}

impl TextChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

impl ChangeProcessor for TextChangeLog {
    type Output = String;

    fn on_commit(&mut self, commit: &CommitMetadata) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        let header = format!(
            "commit {}, author: {}, {}",
            commit.id,
            commit.author,
            commit.committed_at.format("%Y-%m-%d %H:%M:%S")
        );
        self.line(0, &header);
    }

    fn on_affected_object(&mut self, id: &GlobalId) {
        self.line(1, &format!("changes on {} :", id));
    }

    fn on_new_object(&mut self, _id: &GlobalId) {
        self.line(2, "- new object");
    }

    fn on_object_removed(&mut self, _id: &GlobalId) {
        self.line(2, "- object removed");
    }

    fn on_value_changed(&mut self, property: &str, left: &PropertyValue, right: &PropertyValue) {
        self.line(
            2,
            &format!("- '{}' changed from '{}' to '{}'", property, left, right),
        );
    }

    fn on_reference_changed(
        &mut self,
        property: &str,
        left: Option<&GlobalId>,
        right: Option<&GlobalId>,
    ) {
        let show = |id: Option<&GlobalId>| id.map_or_else(|| "null".to_string(), ToString::to_string);
        self.line(
            2,
            &format!(
                "- '{}' reference changed from '{}' to '{}'",
                property,
                show(left),
                show(right)
            ),
        );
    }

    fn on_list_change(&mut self, property: &str, elements: &[ElementChange]) {
        self.line(2, &format!("- '{}' list changes:", property));
        for element in elements {
            let text = match element {
                ElementChange::ElementAdded { index, value } => {
                    format!("· {}. '{}' added", index, value)
                }
                ElementChange::ElementRemoved { index, value } => {
                    format!("· {}. '{}' removed", index, value)
                }
                ElementChange::ElementValueChanged { index, left, right } => {
                    format!("· {}. '{}' changed to '{}'", index, left, right)
                }
            };
            self.line(3, &text);
        }
    }

    fn on_set_change(&mut self, property: &str, added: &[PropertyValue], removed: &[PropertyValue]) {
        self.line(2, &format!("- '{}' set changes:", property));
        for value in added {
            self.line(3, &format!("· '{}' added", value));
        }
        for value in removed {
            self.line(3, &format!("· '{}' removed", value));
        }
    }

    fn on_map_change(&mut self, property: &str, entries: &[EntryChange]) {
        self.line(2, &format!("- '{}' map changes:", property));
        for entry in entries {
            let text = match entry {
                EntryChange::EntryAdded { key, value } => format!("· '{}' -> '{}' added", key, value),
                EntryChange::EntryRemoved { key, value } => {
                    format!("· '{}' -> '{}' removed", key, value)
                }
                EntryChange::EntryValueChanged { key, left, right } => {
                    format!("· '{}' -> '{}' changed to '{}'", key, left, right)
                }
            };
            self.line(3, &text);
        }
    }

    fn result(self) -> String {
        self.out
    }
}

/// Render changes with [`TextChangeLog`]
pub fn render_change_log(changes: &[Change]) -> String {
    process_change_list(changes, TextChangeLog::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitId;
    use chrono::{TimeZone, Utc};

    fn metadata(id: u64) -> CommitMetadata {
        CommitMetadata {
            id: CommitId::new(id, 0),
            author: "ann".into(),
            committed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_groups_by_commit_and_object() {
        let person = GlobalId::instance("Person", 1);
        let changes = vec![
            Change::new(
                person.clone(),
                ChangeKind::ValueChanged {
                    property: "name".into(),
                    left: PropertyValue::Text("Ann".into()),
                    right: PropertyValue::Text("Anna".into()),
                },
            )
            .with_commit(metadata(2)),
            Change::new_object(person.clone()).with_commit(metadata(1)),
        ];

        let log = render_change_log(&changes);
        assert_eq!(
            log,
            "commit 2.0, author: ann, 2024-05-01 12:00:00\n\
             \x20 changes on Person/1 :\n\
             \x20   - 'name' changed from 'Ann' to 'Anna'\n\
             \n\
             commit 1.0, author: ann, 2024-05-01 12:00:00\n\
             \x20 changes on Person/1 :\n\
             \x20   - new object\n"
        );
    }

    struct Counter(usize, usize);

    impl ChangeProcessor for Counter {
        type Output = (usize, usize);

        fn on_affected_object(&mut self, _id: &GlobalId) {
            self.0 += 1;
        }

        fn on_object_removed(&mut self, _id: &GlobalId) {
            self.1 += 1;
        }

        fn result(self) -> (usize, usize) {
            (self.0, self.1)
        }
    }

    #[test]
    fn test_custom_processor() {
        let changes = vec![
            Change::object_removed(GlobalId::instance("Person", 1)),
            Change::object_removed(GlobalId::instance("Person", 2)),
        ];
        assert_eq!(process_change_list(&changes, Counter(0, 0)), (2, 2));
    }
}
