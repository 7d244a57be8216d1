//! Revisions, request sequences and change events
//!
//! A [`Revision`] counts applies to a table. A [`Sequence`] orders the
//! requests whose responses are applied. Watched entries emit a
//! [`ChangeEvent`] each time an apply replaces them.

use std::fmt;
use std::time::Instant;

/// Table-wide apply counter
///
/// Starts at zero for an empty table and increases by one on every apply,
/// including applies whose every entry turned out to be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(pub u64);

impl Revision {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Order of issue for requests whose responses end up in the table
///
/// Sequences are handed out by [`RevisionedTable::issue_sequence`] before
/// the request leaves, so a response can later be compared against whatever
/// already landed for the same entry.
///
/// [`RevisionedTable::issue_sequence`]: crate::RevisionedTable::issue_sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sequence(pub u64);

impl Sequence {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entry was replaced by an apply
///
/// Events carry the id and the revision of the apply, not the value.
/// Read the value back with `RevisionedTable::get()`.
#[derive(Debug, Clone)]
pub struct ChangeEvent<Id> {
    /// The entry that was replaced
    pub entity_id: Id,

    /// Revision of the apply that replaced it
    pub revision: Revision,

    /// When the apply happened
    pub timestamp: Instant,
}

impl<Id> ChangeEvent<Id> {
    pub fn new(entity_id: Id, revision: Revision) -> Self {
        Self {
            entity_id,
            revision,
            timestamp: Instant::now(),
        }
    }
}

impl<Id: PartialEq> PartialEq for ChangeEvent<Id> {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.entity_id == other.entity_id && self.revision == other.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_next_and_display() {
        let r = Revision::default();
        assert_eq!(r.value(), 0);
        assert_eq!(r.next().value(), 1);
        assert_eq!(r.next().to_string(), "r1");
    }

    #[test]
    fn test_sequence_ordering() {
        assert!(Sequence(3) > Sequence(2));
        assert_eq!(Sequence(7).to_string(), "#7");
    }

    #[test]
    fn test_change_event_equality_ignores_timestamp() {
        let a = ChangeEvent::new("light".to_string(), Revision(2));
        std::thread::sleep(std::time::Duration::from_millis(1));
        let b = ChangeEvent::new("light".to_string(), Revision(2));
        let c = ChangeEvent::new("light".to_string(), Revision(3));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
