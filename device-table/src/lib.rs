//! Revisioned Table Library
//!
//! A generic keyed table whose values are shared as `Arc<V>`, built for
//! front ends that detect changes by identity rather than by deep comparison.
//!
//! # Features
//!
//! - **Identity-preserving updates**: entries not named in a delta keep the
//!   exact same `Arc`; entries named in a delta always get a fresh `Arc`
//! - **Revisions**: every apply bumps a table-wide revision and stamps the
//!   entries it replaced, so `(id, revision)` is a stable refresh key
//! - **Request sequencing**: responses carry the sequence of the request that
//!   produced them; stale out-of-order responses are dropped per entry
//! - **Change events**: watch individual ids and consume events through a
//!   blocking iterator
//!
//! # Quick Start
//!
//! ```rust
//! use device_table::RevisionedTable;
//! use std::sync::Arc;
//!
//! let table = RevisionedTable::<String, u32>::new();
//! table.apply_snapshot([("a".to_string(), 1), ("b".to_string(), 2)]).unwrap();
//!
//! let before_b = table.get(&"b".to_string()).unwrap();
//! table.apply_update([("a".to_string(), 1)]).unwrap();
//!
//! // "b" was not in the delta: same allocation
//! assert!(Arc::ptr_eq(&before_b, &table.get(&"b".to_string()).unwrap()));
//! ```
//!
//! # Architecture
//!
//! ```text
//! RevisionedTable<Id, V>
//!     │
//!     ├── slots: HashMap<Id, Slot<V>>
//!     │       │
//!     │       └── Slot { value: Arc<V>, revision, sequence }
//!     │
//!     ├── next_sequence: AtomicU64
//!     │
//!     ├── watched: HashSet<Id>
//!     │
//!     └── event_channel: mpsc::channel<ChangeEvent<Id>>
//!             │
//!             └── ChangeIterator<Id>
//! ```

pub mod error;
pub mod event;
pub mod iter;
pub mod table;

pub use error::TableError;
pub use event::{ChangeEvent, Revision, Sequence};
pub use iter::{ChangeIterator, TryIter};
pub use table::{ApplyReport, RevisionedTable, Snapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::event::{ChangeEvent, Revision, Sequence};
    pub use crate::iter::ChangeIterator;
    pub use crate::table::{ApplyReport, RevisionedTable, Snapshot};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, PartialEq, Debug)]
    struct Lamp {
        on: bool,
        brightness: u8,
    }

    fn lamp(on: bool, brightness: u8) -> Lamp {
        Lamp { on, brightness }
    }

    #[test]
    fn test_full_workflow() {
        let table = RevisionedTable::<String, Lamp>::new();

        table
            .apply_snapshot([
                ("kitchen".to_string(), lamp(false, 80)),
                ("bedroom".to_string(), lamp(false, 60)),
            ])
            .unwrap();

        table.watch("kitchen".to_string());

        let report = table
            .apply_update([("kitchen".to_string(), lamp(true, 80))])
            .unwrap();
        assert_eq!(report.applied, vec!["kitchen".to_string()]);

        let event = table.iter().recv_timeout(Duration::from_millis(100));
        let event = event.expect("watched entry should emit an event");
        assert_eq!(event.entity_id, "kitchen");
        assert_eq!(event.revision, report.revision);

        assert_eq!(*table.get(&"kitchen".to_string()).unwrap(), lamp(true, 80));
    }

    #[test]
    fn test_clone_shares_state() {
        let table1 = RevisionedTable::<String, Lamp>::new();
        let table2 = table1.clone();

        table1
            .apply_update([("kitchen".to_string(), lamp(true, 10))])
            .unwrap();

        let a = table1.get(&"kitchen".to_string()).unwrap();
        let b = table2.get(&"kitchen".to_string()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table1.revision(), table2.revision());
    }
}
