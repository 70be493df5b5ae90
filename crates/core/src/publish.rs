use futures::Stream;

use crate::{path::PathPrefix, store::KvStore, Entry};

/// Progress of a publish run, one event per store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent<E> {
    /// The existing subtree was removed.
    Cleared { prefix: String },
    /// Removing the existing subtree failed. The run continues regardless.
    ClearFailed { prefix: String, error: E },
    Written(Entry),
    WriteFailed { entry: Entry, error: E },
}

/// Replace the subtree at `prefix` with `entries`.
///
/// The subtree (every key below `prefix/`) is deleted first, then every entry is written on its own, in
/// order. Neither a failed delete nor a failed write stops the run; each
/// outcome is reported as a [`PublishEvent`]. Store calls are strictly
/// sequential and nothing is rolled back, so a reader that looks at the store
/// mid-run sees a partially repopulated subtree.
///
/// # Example
///
/// ```
/// use futures::StreamExt as _;
/// use kvseed_core::{publish, Entry, MemoryStore, PathPrefix, PublishEvent};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// let prefix = PathPrefix::new("dev", "app", "alice");
/// let entries = vec![Entry::new(prefix.join("db/host"), "localhost")];
///
/// let events: Vec<_> = publish(&store, &prefix, entries).collect().await;
///
/// assert!(matches!(events[0], PublishEvent::Cleared { .. }));
/// assert!(matches!(events[1], PublishEvent::Written(_)));
/// # }
/// ```
pub fn publish<'a, S>(
    store: &'a S,
    prefix: &'a PathPrefix,
    entries: Vec<Entry>,
) -> impl Stream<Item = PublishEvent<S::Error>> + 'a
where
    S: KvStore + 'a,
{
    async_stream::stream! {
        let prefix = prefix.subtree();

        match store.delete_tree(&prefix).await {
            Ok(()) => {
                tracing::debug!(%prefix, "Cleared existing subtree");
                yield PublishEvent::Cleared { prefix };
            }
            Err(error) => {
                tracing::warn!(%prefix, %error, "Failed to clear existing subtree, continuing");
                yield PublishEvent::ClearFailed { prefix, error };
            }
        }

        for entry in entries {
            match store.put(&entry.key, &entry.value).await {
                Ok(()) => {
                    tracing::trace!(key = %entry.key, "Wrote entry");
                    yield PublishEvent::Written(entry);
                }
                Err(error) => {
                    tracing::warn!(key = %entry.key, %error, "Failed to write entry");
                    yield PublishEvent::WriteFailed { entry, error };
                }
            }
        }
    }
}

/// Totals of a publish run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub cleared: bool,
    pub written: usize,
    pub failed: usize,
}

impl PublishSummary {
    pub fn record<E>(&mut self, event: &PublishEvent<E>) {
        match event {
            PublishEvent::Cleared { .. } => self.cleared = true,
            PublishEvent::ClearFailed { .. } => self.cleared = false,
            PublishEvent::Written(_) => self.written += 1,
            PublishEvent::WriteFailed { .. } => self.failed += 1,
        }
    }
}

impl<'a, E: 'a> FromIterator<&'a PublishEvent<E>> for PublishSummary {
    fn from_iter<I: IntoIterator<Item = &'a PublishEvent<E>>>(iter: I) -> Self {
        let mut summary = Self::default();
        for event in iter {
            summary.record(event);
        }
        summary
    }
}
