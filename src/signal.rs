//! Brush signal - typed publish/subscribe between charts
//!
//! The scatter plot publishes, the parallel plot subscribes. Backed by a
//! `watch` channel: subscribers only ever see the latest selection.

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

use crate::survey::RowId;

/// Name used when logging traffic on the signal
pub const BRUSH_SIGNAL: &str = "scatter-brush";

/// Rows picked by a brush, or no filter at all.
/// `Ids` with an empty set is an active selection that matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Ids(BTreeSet<RowId>),
}

impl Selection {
    pub fn contains(&self, id: RowId) -> bool {
        match self {
            Selection::All => true,
            Selection::Ids(ids) => ids.contains(&id),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Selection::Ids(_))
    }
}

impl FromIterator<RowId> for Selection {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Selection::Ids(iter.into_iter().collect())
    }
}

/// Publisher side, cheap to clone and hand to every chart
#[derive(Clone)]
pub struct BrushSignal {
    tx: Arc<watch::Sender<Selection>>,
}

impl Default for BrushSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl BrushSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Selection::All);
        Self { tx: Arc::new(tx) }
    }

    /// Fire and forget; replaces whatever was published before
    pub fn publish(&self, selection: Selection) {
        match &selection {
            Selection::All => tracing::debug!(signal = BRUSH_SIGNAL, "publish: no filter"),
            Selection::Ids(ids) => {
                tracing::debug!(signal = BRUSH_SIGNAL, "publish: {} ids", ids.len())
            }
        }
        self.tx.send_replace(selection);
    }

    /// Start listening; dropping the subscription unsubscribes
    pub fn subscribe(&self) -> BrushSubscription {
        BrushSubscription {
            rx: self.tx.subscribe(),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pub struct BrushSubscription {
    rx: watch::Receiver<Selection>,
}

impl BrushSubscription {
    /// The newest selection, if one arrived since the last poll
    pub fn poll(&mut self) -> Option<Selection> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_broadcast_wins() {
        let signal = BrushSignal::new();
        let mut sub = signal.subscribe();

        signal.publish([1, 2].into_iter().collect());
        signal.publish([7].into_iter().collect());

        assert_eq!(sub.poll(), Some(Selection::Ids([7].into_iter().collect())));
        assert_eq!(sub.poll(), None);
    }

    #[test]
    fn test_no_filter_distinct_from_empty_selection() {
        let empty: Selection = std::iter::empty().collect();
        assert!(empty.is_active());
        assert!(!empty.contains(0));
        assert!(!Selection::All.is_active());
        assert!(Selection::All.contains(0));
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let signal = BrushSignal::new();
        assert_eq!(signal.subscriber_count(), 0);
        let sub = signal.subscribe();
        assert_eq!(signal.subscriber_count(), 1);
        drop(sub);
        assert_eq!(signal.subscriber_count(), 0);
        // publishing with nobody listening is fine
        signal.publish(Selection::All);
    }

    #[test]
    fn test_new_subscriber_starts_clean() {
        let signal = BrushSignal::new();
        signal.publish([3].into_iter().collect());
        let mut sub = signal.subscribe();
        assert_eq!(sub.poll(), None);
    }
}
