//! Änderungs-Benachrichtigung: synchroner Publish/Subscribe pro Engine-Instanz.

/// Art einer strukturellen Graph-Änderung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphChangeKind {
    /// Node neu angelegt
    NodeAdded,
    /// Node entfernt
    NodeRemoved,
    /// Node(s) verschoben, betroffene Wände müssen neu gezeichnet werden
    NodeMoved,
    /// Wand neu angelegt
    WallAdded,
    /// Wand entfernt
    WallRemoved,
    /// Wand-Eigenschaften oder Verbindungs-Einschränkungen geändert
    WallModified,
    /// Gesamter Graph geleert
    GraphCleared,
}

/// Ein Änderungs-Event mit allen betroffenen IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphChange {
    /// Art der Änderung
    pub kind: GraphChangeKind,
    /// Betroffene Node-IDs
    pub node_ids: Vec<u64>,
    /// Betroffene Wand-IDs
    pub wall_ids: Vec<u64>,
}

impl GraphChange {
    /// Erstellt ein neues Event
    pub fn new(kind: GraphChangeKind, node_ids: Vec<u64>, wall_ids: Vec<u64>) -> Self {
        Self {
            kind,
            node_ids,
            wall_ids,
        }
    }
}

/// Handle einer Listener-Registrierung (für `unsubscribe`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GraphChange)>;

/// Listener-Registry, gebunden an die Lebensdauer einer Engine-Instanz.
///
/// Listener laufen synchron innerhalb des mutierenden Aufrufs. Sie erhalten
/// nur `&GraphChange`; die Engine ist während der Zustellung mutabel
/// geliehen und kann daher nicht aus einem Handler heraus verändert werden.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl ChangeNotifier {
    /// Erstellt eine leere Registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert einen Listener und liefert dessen Handle.
    pub fn subscribe(&mut self, listener: impl FnMut(&GraphChange) + 'static) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        log::debug!("Listener {:?} registriert ({} aktiv)", id, self.listeners.len());
        id
    }

    /// Entfernt einen Listener. Gibt `false` zurück, wenn das Handle unbekannt ist.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        let removed = self.listeners.len() < before;
        if removed {
            log::debug!("Listener {:?} entfernt", id);
        }
        removed
    }

    /// Stellt ein Event an alle Listener in Registrierungs-Reihenfolge zu.
    pub fn emit(&mut self, change: GraphChange) {
        log::trace!(
            "{:?}: Nodes {:?}, Wände {:?}",
            change.kind,
            change.node_ids,
            change.wall_ids
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }

    /// Anzahl registrierter Listener
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_all_listeners_in_order() {
        let seen: Rc<RefCell<Vec<(u8, GraphChangeKind)>>> = Rc::default();
        let mut notifier = ChangeNotifier::new();

        let log_a = Rc::clone(&seen);
        notifier.subscribe(move |c| log_a.borrow_mut().push((1, c.kind)));
        let log_b = Rc::clone(&seen);
        notifier.subscribe(move |c| log_b.borrow_mut().push((2, c.kind)));

        notifier.emit(GraphChange::new(GraphChangeKind::WallAdded, vec![1, 2], vec![7]));

        assert_eq!(
            *seen.borrow(),
            vec![(1, GraphChangeKind::WallAdded), (2, GraphChangeKind::WallAdded)]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0usize));
        let mut notifier = ChangeNotifier::new();
        let counter = Rc::clone(&count);
        let id = notifier.subscribe(move |_| *counter.borrow_mut() += 1);

        notifier.emit(GraphChange::new(GraphChangeKind::GraphCleared, vec![], vec![]));
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.emit(GraphChange::new(GraphChangeKind::GraphCleared, vec![], vec![]));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(notifier.listener_count(), 0);
    }
}
