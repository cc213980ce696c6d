use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// User selection gesture over map objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// `additive` keeps the current selection of that type (shift-click).
    Select {
        object_type: String,
        id: u32,
        additive: bool,
    },
    Deselect {
        object_type: String,
        id: u32,
    },
    /// Clears one type, or every type when `None`.
    Clear { object_type: Option<String> },
    SetActiveType { object_type: String },
}

/// Plain-data snapshot of a selection handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub active_type: Option<String>,
    /// Selected ids per map-object type, ascending.
    pub selected: BTreeMap<String, Vec<u32>>,
}

impl SelectionState {
    pub fn is_selected(&self, object_type: &str, id: u32) -> bool {
        self.selected
            .get(object_type)
            .is_some_and(|ids| ids.binary_search(&id).is_ok())
    }
}

/// Interprets selection gestures on a viewport's map.
pub trait SelectionHandler {
    /// Returns `true` if the selection changed.
    fn handle(&mut self, event: &SelectionEvent) -> bool;
    fn selected(&self, object_type: &str) -> Vec<u32>;
    fn state(&self) -> SelectionState;
    fn restore(&mut self, state: &SelectionState);
}

/// Keeps one selection per map-object type.
///
/// Object ids are arbitrary `u32` values from the backend, so each type's
/// selection is a sparse ordered set and iterates in ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapObjectSelectionHandler {
    active_type: Option<String>,
    sets: BTreeMap<String, BTreeSet<u32>>,
}

impl MapObjectSelectionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: &SelectionState) -> Self {
        let mut h = Self::new();
        h.restore(state);
        h
    }

    pub fn active_type(&self) -> Option<&str> {
        self.active_type.as_deref()
    }
}

impl SelectionHandler for MapObjectSelectionHandler {
    fn handle(&mut self, event: &SelectionEvent) -> bool {
        match event {
            SelectionEvent::Select {
                object_type,
                id,
                additive,
            } => {
                let set = self.sets.entry(object_type.clone()).or_default();
                if *additive {
                    return set.insert(*id);
                }
                let unchanged = set.len() == 1 && set.contains(id);
                set.clear();
                set.insert(*id);
                !unchanged
            }
            SelectionEvent::Deselect { object_type, id } => self
                .sets
                .get_mut(object_type)
                .is_some_and(|set| set.remove(id)),
            SelectionEvent::Clear { object_type: Some(t) } => self
                .sets
                .get_mut(t)
                .is_some_and(|set| {
                    let changed = !set.is_empty();
                    set.clear();
                    changed
                }),
            SelectionEvent::Clear { object_type: None } => {
                let changed = self.sets.values().any(|s| !s.is_empty());
                self.sets.values_mut().for_each(BTreeSet::clear);
                changed
            }
            SelectionEvent::SetActiveType { object_type } => {
                let changed = self.active_type.as_deref() != Some(object_type.as_str());
                self.active_type = Some(object_type.clone());
                changed
            }
        }
    }

    fn selected(&self, object_type: &str) -> Vec<u32> {
        self.sets
            .get(object_type)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    fn state(&self) -> SelectionState {
        SelectionState {
            active_type: self.active_type.clone(),
            selected: self
                .sets
                .iter()
                .filter(|(_, s)| !s.is_empty())
                .map(|(t, s)| (t.clone(), s.iter().copied().collect()))
                .collect(),
        }
    }

    fn restore(&mut self, state: &SelectionState) {
        self.active_type = state.active_type.clone();
        self.sets = state
            .selected
            .iter()
            .map(|(t, ids)| (t.clone(), ids.iter().copied().collect()))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::{MapObjectSelectionHandler, SelectionEvent, SelectionHandler, SelectionState};

    fn select(id: u32, additive: bool) -> SelectionEvent {
        SelectionEvent::Select {
            object_type: "cells".to_string(),
            id,
            additive,
        }
    }

    #[test]
    fn additive_selection_is_ascending() {
        let mut h = MapObjectSelectionHandler::new();
        for id in [10, 2, 65] {
            assert!(h.handle(&select(id, true)));
        }
        assert!(!h.handle(&select(10, true)));
        assert_eq!(h.selected("cells"), vec![2, 10, 65]);
    }

    #[test]
    fn large_object_ids_are_stored_sparsely() {
        let mut h = MapObjectSelectionHandler::new();
        assert!(h.handle(&select(4_000_000_000, false)));
        assert!(h.handle(&select(u32::MAX, true)));
        assert!(h.handle(&select(0, true)));
        assert_eq!(h.sets["cells"].len(), 3);
        assert_eq!(h.selected("cells"), vec![0, 4_000_000_000, u32::MAX]);

        let restored = MapObjectSelectionHandler::from_state(&h.state());
        assert_eq!(restored.selected("cells"), vec![0, 4_000_000_000, u32::MAX]);
    }

    #[test]
    fn non_additive_select_replaces_selection() {
        let mut h = MapObjectSelectionHandler::new();
        assert!(h.handle(&select(3, false)));
        assert!(h.handle(&select(7, true)));
        assert_eq!(h.selected("cells"), vec![3, 7]);

        assert!(h.handle(&select(5, false)));
        assert_eq!(h.selected("cells"), vec![5]);
        // Re-selecting the only selected object changes nothing.
        assert!(!h.handle(&select(5, false)));
    }

    #[test]
    fn deselect_and_clear() {
        let mut h = MapObjectSelectionHandler::new();
        h.handle(&select(1, true));
        h.handle(&select(2, true));
        assert!(h.handle(&SelectionEvent::Deselect {
            object_type: "cells".into(),
            id: 1
        }));
        assert!(!h.handle(&SelectionEvent::Deselect {
            object_type: "nuclei".into(),
            id: 1
        }));
        assert!(h.handle(&SelectionEvent::Clear { object_type: None }));
        assert!(h.selected("cells").is_empty());
        assert!(!h.handle(&SelectionEvent::Clear {
            object_type: Some("cells".into())
        }));
    }

    #[test]
    fn state_round_trips() {
        let mut h = MapObjectSelectionHandler::new();
        h.handle(&SelectionEvent::SetActiveType {
            object_type: "cells".into(),
        });
        h.handle(&select(4, true));
        h.handle(&select(2, true));

        let state = h.state();
        assert_eq!(state.active_type.as_deref(), Some("cells"));
        assert_eq!(state.selected["cells"], vec![2, 4]);
        assert!(state.is_selected("cells", 4));
        assert!(!state.is_selected("nuclei", 4));

        let restored = MapObjectSelectionHandler::from_state(&state);
        assert_eq!(restored, h);
        assert_eq!(SelectionState::default(), MapObjectSelectionHandler::new().state());
    }
}
