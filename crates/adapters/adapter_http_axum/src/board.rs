//! Circuit board — the presentation-side copy of every exposed circuit.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use unibridge_app::ports::Presentation;
use unibridge_domain::circuit::CircuitView;
use unibridge_domain::layout::Exposure;

/// One exposed circuit as the consumer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntry {
    pub exposure: Exposure,
    #[serde(flatten)]
    pub view: CircuitView,
}

/// Shared, cloneable board. The bridge writes through [`Presentation`],
/// HTTP handlers read.
#[derive(Debug, Clone, Default)]
pub struct CircuitBoard {
    entries: Arc<RwLock<BTreeMap<String, BoardEntry>>>,
}

impl CircuitBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every exposed circuit, by alias.
    #[must_use]
    pub fn list(&self) -> Vec<BoardEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<BoardEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(alias)
            .cloned()
    }

    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(alias)
    }
}

impl Presentation for CircuitBoard {
    fn expose(&mut self, exposure: &Exposure, view: &CircuitView) {
        tracing::info!(
            alias = %view.alias,
            accessory = %exposure.accessory,
            service = %exposure.service,
            room = %exposure.room,
            "circuit exposed"
        );
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                view.alias.to_string(),
                BoardEntry {
                    exposure: exposure.clone(),
                    view: view.clone(),
                },
            );
    }

    fn update(&mut self, view: &CircuitView) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(view.alias.as_str()) {
            Some(entry) => entry.view = view.clone(),
            None => tracing::debug!(alias = %view.alias, "update for a circuit never exposed"),
        }
    }
}
