//! The overlay store.
//!
//! # Design
//!
//! Each [`LayerId`] owns one slot. A mutation names exactly one layer and
//! touches only that slot, so layers are isolated by construction. Every
//! mutation bumps the layer's generation and yields an [`OverlayEffect`]
//! describing the new state, which the caller batches into a
//! [`Transaction`] for the widget.
//!
//! Entries arrive in the coordinates of the revision they were computed
//! against. [`OverlayStore::replace_all`] maps every range through the
//! document's [`PositionMap`]; if any range was edited in the meantime the
//! whole batch is dropped and the layer ends up empty.

use lens_ir::{CharRange, Revision};

use crate::{Decoration, LayerId, PositionMap};

/// New state of one layer after a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayEffect {
    /// The layer now holds exactly `decorations`.
    Replaced {
        layer: LayerId,
        generation: u64,
        decorations: Vec<Decoration>,
    },
    /// The layer is now empty.
    Cleared { layer: LayerId, generation: u64 },
    /// A batch was discarded because the text at `edited` changed; the layer is now empty.
    Dropped {
        layer: LayerId,
        generation: u64,
        edited: CharRange,
    },
}

impl OverlayEffect {
    pub fn layer(&self) -> LayerId {
        match self {
            OverlayEffect::Replaced { layer, .. }
            | OverlayEffect::Cleared { layer, .. }
            | OverlayEffect::Dropped { layer, .. } => *layer,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            OverlayEffect::Replaced { generation, .. }
            | OverlayEffect::Cleared { generation, .. }
            | OverlayEffect::Dropped { generation, .. } => *generation,
        }
    }

    /// Decorations the layer holds after this effect.
    pub fn decorations(&self) -> &[Decoration] {
        match self {
            OverlayEffect::Replaced { decorations, .. } => decorations,
            OverlayEffect::Cleared { .. } | OverlayEffect::Dropped { .. } => &[],
        }
    }
}

/// Effects applying to one document revision, dispatched together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub revision: Revision,
    pub effects: Vec<OverlayEffect>,
}

impl Transaction {
    pub fn new(revision: Revision) -> Self {
        Transaction {
            revision,
            effects: Vec::new(),
        }
    }

    pub fn push(&mut self, effect: OverlayEffect) {
        self.effects.push(effect);
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
struct Layer {
    decorations: Vec<Decoration>,
    generation: u64,
}

/// Current contents of every layer.
#[derive(Clone, Debug, Default)]
pub struct OverlayStore {
    layers: [Layer; LayerId::ALL.len()],
}

impl OverlayStore {
    pub fn new() -> Self {
        OverlayStore::default()
    }

    /// Decorations currently held by `layer`.
    pub fn layer(&self, layer: LayerId) -> &[Decoration] {
        &self.layers[layer.slot()].decorations
    }

    pub fn generation(&self, layer: LayerId) -> u64 {
        self.layers[layer.slot()].generation
    }

    /// Indices of the units with decorations in `layer`, ascending.
    pub fn units(&self, layer: LayerId) -> Vec<usize> {
        let mut units: Vec<usize> = self
            .layer(layer)
            .iter()
            .filter_map(|d| d.unit)
            .collect();
        units.sort_unstable();
        units.dedup();
        units
    }

    /// Whether every layer is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.decorations.is_empty())
    }

    /// Replace the contents of `layer` with `entries` computed at `computed_at`.
    #[tracing::instrument(level = "debug", skip_all, fields(layer = %layer, entries = entries.len(), computed_at = %computed_at))]
    pub fn replace_all(
        &mut self,
        layer: LayerId,
        entries: Vec<Decoration>,
        computed_at: Revision,
        positions: &dyn PositionMap,
    ) -> OverlayEffect {
        let mut mapped = Vec::with_capacity(entries.len());
        for mut entry in entries {
            let Some(range) = positions.map_range(entry.range, computed_at) else {
                tracing::debug!(range = %entry.range, "edited range, dropping batch");
                let generation = self.reset(layer);
                return OverlayEffect::Dropped {
                    layer,
                    generation,
                    edited: entry.range,
                };
            };
            entry.range = range;
            mapped.push(entry);
        }

        let slot = &mut self.layers[layer.slot()];
        slot.generation += 1;
        slot.decorations.clone_from(&mapped);
        OverlayEffect::Replaced {
            layer,
            generation: slot.generation,
            decorations: mapped,
        }
    }

    /// Empty `layer`.
    pub fn clear(&mut self, layer: LayerId) -> OverlayEffect {
        let generation = self.reset(layer);
        OverlayEffect::Cleared { layer, generation }
    }

    /// Empty every layer.
    pub fn clear_all(&mut self) -> Vec<OverlayEffect> {
        LayerId::ALL.into_iter().map(|layer| self.clear(layer)).collect()
    }

    fn reset(&mut self, layer: LayerId) -> u64 {
        let slot = &mut self.layers[layer.slot()];
        slot.decorations.clear();
        slot.generation += 1;
        slot.generation
    }
}
