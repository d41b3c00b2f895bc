//! The set of selected layers.

use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId};

/// Selected layer identities.
///
/// Only [`Selection`] flips the `selected` flag on a [`Layer`]; the two are
/// kept in step by every operation here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<LayerId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click on `target`.
    ///
    /// A plain click replaces the selection with `{target}`, or clears it when
    /// nothing was struck. An additive click toggles `target` alone and is a
    /// no-op when nothing was struck. Returns whether the selection changed.
    pub fn click(&mut self, layers: &mut [Layer], target: Option<LayerId>, additive: bool) -> bool {
        let before = self.ids.clone();

        if additive {
            if let Some(id) = target {
                if self.contains(id) {
                    self.ids.retain(|&sid| sid != id);
                    set_flag(layers, id, false);
                } else if set_flag(layers, id, true) {
                    self.ids.push(id);
                }
            }
        } else {
            self.clear(layers);
            if let Some(id) = target {
                if set_flag(layers, id, true) {
                    self.ids.push(id);
                }
            }
        }

        let changed = !same_members(&before, &self.ids);
        if changed {
            tracing::debug!("Selection changed: {} layer(s) selected", self.ids.len());
        }
        changed
    }

    /// Deselect everything.
    pub fn clear(&mut self, layers: &mut [Layer]) {
        for id in self.ids.drain(..) {
            set_flag(layers, id, false);
        }
    }

    /// Forget `id` after its layer left the stack.
    pub fn remove(&mut self, id: LayerId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&sid| sid != id);
        self.ids.len() != before
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected identities, in no particular order.
    #[must_use]
    pub fn ids(&self) -> &[LayerId] {
        &self.ids
    }

    /// Number of selected layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn set_flag(layers: &mut [Layer], id: LayerId, selected: bool) -> bool {
    match layers.iter_mut().find(|layer| layer.id() == id) {
        Some(layer) => {
            layer.set_selected(selected);
            true
        }
        None => false,
    }
}

fn same_members(a: &[LayerId], b: &[LayerId]) -> bool {
    a.len() == b.len() && a.iter().all(|id| b.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::PixelBuffer;

    fn layers(count: usize) -> Vec<Layer> {
        (0..count)
            .map(|i| {
                Layer::new(
                    format!("layer-{i}"),
                    PixelBuffer::solid(4, 4, [255, 255, 255, 255]).expect("buffer"),
                )
            })
            .collect()
    }

    #[test]
    fn test_plain_click_replaces_selection() {
        let mut layers = layers(3);
        let mut selection = Selection::new();
        let (a, b) = (layers[0].id(), layers[1].id());
        selection.click(&mut layers, Some(a), false);
        selection.click(&mut layers, Some(b), true);
        assert_eq!(selection.len(), 2);

        let target = layers[2].id();
        assert!(selection.click(&mut layers, Some(target), false));
        assert_eq!(selection.ids(), &[target]);
        assert!(!layers[0].is_selected());
        assert!(!layers[1].is_selected());
        assert!(layers[2].is_selected());
    }

    #[test]
    fn test_plain_click_on_nothing_clears() {
        let mut layers = layers(2);
        let mut selection = Selection::new();
        let id = layers[0].id();
        selection.click(&mut layers, Some(id), false);
        assert!(selection.click(&mut layers, None, false));
        assert!(selection.is_empty());
        assert!(layers.iter().all(|layer| !layer.is_selected()));
    }

    #[test]
    fn test_additive_click_toggles_only_target() {
        let mut layers = layers(3);
        let mut selection = Selection::new();
        let (a, b, c) = (layers[0].id(), layers[1].id(), layers[2].id());
        selection.click(&mut layers, Some(a), true);
        selection.click(&mut layers, Some(b), true);
        selection.click(&mut layers, Some(c), true);
        assert_eq!(selection.len(), 3);

        assert!(selection.click(&mut layers, Some(b), true));
        assert!(selection.contains(a));
        assert!(!selection.contains(b));
        assert!(selection.contains(c));
        assert!(!layers[1].is_selected());
        assert!(layers[0].is_selected() && layers[2].is_selected());
    }

    #[test]
    fn test_additive_click_on_nothing_is_noop() {
        let mut layers = layers(1);
        let mut selection = Selection::new();
        let id = layers[0].id();
        selection.click(&mut layers, Some(id), false);
        assert!(!selection.click(&mut layers, None, true));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_reselecting_same_layer_reports_no_change() {
        let mut layers = layers(1);
        let mut selection = Selection::new();
        let id = layers[0].id();
        assert!(selection.click(&mut layers, Some(id), false));
        assert!(!selection.click(&mut layers, Some(id), false));
        assert!(layers[0].is_selected());
    }

    #[test]
    fn test_unknown_target_is_ignored() {
        let mut layers = layers(1);
        let mut selection = Selection::new();
        assert!(!selection.click(&mut layers, Some(LayerId::new()), true));
        assert!(selection.is_empty());
    }
}
