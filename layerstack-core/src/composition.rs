//! The layer stack and its selection.

use crate::event::{LayerSummary, Snapshot};
use crate::geometry::{Bounds, Point};
use crate::hit_test::hit_test;
use crate::selection::Selection;
use crate::transform::LayerState;
use crate::{CompositionError, CompositionResult, Layer, LayerId};

/// An ordered stack of layers plus the current selection.
///
/// Index 0 paints first; later layers paint over earlier ones. Every id in
/// the selection refers to a layer in the stack.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    layers: Vec<Layer>,
    selection: Selection,
}

impl Composition {
    /// Create an empty composition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer on top of the stack, unselected.
    pub fn add_layer(&mut self, mut layer: Layer) -> LayerId {
        layer.set_selected(false);
        let id = layer.id();
        tracing::debug!("Adding layer {} ({id})", layer.name());
        self.layers.push(layer);
        id
    }

    /// Remove a layer, dropping it from the selection as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn remove_layer(&mut self, id: LayerId) -> CompositionResult<Layer> {
        let index = self
            .index_of(id)
            .ok_or(CompositionError::LayerNotFound(id))?;
        self.selection.remove(id);
        Ok(self.layers.remove(index))
    }

    /// Get a layer by ID.
    #[must_use]
    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    /// Get a mutable reference to a layer by ID.
    pub fn get_layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id() == id)
    }

    /// Stack position of a layer.
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }

    /// All layers, bottom first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Visible layers, bottom first.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|layer| layer.is_visible())
    }

    /// Selected layers, bottom first.
    pub fn selected_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers
            .iter()
            .filter(|layer| self.selection.contains(layer.id()))
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Apply a selection click. Returns whether the selection changed.
    pub fn click(&mut self, target: Option<LayerId>, additive: bool) -> bool {
        self.selection.click(&mut self.layers, target, additive)
    }

    /// Flip a layer's visibility, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn toggle_visibility(&mut self, id: LayerId) -> CompositionResult<bool> {
        let layer = self
            .get_layer_mut(id)
            .ok_or(CompositionError::LayerNotFound(id))?;
        Ok(layer.toggle_visibility())
    }

    /// Topmost visible layer with an opaque pixel at `point`.
    #[must_use]
    pub fn layer_at(&self, point: Point) -> Option<LayerId> {
        hit_test(&self.layers, point).map(Layer::id)
    }

    /// Bounding box of the visible layers among `layers`.
    #[must_use]
    pub fn bounding_box_of<'a, I>(layers: I) -> Bounds
    where
        I: IntoIterator<Item = &'a Layer>,
    {
        Bounds::from_rects(
            layers
                .into_iter()
                .filter(|layer| layer.is_visible())
                .map(Layer::rect),
        )
    }

    /// Bounding box of every visible layer.
    #[must_use]
    pub fn visible_bounds(&self) -> Bounds {
        Self::bounding_box_of(&self.layers)
    }

    /// Bounding box of the visible selected layers.
    #[must_use]
    pub fn selection_bounds(&self) -> Bounds {
        Self::bounding_box_of(self.selected_layers())
    }

    /// Layer list and selection, for notifying collaborators.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            layers: self.layers.iter().map(LayerSummary::from).collect(),
            selection: self.selected_layers().map(Layer::id).collect(),
        }
    }

    pub(crate) fn apply_layer_state(&mut self, state: &LayerState) {
        if let Some(layer) = self.get_layer_mut(state.id) {
            layer.set_position(state.position.x, state.position.y);
            layer.set_size(state.width, state.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::PixelBuffer;

    fn opaque(name: &str, size: u32) -> Layer {
        Layer::new(name, PixelBuffer::solid(size, size, [1, 2, 3, 255]).expect("buffer"))
    }

    #[test]
    fn test_composition_add_remove() {
        let mut composition = Composition::new();
        assert!(composition.is_empty());

        let id = composition.add_layer(opaque("a", 10));
        assert_eq!(composition.layer_count(), 1);
        assert!(composition.get_layer(id).is_some());

        composition.remove_layer(id).expect("should remove");
        assert!(composition.is_empty());
        assert_eq!(
            composition.remove_layer(id).unwrap_err(),
            CompositionError::LayerNotFound(id)
        );
    }

    #[test]
    fn test_remove_purges_selection() {
        let mut composition = Composition::new();
        let a = composition.add_layer(opaque("a", 10));
        let b = composition.add_layer(opaque("b", 10));
        composition.click(Some(a), true);
        composition.click(Some(b), true);

        composition.remove_layer(a).expect("should remove");
        assert!(!composition.selection().contains(a));
        assert!(composition.selection().contains(b));
        assert_eq!(composition.snapshot().selection, vec![b]);
    }

    #[test]
    fn test_stacked_imports_occlude() {
        let mut composition = Composition::new();
        let bottom = composition.add_layer(opaque("bottom", 100));
        let top = composition.add_layer(opaque("top", 100));
        let center = Point::new(50.0, 50.0);

        assert_eq!(composition.layer_at(center), Some(top));
        assert_eq!(composition.toggle_visibility(top), Ok(false));
        assert_eq!(composition.layer_at(center), Some(bottom));
    }

    #[test]
    fn test_bounds_skip_hidden_layers() {
        let mut composition = Composition::new();
        assert!(composition.visible_bounds().is_empty());

        composition.add_layer(opaque("a", 10).with_position(5.0, 5.0));
        let hidden = composition.add_layer(opaque("b", 10).with_position(100.0, 100.0));
        composition.toggle_visibility(hidden).expect("toggle");

        assert_eq!(
            composition.visible_bounds().rect(),
            Some(Rect::new(5.0, 5.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_selection_bounds() {
        let mut composition = Composition::new();
        let a = composition.add_layer(opaque("a", 10));
        composition.add_layer(opaque("b", 10).with_position(50.0, 0.0));
        assert!(composition.selection_bounds().is_empty());

        composition.click(Some(a), false);
        assert_eq!(
            composition.selection_bounds().rect(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }
}
