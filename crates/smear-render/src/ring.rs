/// Fixed-length ring of layers with an active cursor. The length never
/// changes after construction; the whole set can only be swapped out.
#[derive(Debug)]
pub struct LayerRing<S> {
    layers: Vec<S>,
    active: usize,
}

impl<S> LayerRing<S> {
    /// Wrap `layers` with the cursor at slot 0. `layers` must not be empty.
    pub fn new(layers: Vec<S>) -> Self {
        debug_assert!(!layers.is_empty(), "layer ring needs at least one slot");
        Self { layers, active: 0 }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &S {
        &self.layers[self.active]
    }

    pub fn active_mut(&mut self) -> &mut S {
        &mut self.layers[self.active]
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.layers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.layers.iter()
    }

    /// Move the cursor to the next slot, wrapping to 0 after the last.
    pub fn advance(&mut self) {
        self.active += 1;
        if self.active >= self.layers.len() {
            self.active = 0;
        }
    }

    /// Physical slot of the layer `steps` frames behind the active one.
    /// `steps` must be less than `len()`.
    pub fn index_behind(&self, steps: usize) -> usize {
        debug_assert!(steps < self.layers.len());
        if steps > self.active {
            self.layers.len() - (steps - self.active)
        } else {
            self.active - steps
        }
    }

    /// Swap in a new set of layers of the same length and rewind the cursor.
    /// The previous set is dropped.
    pub fn replace(&mut self, layers: Vec<S>) {
        debug_assert_eq!(layers.len(), self.layers.len());
        self.active = 0;
        self.layers = layers;
    }
}

impl<S> std::ops::Index<usize> for LayerRing<S> {
    type Output = S;

    fn index(&self, index: usize) -> &S {
        &self.layers[index]
    }
}
