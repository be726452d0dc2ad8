/// Resumable cursor over a weighted list: each item is drawn `weight(item)`
/// times, in order, before the cursor moves on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceStream {
    position: usize,
    consumed: u32,
}

impl PlaceStream {
    pub fn new() -> Self { Self::default() }

    /// Index of the item currently being drawn.
    #[inline] pub fn position(&self) -> usize { self.position }

    /// Units already drawn from the current item.
    #[inline] pub fn consumed(&self) -> u32 { self.consumed }

    /// Draw one unit. Items weighing 0 are skipped; `None` once `items` is
    /// exhausted. `items` and `weight` must be the same on every call.
    pub fn next<'a, T>(&mut self, items: &'a [T], weight: impl Fn(&T) -> u32) -> Option<&'a T> {
        loop {
            let item = items.get(self.position)?;
            if self.consumed < weight(item) {
                self.consumed += 1;
                return Some(item);
            }
            self.position += 1;
            self.consumed = 0;
        }
    }
}

/// Iterator over every unit of `items`.
pub struct Draws<'a, T, F> {
    items: &'a [T],
    weight: F,
    cursor: PlaceStream,
}

impl<'a, T, F: Fn(&T) -> u32> Iterator for Draws<'a, T, F> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next(self.items, &self.weight)
    }
}

/// Draw units one at a time from `items`, `weight(item)` per item.
pub fn draws<T, F: Fn(&T) -> u32>(items: &[T], weight: F) -> Draws<'_, T, F> {
    Draws { items, weight, cursor: PlaceStream::new() }
}
