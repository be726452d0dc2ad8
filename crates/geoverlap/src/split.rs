/// Candidates split by overlap with a reference feature. Every candidate lands
/// in exactly one of the two lists, in its original relative order.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub overlapping: Vec<T>,
    pub not_overlapping: Vec<T>,
}

impl<T> Default for Split<T> {
    fn default() -> Self {
        Self { overlapping: Vec::new(), not_overlapping: Vec::new() }
    }
}

impl<T> Split<T> {
    /// Total number of candidates across both sides.
    #[inline] pub fn len(&self) -> usize { self.overlapping.len() + self.not_overlapping.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.overlapping.is_empty() && self.not_overlapping.is_empty() }
}

/// Split `features` into those whose index is in `indices` and the rest.
/// Out-of-range and repeated indices are ignored.
pub fn split_by_indices<T>(features: Vec<T>, indices: &[usize]) -> Split<T> {
    let len = features.len();
    let mut selected = vec![false; len];
    indices.iter()
        .filter(|&&index| index < len)
        .for_each(|&index| selected[index] = true);

    let mut split = Split {
        overlapping: Vec::with_capacity(indices.len().min(features.len())),
        not_overlapping: Vec::with_capacity(features.len().saturating_sub(indices.len())),
    };
    for (feature, selected) in features.into_iter().zip(selected) {
        if selected { split.overlapping.push(feature) } else { split.not_overlapping.push(feature) }
    }
    split
}
