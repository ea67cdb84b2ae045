/// One known identity: the display name and its reference embedding.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryEntry {
    pub name: String,
    pub embedding: Vec<f32>,
}

/// Known identities in scan order. Built once before streaming and never
/// mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn new(entries: Vec<GalleryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry, in scan order, whose distance to `query` is below
    /// `tolerance`.
    ///
    /// This is deliberately not a nearest-neighbour search: a later entry
    /// that is closer never overrides an earlier one that already matched.
    pub fn first_match(&self, query: &[f32], tolerance: f64) -> Option<&GalleryEntry> {
        self.entries
            .iter()
            .find(|entry| cosine_distance(&entry.embedding, query) < tolerance)
    }
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// `1 - a·b` for L2-normalized vectors; 0 for identical directions, 2 for
/// opposite ones.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    1.0 - dot
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn entry(name: &str, embedding: &[f32]) -> GalleryEntry {
        let mut embedding = embedding.to_vec();
        l2_normalize(&mut embedding);
        GalleryEntry {
            name: name.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_l2_normalize_unit_vector() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_cosine_distance_identical_and_orthogonal() {
        assert_relative_eq!(cosine_distance(&[0.6, 0.8], &[0.6, 0.8]), 0.0, epsilon = 1e-6);
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0);
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]), 2.0);
    }

    #[test]
    fn test_first_match_returns_none_when_nothing_is_close() {
        let gallery = Gallery::new(vec![entry("alice", &[1.0, 0.0])]);
        assert!(gallery.first_match(&[0.0, 1.0], 0.5).is_none());
    }

    #[test]
    fn test_first_match_prefers_scan_order_over_closeness() {
        // Probe is closer to "bob" but "alice" comes first and is within tolerance
        let gallery = Gallery::new(vec![
            entry("alice", &[1.0, 0.6]),
            entry("bob", &[1.0, 0.05]),
        ]);
        let mut query = vec![1.0, 0.0];
        l2_normalize(&mut query);

        let alice = cosine_distance(&gallery.entries()[0].embedding, &query);
        let bob = cosine_distance(&gallery.entries()[1].embedding, &query);
        assert!(bob < alice && alice < 0.5);

        assert_eq!(gallery.first_match(&query, 0.5).unwrap().name, "alice");
    }

    #[test]
    fn test_first_match_skips_entries_outside_tolerance() {
        let gallery = Gallery::new(vec![
            entry("alice", &[0.0, 1.0]),
            entry("bob", &[1.0, 0.0]),
        ]);
        assert_eq!(gallery.first_match(&[1.0, 0.0], 0.5).unwrap().name, "bob");
    }

    #[test]
    fn test_tolerance_is_strict() {
        let gallery = Gallery::new(vec![entry("alice", &[1.0, 0.0])]);
        // distance to an orthogonal query is exactly 1.0
        assert!(gallery.first_match(&[0.0, 1.0], 1.0).is_none());
        assert!(gallery.first_match(&[0.0, 1.0], 1.0001).is_some());
    }

    #[test]
    fn test_empty_gallery() {
        let gallery = Gallery::default();
        assert!(gallery.is_empty());
        assert_eq!(gallery.len(), 0);
        assert!(gallery.first_match(&[1.0], 2.0).is_none());
    }
}
