//! Debounce for raw gesture labels.

use std::collections::VecDeque;

use crate::gesture::ShapeKind;

/// Bounded history of raw labels plus the currently committed shape.
#[derive(Clone, Debug)]
pub struct GestureStabilizer {
    history: VecDeque<Option<ShapeKind>>,
    capacity: usize,
    window: usize,
    committed: Option<ShapeKind>,
}

impl GestureStabilizer {
    pub fn new(window: usize, capacity: usize) -> Self {
        let capacity = capacity.max(window).max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            window: window.max(1),
            committed: None,
        }
    }

    /// Record a raw label. Returns the new shape when this push commits a change.
    ///
    /// A commit needs the last `window` labels to be the same non-null label,
    /// different from the committed one.
    pub fn push(&mut self, label: Option<ShapeKind>) -> Option<ShapeKind> {
        self.history.push_back(label);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let candidate = self.stable_label()?;
        if self.committed == Some(candidate) {
            return None;
        }
        self.committed = Some(candidate);
        Some(candidate)
    }

    fn stable_label(&self) -> Option<ShapeKind> {
        if self.history.len() < self.window {
            return None;
        }
        let mut recent = self.history.iter().rev().take(self.window);
        let first = (*recent.next()?)?;
        recent.all(|l| *l == Some(first)).then_some(first)
    }

    /// Length of the trailing run of identical labels (null runs count as 0).
    pub fn stability_count(&self) -> usize {
        match self.history.back() {
            Some(Some(last)) => self
                .history
                .iter()
                .rev()
                .take_while(|l| **l == Some(*last))
                .count(),
            _ => 0,
        }
    }

    /// Forget raw history. The committed shape persists.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn committed(&self) -> Option<ShapeKind> {
        self.committed
    }

    /// Set the committed shape without going through the debounce (startup shape).
    pub fn force(&mut self, shape: ShapeKind) {
        self.committed = Some(shape);
    }

    pub fn history(&self) -> impl Iterator<Item = Option<ShapeKind>> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::ShapeKind::*;
    use proptest::prelude::*;

    fn stabilizer() -> GestureStabilizer {
        GestureStabilizer::new(3, 10)
    }

    fn feed(s: &mut GestureStabilizer, labels: &[Option<ShapeKind>]) -> Vec<ShapeKind> {
        labels.iter().filter_map(|&l| s.push(l)).collect()
    }

    #[test]
    fn test_run_of_three_commits() {
        let mut s = stabilizer();
        assert_eq!(feed(&mut s, &[Some(Star), Some(Star), Some(Star)]), vec![Star]);
        assert_eq!(s.committed(), Some(Star));
    }

    #[test]
    fn test_interrupted_run_does_not_commit() {
        let mut s = stabilizer();
        assert!(feed(&mut s, &[Some(Star), Some(Ring), Some(Star)]).is_empty());
        assert_eq!(s.committed(), None);
    }

    #[test]
    fn test_short_run_does_not_commit() {
        let mut s = stabilizer();
        assert!(feed(&mut s, &[Some(Star), Some(Star)]).is_empty());
    }

    #[test]
    fn test_null_run_never_commits() {
        let mut s = stabilizer();
        assert!(feed(&mut s, &[None, None, None, None]).is_empty());
        assert_eq!(s.stability_count(), 0);
    }

    #[test]
    fn test_same_label_commits_once() {
        let mut s = stabilizer();
        let commits = feed(&mut s, &[Some(Sphere); 8]);
        assert_eq!(commits, vec![Sphere]);
        assert_eq!(s.stability_count(), 8);
    }

    #[test]
    fn test_switch_after_commit() {
        let mut s = stabilizer();
        feed(&mut s, &[Some(Sphere); 3]);
        let commits = feed(&mut s, &[Some(Heart), Some(Heart), Some(Heart)]);
        assert_eq!(commits, vec![Heart]);
    }

    #[test]
    fn test_clear_history_keeps_commit() {
        let mut s = stabilizer();
        feed(&mut s, &[Some(Ring); 3]);
        s.clear_history();
        assert!(s.is_empty());
        assert_eq!(s.committed(), Some(Ring));
        // Re-entering the same gesture is not a change
        assert!(feed(&mut s, &[Some(Ring); 3]).is_empty());
    }

    fn label() -> impl Strategy<Value = Option<ShapeKind>> {
        prop_oneof![
            Just(None),
            Just(Some(Sphere)),
            Just(Some(Ring)),
            Just(Some(Star)),
            Just(Some(Heart)),
            Just(Some(Text)),
        ]
    }

    proptest! {
        #[test]
        fn prop_history_bounded_and_commits_need_run(labels in prop::collection::vec(label(), 0..60)) {
            let mut s = stabilizer();
            let mut seen: Vec<Option<ShapeKind>> = Vec::new();
            for l in labels {
                let before = s.committed();
                seen.push(l);
                let commit = s.push(l);
                prop_assert!(s.len() <= 10);
                if let Some(c) = commit {
                    let n = seen.len();
                    prop_assert!(n >= 3);
                    prop_assert!(seen[n - 3..].iter().all(|x| *x == Some(c)));
                    prop_assert_ne!(before, Some(c));
                }
            }
        }
    }
}
