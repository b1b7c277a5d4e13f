use std::collections::VecDeque;

use super::Filter;

/// Majority vote over a fixed history of values.
///
/// Each [`Filter::push`] returns the most frequent value among the last `history_size` values
/// (including the one just pushed). Ties are broken in favor of the value that entered the
/// history first.
#[derive(Debug, Clone)]
pub struct Majority<T> {
    history: VecDeque<T>,
    /// Max. number of values to keep in the history.
    history_size: usize,
}

impl<T: Clone + PartialEq> Majority<T> {
    /// Creates a new majority filter that votes over the last `history_size` values.
    pub fn new(history_size: usize) -> Self {
        assert!(history_size > 0, "history size must be non-zero");
        Self {
            history: VecDeque::with_capacity(history_size),
            history_size,
        }
    }

    /// Returns the current majority value, or `None` if the history is empty.
    pub fn winner(&self) -> Option<T> {
        // The history is tiny, so a quadratic count beats hashing.
        let mut best: Option<(&T, usize)> = None;
        for (i, candidate) in self.history.iter().enumerate() {
            if self.history.iter().take(i).any(|prev| prev == candidate) {
                continue;
            }
            let count = self.history.iter().filter(|v| *v == candidate).count();
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((candidate, count)),
            }
        }
        best.map(|(value, _)| value.clone())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl<T: Clone + PartialEq> Filter<T> for Majority<T> {
    fn push(&mut self, value: T) -> T {
        self.history.push_back(value);
        if self.history.len() > self.history_size {
            self.history.pop_front();
        }

        match self.winner() {
            Some(winner) => winner,
            None => unreachable!("history cannot be empty after a push"),
        }
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}
