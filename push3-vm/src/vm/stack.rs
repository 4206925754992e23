use strum::Display;

use crate::error::{VmError, VmResult};

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum StackKind {
    Code,
    Exec,
    Integer,
    Boolean,
}

/// LIFO stack with a fixed capacity. Index 0 is the bottom.
///
/// Storage grows on demand, but a push past `capacity` is a fault rather than a
/// reallocation.
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    kind: StackKind,
    items: Vec<T>,
    capacity: usize,
}

impl<T: Copy> BoundedStack<T> {
    /// A stack preloaded with `initial` (bottom first) and room for `headroom`
    /// further items.
    pub fn with_initial(kind: StackKind, initial: Vec<T>, headroom: usize) -> Self {
        let capacity = initial.len().saturating_add(headroom);
        Self {
            kind,
            items: initial,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, v: T) -> VmResult<()> {
        if self.items.len() >= self.capacity {
            return Err(VmError::StackOverflow {
                stack: self.kind,
                capacity: self.capacity,
            });
        }
        self.items.push(v);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn top(&self) -> Option<T> {
        self.items.last().copied()
    }

    /// Bottom-indexed read.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.get(index).copied()
    }

    /// Pop two items, returning `(top, second)`. Leaves the stack untouched when
    /// fewer than two items are present.
    pub fn pop2(&mut self) -> Option<(T, T)> {
        if self.items.len() < 2 {
            return None;
        }
        let top = self.items.pop()?;
        let second = self.items.pop()?;
        Some((top, second))
    }

    /// Swap the two topmost items.
    pub fn swap_top(&mut self) -> bool {
        let len = self.items.len();
        if len < 2 {
            return false;
        }
        self.items.swap(len - 1, len - 2);
        true
    }

    /// `[.., a, b, c]` becomes `[.., b, c, a]`.
    pub fn rotate3(&mut self) -> bool {
        let len = self.items.len();
        if len < 3 {
            return false;
        }
        self.items[len - 3..].rotate_left(1);
        true
    }

    /// Insert at a bottom-indexed position, shifting the items above it up.
    pub fn insert(&mut self, index: usize, v: T) -> VmResult<()> {
        if self.items.len() >= self.capacity {
            return Err(VmError::StackOverflow {
                stack: self.kind,
                capacity: self.capacity,
            });
        }
        let index = index.min(self.items.len());
        self.items.insert(index, v);
        Ok(())
    }

    /// Remove at a bottom-indexed position.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_initial_plus_headroom() {
        let mut s = BoundedStack::with_initial(StackKind::Integer, vec![1i128, 2], 1);
        assert_eq!(s.capacity(), 3);
        s.push(3).unwrap();
        assert_eq!(
            s.push(4),
            Err(VmError::StackOverflow {
                stack: StackKind::Integer,
                capacity: 3
            })
        );
        assert_eq!(s.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn pop2_needs_two() {
        let mut s = BoundedStack::with_initial(StackKind::Boolean, vec![true], 4);
        assert_eq!(s.pop2(), None);
        assert_eq!(s.as_slice(), &[true]);
        s.push(false).unwrap();
        assert_eq!(s.pop2(), Some((false, true)));
        assert!(s.is_empty());
    }

    #[test]
    fn rotate_pulls_third_to_top() {
        let mut s = BoundedStack::with_initial(StackKind::Integer, vec![0i128, 1, 2, 3], 0);
        assert!(s.rotate3());
        assert_eq!(s.as_slice(), &[0, 2, 3, 1]);
    }

    #[test]
    fn get_and_remove_are_bottom_indexed() {
        let mut s = BoundedStack::with_initial(StackKind::Integer, vec![10i128, 20, 30], 0);
        assert_eq!(s.get(0), Some(10));
        assert_eq!(s.get(3), None);
        assert_eq!(s.remove(1), Some(20));
        assert_eq!(s.remove(5), None);
        assert_eq!(s.as_slice(), &[10, 30]);
    }
}
