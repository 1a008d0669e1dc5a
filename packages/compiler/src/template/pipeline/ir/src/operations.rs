//! IR Operations
//!
//! The ordered list type holding the create, update and handler ops of a unit.

/// An ordered list of ops of one kind.
///
/// Backed by a `Vec`; positions are used where other IR forms would keep
/// pointers to neighbouring ops.
#[derive(Debug, Clone, PartialEq)]
pub struct OpList<T> {
    ops: Vec<T>,
}

impl<T> OpList<T> {
    pub fn new() -> Self {
        OpList { ops: Vec::new() }
    }

    pub fn push(&mut self, op: T) {
        self.ops.push(op);
    }

    /// Inserts `ops` at the start of the list, keeping their order.
    pub fn prepend(&mut self, ops: impl IntoIterator<Item = T>) {
        let tail = std::mem::take(&mut self.ops);
        self.ops.extend(ops);
        self.ops.extend(tail);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.ops.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.ops.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.ops.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.ops.get_mut(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index < self.ops.len() {
            Some(self.ops.remove(index))
        } else {
            None
        }
    }

    pub fn replace_at(&mut self, index: usize, new_op: T) -> Option<T> {
        self.ops.get_mut(index).map(|slot| std::mem::replace(slot, new_op))
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.ops.retain(keep);
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.ops
    }

    pub fn as_slice(&self) -> &[T] {
        &self.ops
    }
}

impl<T> Default for OpList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for OpList<T> {
    fn from(ops: Vec<T>) -> Self {
        OpList { ops }
    }
}

impl<T> IntoIterator for OpList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OpList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut OpList<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_keeps_order() {
        let mut list = OpList::from(vec![3, 4]);
        list.prepend(vec![1, 2]);
        assert_eq!(list.as_slice(), &[1, 2, 3, 4]);
        list.prepend(Vec::new());
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn replace_and_remove() {
        let mut list = OpList::from(vec!['a', 'b', 'c']);
        assert_eq!(list.replace_at(1, 'x'), Some('b'));
        assert_eq!(list.remove_at(0), Some('a'));
        assert_eq!(list.remove_at(5), None);
        assert_eq!(list.as_slice(), &['x', 'c']);
    }
}
