//! Non-empty vector used for tool-call batches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector that is guaranteed to contain at least one element.
///
/// # Example
///
/// ```rust
/// use strand_core::NonEmptyVec;
///
/// let calls = NonEmptyVec::new("search", vec!["summarize"]);
/// assert_eq!(calls.head(), &"search");
/// assert_eq!(calls.len(), 2);
///
/// let empty: Vec<&str> = Vec::new();
/// assert!(NonEmptyVec::try_from(empty).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
#[serde(bound(
    serialize = "T: Clone + Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct NonEmptyVec<T> {
    head: T,
    tail: Vec<T>,
}

impl<T> NonEmptyVec<T> {
    /// Create a vector from a head element and any number of tail elements.
    pub fn new(head: T, tail: Vec<T>) -> Self {
        Self { head, tail }
    }

    /// Create a vector holding exactly one element.
    pub fn singleton(value: T) -> Self {
        Self {
            head: value,
            tail: Vec::new(),
        }
    }

    /// The first element. Always present.
    pub fn head(&self) -> &T {
        &self.head
    }

    /// Elements after the head (may be empty).
    pub fn tail(&self) -> &[T] {
        &self.tail
    }

    /// Number of elements; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// `true` when only the head is present.
    pub fn is_singleton(&self) -> bool {
        self.tail.is_empty()
    }

    /// Append an element at the end.
    pub fn push(&mut self, value: T) {
        self.tail.push(value);
    }

    /// Element at `index`, in insertion order.
    pub fn get(&self, index: usize) -> Option<&T> {
        match index {
            0 => Some(&self.head),
            n => self.tail.get(n - 1),
        }
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Index of the first element matching `predicate`.
    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(predicate)
    }

    /// Convert into a plain `Vec`, preserving order.
    pub fn into_vec(self) -> Vec<T> {
        let mut vec = Vec::with_capacity(1 + self.tail.len());
        vec.push(self.head);
        vec.extend(self.tail);
        vec
    }
}

/// Returned when converting an empty `Vec` into a [`NonEmptyVec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot build a NonEmptyVec from an empty vector")]
pub struct EmptyVecError;

impl<T> TryFrom<Vec<T>> for NonEmptyVec<T> {
    type Error = EmptyVecError;

    fn try_from(vec: Vec<T>) -> Result<Self, Self::Error> {
        let mut items = vec.into_iter();
        let head = items.next().ok_or(EmptyVecError)?;
        Ok(Self {
            head,
            tail: items.collect(),
        })
    }
}

impl<T> From<NonEmptyVec<T>> for Vec<T> {
    fn from(value: NonEmptyVec<T>) -> Self {
        value.into_vec()
    }
}

impl<T> IntoIterator for NonEmptyVec<T> {
    type Item = T;
    type IntoIter = std::iter::Chain<std::iter::Once<T>, std::vec::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.head).chain(self.tail)
    }
}

impl<'a, T> IntoIterator for &'a NonEmptyVec<T> {
    type Item = &'a T;
    type IntoIter = std::iter::Chain<std::iter::Once<&'a T>, std::slice::Iter<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(&self.head).chain(self.tail.iter())
    }
}

impl<T: fmt::Display> fmt::Display for NonEmptyVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}
