use std::fmt;

use smallvec::SmallVec;

/// Child-index path from a root to one of its nodes. The empty path addresses the
/// root itself.
///
/// ```
/// use hytree::path::Path;
///
/// let path = Path::of([0, 2]).child(1);
/// assert_eq!(path.as_slice(), &[0, 2, 1]);
/// assert_eq!(path.to_string(), "[0, 2, 1]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path(SmallVec<[usize; 8]>);

impl Path {
    /// The path of the root.
    pub fn root() -> Self {
        Path(SmallVec::new())
    }

    pub fn of(indices: impl IntoIterator<Item = usize>) -> Self {
        Path(indices.into_iter().collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Child index taken at step `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.0.get(index).copied()
    }

    /// Last child index of the path, `None` for the root path.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent node, `None` for the root path.
    pub fn parent(&self) -> Option<Path> {
        let (_, init) = self.0.split_last()?;
        Some(Path(init.iter().copied().collect()))
    }

    /// Path of the `index`-th child of the addressed node.
    pub fn child(&self, index: usize) -> Path {
        let mut out = self.clone();
        out.0.push(index);
        out
    }

    /// Concatenation of `self` followed by `other`.
    pub fn append(&self, other: &Path) -> Path {
        let mut out = self.clone();
        out.0.extend_from_slice(&other.0);
        out
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for Path {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl From<&[usize]> for Path {
    fn from(value: &[usize]) -> Self {
        Path(value.iter().copied().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}
