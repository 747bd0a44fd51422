const INVALID: u16 = 0xffff;

/// Precomputed position of a non-shared uniform inside a program state.
///
/// Obtained once through `ProgramState::uniform_state_index` and reused every
/// draw. Only meaningful for the program it was resolved against; it goes stale
/// when the state's program changes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformStateIndex {
    index: u16,
    offset: u16,
}

impl UniformStateIndex {
    /// Marks "no such uniform".
    pub const INVALID: Self = Self {
        index: INVALID,
        offset: INVALID,
    };

    /// Builds an index, or `INVALID` if either part does not fit.
    pub(crate) fn new(index: usize, offset: usize) -> Self {
        match (u16::try_from(index), u16::try_from(offset)) {
            (Ok(index), Ok(offset)) if index != INVALID && offset != INVALID => {
                Self { index, offset }
            }
            _ => Self::INVALID,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Ordinal of the uniform in the program's uniform list.
    #[inline]
    pub fn index(self) -> Option<usize> {
        self.is_valid().then_some(self.index as usize)
    }

    /// Offset, in floats, into the state's value buffer.
    #[inline]
    pub fn offset(self) -> Option<usize> {
        self.is_valid().then_some(self.offset as usize)
    }
}

impl Default for UniformStateIndex {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Precomputed position of a non-shared sampler inside a program state.
///
/// Same staleness rules as [`UniformStateIndex`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SamplerStateIndex {
    index: u16,
    slot: u16,
}

impl SamplerStateIndex {
    pub const INVALID: Self = Self {
        index: INVALID,
        slot: INVALID,
    };

    pub(crate) fn new(index: usize, slot: usize) -> Self {
        match (u16::try_from(index), u16::try_from(slot)) {
            (Ok(index), Ok(slot)) if index != INVALID && slot != INVALID => Self { index, slot },
            _ => Self::INVALID,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Ordinal of the sampler in the program's sampler list.
    #[inline]
    pub fn index(self) -> Option<usize> {
        self.is_valid().then_some(self.index as usize)
    }

    /// Position in the state's texture list.
    #[inline]
    pub fn slot(self) -> Option<usize> {
        self.is_valid().then_some(self.slot as usize)
    }
}

impl Default for SamplerStateIndex {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_sentinel() {
        assert!(!UniformStateIndex::default().is_valid());
        assert!(!SamplerStateIndex::default().is_valid());
        assert_eq!(UniformStateIndex::default().offset(), None);
    }

    #[test]
    fn valid_index_exposes_parts() {
        let idx = UniformStateIndex::new(2, 4);
        assert_eq!(idx.index(), Some(2));
        assert_eq!(idx.offset(), Some(4));
    }

    #[test]
    fn oversized_parts_collapse_to_sentinel() {
        assert_eq!(UniformStateIndex::new(1, 70_000), UniformStateIndex::INVALID);
        assert_eq!(SamplerStateIndex::new(0xffff, 0), SamplerStateIndex::INVALID);
    }
}
