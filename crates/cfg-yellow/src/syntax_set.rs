use crate::SyntaxKind;

/// A set of [`SyntaxKind`]s packed into one word, buildable in `const` items.
///
/// Every kind of the Cfg grammar has a discriminant below 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet(u64);

impl SyntaxSet {
    pub const EMPTY: Self = Self(0);

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < N {
            bits |= mask(kinds[i]);
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

const fn mask(kind: SyntaxKind) -> u64 {
    let index = kind as u16 as u32;
    assert!(index < u64::BITS, "SyntaxKind out of SyntaxSet range");
    1 << index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn union_and_contains() {
        const BRACES: SyntaxSet = SyntaxSet::new([LEFT_BRACE, RIGHT_BRACE]);
        let set = BRACES.union(SyntaxSet::new([ERROR]));

        assert!(set.contains(LEFT_BRACE));
        assert!(set.contains(ERROR));
        assert!(!set.contains(NAME));
        assert!(SyntaxSet::EMPTY.is_empty());
        assert!(!SyntaxSet::EMPTY.contains(LEFT_BRACE));
    }
}
