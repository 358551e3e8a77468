use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Handle to a BDD node.
///
/// The sign encodes a complement edge: `-r` denotes the negation of the
/// function referenced by `r`. The absolute value is the index in the node table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(i32);

impl Ref {
    pub const fn positive(index: u32) -> Self {
        Self(index as i32)
    }

    pub const fn is_negated(&self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Return the regular (non-complemented) version of this reference.
    pub const fn regular(self) -> Self {
        Self(self.0.abs())
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Return the internal signed representation.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Unsigned encoding `2 * index + negated`, suitable for hashing.
    pub(crate) fn as_lit(self) -> u64 {
        ((self.index() as u64) << 1) + self.is_negated() as u64
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}",
            if self.is_negated() { "~" } else { "" },
            self.index()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation() {
        let r = Ref::positive(7);
        assert!(!r.is_negated());
        assert!((-r).is_negated());
        assert_eq!(-(-r), r);
        assert_eq!((-r).regular(), r);
        assert_eq!((-r).index(), 7);
        assert_eq!(r.to_string(), "@7");
        assert_eq!((-r).to_string(), "~@7");
    }

    #[test]
    fn test_as_lit() {
        assert_eq!(Ref::positive(3).as_lit(), 6);
        assert_eq!((-Ref::positive(3)).as_lit(), 7);
    }
}
