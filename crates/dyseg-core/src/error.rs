use core::fmt;

/// Errors returned by [Tree::try_insert](crate::Tree::try_insert) and
/// [Tree::try_query](crate::Tree::try_query)
///
/// The regular entry points never fail: absent indices and empty ranges simply
/// aggregate to the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The start bound of a query range lies above its end bound
    InvalidRange,
    /// `combine(IDENTITY, v) == v == combine(v, IDENTITY)` does not hold for the inserted value
    IdentityViolation,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRange => write!(f, "range start lies above range end"),
            Error::IdentityViolation => write!(
                f,
                "aggregator identity does not act as a neutral element for the value"
            ),
        }
    }
}

impl core::error::Error for Error {}
