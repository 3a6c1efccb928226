use std::fmt;

/// Failure modes of parameter validation and hashing.
///
/// Variants mirror the C reference's `mtp_argon2_error_codes` table
/// one-for-one, minus the pointer/length-mismatch checks that Rust's slice
/// types make unrepresentable, and minus anything belonging to the
/// encode/decode/verify layer built on top of this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Requested output length is below the 4-byte minimum.
    OutputTooShort,
    /// Requested output length exceeds `2^32 - 1` bytes.
    OutputTooLong,
    /// Password is longer than `2^32 - 1` bytes.
    PwdTooLong,
    /// Salt is shorter than 8 bytes.
    SaltTooShort,
    /// Salt is longer than `2^32 - 1` bytes.
    SaltTooLong,
    /// Secret key is longer than `2^32 - 1` bytes.
    SecretTooLong,
    /// Associated data is longer than `2^32 - 1` bytes.
    AdTooLong,
    /// `t_cost` is below 1.
    TimeTooSmall,
    /// `t_cost` exceeds `2^32 - 1`.
    TimeTooLarge,
    /// `m_cost` is below `8 * lanes`.
    MemoryTooLittle,
    /// `m_cost` exceeds the address-space-derived ceiling.
    MemoryTooMuch,
    /// `p_cost` (lanes) is below 1.
    LanesTooFew,
    /// `p_cost` (lanes) exceeds `2^24 - 1`.
    LanesTooMany,
    /// `threads` is below 1.
    ThreadsTooFew,
    /// `threads` exceeds `2^24 - 1`.
    ThreadsTooMany,
    /// Caller-supplied memory (via `hash_password_into_with_memory`) is
    /// smaller than the instance requires.
    MemoryAllocationError,
    /// A parameter combination failed validation for a reason not covered
    /// by a more specific variant above.
    IncorrectParameter,
    /// `variant` byte did not decode to `d`/`i`/`id`.
    IncorrectType,
    /// `version` did not decode to `0x10` or `0x13`.
    IncorrectVersion,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::OutputTooShort => "output too short",
            Error::OutputTooLong => "output too long",
            Error::PwdTooLong => "password too long",
            Error::SaltTooShort => "salt too short",
            Error::SaltTooLong => "salt too long",
            Error::SecretTooLong => "secret too long",
            Error::AdTooLong => "associated data too long",
            Error::TimeTooSmall => "time cost too small",
            Error::TimeTooLarge => "time cost too large",
            Error::MemoryTooLittle => "memory cost too little",
            Error::MemoryTooMuch => "memory cost too much",
            Error::LanesTooFew => "too few lanes",
            Error::LanesTooMany => "too many lanes",
            Error::ThreadsTooFew => "too few threads",
            Error::ThreadsTooMany => "too many threads",
            Error::MemoryAllocationError => "supplied memory buffer too small",
            Error::IncorrectParameter => "incorrect parameter",
            Error::IncorrectType => "incorrect argon2 type",
            Error::IncorrectVersion => "incorrect argon2 version",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
