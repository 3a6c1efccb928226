use crate::error::Error;

/// Wire version of the algorithm. `V0x13` is the RFC 9106 default; `V0x10`
/// is kept for compatibility with the original Argon2 specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Version {
    V0x10 = 0x10,
    V0x13 = 0x13,
}

impl Default for Version {
    fn default() -> Self {
        Version::V0x13
    }
}

impl Version {
    pub(crate) fn as_u32(self) -> u32 {
        self as u32
    }

    /// Whether pass `pass` should XOR into the existing block contents
    /// rather than overwrite them. Only `V0x13` does this, and only from
    /// the second pass onward.
    pub(crate) fn xor_existing(self, pass: u32) -> bool {
        matches!(self, Version::V0x13) && pass > 0
    }
}

impl TryFrom<u32> for Version {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Error> {
        match value {
            0x10 => Ok(Version::V0x10),
            0x13 => Ok(Version::V0x13),
            _ => Err(Error::IncorrectVersion),
        }
    }
}
