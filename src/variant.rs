use crate::error::Error;

/// Which of the three Argon2 indexing disciplines to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Data-dependent addressing throughout. Fastest, vulnerable to
    /// cache-timing side channels.
    Argon2d = 0,
    /// Data-independent addressing throughout. Slower, side-channel
    /// resistant.
    Argon2i = 1,
    /// Data-independent for the first two slices of pass 0, data-dependent
    /// everywhere else.
    Argon2id = 2,
}

impl Variant {
    pub(crate) fn as_u32(self) -> u32 {
        self as u32
    }

    /// Whether blocks at this `(pass, slice)` are filled with
    /// data-independent addressing.
    pub(crate) fn data_independent_addressing(self, pass: u32, slice: u32) -> bool {
        match self {
            Variant::Argon2d => false,
            Variant::Argon2i => true,
            Variant::Argon2id => pass == 0 && slice < crate::params::SYNC_POINTS / 2,
        }
    }
}

impl TryFrom<u32> for Variant {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Error> {
        match value {
            0 => Ok(Variant::Argon2d),
            1 => Ok(Variant::Argon2i),
            2 => Ok(Variant::Argon2id),
            _ => Err(Error::IncorrectType),
        }
    }
}
