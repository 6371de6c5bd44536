use std::fmt;
use std::io;

/// Errors surfaced by the interpreter core.
///
/// Only load failures and fatal invariant violations appear here; stack
/// underflow/overflow are recoverable, logged, and never become errors.
#[derive(Debug)]
pub enum CoreError {
    /// The ROM source could not be read.
    Io(io::Error),
    /// The ROM source contained no bytes.
    RomEmpty,
    /// The ROM does not fit between 0x200 and the end of memory.
    RomTooLarge { len: usize },
    /// A handler touched memory outside 0x000..0xFFF.
    OutOfBounds { addr: usize },
    /// The fetched word matched no entry in the dispatch table.
    UnknownOpcode { op: u16, pc: u16 },
    /// A timing parameter was zero.
    InvalidConfig(&'static str),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Io(e) => write!(f, "failed to read ROM: {}", e),
            CoreError::RomEmpty => write!(f, "ROM contains no bytes"),
            CoreError::RomTooLarge { len } => {
                write!(f, "ROM of {} bytes does not fit in memory", len)
            }
            CoreError::OutOfBounds { addr } => {
                write!(f, "memory access out of bounds at {:#05X}", addr)
            }
            CoreError::UnknownOpcode { op, pc } => {
                write!(f, "unknown opcode {:04X} at {:#05X}", op, pc)
            }
            CoreError::InvalidConfig(what) => write!(f, "{} must be positive", what),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CoreError {
    fn from(e: io::Error) -> Self {
        CoreError::Io(e)
    }
}
