//! Ошибки wire protocol

/// Ошибка упаковки аргументов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    /// Счётчик аргументов — один байт, больше 255 не влезает
    TooManyArguments(usize),
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::TooManyArguments(n) => {
                write!(f, "too many arguments: {} (max {})", n, crate::args::MAX_ARGS)
            }
        }
    }
}

impl std::error::Error for PackError {}

/// Ошибка разбора packed buffer / envelope frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Empty,
    OutOfBounds,
    UnknownEventKind(u8),
    UnknownAddressTag(u8),
    /// Лишние байты после последнего аргумента
    TrailingBytes(usize),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty buffer"),
            DecodeError::OutOfBounds => write!(f, "buffer too short"),
            DecodeError::UnknownEventKind(k) => write!(f, "unknown event kind: {:#x}", k),
            DecodeError::UnknownAddressTag(t) => write!(f, "unknown address tag: {:#x}", t),
            DecodeError::TrailingBytes(n) => write!(f, "{} trailing bytes after arguments", n),
        }
    }
}

impl std::error::Error for DecodeError {}
