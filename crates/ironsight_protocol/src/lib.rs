//! IRONSIGHT wire protocol
//!
//! Движок-независимый код для net events:
//! - `args`: Argument Packer — `[count u8] ([len u8][LE bytes])*`
//! - `event`: NetEventKind, TargetAddress (LocalId | NetId), NetEventEnvelope
//! - `types`: ошибки кодирования/декодирования
//!
//! Формат должен совпадать между peers бит-в-бит.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod args;
pub mod event;
pub mod types;

pub use args::{pack, unpack, NetArg, PackedArgs, UnpackedArgs, MAX_ARGS};
pub use event::{NetEventEnvelope, NetEventKind, TargetAddress};
pub use types::{DecodeError, PackError};
