//! Argument Packer
//!
//! Формат: `[count u8]`, затем для каждого аргумента `[len u8][len байт LE]`.
//!
//! Поддерживаемые scalar kinds закрыты в `NetArg`. Неподдерживаемый аргумент
//! кодируется как `len = 0` без payload — receiver трактует его как "absent",
//! а не как ошибку. Это часть wire-совместимости, валидацию сюда не добавлять.

use crate::types::{DecodeError, PackError};

/// Максимум аргументов в одном buffer (count — один байт)
pub const MAX_ARGS: usize = u8::MAX as usize;

/// Один аргумент net event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetArg {
    F32(f32),
    F64(f64),
    I32(i32),
    I64(i64),
    U64(u64),
    Bool(bool),
    U32(u32),
    U8(u8),
    /// Тип, который packer не умеет кодировать (уходит как zero-length field)
    Unsupported,
}

impl NetArg {
    /// Длина payload в байтах (0 для `Unsupported`)
    pub fn encoded_len(&self) -> u8 {
        match self {
            NetArg::F32(_) | NetArg::I32(_) | NetArg::U32(_) => 4,
            NetArg::F64(_) | NetArg::I64(_) | NetArg::U64(_) => 8,
            NetArg::Bool(_) | NetArg::U8(_) => 1,
            NetArg::Unsupported => 0,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.encoded_len());
        match *self {
            NetArg::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
            NetArg::F64(v) => out.extend_from_slice(&v.to_le_bytes()),
            NetArg::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
            NetArg::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
            NetArg::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
            NetArg::Bool(v) => out.push(v as u8),
            NetArg::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
            NetArg::U8(v) => out.push(v),
            NetArg::Unsupported => {}
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for NetArg {
                fn from(v: $ty) -> Self {
                    NetArg::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    f32 => F32,
    f64 => F64,
    i32 => I32,
    i64 => I64,
    u64 => U64,
    bool => Bool,
    u32 => U32,
    u8 => U8,
}

/// Готовый packed buffer (immutable после сборки)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArgs {
    bytes: Vec<u8>,
}

impl PackedArgs {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Количество аргументов (первый байт)
    pub fn arg_count(&self) -> u8 {
        self.bytes.first().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Упаковать аргументы в buffer
///
/// Больше `MAX_ARGS` аргументов — явная ошибка (однобайтовый count иначе
/// молча переполнится).
pub fn pack(args: &[NetArg]) -> Result<PackedArgs, PackError> {
    if args.len() > MAX_ARGS {
        return Err(PackError::TooManyArguments(args.len()));
    }

    let payload: usize = args.iter().map(|a| 1 + a.encoded_len() as usize).sum();
    let mut bytes = Vec::with_capacity(1 + payload);
    bytes.push(args.len() as u8);
    for arg in args {
        arg.write_to(&mut bytes);
    }

    Ok(PackedArgs { bytes })
}

/// Разобранный buffer на стороне receiver
///
/// Каждое поле — `None` если длина 0 (absent/unencodable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedArgs<'a> {
    fields: Vec<Option<&'a [u8]>>,
}

impl<'a> UnpackedArgs<'a> {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Сырые байты поля; `None` если поля нет или оно zero-length
    pub fn raw(&self, index: usize) -> Option<&'a [u8]> {
        self.fields.get(index).copied().flatten()
    }

    pub fn is_absent(&self, index: usize) -> bool {
        self.raw(index).is_none()
    }

    pub fn f32(&self, index: usize) -> Option<f32> {
        self.fixed::<4>(index).map(f32::from_le_bytes)
    }

    pub fn f64(&self, index: usize) -> Option<f64> {
        self.fixed::<8>(index).map(f64::from_le_bytes)
    }

    pub fn i32(&self, index: usize) -> Option<i32> {
        self.fixed::<4>(index).map(i32::from_le_bytes)
    }

    pub fn i64(&self, index: usize) -> Option<i64> {
        self.fixed::<8>(index).map(i64::from_le_bytes)
    }

    pub fn u64(&self, index: usize) -> Option<u64> {
        self.fixed::<8>(index).map(u64::from_le_bytes)
    }

    pub fn u32(&self, index: usize) -> Option<u32> {
        self.fixed::<4>(index).map(u32::from_le_bytes)
    }

    pub fn u8(&self, index: usize) -> Option<u8> {
        self.fixed::<1>(index).map(|b| b[0])
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        self.u8(index).map(|b| b != 0)
    }

    fn fixed<const N: usize>(&self, index: usize) -> Option<[u8; N]> {
        self.raw(index)?.try_into().ok()
    }
}

/// Разобрать packed buffer
pub fn unpack(bytes: &[u8]) -> Result<UnpackedArgs<'_>, DecodeError> {
    let count = *bytes.first().ok_or(DecodeError::Empty)? as usize;
    let mut fields = Vec::with_capacity(count);
    let mut offset = 1;

    for _ in 0..count {
        let len = *bytes.get(offset).ok_or(DecodeError::OutOfBounds)? as usize;
        offset += 1;
        if len == 0 {
            fields.push(None);
            continue;
        }
        let field = bytes
            .get(offset..offset + len)
            .ok_or(DecodeError::OutOfBounds)?;
        fields.push(Some(field));
        offset += len;
    }

    if offset != bytes.len() {
        return Err(DecodeError::TrailingBytes(bytes.len() - offset));
    }

    Ok(UnpackedArgs { fields })
}
