//! Net event envelope
//!
//! Frame одного события:
//! `[kind u8][addr tag u8][addr LE: u32 для LocalId | u16 для NetId][packed args]`
//!
//! Transport (сокеты, reliability, ordering) сюда не входит.

use serde::{Deserialize, Serialize};

use crate::args::{PackedArgs, UnpackedArgs};
use crate::types::DecodeError;

/// Тип события (8-bit tag, одинаковый у всех peers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NetEventKind {
    Nil = 0,
    Hit = 1,
    Death = 2,
    OnCreation = 3,
    OnDestruction = 4,
    Animation = 5,
    Interact = 6,
}

impl NetEventKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NetEventKind::Nil),
            1 => Some(NetEventKind::Hit),
            2 => Some(NetEventKind::Death),
            3 => Some(NetEventKind::OnCreation),
            4 => Some(NetEventKind::OnDestruction),
            5 => Some(NetEventKind::Animation),
            6 => Some(NetEventKind::Interact),
            _ => None,
        }
    }
}

/// Адрес цели события
///
/// Трансляции между режимами нет: какой выбрать — решает caller
/// (локально созданная entity или replicated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetAddress {
    /// Transient id, валиден только в симуляции одного peer
    LocalId(u32),
    /// Stable id replicated entity, валиден у всех peers
    NetId(u16),
}

impl TargetAddress {
    const LOCAL_TAG: u8 = 0;
    const NET_TAG: u8 = 1;

    pub fn tag(&self) -> u8 {
        match self {
            TargetAddress::LocalId(_) => Self::LOCAL_TAG,
            TargetAddress::NetId(_) => Self::NET_TAG,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        match *self {
            TargetAddress::LocalId(id) => out.extend_from_slice(&id.to_le_bytes()),
            TargetAddress::NetId(id) => out.extend_from_slice(&id.to_le_bytes()),
        }
    }

    /// Возвращает адрес и количество прочитанных байт
    fn read_from(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        let tag = *bytes.first().ok_or(DecodeError::OutOfBounds)?;
        match tag {
            Self::LOCAL_TAG => {
                let raw: [u8; 4] = bytes
                    .get(1..5)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(DecodeError::OutOfBounds)?;
                Ok((TargetAddress::LocalId(u32::from_le_bytes(raw)), 5))
            }
            Self::NET_TAG => {
                let raw: [u8; 2] = bytes
                    .get(1..3)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(DecodeError::OutOfBounds)?;
                Ok((TargetAddress::NetId(u16::from_le_bytes(raw)), 3))
            }
            other => Err(DecodeError::UnknownAddressTag(other)),
        }
    }
}

/// Событие на отправку (fire-and-forget, без identity)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetEventEnvelope {
    pub kind: NetEventKind,
    pub target: TargetAddress,
    pub payload: PackedArgs,
}

impl NetEventEnvelope {
    pub fn new(kind: NetEventKind, target: TargetAddress, payload: PackedArgs) -> Self {
        Self { kind, target, payload }
    }

    /// Собрать frame для transport
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.payload.len());
        out.push(self.kind.as_u8());
        self.target.write_to(&mut out);
        out.extend_from_slice(self.payload.as_bytes());
        out
    }

    /// Разобрать frame: kind, адрес и packed args (args ссылаются на `bytes`)
    pub fn decode(
        bytes: &[u8],
    ) -> Result<(NetEventKind, TargetAddress, UnpackedArgs<'_>), DecodeError> {
        let raw_kind = *bytes.first().ok_or(DecodeError::Empty)?;
        let kind = NetEventKind::from_u8(raw_kind).ok_or(DecodeError::UnknownEventKind(raw_kind))?;
        let (target, consumed) = TargetAddress::read_from(&bytes[1..])?;
        let args = crate::args::unpack(&bytes[1 + consumed..])?;
        Ok((kind, target, args))
    }
}
