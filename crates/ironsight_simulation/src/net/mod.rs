//! Net event dispatch (outbound side)
//!
//! `NetEventDispatcher` пакует аргументы и отдаёт `(kind, target, payload)`
//! в `NetEventSink`. Fire-and-forget: ни доставки, ни ошибок caller не видит.
//!
//! Адресация:
//! - `NetAddress` на entity → используется как есть (NetId для replicated)
//! - без компонента → `LocalId(entity.index())`
//! Трансляции LocalId ↔ NetId здесь нет.

use bevy::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use ironsight_protocol::{pack, NetArg, NetEventEnvelope, NetEventKind, PackedArgs, TargetAddress};

use crate::combat::weapon_stats::BodyPart;

/// Networking collaborator
pub trait NetEventSink: Send + Sync {
    fn send_event(&mut self, kind: NetEventKind, target: TargetAddress, payload: PackedArgs);
}

/// Явный сетевой адрес entity
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetAddress(pub TargetAddress);

/// Адрес entity для события: `NetAddress` если есть, иначе transient LocalId
pub fn address_of(entity: Entity, address: Option<&NetAddress>) -> TargetAddress {
    match address {
        Some(NetAddress(target)) => *target,
        None => TargetAddress::LocalId(entity.index()),
    }
}

/// Payload события Hit: `[damage f32, body_part u8, credit_shooter bool]`
pub fn hit_args(damage: f32, part: BodyPart, credit_shooter: bool) -> [NetArg; 3] {
    [
        NetArg::F32(damage),
        NetArg::U8(part.as_u8()),
        NetArg::Bool(credit_shooter),
    ]
}

/// Resource: dispatcher поверх подключённого sink
#[derive(Resource)]
pub struct NetEventDispatcher {
    sink: Box<dyn NetEventSink>,
    dispatched: u64,
}

impl NetEventDispatcher {
    pub fn new(sink: impl NetEventSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            dispatched: 0,
        }
    }

    /// Упаковать и отправить
    ///
    /// Больше 255 аргументов — событие не отправляется (ошибка в лог).
    pub fn dispatch(&mut self, kind: NetEventKind, target: TargetAddress, args: &[NetArg]) {
        let payload = match pack(args) {
            Ok(payload) => payload,
            Err(e) => {
                crate::logger::log_error("Net", &format!("{:?} → {:?} dropped: {}", kind, target, e));
                return;
            }
        };

        crate::logger::log(
            "Net",
            &format!("{:?} → {:?} ({} args, {} bytes)", kind, target, args.len(), payload.len()),
        );

        self.dispatched += 1;
        self.sink.send_event(kind, target, payload);
    }

    /// Сколько событий ушло в sink
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched
    }
}

/// In-process sink: очередь envelopes
///
/// Clone разделяет очередь: одна копия в dispatcher, другая — Resource для drain.
#[derive(Resource, Debug, Clone, Default)]
pub struct OutboundNetEvents {
    queue: Arc<Mutex<VecDeque<NetEventEnvelope>>>,
}

impl OutboundNetEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<NetEventEnvelope>> {
        // Poisoned mutex → данные очереди всё равно валидны
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Забрать все накопленные события (FIFO)
    pub fn drain(&self) -> Vec<NetEventEnvelope> {
        self.lock().drain(..).collect()
    }
}

impl NetEventSink for OutboundNetEvents {
    fn send_event(&mut self, kind: NetEventKind, target: TargetAddress, payload: PackedArgs) {
        self.lock().push_back(NetEventEnvelope::new(kind, target, payload));
    }
}
