//! Everything that changes the level over time: the mover state machine and
//! the specials built on it, lights, scrollers, switches, delayed dispatch,
//! and the manager that drives them all.

pub mod ceilings;
pub mod delay;
pub mod doors;
pub mod elevator;
pub mod floors;
pub mod lights;
pub mod manager;
pub mod mover;
pub mod platforms;
pub mod scroll;
pub mod stairs;
pub mod switch;
pub mod teleport;

use crate::level::Level;
use crate::registry::SpecialKey;

use delay::{DelayedSpawn, ExitCountdown};
use elevator::Elevator;
use lights::{FireFlicker, Glow, LightChange, LightFlash, StrobeFlash};
use mover::{MoveResolver, SectorMover};
use scroll::Scroller;
use stairs::StairBuilder;
use switch::ButtonRevert;
use teleport::Teleport;

/// What a special reports after one tick of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Continue,
    Destroy,
}

/// Every registrable special. The manager ticks these in registration order;
/// a variant that returns [`TickStatus::Destroy`] is finalized and dropped.
#[derive(Debug, Clone)]
pub enum Special {
    Mover(SectorMover),
    Elevator(Elevator),
    Stairs(StairBuilder),
    Teleport(Teleport),
    LightChange(LightChange),
    FireFlicker(FireFlicker),
    LightFlash(LightFlash),
    StrobeFlash(StrobeFlash),
    Glow(Glow),
    Scroll(Scroller),
    Switch(ButtonRevert),
    Delayed(DelayedSpawn),
    Exit(ExitCountdown),
}

impl Special {
    /// Take ownership of whatever level state this special drives. Called
    /// once, right after registration.
    pub fn claim(&mut self, level: &mut Level, key: SpecialKey) {
        match self {
            Special::Mover(m) => m.claim(level, key),
            Special::Elevator(e) => e.claim(level, key),
            Special::Stairs(s) => s.claim(level, key),
            _ => {}
        }
    }

    /// One simulation step. New specials to schedule for the next tick go
    /// into `spawns`.
    pub fn tick(
        &mut self,
        level: &mut Level,
        resolver: &mut dyn MoveResolver,
        spawns: &mut Vec<Special>,
    ) -> TickStatus {
        match self {
            Special::Mover(m) => m.tick(level, resolver),
            Special::Elevator(e) => e.tick(level, resolver),
            Special::Stairs(s) => s.tick(level, resolver),
            Special::Teleport(t) => t.tick(level),
            Special::LightChange(l) => l.tick(level),
            Special::FireFlicker(l) => l.tick(level),
            Special::LightFlash(l) => l.tick(level),
            Special::StrobeFlash(l) => l.tick(level),
            Special::Glow(l) => l.tick(level),
            Special::Scroll(s) => s.tick(level),
            Special::Switch(s) => s.tick(level),
            Special::Delayed(d) => d.tick(spawns),
            Special::Exit(e) => e.tick(level),
        }
    }

    /// Release claims and apply any completion effects. Runs on natural
    /// destruction and on forced removal alike.
    pub fn finalize(&mut self, level: &mut Level) {
        match self {
            Special::Mover(m) => m.finalize(level),
            Special::Elevator(e) => e.finalize(level),
            Special::Stairs(s) => s.finalize(level),
            _ => {}
        }
    }
}
