//! Time-shifted actions: a special that registers another special after a
//! countdown, and the exit countdown itself.

use crate::env::{Special, TickStatus};
use crate::level::Level;

/// Holds a boxed special and releases it into the registry when the timer
/// expires. The released special first ticks on the following world tick.
#[derive(Debug, Clone)]
pub struct DelayedSpawn {
    pub(crate) tics: u32,
    pub(crate) special: Option<Box<Special>>,
}

impl DelayedSpawn {
    pub fn new(tics: u32, special: Special) -> Self {
        Self {
            tics,
            special: Some(Box::new(special)),
        }
    }

    pub fn tick(&mut self, spawns: &mut Vec<Special>) -> TickStatus {
        if self.tics > 0 {
            self.tics -= 1;
            return TickStatus::Continue;
        }
        if let Some(special) = self.special.take() {
            spawns.push(*special);
        }
        TickStatus::Destroy
    }
}

/// Ends the level when it expires.
#[derive(Debug, Clone)]
pub struct ExitCountdown {
    pub(crate) tics: u32,
    pub(crate) secret: bool,
}

impl ExitCountdown {
    pub fn new(tics: u32, secret: bool) -> Self {
        Self { tics, secret }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        if self.tics > 0 {
            self.tics -= 1;
            return TickStatus::Continue;
        }
        if self.secret {
            level.do_secret_exit_level();
        } else {
            level.do_exit_level();
        }
        TickStatus::Destroy
    }
}
