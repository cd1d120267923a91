//! Light specials. Four persistent machines (fire flicker, blink, strobe,
//! glow) plus the finite fade used by light-change triggers.

use crate::env::TickStatus;
use crate::level::Level;
use crate::map_defs::SectorId;

pub const GLOWSPEED: i32 = 8;
pub const STROBEBRIGHT: u32 = 5;
pub const FASTDARK: u32 = 15;
pub const SLOWDARK: u32 = 35;

/// Campfire-style shimmer: every few tics drop a random amount below the
/// bright level, never below the surrounding minimum.
#[derive(Debug, Clone)]
pub struct FireFlicker {
    pub(crate) sector: SectorId,
    pub(crate) count: u32,
    pub(crate) max_light: i32,
    pub(crate) min_light: i32,
}

impl FireFlicker {
    pub fn new(level: &Level, sector: SectorId) -> Self {
        let max_light = level.sectors[sector].lightlevel as i32;
        let min_light = level.find_min_light_surrounding(sector, max_light as usize) as i32 + 16;
        Self {
            sector,
            count: 4,
            max_light,
            min_light,
        }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        self.count -= 1;
        if self.count > 0 {
            return TickStatus::Continue;
        }
        let amount = (level.rng.p_random() & 3) * 16;
        let light = if self.max_light - amount < self.min_light {
            self.min_light
        } else {
            self.max_light - amount
        };
        level.sectors[self.sector].lightlevel = light.max(0) as usize;
        self.count = 4;
        TickStatus::Continue
    }
}

/// Broken-tube blink: random stretches of bright and dark.
#[derive(Debug, Clone)]
pub struct LightFlash {
    pub(crate) sector: SectorId,
    pub(crate) count: u32,
    pub(crate) max_light: usize,
    pub(crate) min_light: usize,
    pub(crate) max_time: i32,
    pub(crate) min_time: i32,
}

impl LightFlash {
    pub fn new(level: &mut Level, sector: SectorId) -> Self {
        let max_light = level.sectors[sector].lightlevel;
        let min_light = level.find_min_light_surrounding(sector, max_light);
        let max_time = 64;
        let count = (level.rng.p_random() & max_time) as u32 + 1;
        Self {
            sector,
            count,
            max_light,
            min_light,
            max_time,
            min_time: 7,
        }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        self.count -= 1;
        if self.count > 0 {
            return TickStatus::Continue;
        }
        let sector = &mut level.sectors[self.sector];
        if sector.lightlevel == self.max_light {
            sector.lightlevel = self.min_light;
            self.count = (level.rng.p_random() & self.min_time) as u32 + 1;
        } else {
            sector.lightlevel = self.max_light;
            self.count = (level.rng.p_random() & self.max_time) as u32 + 1;
        }
        TickStatus::Continue
    }
}

/// Regular two-level strobe. Synchronised strobes start with a count of 1
/// so banks tagged together flash in step; unsynchronised ones desync off
/// the RNG.
#[derive(Debug, Clone)]
pub struct StrobeFlash {
    pub(crate) sector: SectorId,
    pub(crate) count: u32,
    pub(crate) max_light: usize,
    pub(crate) min_light: usize,
    pub(crate) dark_time: u32,
    pub(crate) bright_time: u32,
}

impl StrobeFlash {
    pub fn new(level: &mut Level, sector: SectorId, dark_time: u32, in_sync: bool) -> Self {
        let max_light = level.sectors[sector].lightlevel;
        let mut min_light = level.find_min_light_surrounding(sector, max_light);
        if min_light == max_light {
            min_light = 0;
        }
        let count = if in_sync {
            1
        } else {
            (level.rng.p_random() & 7) as u32 + 1
        };
        Self {
            sector,
            count,
            max_light,
            min_light,
            dark_time,
            bright_time: STROBEBRIGHT,
        }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        self.count -= 1;
        if self.count > 0 {
            return TickStatus::Continue;
        }
        let sector = &mut level.sectors[self.sector];
        if sector.lightlevel == self.min_light {
            sector.lightlevel = self.max_light;
            self.count = self.bright_time;
        } else {
            sector.lightlevel = self.min_light;
            self.count = self.dark_time;
        }
        TickStatus::Continue
    }
}

/// Smooth breathing glow between the surrounding minimum and the sector's
/// own level.
#[derive(Debug, Clone)]
pub struct Glow {
    pub(crate) sector: SectorId,
    pub(crate) max_light: i32,
    pub(crate) min_light: i32,
    /// +1 brightening, -1 dimming.
    pub(crate) direction: i32,
}

impl Glow {
    pub fn new(level: &Level, sector: SectorId) -> Self {
        let max_light = level.sectors[sector].lightlevel as i32;
        let min_light = level.find_min_light_surrounding(sector, max_light as usize) as i32;
        Self {
            sector,
            max_light,
            min_light,
            direction: -1,
        }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        let sector = &mut level.sectors[self.sector];
        let mut light = sector.lightlevel as i32 + self.direction * GLOWSPEED;
        if self.direction < 0 && light <= self.min_light {
            light = self.min_light;
            self.direction = 1;
        } else if self.direction > 0 && light >= self.max_light {
            light = self.max_light;
            self.direction = -1;
        }
        sector.lightlevel = light.max(0) as usize;
        TickStatus::Continue
    }
}

/// Finite fade to a target level, then gone.
#[derive(Debug, Clone)]
pub struct LightChange {
    pub(crate) sector: SectorId,
    pub(crate) target: usize,
    /// Levels per tick; 0 snaps instantly.
    pub(crate) step: usize,
}

impl LightChange {
    pub fn new(sector: SectorId, target: usize, step: usize) -> Self {
        Self {
            sector,
            target,
            step,
        }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        let sector = &mut level.sectors[self.sector];
        if self.step == 0 {
            sector.lightlevel = self.target;
            return TickStatus::Destroy;
        }
        let current = sector.lightlevel;
        sector.lightlevel = if current < self.target {
            (current + self.step).min(self.target)
        } else {
            current.saturating_sub(self.step).max(self.target)
        };
        if sector.lightlevel == self.target {
            TickStatus::Destroy
        } else {
            TickStatus::Continue
        }
    }
}
