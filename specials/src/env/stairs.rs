//! Stair builder. From the base sector it walks front-to-back through
//! two-sided lines onto same-textured floors, each step's destination one
//! stair height above the last, then raises the whole run. Every step
//! climbs at once; each landing pauses the run for the stair delay. A run
//! can optionally sink back down after a rest.

use serde::{Deserialize, Serialize};
use sound_traits::SfxName;

use crate::env::mover::{MoveDirection, MoveResolver, MoveResult};
use crate::env::TickStatus;
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId};
use crate::registry::SpecialKey;

/// How the walk accounts for steps it has to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StairCompat {
    /// The historical quirk: the height accumulator is bumped before the
    /// busy-sector check, so a skipped step still raises everything beyond
    /// it by an extra stair height.
    Vanilla,
    /// Skipped steps contribute nothing.
    Strict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StairStep {
    pub(crate) sector: SectorId,
    pub(crate) dest_z: f32,
    pub(crate) orig_z: f32,
    pub(crate) done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StairPhase {
    Building,
    ResetWait(u32),
    Resetting,
}

#[derive(Debug, Clone)]
pub struct StairBuilder {
    pub(crate) key: Option<SpecialKey>,
    pub(crate) speed: f32,
    pub(crate) stair_height: f32,
    pub(crate) stair_delay: u32,
    pub(crate) reset_delay: u32,
    pub(crate) compat: StairCompat,
    pub(crate) steps: Vec<StairStep>,
    /// Remaining pause after a step landed.
    pub(crate) delay_tics: u32,
    pub(crate) phase: StairPhase,
}

impl StairBuilder {
    /// Walk the level and lay out the run. The returned builder does
    /// nothing until registered and claimed.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        level: &Level,
        sector: SectorId,
        speed: f32,
        stair_height: f32,
        stair_delay: u32,
        reset_delay: u32,
        compat: StairCompat,
        match_texture: bool,
    ) -> Self {
        let base_tex = level.sectors[sector].floor.texture;
        let mut height = level.sectors[sector].floor.z + stair_height;
        let mut steps = vec![StairStep {
            sector,
            dest_z: height,
            orig_z: level.sectors[sector].floor.z,
            done: false,
        }];

        let mut current = sector;
        'walk: loop {
            for &l in &level.sectors[current].lines {
                let line = &level.lines[l];
                // Steps only propagate across the front of a line.
                if line.front_sector != current {
                    continue;
                }
                let Some(next) = line.back_sector else {
                    continue;
                };
                if match_texture && level.sectors[next].floor.texture != base_tex {
                    continue;
                }
                let busy = level.sectors[next].owner(PlaneKind::Floor).is_some()
                    || steps.iter().any(|s| s.sector == next);
                match compat {
                    StairCompat::Vanilla => {
                        height += stair_height;
                        if busy {
                            continue;
                        }
                    }
                    StairCompat::Strict => {
                        if busy {
                            continue;
                        }
                        height += stair_height;
                    }
                }
                steps.push(StairStep {
                    sector: next,
                    dest_z: height,
                    orig_z: level.sectors[next].floor.z,
                    done: false,
                });
                current = next;
                continue 'walk;
            }
            break;
        }

        Self {
            key: None,
            speed,
            stair_height,
            stair_delay,
            reset_delay,
            compat,
            steps,
            delay_tics: 0,
            phase: StairPhase::Building,
        }
    }

    pub fn base_sector(&self) -> SectorId {
        self.steps[0].sector
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Reserve every step's floor; the walk of a later stair trigger must
    /// see the whole run as busy.
    pub fn claim(&mut self, level: &mut Level, key: SpecialKey) {
        self.key = Some(key);
        for step in &self.steps {
            level.sectors[step.sector].set_owner(PlaneKind::Floor, Some(key));
        }
    }

    pub fn tick(&mut self, level: &mut Level, resolver: &mut dyn MoveResolver) -> TickStatus {
        match self.phase {
            StairPhase::Building => {
                // A landing pauses the whole run, the mid-travel steps
                // included.
                if self.delay_tics > 0 {
                    for step in &self.steps {
                        if step.done {
                            continue;
                        }
                        let sector = &mut level.sectors[step.sector];
                        if sector.owner(PlaneKind::Floor) == self.key {
                            let plane = sector.plane_mut(PlaneKind::Floor);
                            plane.prev_z = plane.z;
                        }
                    }
                    self.delay_tics -= 1;
                    return TickStatus::Continue;
                }
                let landed = self.move_steps(level, resolver, MoveDirection::Up);
                if landed > 0 {
                    self.delay_tics = self.stair_delay;
                }
                if self.steps.iter().all(|s| s.done) {
                    if self.reset_delay > 0 {
                        self.phase = StairPhase::ResetWait(self.reset_delay);
                        return TickStatus::Continue;
                    }
                    level.start_sector_sound(self.base_sector(), SfxName::Pstop, false);
                    return TickStatus::Destroy;
                }
                TickStatus::Continue
            }
            StairPhase::ResetWait(tics) => {
                if tics > 1 {
                    self.phase = StairPhase::ResetWait(tics - 1);
                } else {
                    // Reclaim and send the run back down together. A step
                    // whose floor was grabbed by another mover in the
                    // meantime is left where it is.
                    for step in &mut self.steps {
                        if level.sectors[step.sector].owner(PlaneKind::Floor).is_none() {
                            step.done = false;
                            level.sectors[step.sector].set_owner(PlaneKind::Floor, self.key);
                        }
                    }
                    self.phase = StairPhase::Resetting;
                }
                TickStatus::Continue
            }
            StairPhase::Resetting => {
                self.move_steps(level, resolver, MoveDirection::Down);
                if self.steps.iter().all(|s| s.done) {
                    level.start_sector_sound(self.base_sector(), SfxName::Pstop, false);
                    return TickStatus::Destroy;
                }
                TickStatus::Continue
            }
        }
    }

    fn move_steps(
        &mut self,
        level: &mut Level,
        resolver: &mut dyn MoveResolver,
        direction: MoveDirection,
    ) -> usize {
        let key = self.key;
        let mut any_moved = false;
        let mut landed = 0;
        for i in 0..self.steps.len() {
            let step = self.steps[i];
            if step.done {
                continue;
            }
            let target = match direction {
                MoveDirection::Up => step.dest_z,
                MoveDirection::Down => step.orig_z,
            };
            let plane = level.sectors[step.sector].plane_mut(PlaneKind::Floor);
            plane.prev_z = plane.z;
            let (speed, candidate) = match direction {
                MoveDirection::Up => (self.speed, (plane.z + self.speed).min(target)),
                MoveDirection::Down => (-self.speed, (plane.z - self.speed).max(target)),
            };
            let status = resolver.move_plane(
                level,
                step.sector,
                PlaneKind::Floor,
                speed,
                candidate,
                None,
                direction,
            );
            // A blocked step leans on the obstruction; the rest of the run
            // keeps climbing.
            if status == MoveResult::Blocked {
                continue;
            }
            any_moved = true;
            if level.sectors[step.sector].floor.z == target {
                self.steps[i].done = true;
                landed += 1;
                let sector = &mut level.sectors[step.sector];
                if sector.owner(PlaneKind::Floor) == key {
                    sector.set_owner(PlaneKind::Floor, None);
                }
            }
        }
        if any_moved && level.level_time & 7 == 0 {
            level.start_sector_sound(self.base_sector(), SfxName::Stnmov, false);
        }
        landed
    }

    pub fn finalize(&mut self, level: &mut Level) {
        for step in &self.steps {
            let sector = &mut level.sectors[step.sector];
            if sector.owner(PlaneKind::Floor) == self.key {
                sector.set_owner(PlaneKind::Floor, None);
                sector.floor.prev_z = sector.floor.z;
            }
        }
    }
}
