//! Trigger resolution and the per-tick driver. A [`Trigger`] is the decoded
//! payload of a line activation; `try_activate` fans it out over the tagged
//! sectors, respects plane ownership, and registers the resulting specials.
//! `ticker` runs every registered special once per world tick in
//! registration order.

use glam::Vec2;
use sound_traits::SfxName;

use crate::env::ceilings::{ceiling_crusher, ceiling_lower_to_floor, ceiling_raise_to_highest};
use crate::env::delay::{DelayedSpawn, ExitCountdown};
use crate::env::doors::{door_close, door_close_wait_open, door_open_close, door_open_stay};
use crate::env::elevator::Elevator;
use crate::env::floors::{
    donut, floor_lower_to_highest, floor_lower_to_lowest, floor_lower_to_nearest, floor_raise_by,
    floor_raise_and_change, floor_raise_and_crush, floor_raise_to_lowest_ceiling,
    floor_raise_to_nearest,
};
use crate::env::lights::{
    FireFlicker, Glow, LightChange, LightFlash, StrobeFlash, FASTDARK, SLOWDARK,
};
use crate::env::mover::{CrushMode, MoveResolver, Repetition, TexChange};
use crate::env::platforms::{lift_down_wait_up, plat_perpetual};
use crate::env::scroll::Scroller;
use crate::env::stairs::{StairBuilder, StairCompat};
use crate::env::switch::{change_switch_texture, ButtonRevert};
use crate::env::teleport::{Teleport, TeleportZ};
use crate::env::{Special, TickStatus};
use crate::level::Level;
use crate::map_defs::{KeyCard, LineId, PlaneKind, SectorId, ThingId};
use crate::registry::{Registry, SpecialKey};
use crate::TICRATE;

/// World units per tick per unit of speed code.
pub const SPEED_FACTOR: f32 = 0.125;
/// Ticks a door holds open before closing.
pub const VDOORWAIT: u32 = 150;
/// Ticks a lift rests at the bottom.
pub const LIFTWAIT: u32 = TICRATE * 3;
/// Ticks a pressed button stays pressed.
pub const BUTTONTIME: u32 = TICRATE;

/// Speed argument in map byte code; world units per tick are
/// `code * SPEED_FACTOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedCode(pub u16);

impl SpeedCode {
    pub const STAIR_SLOW: Self = Self(2);
    pub const SLOW: Self = Self(16);
    pub const NORMAL: Self = Self(32);
    pub const FAST: Self = Self(64);
    pub const TURBO: Self = Self(128);

    pub fn units(self) -> f32 {
        f32::from(self.0) * SPEED_FACTOR
    }
}

/// How the activator touched the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationContext {
    Cross,
    Use,
    Shoot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerKind {
    DoorOpenClose { speed: SpeedCode, delay: u32 },
    DoorOpenStay { speed: SpeedCode },
    DoorClose { speed: SpeedCode },
    DoorCloseWaitOpen { speed: SpeedCode, delay: u32 },
    DoorLockedOpenClose { speed: SpeedCode, delay: u32, key: KeyCard },
    Lift { speed: SpeedCode, delay: u32 },
    PlatPerpetual { speed: SpeedCode, delay: u32, lip: f32 },
    PlatStop,
    FloorLowerToLowest { speed: SpeedCode },
    FloorLowerToHighest { speed: SpeedCode, adjust: f32 },
    FloorLowerToNearest { speed: SpeedCode },
    FloorRaiseToLowestCeiling { speed: SpeedCode },
    FloorRaiseToNearest { speed: SpeedCode },
    FloorRaiseBy { speed: SpeedCode, amount: f32 },
    /// Raise and take the activating line's front-sector flat and special.
    FloorRaiseAndChange { speed: SpeedCode, amount: f32 },
    FloorRaiseAndCrush { speed: SpeedCode, damage: i32, mode: CrushMode },
    Donut { lower_speed: SpeedCode, raise_speed: SpeedCode },
    CeilingLowerToFloor { speed: SpeedCode },
    CeilingRaiseToHighest { speed: SpeedCode },
    CeilingCrusher { speed: SpeedCode, damage: i32, mode: CrushMode, return_factor: f32 },
    CrusherStop,
    ElevatorRaise { speed: SpeedCode },
    ElevatorLower { speed: SpeedCode },
    BuildStairs {
        speed: SpeedCode,
        stair_height: f32,
        stair_delay: u32,
        reset_delay: u32,
        compat: StairCompat,
        match_texture: bool,
    },
    Teleport { tid: i16, tag: i16, z: TeleportZ, reverse_angle: bool },
    /// 0 means each sector takes its brightest neighbour's level.
    LightsOn { value: usize },
    LightsOff,
    LightFade { target: usize, step: usize },
    StartStrobe { dark_time: u32, in_sync: bool },
    ExitLevel,
    SecretExitLevel,
    DelayedExit { tics: u32, secret: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub line: LineId,
    pub kind: TriggerKind,
    pub context: ActivationContext,
    pub repeatable: bool,
}

pub struct SpecialManager {
    pub(crate) registry: Registry<Special>,
}

impl Default for SpecialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecialManager {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_active(&self, key: SpecialKey) -> bool {
        self.registry.contains(key)
    }

    /// Register and claim. The special first ticks on the next world tick.
    pub fn add_special(&mut self, level: &mut Level, special: Special) -> SpecialKey {
        let key = self.registry.add(special);
        if let Some(mut s) = self.registry.take(key) {
            s.claim(level, key);
            self.registry.put_back(key, s);
        }
        key
    }

    /// Forcibly remove one special, releasing its claims.
    pub fn remove(&mut self, level: &mut Level, key: SpecialKey) -> bool {
        if let Some(mut s) = self.registry.remove(key) {
            s.finalize(level);
            true
        } else {
            false
        }
    }

    /// Run one world tick over every registered special.
    pub fn ticker(&mut self, level: &mut Level, resolver: &mut dyn MoveResolver) {
        let count = self.registry.begin_pass();
        let mut spawns = Vec::new();
        for i in 0..count {
            let key = self.registry.key_at(i);
            let Some(mut special) = self.registry.take(key) else {
                // Removed earlier in this pass.
                continue;
            };
            match special.tick(level, resolver, &mut spawns) {
                TickStatus::Continue => self.registry.put_back(key, special),
                TickStatus::Destroy => {
                    special.finalize(level);
                    self.registry.release(key);
                }
            }
            for s in spawns.drain(..) {
                self.add_special(level, s);
            }
        }
        self.registry.sweep();
        level.level_time += 1;
    }

    /// Resolve a trigger. Returns whether anything took effect; on success
    /// a `Use` activation also throws the line's switch.
    pub fn try_activate(
        &mut self,
        level: &mut Level,
        trigger: &Trigger,
        activator: Option<ThingId>,
    ) -> bool {
        if trigger.line >= level.lines.len() {
            return false;
        }
        if level.lines[trigger.line].activated && !trigger.repeatable {
            return false;
        }

        if let TriggerKind::DoorLockedOpenClose { key, .. } = trigger.kind {
            let Some(user) = activator else {
                return false;
            };
            if !level.things[user].has_key(key) {
                level.start_thing_sound(user, SfxName::Oof);
                log::info!("Door needs the {key:?} key");
                return false;
            }
        }

        let success = self.dispatch(level, trigger, activator);

        if success {
            if !trigger.repeatable {
                level.lines[trigger.line].activated = true;
            }
            if trigger.context == ActivationContext::Use {
                if let Some((side, slot, original)) =
                    change_switch_texture(level, trigger.line, trigger.repeatable)
                {
                    if trigger.repeatable {
                        self.add_special(
                            level,
                            Special::Switch(ButtonRevert::new(
                                trigger.line,
                                side,
                                slot,
                                original,
                                BUTTONTIME,
                            )),
                        );
                    }
                }
            }
        }
        success
    }

    fn dispatch(
        &mut self,
        level: &mut Level,
        trigger: &Trigger,
        activator: Option<ThingId>,
    ) -> bool {
        let line_tag = level.lines[trigger.line].tag;
        match trigger.kind {
            TriggerKind::DoorOpenClose { speed, delay }
            | TriggerKind::DoorLockedOpenClose { speed, delay, .. } => self
                .start_movers(level, trigger, PlaneKind::Ceiling, true, |level, s| {
                    Some(Special::Mover(door_open_close(level, s, speed.units(), delay)))
                }),
            TriggerKind::DoorOpenStay { speed } => {
                self.start_movers(level, trigger, PlaneKind::Ceiling, false, |level, s| {
                    Some(Special::Mover(door_open_stay(level, s, speed.units())))
                })
            }
            TriggerKind::DoorClose { speed } => {
                self.start_movers(level, trigger, PlaneKind::Ceiling, false, |level, s| {
                    Some(Special::Mover(door_close(level, s, speed.units())))
                })
            }
            TriggerKind::DoorCloseWaitOpen { speed, delay } => {
                self.start_movers(level, trigger, PlaneKind::Ceiling, true, |level, s| {
                    Some(Special::Mover(door_close_wait_open(
                        level,
                        s,
                        speed.units(),
                        delay,
                    )))
                })
            }
            TriggerKind::Lift { speed, delay } => {
                self.start_movers(level, trigger, PlaneKind::Floor, true, |level, s| {
                    Some(Special::Mover(lift_down_wait_up(
                        level,
                        s,
                        speed.units(),
                        delay,
                    )))
                })
            }
            TriggerKind::PlatPerpetual { speed, delay, lip } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(plat_perpetual(
                        level,
                        s,
                        speed.units(),
                        delay,
                        lip,
                    )))
                })
            }
            TriggerKind::PlatStop => self.stop_matching(level, |s| match s {
                Special::Mover(m) => {
                    m.plane() == PlaneKind::Floor
                        && m.repetition() == Repetition::Perpetual
                        && !m.is_crusher()
                }
                _ => false,
            }, line_tag),
            TriggerKind::FloorLowerToLowest { speed } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_lower_to_lowest(level, s, speed.units())))
                })
            }
            TriggerKind::FloorLowerToHighest { speed, adjust } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_lower_to_highest(
                        level,
                        s,
                        speed.units(),
                        adjust,
                    )))
                })
            }
            TriggerKind::FloorLowerToNearest { speed } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_lower_to_nearest(
                        level,
                        s,
                        speed.units(),
                    )))
                })
            }
            TriggerKind::FloorRaiseToLowestCeiling { speed } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_raise_to_lowest_ceiling(
                        level,
                        s,
                        speed.units(),
                    )))
                })
            }
            TriggerKind::FloorRaiseToNearest { speed } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_raise_to_nearest(
                        level,
                        s,
                        speed.units(),
                    )))
                })
            }
            TriggerKind::FloorRaiseBy { speed, amount } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_raise_by(
                        level,
                        s,
                        speed.units(),
                        amount,
                    )))
                })
            }
            TriggerKind::FloorRaiseAndChange { speed, amount } => {
                let model = level.lines[trigger.line].front_sector;
                let change = TexChange {
                    texture: level.sectors[model].floor.texture,
                    special: Some(level.sectors[model].special),
                };
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_raise_and_change(
                        level,
                        s,
                        speed.units(),
                        amount,
                        change,
                    )))
                })
            }
            TriggerKind::FloorRaiseAndCrush { speed, damage, mode } => {
                self.start_movers(level, trigger, PlaneKind::Floor, false, |level, s| {
                    Some(Special::Mover(floor_raise_and_crush(
                        level,
                        s,
                        speed.units(),
                        damage,
                        mode,
                    )))
                })
            }
            TriggerKind::Donut {
                lower_speed,
                raise_speed,
            } => {
                let mut success = false;
                for pillar in level.sectors_with_tag(line_tag) {
                    if level.sectors[pillar].owner(PlaneKind::Floor).is_some() {
                        continue;
                    }
                    if let Some((lower, raise)) =
                        donut(level, pillar, lower_speed.units(), raise_speed.units())
                    {
                        self.add_special(level, Special::Mover(lower));
                        self.add_special(level, Special::Mover(raise));
                        success = true;
                    }
                }
                success
            }
            TriggerKind::CeilingLowerToFloor { speed } => {
                self.start_movers(level, trigger, PlaneKind::Ceiling, false, |level, s| {
                    Some(Special::Mover(ceiling_lower_to_floor(
                        level,
                        s,
                        speed.units(),
                    )))
                })
            }
            TriggerKind::CeilingRaiseToHighest { speed } => {
                self.start_movers(level, trigger, PlaneKind::Ceiling, false, |level, s| {
                    Some(Special::Mover(ceiling_raise_to_highest(
                        level,
                        s,
                        speed.units(),
                    )))
                })
            }
            TriggerKind::CeilingCrusher {
                speed,
                damage,
                mode,
                return_factor,
            } => self.start_movers(level, trigger, PlaneKind::Ceiling, false, |level, s| {
                Some(Special::Mover(ceiling_crusher(
                    level,
                    s,
                    speed.units(),
                    damage,
                    mode,
                    return_factor,
                )))
            }),
            TriggerKind::CrusherStop => self.stop_matching(level, |s| match s {
                Special::Mover(m) => m.plane() == PlaneKind::Ceiling && m.is_crusher(),
                _ => false,
            }, line_tag),
            TriggerKind::ElevatorRaise { speed } => {
                self.start_elevators(level, trigger, |level, s| {
                    Elevator::raise_to_nearest(level, s, speed.units())
                })
            }
            TriggerKind::ElevatorLower { speed } => {
                self.start_elevators(level, trigger, |level, s| {
                    Elevator::lower_to_nearest(level, s, speed.units())
                })
            }
            TriggerKind::BuildStairs {
                speed,
                stair_height,
                stair_delay,
                reset_delay,
                compat,
                match_texture,
            } => {
                let mut success = false;
                for sector in level.sectors_with_tag(line_tag) {
                    if level.sectors[sector].owner(PlaneKind::Floor).is_some() {
                        continue;
                    }
                    let stairs = StairBuilder::create(
                        level,
                        sector,
                        speed.units(),
                        stair_height,
                        stair_delay,
                        reset_delay,
                        compat,
                        match_texture,
                    );
                    self.add_special(level, Special::Stairs(stairs));
                    success = true;
                }
                success
            }
            TriggerKind::Teleport {
                tid,
                tag,
                z,
                reverse_angle,
            } => {
                let Some(thing) = activator else {
                    return false;
                };
                match Teleport::create(thing, tid, tag, z, reverse_angle) {
                    Some(tp) => {
                        self.add_special(level, Special::Teleport(tp));
                        true
                    }
                    None => false,
                }
            }
            TriggerKind::LightsOn { value } => {
                let sectors = level.sectors_with_tag(line_tag);
                for &s in &sectors {
                    level.sectors[s].lightlevel = if value == 0 {
                        level.find_max_light_surrounding(s, 0)
                    } else {
                        value
                    };
                }
                !sectors.is_empty()
            }
            TriggerKind::LightsOff => {
                let sectors = level.sectors_with_tag(line_tag);
                for &s in &sectors {
                    let own = level.sectors[s].lightlevel;
                    level.sectors[s].lightlevel = level.find_min_light_surrounding(s, own);
                }
                !sectors.is_empty()
            }
            TriggerKind::LightFade { target, step } => {
                let mut success = false;
                for s in level.sectors_with_tag(line_tag) {
                    self.add_special(level, Special::LightChange(LightChange::new(s, target, step)));
                    success = true;
                }
                success
            }
            TriggerKind::StartStrobe { dark_time, in_sync } => {
                let mut success = false;
                for s in level.sectors_with_tag(line_tag) {
                    let strobe = StrobeFlash::new(level, s, dark_time, in_sync);
                    self.add_special(level, Special::StrobeFlash(strobe));
                    success = true;
                }
                success
            }
            TriggerKind::ExitLevel => {
                level.do_exit_level();
                true
            }
            TriggerKind::SecretExitLevel => {
                level.do_secret_exit_level();
                true
            }
            TriggerKind::DelayedExit { tics, secret } => {
                self.add_special(level, Special::Exit(ExitCountdown::new(tics, secret)));
                true
            }
        }
    }

    /// Sectors a trigger fans out over: the tagged set, or for a `Use`
    /// press on an untagged line, the sector behind the line (manual door).
    fn target_sectors(&self, level: &Level, trigger: &Trigger) -> Vec<SectorId> {
        let line = &level.lines[trigger.line];
        if line.tag != 0 {
            level.sectors_with_tag(line.tag)
        } else if trigger.context == ActivationContext::Use {
            line.back_sector.into_iter().collect()
        } else {
            Vec::new()
        }
    }

    fn start_movers<F>(
        &mut self,
        level: &mut Level,
        trigger: &Trigger,
        plane: PlaneKind,
        reusable: bool,
        mut build: F,
    ) -> bool
    where
        F: FnMut(&mut Level, SectorId) -> Option<Special>,
    {
        let mut success = false;
        for sector in self.target_sectors(level, trigger) {
            if let Some(owner) = level.sectors[sector].owner(plane) {
                // Pressing a held door again sends it back early.
                if reusable && trigger.context == ActivationContext::Use {
                    if let Some(Special::Mover(m)) = self.registry.get_mut(owner) {
                        if m.use_activate() {
                            success = true;
                        }
                    }
                }
                continue;
            }
            if let Some(special) = build(level, sector) {
                self.add_special(level, special);
                success = true;
            }
        }
        success
    }

    fn start_elevators<F>(&mut self, level: &mut Level, trigger: &Trigger, build: F) -> bool
    where
        F: Fn(&Level, SectorId) -> Elevator,
    {
        let mut success = false;
        for sector in self.target_sectors(level, trigger) {
            if level.sectors[sector].is_moving() {
                continue;
            }
            let elevator = build(level, sector);
            self.add_special(level, Special::Elevator(elevator));
            success = true;
        }
        success
    }

    /// Remove every registered special the predicate matches whose sector
    /// carries the given tag.
    fn stop_matching<F>(&mut self, level: &mut Level, pred: F, tag: i16) -> bool
    where
        F: Fn(&Special) -> bool,
    {
        let keys: Vec<SpecialKey> = self
            .registry
            .iter()
            .filter(|(_, s)| {
                pred(s)
                    && match s {
                        Special::Mover(m) => level.sectors[m.sector()].tag == tag,
                        Special::Elevator(e) => level.sectors[e.sector()].tag == tag,
                        _ => false,
                    }
            })
            .map(|(k, _)| k)
            .collect();
        let mut any = false;
        for key in keys {
            if self.remove(level, key) {
                any = true;
            }
        }
        any
    }

    /// Consume map-placed sector and line specials at level start: ambient
    /// light effects, the timed doors, and wall scrollers.
    pub fn spawn_level_specials(&mut self, level: &mut Level) {
        for sector in 0..level.sectors.len() {
            let special = level.sectors[sector].special;
            match special {
                0 => {}
                1 => {
                    let flash = LightFlash::new(level, sector);
                    self.add_special(level, Special::LightFlash(flash));
                }
                2 => {
                    let strobe = StrobeFlash::new(level, sector, FASTDARK, false);
                    self.add_special(level, Special::StrobeFlash(strobe));
                }
                3 => {
                    let strobe = StrobeFlash::new(level, sector, SLOWDARK, false);
                    self.add_special(level, Special::StrobeFlash(strobe));
                }
                8 => {
                    let glow = Glow::new(level, sector);
                    self.add_special(level, Special::Glow(glow));
                }
                10 => {
                    let door = door_close(level, sector, SpeedCode::NORMAL.units());
                    self.add_special(
                        level,
                        Special::Delayed(DelayedSpawn::new(TICRATE * 30, Special::Mover(door))),
                    );
                }
                12 => {
                    let strobe = StrobeFlash::new(level, sector, SLOWDARK, true);
                    self.add_special(level, Special::StrobeFlash(strobe));
                }
                13 => {
                    let strobe = StrobeFlash::new(level, sector, FASTDARK, true);
                    self.add_special(level, Special::StrobeFlash(strobe));
                }
                14 => {
                    let door =
                        door_open_close(level, sector, SpeedCode::NORMAL.units(), VDOORWAIT);
                    self.add_special(
                        level,
                        Special::Delayed(DelayedSpawn::new(TICRATE * 300, Special::Mover(door))),
                    );
                }
                17 => {
                    let fire = FireFlicker::new(level, sector);
                    self.add_special(level, Special::FireFlicker(fire));
                }
                unknown => {
                    log::debug!("Sector {sector} has unhandled special {unknown}");
                }
            }
        }
        for line in 0..level.lines.len() {
            // The classic animated-wall special.
            if level.lines[line].special == 48 {
                let side = level.lines[line].front_sidedef;
                self.add_special(
                    level,
                    Special::Scroll(Scroller::side(side, Vec2::new(1.0, 0.0))),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mover::FreeMove;
    use crate::map_defs::{LineDef, Sector, SideDef};
    use crate::random::Random;
    use std::sync::mpsc::channel;

    /// Switch line 0 (tag 1) in room 0, door sector 1 tagged 1 recessed
    /// under room 0.
    fn door_level() -> Level {
        let mut room = Sector::new(0, 0, 0.0, 96.0, 160);
        let mut door = Sector::new(1, 1, 0.0, 0.0, 160);
        room.lines.push(0);
        door.lines.push(0);
        let mut line = LineDef::new(0, 1, 0, 0);
        line.back_sector = Some(1);
        line.back_sidedef = Some(1);
        let (tx, _rx) = channel();
        Level::new(
            vec![room, door],
            vec![line],
            vec![SideDef::new(0), SideDef::new(1)],
            Vec::new(),
            Random::new(),
            tx,
        )
    }

    fn door_trigger(repeatable: bool) -> Trigger {
        Trigger {
            line: 0,
            kind: TriggerKind::DoorOpenClose {
                speed: SpeedCode::SLOW,
                delay: VDOORWAIT,
            },
            context: ActivationContext::Use,
            repeatable,
        }
    }

    #[test]
    fn activation_registers_and_claims() {
        let mut level = door_level();
        let mut manager = SpecialManager::new();
        assert!(manager.try_activate(&mut level, &door_trigger(true), None));
        assert_eq!(manager.active_count(), 1);
        assert!(level.sectors[1].owner(PlaneKind::Ceiling).is_some());
        // Same trigger again: the door plane is owned and not yet waiting,
        // so nothing takes effect.
        assert!(!manager.try_activate(&mut level, &door_trigger(true), None));
    }

    #[test]
    fn non_repeatable_line_fires_once() {
        let mut level = door_level();
        let mut manager = SpecialManager::new();
        let trigger = door_trigger(false);
        assert!(manager.try_activate(&mut level, &trigger, None));
        let mut resolver = FreeMove;
        // Run the door to completion.
        for _ in 0..500 {
            manager.ticker(&mut level, &mut resolver);
        }
        assert_eq!(manager.active_count(), 0);
        assert!(!manager.try_activate(&mut level, &trigger, None));
    }

    #[test]
    fn new_special_first_ticks_next_world_tick() {
        let mut level = door_level();
        let mut manager = SpecialManager::new();
        let mut resolver = FreeMove;
        manager.ticker(&mut level, &mut resolver);
        manager.try_activate(&mut level, &door_trigger(true), None);
        assert_eq!(level.sectors[1].ceiling.z, 0.0);
        manager.ticker(&mut level, &mut resolver);
        assert_eq!(level.sectors[1].ceiling.z, 2.0);
    }

    #[test]
    fn use_during_hold_sends_door_back() {
        let mut level = door_level();
        let mut manager = SpecialManager::new();
        let mut resolver = FreeMove;
        let trigger = door_trigger(true);
        manager.try_activate(&mut level, &trigger, None);
        // 46 ticks: the door tops out at 92 and starts its hold.
        for _ in 0..47 {
            manager.ticker(&mut level, &mut resolver);
        }
        assert_eq!(level.sectors[1].ceiling.z, 92.0);
        // Press again: the hold is cancelled, the door closes.
        assert!(manager.try_activate(&mut level, &trigger, None));
        for _ in 0..47 {
            manager.ticker(&mut level, &mut resolver);
        }
        assert_eq!(level.sectors[1].ceiling.z, 0.0);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn locked_door_requires_key() {
        let mut level = door_level();
        let mut thing = crate::map_defs::Thing::new(0, Vec2::ZERO, 0.0, 0);
        thing.player = true;
        level.things.push(thing);
        level.sectors[0].things.push(0);
        let mut manager = SpecialManager::new();
        let trigger = Trigger {
            line: 0,
            kind: TriggerKind::DoorLockedOpenClose {
                speed: SpeedCode::SLOW,
                delay: VDOORWAIT,
                key: KeyCard::Blue,
            },
            context: ActivationContext::Use,
            repeatable: true,
        };
        assert!(!manager.try_activate(&mut level, &trigger, Some(0)));
        level.things[0].keys[KeyCard::Blue as usize] = true;
        assert!(manager.try_activate(&mut level, &trigger, Some(0)));
    }

    #[test]
    fn crusher_stop_removes_only_tagged_crushers() {
        let mut level = door_level();
        let mut manager = SpecialManager::new();
        let crush = Trigger {
            line: 0,
            kind: TriggerKind::CeilingCrusher {
                speed: SpeedCode::SLOW,
                damage: 10,
                mode: CrushMode::Hold,
                return_factor: 1.0,
            },
            context: ActivationContext::Use,
            repeatable: true,
        };
        assert!(manager.try_activate(&mut level, &crush, None));
        assert_eq!(manager.active_count(), 1);
        let stop = Trigger {
            line: 0,
            kind: TriggerKind::CrusherStop,
            context: ActivationContext::Use,
            repeatable: true,
        };
        assert!(manager.try_activate(&mut level, &stop, None));
        assert_eq!(manager.active_count(), 0);
        assert!(level.sectors[1].owner(PlaneKind::Ceiling).is_none());
    }

    #[test]
    fn spawn_level_specials_consumes_map_codes() {
        let mut level = door_level();
        level.sectors[0].special = 8;
        level.lines[0].special = 48;
        let mut manager = SpecialManager::new();
        manager.spawn_level_specials(&mut level);
        assert_eq!(manager.active_count(), 2);
    }
}
