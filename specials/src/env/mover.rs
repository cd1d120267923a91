//! The generic sector-plane mover. Doors, lifts, floors, ceilings and
//! crushers are all this one state machine with different construction data:
//! a plane, a start direction, a repetition policy, a speed, and optionally
//! crush behaviour and a completion texture change.
//!
//! The travel band `[min_z, max_z]` is fixed at construction. The mover only
//! ever asks the [`MoveResolver`] to move the plane; it never writes heights
//! itself.

use serde::{Deserialize, Serialize};
use sound_traits::SfxName;

use crate::env::TickStatus;
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId};
use crate::registry::SpecialKey;

/// Speed a crusher drops to while meat is in the way.
const CRUSH_SLOW_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn opposite(self) -> Self {
        match self {
            MoveDirection::Up => MoveDirection::Down,
            MoveDirection::Down => MoveDirection::Up,
        }
    }
}

/// What happens when the mover reaches the far end of its travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repetition {
    /// One leg, then done. Blocked movers of this kind push forever.
    None,
    /// Travel, hold for `delay` ticks, return to the start, done.
    DelayReturn,
    /// Bounce between the ends until removed by a stop trigger.
    Perpetual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrushMode {
    /// Keep full speed while crushing.
    Hold,
    /// Drop to a crawl while something is being crushed.
    SlowDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrushData {
    pub mode: CrushMode,
    /// Damage dealt per crush step to each blocking thing.
    pub damage: i32,
    /// Speed multiplier for the leg moving away from the crush direction.
    pub return_factor: f32,
}

impl CrushData {
    pub fn new(mode: CrushMode, damage: i32) -> Self {
        Self {
            mode,
            damage,
            return_factor: 1.0,
        }
    }
}

/// Applied to the sector when the mover finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexChange {
    pub texture: usize,
    /// Replacement sector special, `None` leaves it untouched.
    pub special: Option<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveData {
    pub plane: PlaneKind,
    pub start_direction: MoveDirection,
    pub repetition: Repetition,
    /// Map units per tick, always positive; sign lives on the current leg.
    pub speed: f32,
    /// Hold time at the far end, ticks.
    pub delay: u32,
    pub crush: Option<CrushData>,
    pub change: Option<TexChange>,
}

/// The sound set of a mover. Doors want start/return, lifts want stop
/// thunks, grinding floors want the movement loop. `None` entries are quiet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorSound {
    /// First tick of the outbound leg.
    pub start: Option<SfxName>,
    /// First tick of the return leg.
    pub ret: Option<SfxName>,
    /// Reaching a hold point or being destroyed.
    pub stop: Option<SfxName>,
    /// Every 8th tick while moving.
    pub movement: Option<SfxName>,
}

/// Outcome of a plane move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The plane now sits at the requested height.
    Success,
    /// Something solid stopped the plane; it did not move.
    Blocked,
    /// The plane moved and is squeezing things that could not escape.
    Crushing,
}

/// The collision boundary. The engine funnels every geometric change through
/// this; implementations write the plane's `z` (never `prev_z`, the caller
/// owns interpolation state) and report how the move went.
pub trait MoveResolver {
    fn move_plane(
        &mut self,
        level: &mut Level,
        sector: SectorId,
        plane: PlaneKind,
        speed: f32,
        dest_z: f32,
        crush: Option<CrushData>,
        direction: MoveDirection,
    ) -> MoveResult;
}

/// A resolver with no collision: every move lands exactly where asked.
/// Useful for hosts that do their own overlap handling, and for tests.
#[derive(Debug, Default)]
pub struct FreeMove;

impl MoveResolver for FreeMove {
    fn move_plane(
        &mut self,
        level: &mut Level,
        sector: SectorId,
        plane: PlaneKind,
        _speed: f32,
        dest_z: f32,
        _crush: Option<CrushData>,
        _direction: MoveDirection,
    ) -> MoveResult {
        level.sectors[sector].plane_mut(plane).z = dest_z;
        MoveResult::Success
    }
}

#[derive(Debug, Clone)]
pub struct SectorMover {
    pub(crate) sector: SectorId,
    pub(crate) move_data: MoveData,
    pub(crate) sound: SectorSound,
    pub(crate) start_z: f32,
    pub(crate) dest_z: f32,
    pub(crate) min_z: f32,
    pub(crate) max_z: f32,
    /// Signed units per tick for the current leg.
    pub(crate) speed: f32,
    pub(crate) direction: MoveDirection,
    pub(crate) delay_tics: u32,
    pub(crate) crushing: bool,
    pub(crate) played_start: bool,
    pub(crate) played_return: bool,
    /// Whether the most recent tick was refused by the resolver. Paired
    /// movers use this to hold their companion.
    pub(crate) last_blocked: bool,
}

impl SectorMover {
    /// A mover whose travel band is exactly `start_z..dest_z`.
    pub fn new(sector: SectorId, data: MoveData, start_z: f32, dest_z: f32, sound: SectorSound) -> Self {
        Self::with_range(
            sector,
            data,
            start_z,
            start_z.min(dest_z),
            start_z.max(dest_z),
            sound,
        )
    }

    /// A mover that may start mid-band (perpetual platforms). The first
    /// destination is the band end in the start direction.
    pub fn with_range(
        sector: SectorId,
        data: MoveData,
        start_z: f32,
        min_z: f32,
        max_z: f32,
        sound: SectorSound,
    ) -> Self {
        let (speed, dest_z) = match data.start_direction {
            MoveDirection::Up => (data.speed, max_z),
            MoveDirection::Down => (-data.speed, min_z),
        };
        Self {
            sector,
            move_data: data,
            sound,
            start_z,
            dest_z,
            min_z,
            max_z,
            speed,
            direction: data.start_direction,
            delay_tics: 0,
            crushing: false,
            played_start: false,
            played_return: false,
            last_blocked: false,
        }
    }

    pub fn sector(&self) -> SectorId {
        self.sector
    }

    pub fn plane(&self) -> PlaneKind {
        self.move_data.plane
    }

    pub fn is_crusher(&self) -> bool {
        self.move_data.crush.is_some()
    }

    pub fn repetition(&self) -> Repetition {
        self.move_data.repetition
    }

    pub fn direction(&self) -> MoveDirection {
        self.direction
    }

    pub fn is_waiting(&self) -> bool {
        self.delay_tics > 0
    }

    pub fn claim(&mut self, level: &mut Level, key: SpecialKey) {
        level.sectors[self.sector].set_owner(self.move_data.plane, Some(key));
    }

    /// Use-activation while registered. A waiting reversible mover cuts its
    /// hold short; anything else ignores the press.
    pub fn use_activate(&mut self) -> bool {
        if self.move_data.repetition == Repetition::DelayReturn && self.delay_tics > 0 {
            self.delay_tics = 0;
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self, level: &mut Level, resolver: &mut dyn MoveResolver) -> TickStatus {
        let sector = self.sector;
        let kind = self.move_data.plane;

        if self.delay_tics > 0 {
            let plane = level.sectors[sector].plane_mut(kind);
            plane.prev_z = plane.z;
            self.delay_tics -= 1;
            return TickStatus::Continue;
        }

        self.play_sounds(level);

        let plane = level.sectors[sector].plane_mut(kind);
        plane.prev_z = plane.z;
        let candidate = (plane.z + self.speed).clamp(self.min_z, self.max_z);

        // Crushing is only possible on the leg toward the crush direction.
        let crush = if self.direction == self.move_data.start_direction {
            self.move_data.crush
        } else {
            None
        };
        let status = resolver.move_plane(
            level,
            sector,
            kind,
            self.speed,
            candidate,
            crush,
            self.direction,
        );
        self.last_blocked = status == MoveResult::Blocked;

        match status {
            MoveResult::Blocked => {
                // `None` movers lean on the obstruction until it clears.
                if self.move_data.repetition != Repetition::None {
                    self.flip(level, true);
                }
            }
            MoveResult::Crushing => {
                if let Some(crush) = self.move_data.crush {
                    if crush.mode == CrushMode::SlowDown && !self.crushing {
                        self.crushing = true;
                        self.speed = self.speed.signum() * CRUSH_SLOW_SPEED;
                    }
                }
            }
            MoveResult::Success => {}
        }

        let z = level.sectors[sector].plane(kind).z;
        if z == self.dest_z {
            match self.move_data.repetition {
                Repetition::None => return TickStatus::Destroy,
                Repetition::DelayReturn => {
                    if self.direction != self.move_data.start_direction && z == self.start_z {
                        return TickStatus::Destroy;
                    }
                    self.flip(level, false);
                }
                Repetition::Perpetual => self.flip(level, false),
            }
        }
        TickStatus::Continue
    }

    pub fn finalize(&mut self, level: &mut Level) {
        let sector = &mut level.sectors[self.sector];
        sector.set_owner(self.move_data.plane, None);
        let plane = sector.plane_mut(self.move_data.plane);
        plane.prev_z = plane.z;
        if let Some(change) = self.move_data.change {
            sector.plane_mut(self.move_data.plane).texture = change.texture;
            if let Some(special) = change.special {
                sector.special = special;
            }
        }
        if let Some(sfx) = self.sound.stop {
            level.start_sector_sound(self.sector, sfx, false);
        }
    }

    /// Turn around at an end of travel. Any clean arrival plays the stop
    /// cue; a blocked flip never re-arms the hold delay, only a clean
    /// arrival at the end of the outbound leg does (or any arrival, for
    /// perpetual movers).
    fn flip(&mut self, level: &Level, blocked: bool) {
        let md = &self.move_data;
        if !blocked {
            if let Some(sfx) = self.sound.stop {
                level.start_sector_sound(self.sector, sfx, false);
            }
            if md.repetition == Repetition::Perpetual
                || (md.repetition == Repetition::DelayReturn
                    && self.direction == md.start_direction)
            {
                self.delay_tics = md.delay;
            }
        }

        self.direction = self.direction.opposite();
        self.dest_z = match self.direction {
            MoveDirection::Up => self.max_z,
            MoveDirection::Down => self.min_z,
        };
        self.played_start = false;
        self.played_return = false;
        self.crushing = false;

        let factor = if self.direction == md.start_direction {
            1.0
        } else {
            md.crush.map_or(1.0, |c| c.return_factor)
        };
        self.speed = match self.direction {
            MoveDirection::Up => md.speed * factor,
            MoveDirection::Down => -(md.speed * factor),
        };
    }

    fn play_sounds(&mut self, level: &Level) {
        if self.direction == self.move_data.start_direction {
            if !self.played_start {
                self.played_start = true;
                if let Some(sfx) = self.sound.start {
                    level.start_sector_sound(self.sector, sfx, false);
                }
            }
        } else if !self.played_return {
            self.played_return = true;
            if let Some(sfx) = self.sound.ret {
                level.start_sector_sound(self.sector, sfx, false);
            }
        }
        if let Some(sfx) = self.sound.movement {
            if level.level_time & 7 == 0 {
                level.start_sector_sound(self.sector, sfx, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::map_defs::Sector;
    use crate::random::Random;
    use std::sync::mpsc::channel;

    fn one_room(floor: f32, ceiling: f32) -> Level {
        let (tx, _rx) = channel();
        Level::new(
            vec![Sector::new(0, 0, floor, ceiling, 160)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Random::new(),
            tx,
        )
    }

    fn raise_data(speed: f32, repetition: Repetition, delay: u32) -> MoveData {
        MoveData {
            plane: PlaneKind::Ceiling,
            start_direction: MoveDirection::Up,
            repetition,
            speed,
            delay,
            crush: None,
            change: None,
        }
    }

    #[test]
    fn one_shot_reaches_dest_and_destroys() {
        let mut level = one_room(0.0, 100.0);
        let mut resolver = FreeMove;
        let mut mover = SectorMover::new(
            0,
            raise_data(4.0, Repetition::None, 0),
            100.0,
            110.0,
            SectorSound::default(),
        );
        assert_eq!(mover.tick(&mut level, &mut resolver), TickStatus::Continue);
        assert_eq!(level.sectors[0].ceiling.z, 104.0);
        assert_eq!(mover.tick(&mut level, &mut resolver), TickStatus::Continue);
        // Final partial step clamps to the destination and terminates.
        assert_eq!(mover.tick(&mut level, &mut resolver), TickStatus::Destroy);
        assert_eq!(level.sectors[0].ceiling.z, 110.0);
    }

    #[test]
    fn zero_distance_mover_destroys_first_tick() {
        let mut level = one_room(0.0, 100.0);
        let mut resolver = FreeMove;
        let mut mover = SectorMover::new(
            0,
            raise_data(4.0, Repetition::None, 0),
            100.0,
            100.0,
            SectorSound::default(),
        );
        assert_eq!(mover.tick(&mut level, &mut resolver), TickStatus::Destroy);
    }

    #[test]
    fn delay_return_holds_then_returns_to_start() {
        let mut level = one_room(0.0, 100.0);
        let mut resolver = FreeMove;
        let mut mover = SectorMover::new(
            0,
            raise_data(4.0, Repetition::DelayReturn, 3),
            100.0,
            108.0,
            SectorSound::default(),
        );
        // Two ticks up, arrival flips and arms the hold.
        mover.tick(&mut level, &mut resolver);
        mover.tick(&mut level, &mut resolver);
        assert_eq!(level.sectors[0].ceiling.z, 108.0);
        assert!(mover.is_waiting());
        for _ in 0..3 {
            assert_eq!(mover.tick(&mut level, &mut resolver), TickStatus::Continue);
            assert_eq!(level.sectors[0].ceiling.z, 108.0);
        }
        // Two ticks back down, then done at the exact start height.
        mover.tick(&mut level, &mut resolver);
        assert_eq!(mover.tick(&mut level, &mut resolver), TickStatus::Destroy);
        assert_eq!(level.sectors[0].ceiling.z, 100.0);
    }

    #[test]
    fn use_during_hold_cuts_wait_short() {
        let mut level = one_room(0.0, 100.0);
        let mut resolver = FreeMove;
        let mut mover = SectorMover::new(
            0,
            raise_data(4.0, Repetition::DelayReturn, 50),
            100.0,
            104.0,
            SectorSound::default(),
        );
        mover.tick(&mut level, &mut resolver);
        assert!(mover.is_waiting());
        assert!(mover.use_activate());
        // Not waiting anymore, and a second press does nothing.
        assert!(!mover.use_activate());
        mover.tick(&mut level, &mut resolver);
        assert_eq!(level.sectors[0].ceiling.z, 100.0);
    }

    struct BlockBelow {
        limit: f32,
    }

    impl MoveResolver for BlockBelow {
        fn move_plane(
            &mut self,
            level: &mut Level,
            sector: SectorId,
            plane: PlaneKind,
            _speed: f32,
            dest_z: f32,
            _crush: Option<CrushData>,
            direction: MoveDirection,
        ) -> MoveResult {
            if direction == MoveDirection::Down && dest_z < self.limit {
                return MoveResult::Blocked;
            }
            level.sectors[sector].plane_mut(plane).z = dest_z;
            MoveResult::Success
        }
    }

    #[test]
    fn blocked_return_leg_flips_without_rearming_delay() {
        let mut level = one_room(0.0, 100.0);
        let mut resolver = BlockBelow { limit: 104.0 };
        let mut mover = SectorMover::new(
            0,
            raise_data(4.0, Repetition::DelayReturn, 2),
            100.0,
            108.0,
            SectorSound::default(),
        );
        mover.tick(&mut level, &mut resolver); // 104
        mover.tick(&mut level, &mut resolver); // 108, hold armed
        mover.tick(&mut level, &mut resolver); // hold
        mover.tick(&mut level, &mut resolver); // hold
        mover.tick(&mut level, &mut resolver); // down to 104
        // Next step would pass the obstruction: blocked, flips straight back
        // up with no hold.
        mover.tick(&mut level, &mut resolver);
        assert_eq!(level.sectors[0].ceiling.z, 104.0);
        assert!(!mover.is_waiting());
        assert_eq!(mover.direction(), MoveDirection::Up);
        mover.tick(&mut level, &mut resolver);
        assert_eq!(level.sectors[0].ceiling.z, 108.0);
    }

    struct AlwaysBlocked;

    impl MoveResolver for AlwaysBlocked {
        fn move_plane(
            &mut self,
            _level: &mut Level,
            _sector: SectorId,
            _plane: PlaneKind,
            _speed: f32,
            _dest_z: f32,
            _crush: Option<CrushData>,
            _direction: MoveDirection,
        ) -> MoveResult {
            MoveResult::Blocked
        }
    }

    #[test]
    fn blocked_one_shot_pushes_forever() {
        let mut level = one_room(0.0, 100.0);
        let mut resolver = AlwaysBlocked;
        let mut mover = SectorMover::new(
            0,
            raise_data(4.0, Repetition::None, 0),
            100.0,
            140.0,
            SectorSound::default(),
        );
        for _ in 0..100 {
            assert_eq!(mover.tick(&mut level, &mut resolver), TickStatus::Continue);
        }
        assert_eq!(level.sectors[0].ceiling.z, 100.0);
        assert_eq!(mover.direction(), MoveDirection::Up);
    }

    #[test]
    fn perpetual_mover_plays_stop_cue_at_each_extremum() {
        use sound_traits::SoundAction;

        let (tx, rx) = channel();
        let mut level = Level::new(
            vec![Sector::new(0, 0, 0.0, 100.0, 160)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Random::new(),
            tx,
        );
        let mut resolver = FreeMove;
        let mut mover = SectorMover::new(
            0,
            raise_data(4.0, Repetition::Perpetual, 0),
            100.0,
            108.0,
            SectorSound {
                start: None,
                ret: None,
                stop: Some(SfxName::Pstop),
                movement: None,
            },
        );
        // Two ticks to the top, two back down; both turnarounds audible
        // even though there is no hold delay.
        for _ in 0..4 {
            mover.tick(&mut level, &mut resolver);
        }
        let stops = rx
            .try_iter()
            .filter(|a| {
                matches!(
                    a,
                    SoundAction::StartSfx {
                        sfx: SfxName::Pstop,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(stops, 2);
    }
}
