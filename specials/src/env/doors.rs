//! Door constructors. A door is a ceiling mover whose up-travel ends just
//! below the lowest neighbouring ceiling, so the door never pokes out of its
//! recess.

use sound_traits::SfxName;

use crate::env::mover::{
    MoveData, MoveDirection, Repetition, SectorMover, SectorSound,
};
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId};

/// Gap left between an open door and the lowest surrounding ceiling.
pub const DOOR_RAISE_GAP: f32 = 4.0;
/// Speed at and above which doors use the blazing sound set.
const BLAZE_SPEED: f32 = 8.0;

fn door_sound(speed: f32, closing: bool) -> SectorSound {
    let blaze = speed >= BLAZE_SPEED;
    SectorSound {
        start: Some(match (blaze, closing) {
            (false, false) => SfxName::Doropn,
            (false, true) => SfxName::Dorcls,
            (true, false) => SfxName::Bdopn,
            (true, true) => SfxName::Bdcls,
        }),
        ret: Some(if blaze { SfxName::Bdcls } else { SfxName::Dorcls }),
        stop: None,
        movement: None,
    }
}

fn open_dest(level: &Level, sector: SectorId) -> f32 {
    level.find_lowest_ceiling_surrounding(sector) - DOOR_RAISE_GAP
}

/// Open, hold for `delay` ticks, close again.
pub fn door_open_close(level: &Level, sector: SectorId, speed: f32, delay: u32) -> SectorMover {
    let start = level.sectors[sector].ceiling.z;
    SectorMover::new(
        sector,
        MoveData {
            plane: PlaneKind::Ceiling,
            start_direction: MoveDirection::Up,
            repetition: Repetition::DelayReturn,
            speed,
            delay,
            crush: None,
            change: None,
        },
        start,
        open_dest(level, sector),
        door_sound(speed, false),
    )
}

/// Open and stay open.
pub fn door_open_stay(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].ceiling.z;
    SectorMover::new(
        sector,
        MoveData {
            plane: PlaneKind::Ceiling,
            start_direction: MoveDirection::Up,
            repetition: Repetition::None,
            speed,
            delay: 0,
            crush: None,
            change: None,
        },
        start,
        open_dest(level, sector),
        door_sound(speed, false),
    )
}

/// Close and stay closed.
pub fn door_close(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].ceiling.z;
    let floor = level.sectors[sector].floor.z;
    SectorMover::new(
        sector,
        MoveData {
            plane: PlaneKind::Ceiling,
            start_direction: MoveDirection::Down,
            repetition: Repetition::None,
            speed,
            delay: 0,
            crush: None,
            change: None,
        },
        start,
        floor,
        door_sound(speed, true),
    )
}

/// Close, hold shut for `delay` ticks, open back to where it started.
pub fn door_close_wait_open(level: &Level, sector: SectorId, speed: f32, delay: u32) -> SectorMover {
    let start = level.sectors[sector].ceiling.z;
    let floor = level.sectors[sector].floor.z;
    SectorMover::new(
        sector,
        MoveData {
            plane: PlaneKind::Ceiling,
            start_direction: MoveDirection::Down,
            repetition: Repetition::DelayReturn,
            speed,
            delay,
            crush: None,
            change: None,
        },
        start,
        floor,
        door_sound(speed, true),
    )
}
