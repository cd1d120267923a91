//! Floor mover constructors: raises, lowers, the crushing raise, and the
//! donut (pillar sinks while the surrounding ring rises and retextures).

use sound_traits::SfxName;

use crate::env::mover::{
    CrushData, CrushMode, MoveData, MoveDirection, Repetition, SectorMover, SectorSound,
    TexChange,
};
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId};

/// Headroom a crushing floor raise leaves below the ceiling.
pub const FLOOR_CRUSH_GAP: f32 = 8.0;

fn floor_sound() -> SectorSound {
    SectorSound {
        start: None,
        ret: None,
        stop: Some(SfxName::Pstop),
        movement: Some(SfxName::Stnmov),
    }
}

fn floor_mover(
    sector: SectorId,
    direction: MoveDirection,
    speed: f32,
    start: f32,
    dest: f32,
    crush: Option<CrushData>,
    change: Option<TexChange>,
) -> SectorMover {
    SectorMover::new(
        sector,
        MoveData {
            plane: PlaneKind::Floor,
            start_direction: direction,
            repetition: Repetition::None,
            speed,
            delay: 0,
            crush,
            change,
        },
        start,
        dest,
        floor_sound(),
    )
}

pub fn floor_lower_to_lowest(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let dest = level.find_lowest_floor_surrounding(sector).min(start);
    floor_mover(sector, MoveDirection::Down, speed, start, dest, None, None)
}

/// Lower to the highest neighbouring floor, `adjust` units above it. Used
/// with a positive adjust for the turbo lower that leaves a step.
pub fn floor_lower_to_highest(
    level: &Level,
    sector: SectorId,
    speed: f32,
    adjust: f32,
) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let dest = (level.find_highest_floor_surrounding(sector) + adjust).min(start);
    floor_mover(sector, MoveDirection::Down, speed, start, dest, None, None)
}

pub fn floor_lower_to_nearest(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let dest = level.find_next_lowest_floor(sector);
    floor_mover(sector, MoveDirection::Down, speed, start, dest, None, None)
}

pub fn floor_raise_to_lowest_ceiling(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let dest = level
        .find_lowest_ceiling_surrounding(sector)
        .min(level.sectors[sector].ceiling.z)
        .max(start);
    floor_mover(sector, MoveDirection::Up, speed, start, dest, None, None)
}

pub fn floor_raise_to_nearest(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let dest = level.find_next_highest_floor(sector);
    floor_mover(sector, MoveDirection::Up, speed, start, dest, None, None)
}

pub fn floor_raise_by(level: &Level, sector: SectorId, speed: f32, amount: f32) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    floor_mover(
        sector,
        MoveDirection::Up,
        speed,
        start,
        start + amount,
        None,
        None,
    )
}

/// Raise by a fixed amount and adopt a new flat and sector special on
/// arrival.
pub fn floor_raise_and_change(
    level: &Level,
    sector: SectorId,
    speed: f32,
    amount: f32,
    change: TexChange,
) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    floor_mover(
        sector,
        MoveDirection::Up,
        speed,
        start,
        start + amount,
        None,
        Some(change),
    )
}

/// Raise toward the ceiling, squeezing anything caught in between.
pub fn floor_raise_and_crush(
    level: &Level,
    sector: SectorId,
    speed: f32,
    damage: i32,
    mode: CrushMode,
) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let dest = (level
        .find_lowest_ceiling_surrounding(sector)
        .min(level.sectors[sector].ceiling.z)
        - FLOOR_CRUSH_GAP)
        .max(start);
    floor_mover(
        sector,
        MoveDirection::Up,
        speed,
        start,
        dest,
        Some(CrushData::new(mode, damage)),
        None,
    )
}

/// The donut: the tagged pillar sector sinks to the floor of the model
/// sector two rings out, while the ring between them rises to the same
/// height and takes the model's flat. Returns `None` when the geometry
/// around the pillar does not form a donut.
pub fn donut(
    level: &Level,
    pillar: SectorId,
    lower_speed: f32,
    raise_speed: f32,
) -> Option<(SectorMover, SectorMover)> {
    // First two-sided line off the pillar leads to the ring.
    let ring = level.sectors[pillar]
        .lines
        .iter()
        .find_map(|&l| level.lines[l].opposite(pillar))?;
    // First line off the ring that does not lead back to the pillar leads
    // to the model sector.
    let model = level.sectors[ring]
        .lines
        .iter()
        .find_map(|&l| match level.lines[l].opposite(ring) {
            Some(s) if s != pillar => Some(s),
            _ => None,
        })?;

    let dest = level.sectors[model].floor.z;
    let pillar_mover = floor_mover(
        pillar,
        MoveDirection::Down,
        lower_speed,
        level.sectors[pillar].floor.z,
        dest,
        None,
        None,
    );
    let ring_mover = floor_mover(
        ring,
        MoveDirection::Up,
        raise_speed,
        level.sectors[ring].floor.z,
        dest,
        None,
        Some(TexChange {
            texture: level.sectors[model].floor.texture,
            special: Some(level.sectors[model].special),
        }),
    );
    Some((pillar_mover, ring_mover))
}
