//! Lifts and perpetual platforms: floor movers with the platform sound set.

use sound_traits::SfxName;

use crate::env::mover::{
    MoveData, MoveDirection, Repetition, SectorMover, SectorSound,
};
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId};

fn plat_sound() -> SectorSound {
    SectorSound {
        start: Some(SfxName::Pstart),
        ret: Some(SfxName::Pstart),
        stop: Some(SfxName::Pstop),
        movement: None,
    }
}

/// The standard lift: drop to the lowest surrounding floor, wait, rise back.
pub fn lift_down_wait_up(level: &Level, sector: SectorId, speed: f32, delay: u32) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let dest = level.find_lowest_floor_surrounding(sector).min(start);
    SectorMover::new(
        sector,
        MoveData {
            plane: PlaneKind::Floor,
            start_direction: MoveDirection::Down,
            repetition: Repetition::DelayReturn,
            speed,
            delay,
            crush: None,
            change: None,
        },
        start,
        dest,
        plat_sound(),
    )
}

/// A platform that bounces between the lowest and highest surrounding
/// floors until stopped, holding `delay` ticks at each end. The first
/// direction comes off the level RNG so banks of platforms desynchronise.
pub fn plat_perpetual(
    level: &mut Level,
    sector: SectorId,
    speed: f32,
    delay: u32,
    lip: f32,
) -> SectorMover {
    let start = level.sectors[sector].floor.z;
    let low = (level.find_lowest_floor_surrounding(sector) + lip).min(start);
    let high = level.find_highest_floor_surrounding(sector).max(start);
    let start_direction = if level.rng.p_random() & 1 == 0 {
        MoveDirection::Down
    } else {
        MoveDirection::Up
    };
    SectorMover::with_range(
        sector,
        MoveData {
            plane: PlaneKind::Floor,
            start_direction,
            repetition: Repetition::Perpetual,
            speed,
            delay,
            crush: None,
            change: None,
        },
        start,
        low,
        high,
        plat_sound(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mover::FreeMove;
    use crate::env::TickStatus;
    use crate::map_defs::{LineDef, Sector, SideDef};
    use crate::random::Random;
    use std::sync::mpsc::channel;

    /// Lift sector 0 at 64 with a pit neighbour at 0 and a ledge at 96.
    fn lift_level() -> Level {
        let mut lift = Sector::new(0, 1, 64.0, 192.0, 160);
        let mut pit = Sector::new(1, 0, 0.0, 192.0, 160);
        let mut ledge = Sector::new(2, 0, 96.0, 192.0, 160);
        lift.lines.push(0);
        lift.lines.push(1);
        pit.lines.push(0);
        ledge.lines.push(1);
        let mut l0 = LineDef::new(0, 1, 0, 0);
        l0.back_sector = Some(1);
        l0.back_sidedef = Some(1);
        let mut l1 = LineDef::new(1, 0, 0, 2);
        l1.back_sector = Some(2);
        l1.back_sidedef = Some(3);
        let (tx, _rx) = channel();
        Level::new(
            vec![lift, pit, ledge],
            vec![l0, l1],
            vec![
                SideDef::new(0),
                SideDef::new(1),
                SideDef::new(0),
                SideDef::new(2),
            ],
            Vec::new(),
            Random::new(),
            tx,
        )
    }

    #[test]
    fn lift_full_cycle() {
        let mut level = lift_level();
        let mut resolver = FreeMove;
        let mut lift = lift_down_wait_up(&level, 0, 4.0, 105);
        let mut tics = 0u32;
        loop {
            tics += 1;
            if lift.tick(&mut level, &mut resolver) == TickStatus::Destroy {
                break;
            }
            assert!(tics < 1000);
        }
        // 16 down + 105 wait + 16 up.
        assert_eq!(tics, 137);
        assert_eq!(level.sectors[0].floor.z, 64.0);
    }

    #[test]
    fn perpetual_band_spans_neighbour_floors() {
        let mut level = lift_level();
        let plat = plat_perpetual(&mut level, 0, 4.0, 35, 0.0);
        assert_eq!(plat.min_z, 0.0);
        assert_eq!(plat.max_z, 96.0);
        let mut resolver = FreeMove;
        let mut plat = plat;
        // Never terminates on its own.
        for _ in 0..500 {
            assert_eq!(plat.tick(&mut level, &mut resolver), TickStatus::Continue);
        }
    }
}
