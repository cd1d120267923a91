//! Ceiling mover constructors, including the perpetual crusher.

use sound_traits::SfxName;

use crate::env::mover::{
    CrushData, CrushMode, MoveData, MoveDirection, Repetition, SectorMover, SectorSound,
};
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId};

/// How far above the floor a crusher's down-stroke stops.
pub const CRUSH_GAP: f32 = 8.0;

fn ceiling_sound() -> SectorSound {
    SectorSound {
        start: None,
        ret: None,
        stop: Some(SfxName::Pstop),
        movement: Some(SfxName::Stnmov),
    }
}

pub fn ceiling_lower_to_floor(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].ceiling.z;
    let dest = level.sectors[sector].floor.z;
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
        dest,
        ceiling_sound(),
    )
}

pub fn ceiling_raise_to_highest(level: &Level, sector: SectorId, speed: f32) -> SectorMover {
    let start = level.sectors[sector].ceiling.z;
    let dest = level.find_highest_ceiling_surrounding(sector).max(start);
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
        dest,
        ceiling_sound(),
    )
}

/// The classic crusher: drop to `CRUSH_GAP` above the floor, squeeze, rise
/// back to the start height, repeat until stopped. `return_factor` scales
/// the upward leg (0.5 for slow-return crushers).
pub fn ceiling_crusher(
    level: &Level,
    sector: SectorId,
    speed: f32,
    damage: i32,
    mode: CrushMode,
    return_factor: f32,
) -> SectorMover {
    let start = level.sectors[sector].ceiling.z;
    let dest = (level.sectors[sector].floor.z + CRUSH_GAP).min(start);
    let mut crush = CrushData::new(mode, damage);
    crush.return_factor = return_factor;
    SectorMover::new(
        sector,
        MoveData {
            plane: PlaneKind::Ceiling,
            start_direction: MoveDirection::Down,
            repetition: Repetition::Perpetual,
            speed,
            delay: 0,
            crush: Some(crush),
            change: None,
        },
        start,
        dest,
        ceiling_sound(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mover::{FreeMove, MoveResolver, MoveResult};
    use crate::env::TickStatus;
    use crate::map_defs::Sector;
    use crate::random::Random;
    use std::sync::mpsc::channel;

    fn one_room() -> Level {
        let (tx, _rx) = channel();
        Level::new(
            vec![Sector::new(0, 1, 0.0, 72.0, 160)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Random::new(),
            tx,
        )
    }

    #[test]
    fn crusher_bounces_between_gap_and_start() {
        let mut level = one_room();
        let mut resolver = FreeMove;
        let mut crusher = ceiling_crusher(&level, 0, 8.0, 10, CrushMode::Hold, 1.0);
        let mut lowest = f32::MAX;
        let mut highest = f32::MIN;
        for _ in 0..64 {
            assert_eq!(
                crusher.tick(&mut level, &mut resolver),
                TickStatus::Continue
            );
            let z = level.sectors[0].ceiling.z;
            lowest = lowest.min(z);
            highest = highest.max(z);
        }
        assert_eq!(lowest, 8.0);
        assert_eq!(highest, 72.0);
    }

    /// Resolver that reports crushing whenever the ceiling dips into the
    /// band a victim occupies.
    struct Victim {
        head_z: f32,
    }

    impl MoveResolver for Victim {
        fn move_plane(
            &mut self,
            level: &mut Level,
            sector: usize,
            plane: crate::map_defs::PlaneKind,
            _speed: f32,
            dest_z: f32,
            crush: Option<CrushData>,
            direction: MoveDirection,
        ) -> MoveResult {
            level.sectors[sector].plane_mut(plane).z = dest_z;
            if direction == MoveDirection::Down && dest_z < self.head_z && crush.is_some() {
                MoveResult::Crushing
            } else {
                MoveResult::Success
            }
        }
    }

    #[test]
    fn slowdown_crusher_crawls_then_recovers_on_flip() {
        let mut level = one_room();
        let mut resolver = Victim { head_z: 56.0 };
        let mut crusher = ceiling_crusher(&level, 0, 8.0, 10, CrushMode::SlowDown, 1.0);
        crusher.tick(&mut level, &mut resolver); // 64
        crusher.tick(&mut level, &mut resolver); // 56, still clear
        crusher.tick(&mut level, &mut resolver); // 48, crushing starts
        assert!(crusher.crushing);
        let before = level.sectors[0].ceiling.z;
        crusher.tick(&mut level, &mut resolver);
        // Crawling at the slow crush speed now.
        assert!((before - level.sectors[0].ceiling.z).abs() < 1.0);
        // Drive it to the bottom and let it flip; full speed resumes.
        for _ in 0..1000 {
            crusher.tick(&mut level, &mut resolver);
            if level.sectors[0].ceiling.z == 8.0 {
                break;
            }
        }
        crusher.tick(&mut level, &mut resolver);
        assert!(!crusher.crushing);
        assert_eq!(level.sectors[0].ceiling.z, 16.0);
    }
}
