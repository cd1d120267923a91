//! Elevators move a sector's floor and ceiling together, keeping the cab
//! height constant. The plane that can hit riders first leads (ceiling going
//! up, floor going down) and consults the resolver; the trailing plane
//! mirrors whatever distance the lead actually covered.

use sound_traits::SfxName;

use crate::env::mover::{
    MoveData, MoveDirection, MoveResolver, MoveResult, Repetition, SectorMover, SectorSound,
};
use crate::env::TickStatus;
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId};
use crate::registry::SpecialKey;

#[derive(Debug, Clone)]
pub struct Elevator {
    pub(crate) lead: SectorMover,
    pub(crate) trail_plane: PlaneKind,
}

impl Elevator {
    fn new(level: &Level, sector: SectorId, speed: f32, floor_dest: f32) -> Self {
        let floor_z = level.sectors[sector].floor.z;
        let direction = if floor_dest > floor_z {
            MoveDirection::Up
        } else {
            MoveDirection::Down
        };
        let gap = level.sectors[sector].ceiling.z - floor_z;
        let (lead_plane, trail_plane, start, dest) = match direction {
            MoveDirection::Up => (
                PlaneKind::Ceiling,
                PlaneKind::Floor,
                floor_z + gap,
                floor_dest + gap,
            ),
            MoveDirection::Down => (PlaneKind::Floor, PlaneKind::Ceiling, floor_z, floor_dest),
        };
        let lead = SectorMover::new(
            sector,
            MoveData {
                plane: lead_plane,
                start_direction: direction,
                repetition: Repetition::None,
                speed,
                delay: 0,
                crush: None,
                change: None,
            },
            start,
            dest,
            SectorSound {
                start: Some(SfxName::Pstart),
                ret: None,
                stop: Some(SfxName::Pstop),
                movement: Some(SfxName::Stnmov),
            },
        );
        Self { lead, trail_plane }
    }

    /// Cab rises until the floor reaches the next higher neighbouring floor.
    pub fn raise_to_nearest(level: &Level, sector: SectorId, speed: f32) -> Self {
        let dest = level.find_next_highest_floor(sector);
        Self::new(level, sector, speed, dest)
    }

    /// Cab descends until the floor reaches the next lower neighbouring
    /// floor.
    pub fn lower_to_nearest(level: &Level, sector: SectorId, speed: f32) -> Self {
        let dest = level.find_next_lowest_floor(sector);
        Self::new(level, sector, speed, dest)
    }

    pub fn sector(&self) -> SectorId {
        self.lead.sector()
    }

    /// Both planes are claimed; nothing else may drive this sector while
    /// the cab is in motion.
    pub fn claim(&mut self, level: &mut Level, key: SpecialKey) {
        let sector = &mut level.sectors[self.lead.sector()];
        sector.set_owner(PlaneKind::Floor, Some(key));
        sector.set_owner(PlaneKind::Ceiling, Some(key));
    }

    pub fn tick(&mut self, level: &mut Level, resolver: &mut dyn MoveResolver) -> TickStatus {
        let sector = self.lead.sector();
        let lead_plane = self.lead.plane();

        let before = level.sectors[sector].plane(lead_plane).z;
        let status = self.lead.tick(level, resolver);
        let delta = level.sectors[sector].plane(lead_plane).z - before;

        let trail = level.sectors[sector].plane_mut(self.trail_plane);
        trail.prev_z = trail.z;
        if delta != 0.0 {
            let dest = trail.z + delta;
            let result = resolver.move_plane(
                level,
                sector,
                self.trail_plane,
                delta,
                dest,
                None,
                self.lead.direction(),
            );
            // The trailing plane faces away from riders; a refusal here
            // means level geometry, so hold the whole cab this tick.
            if result == MoveResult::Blocked {
                let lead = level.sectors[sector].plane_mut(lead_plane);
                lead.z = before;
                return TickStatus::Continue;
            }
        }
        status
    }

    pub fn finalize(&mut self, level: &mut Level) {
        let sector = &mut level.sectors[self.lead.sector()];
        sector.set_owner(PlaneKind::Floor, None);
        sector.set_owner(PlaneKind::Ceiling, None);
        sector.floor.prev_z = sector.floor.z;
        sector.ceiling.prev_z = sector.ceiling.z;
        level.start_sector_sound(self.lead.sector(), SfxName::Pstop, false);
    }
}
