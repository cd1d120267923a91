//! Texture scrollers. Sidedef scrollers slide wall textures, plane
//! scrollers slide flats, and carrying floor scrollers also push whatever
//! stands on them. Scrollers never terminate on their own.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::env::TickStatus;
use crate::level::Level;
use crate::map_defs::{PlaneKind, SectorId, SideId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScrollTarget {
    Side(SideId),
    Plane(SectorId, PlaneKind),
}

#[derive(Debug, Clone)]
pub struct Scroller {
    pub(crate) target: ScrollTarget,
    /// Offset added per tick.
    pub(crate) speed: Vec2,
    /// Floor scrollers only: push grounded things along.
    pub(crate) carry: bool,
}

impl Scroller {
    pub fn side(side: SideId, speed: Vec2) -> Self {
        Self {
            target: ScrollTarget::Side(side),
            speed,
            carry: false,
        }
    }

    pub fn plane(sector: SectorId, plane: PlaneKind, speed: Vec2, carry: bool) -> Self {
        Self {
            target: ScrollTarget::Plane(sector, plane),
            speed,
            // Only a floor can carry riders.
            carry: carry && plane == PlaneKind::Floor,
        }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        match self.target {
            ScrollTarget::Side(side) => {
                let side = &mut level.sides[side];
                side.prev_offset = side.offset;
                side.offset += self.speed;
            }
            ScrollTarget::Plane(sector, kind) => {
                let plane = level.sectors[sector].plane_mut(kind);
                plane.prev_offset = plane.offset;
                plane.offset += self.speed;
                if self.carry {
                    for t in level.sectors[sector].things.clone() {
                        let thing = &mut level.things[t];
                        if thing.on_ground {
                            thing.momxy += self.speed;
                        }
                    }
                }
            }
        }
        TickStatus::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_defs::{Sector, SideDef, Thing};
    use crate::random::Random;
    use std::sync::mpsc::channel;

    fn scroll_level() -> Level {
        let mut sector = Sector::new(0, 0, 0.0, 128.0, 160);
        sector.things.push(0);
        let mut rider = Thing::new(0, Vec2::new(5.0, 5.0), 0.0, 0);
        rider.on_ground = true;
        let mut floater = Thing::new(1, Vec2::new(6.0, 6.0), 32.0, 0);
        floater.on_ground = false;
        sector.things.push(1);
        let (tx, _rx) = channel();
        Level::new(
            vec![sector],
            Vec::new(),
            vec![SideDef::new(0)],
            vec![rider, floater],
            Random::new(),
            tx,
        )
    }

    #[test]
    fn side_scroller_accumulates_offset() {
        let mut level = scroll_level();
        let mut scroller = Scroller::side(0, Vec2::new(1.0, 0.0));
        for _ in 0..10 {
            assert_eq!(scroller.tick(&mut level), TickStatus::Continue);
        }
        assert_eq!(level.sides[0].offset, Vec2::new(10.0, 0.0));
        assert_eq!(level.sides[0].prev_offset, Vec2::new(9.0, 0.0));
    }

    #[test]
    fn carry_pushes_grounded_riders_only() {
        let mut level = scroll_level();
        let mut scroller =
            Scroller::plane(0, PlaneKind::Floor, Vec2::new(0.5, 0.0), true);
        scroller.tick(&mut level);
        assert_eq!(level.things[0].momxy, Vec2::new(0.5, 0.0));
        assert_eq!(level.things[1].momxy, Vec2::ZERO);
        assert_eq!(level.sectors[0].floor.offset, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn ceiling_scroller_never_carries() {
        let mut level = scroll_level();
        let mut scroller =
            Scroller::plane(0, PlaneKind::Ceiling, Vec2::new(0.5, 0.0), true);
        scroller.tick(&mut level);
        assert_eq!(level.things[0].momxy, Vec2::ZERO);
    }
}
