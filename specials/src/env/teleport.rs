//! One-shot teleport specials. Registered when a thing crosses a teleport
//! line, resolved on the next tick: find the landing spot, telefrag anything
//! solid standing on it, move the thing, freeze it briefly.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use sound_traits::SfxName;

use crate::env::TickStatus;
use crate::level::Level;
use crate::map_defs::ThingId;

/// Post-teleport input freeze.
pub const TELEPORT_FREEZE_TICS: u32 = 18;

/// Where the traveller lands vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeleportZ {
    /// The landing spot's own height (silent line-to-line style).
    SpotZ,
    /// The destination sector's floor (classic pad style).
    DestFloor,
}

#[derive(Debug, Clone)]
pub struct Teleport {
    pub(crate) thing: ThingId,
    /// Landing spot thing id; 0 means unaddressed.
    pub(crate) tid: i16,
    /// Destination sector tag; 0 means unaddressed.
    pub(crate) tag: i16,
    pub(crate) z: TeleportZ,
    pub(crate) reverse_angle: bool,
}

impl Teleport {
    /// `None` when neither a tid nor a tag is given; such a line can never
    /// resolve a landing and the activation fails outright.
    pub fn create(
        thing: ThingId,
        tid: i16,
        tag: i16,
        z: TeleportZ,
        reverse_angle: bool,
    ) -> Option<Self> {
        if tid == 0 && tag == 0 {
            return None;
        }
        Some(Self {
            thing,
            tid,
            tag,
            z,
            reverse_angle,
        })
    }

    /// Landing spot lookup. Tid-only picks the marked spot with that tid;
    /// tag-only picks the first marked spot standing in a tagged sector;
    /// both narrow to the tid inside tagged sectors. Thing order is arena
    /// order, so resolution is deterministic.
    fn find_spot(&self, level: &Level) -> Option<ThingId> {
        level
            .things
            .iter()
            .enumerate()
            .filter(|(_, t)| t.teleport_spot)
            .filter(|(_, t)| self.tid == 0 || t.tid == self.tid)
            .filter(|(_, t)| self.tag == 0 || level.sectors[t.sector].tag == self.tag)
            .map(|(i, _)| i)
            .next()
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        let Some(spot) = self.find_spot(level) else {
            log::debug!(
                "Teleport found no landing for tid {} tag {}",
                self.tid,
                self.tag
            );
            return TickStatus::Destroy;
        };
        if spot == self.thing || self.thing >= level.things.len() {
            return TickStatus::Destroy;
        }

        let dest_sector = level.things[spot].sector;
        let dest_pos = level.things[spot].pos;
        let dest_z = match self.z {
            TeleportZ::SpotZ => level.things[spot].z,
            TeleportZ::DestFloor => level.sectors[dest_sector].floor.z,
        };
        let mut angle = level.things[spot].angle;
        if self.reverse_angle {
            angle += PI;
        }

        // Telefrag whatever solid thing already occupies the pad.
        let radius = level.things[self.thing].radius;
        for i in 0..level.things.len() {
            if i == self.thing {
                continue;
            }
            let other = &level.things[i];
            if !other.shootable || other.health <= 0 {
                continue;
            }
            let gap = other.radius + radius;
            if (other.pos.x - dest_pos.x).abs() < gap && (other.pos.y - dest_pos.y).abs() < gap {
                level.things[i].health = 0;
            }
        }

        // Departure whoosh at the old position, arrival at the new.
        level.start_thing_sound(self.thing, SfxName::Telept);
        level.relocate_thing(self.thing, dest_sector);
        let thing = &mut level.things[self.thing];
        thing.pos = dest_pos;
        thing.z = dest_z;
        thing.angle = angle;
        thing.momxy = glam::Vec2::ZERO;
        thing.momz = 0.0;
        thing.frozen_tics = TELEPORT_FREEZE_TICS;
        level.start_thing_sound(self.thing, SfxName::Telept);

        TickStatus::Destroy
    }
}
