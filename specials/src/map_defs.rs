//! Runtime level structures the specials operate on. These are plain records
//! in arenas; everything cross-references by id, never by pointer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::registry::SpecialKey;

pub type SectorId = usize;
pub type LineId = usize;
pub type SideId = usize;
pub type ThingId = usize;

/// Which horizontal plane of a sector a mover drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneKind {
    Floor,
    Ceiling,
}

/// Keys a locked door can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCard {
    Blue = 0,
    Yellow = 1,
    Red = 2,
}

/// One horizontal surface of a sector. `prev_z` trails `z` by one tick so a
/// renderer can interpolate between simulation frames.
#[derive(Debug, Clone)]
pub struct SectorPlane {
    pub z: f32,
    pub prev_z: f32,
    /// Flat texture handle, meaningful only to the host.
    pub texture: usize,
    /// Scroll offset applied by plane scrollers.
    pub offset: Vec2,
    pub prev_offset: Vec2,
}

impl SectorPlane {
    pub fn new(z: f32, texture: usize) -> Self {
        Self {
            z,
            prev_z: z,
            texture,
            offset: Vec2::ZERO,
            prev_offset: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sector {
    pub num: u32,
    pub tag: i16,
    /// Sector special from the map data, consumed at level start to spawn
    /// ambient effects (flicker, strobe, timed doors).
    pub special: i16,
    pub floor: SectorPlane,
    pub ceiling: SectorPlane,
    pub lightlevel: usize,
    /// Lines with this sector on either side. Neighbour searches walk these.
    pub lines: Vec<LineId>,
    /// Things currently standing in this sector.
    pub things: Vec<ThingId>,
    /// Midpoint used as the origin for positional sector sounds.
    pub sound_origin: Vec2,
    active_floor: Option<SpecialKey>,
    active_ceiling: Option<SpecialKey>,
}

impl Sector {
    pub fn new(num: u32, tag: i16, floor_z: f32, ceiling_z: f32, lightlevel: usize) -> Self {
        Self {
            num,
            tag,
            special: 0,
            floor: SectorPlane::new(floor_z, 0),
            ceiling: SectorPlane::new(ceiling_z, 0),
            lightlevel,
            lines: Vec::new(),
            things: Vec::new(),
            sound_origin: Vec2::ZERO,
            active_floor: None,
            active_ceiling: None,
        }
    }

    pub fn plane(&self, kind: PlaneKind) -> &SectorPlane {
        match kind {
            PlaneKind::Floor => &self.floor,
            PlaneKind::Ceiling => &self.ceiling,
        }
    }

    pub fn plane_mut(&mut self, kind: PlaneKind) -> &mut SectorPlane {
        match kind {
            PlaneKind::Floor => &mut self.floor,
            PlaneKind::Ceiling => &mut self.ceiling,
        }
    }

    /// The special currently driving this plane, if any. At most one mover
    /// may own a plane at a time.
    pub fn owner(&self, kind: PlaneKind) -> Option<SpecialKey> {
        match kind {
            PlaneKind::Floor => self.active_floor,
            PlaneKind::Ceiling => self.active_ceiling,
        }
    }

    pub fn set_owner(&mut self, kind: PlaneKind, key: Option<SpecialKey>) {
        match kind {
            PlaneKind::Floor => self.active_floor = key,
            PlaneKind::Ceiling => self.active_ceiling = key,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.active_floor.is_some() || self.active_ceiling.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SideDef {
    pub sector: SectorId,
    pub toptexture: Option<usize>,
    pub midtexture: Option<usize>,
    pub bottomtexture: Option<usize>,
    /// Scroll offset applied by line scrollers.
    pub offset: Vec2,
    pub prev_offset: Vec2,
}

impl SideDef {
    pub fn new(sector: SectorId) -> Self {
        Self {
            sector,
            toptexture: None,
            midtexture: None,
            bottomtexture: None,
            offset: Vec2::ZERO,
            prev_offset: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineDef {
    pub num: u32,
    pub tag: i16,
    /// Line special from the map data, consumed at level start for scrollers.
    pub special: i16,
    pub front_sector: SectorId,
    pub back_sector: Option<SectorId>,
    pub front_sidedef: SideId,
    pub back_sidedef: Option<SideId>,
    /// Set once a non-repeatable trigger fires over this line.
    pub activated: bool,
}

impl LineDef {
    pub fn new(num: u32, tag: i16, front_sector: SectorId, front_sidedef: SideId) -> Self {
        Self {
            num,
            tag,
            special: 0,
            front_sector,
            back_sector: None,
            front_sidedef,
            back_sidedef: None,
            activated: false,
        }
    }

    /// The sector on the opposite side of `sector`, if the line is two-sided.
    pub fn opposite(&self, sector: SectorId) -> Option<SectorId> {
        if self.front_sector == sector {
            self.back_sector
        } else if self.back_sector == Some(sector) {
            Some(self.front_sector)
        } else {
            None
        }
    }
}

/// A map object as the specials see it: position, momentum and just enough
/// flags to teleport it, carry it and crush it.
#[derive(Debug, Clone)]
pub struct Thing {
    pub num: u32,
    /// Scripted thing id; 0 means unaddressable.
    pub tid: i16,
    pub pos: Vec2,
    pub z: f32,
    /// Radians, east is zero.
    pub angle: f32,
    pub momxy: Vec2,
    pub momz: f32,
    pub sector: SectorId,
    pub radius: f32,
    pub height: f32,
    pub health: i32,
    /// Marks a teleport landing spot rather than a solid object.
    pub teleport_spot: bool,
    pub shootable: bool,
    pub player: bool,
    pub on_ground: bool,
    /// Ticks during which the thing may not act (post-teleport freeze).
    pub frozen_tics: u32,
    pub keys: [bool; 3],
}

impl Thing {
    pub fn new(num: u32, pos: Vec2, z: f32, sector: SectorId) -> Self {
        Self {
            num,
            tid: 0,
            pos,
            z,
            angle: 0.0,
            momxy: Vec2::ZERO,
            momz: 0.0,
            sector,
            radius: 16.0,
            height: 56.0,
            health: 100,
            teleport_spot: false,
            shootable: true,
            player: false,
            on_ground: true,
            frozen_tics: 0,
            keys: [false; 3],
        }
    }

    pub fn has_key(&self, key: KeyCard) -> bool {
        self.keys[key as usize]
    }
}
