//! The level arenas plus the neighbour searches the special constructors
//! feed on. Movement destinations are almost always "some extreme of the
//! surrounding sectors", so those walks live here next to the data.

use std::sync::mpsc::Sender;

use sound_traits::{SfxName, SoundAction};

use crate::map_defs::{LineDef, LineId, Sector, SectorId, SideDef, Thing, ThingId};
use crate::random::Random;

pub type SndServerTx = Sender<SoundAction<SfxName>>;

/// Requested end-of-level transition, latched for the host to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    Normal,
    Secret,
}

pub struct Level {
    pub sectors: Vec<Sector>,
    pub lines: Vec<LineDef>,
    pub sides: Vec<SideDef>,
    pub things: Vec<Thing>,
    pub rng: Random,
    pub snd_command: SndServerTx,
    /// Ticks elapsed since level start. Synchronised strobes key off this.
    pub level_time: u32,
    pub exit: Option<ExitAction>,
    /// Pairs of texture handles that swap when a switch is pressed.
    pub switch_pairs: Vec<(usize, usize)>,
}

impl Level {
    pub fn new(
        sectors: Vec<Sector>,
        lines: Vec<LineDef>,
        sides: Vec<SideDef>,
        things: Vec<Thing>,
        rng: Random,
        snd_command: SndServerTx,
    ) -> Self {
        Self {
            sectors,
            lines,
            sides,
            things,
            rng,
            snd_command,
            level_time: 0,
            exit: None,
            switch_pairs: Vec::new(),
        }
    }

    pub fn sectors_with_tag(&self, tag: i16) -> Vec<SectorId> {
        self.sectors
            .iter()
            .enumerate()
            .filter(|(_, s)| s.tag == tag)
            .map(|(i, _)| i)
            .collect()
    }

    fn neighbours<'a>(&'a self, sector: SectorId) -> impl Iterator<Item = &'a Sector> + 'a {
        self.sectors[sector]
            .lines
            .iter()
            .filter_map(move |&l| self.lines[l].opposite(sector))
            .map(|s| &self.sectors[s])
    }

    /// Lowest ceiling among surrounding sectors, or this sector's own
    /// ceiling when the sector is sealed. Door destinations build on this.
    pub fn find_lowest_ceiling_surrounding(&self, sector: SectorId) -> f32 {
        self.neighbours(sector)
            .map(|s| s.ceiling.z)
            .fold(None, |acc: Option<f32>, z| Some(acc.map_or(z, |a| a.min(z))))
            .unwrap_or(self.sectors[sector].ceiling.z)
    }

    pub fn find_highest_ceiling_surrounding(&self, sector: SectorId) -> f32 {
        self.neighbours(sector)
            .map(|s| s.ceiling.z)
            .fold(None, |acc: Option<f32>, z| Some(acc.map_or(z, |a| a.max(z))))
            .unwrap_or(self.sectors[sector].ceiling.z)
    }

    pub fn find_lowest_floor_surrounding(&self, sector: SectorId) -> f32 {
        self.neighbours(sector)
            .map(|s| s.floor.z)
            .fold(None, |acc: Option<f32>, z| Some(acc.map_or(z, |a| a.min(z))))
            .unwrap_or(self.sectors[sector].floor.z)
    }

    pub fn find_highest_floor_surrounding(&self, sector: SectorId) -> f32 {
        self.neighbours(sector)
            .map(|s| s.floor.z)
            .fold(None, |acc: Option<f32>, z| Some(acc.map_or(z, |a| a.max(z))))
            .unwrap_or(self.sectors[sector].floor.z)
    }

    /// Smallest neighbouring floor strictly above this sector's floor, or
    /// the sector's own floor when no neighbour is higher.
    pub fn find_next_highest_floor(&self, sector: SectorId) -> f32 {
        let own = self.sectors[sector].floor.z;
        self.neighbours(sector)
            .map(|s| s.floor.z)
            .filter(|&z| z > own)
            .fold(None, |acc: Option<f32>, z| Some(acc.map_or(z, |a| a.min(z))))
            .unwrap_or(own)
    }

    /// Greatest neighbouring floor strictly below this sector's floor, or
    /// the sector's own floor when no neighbour is lower.
    pub fn find_next_lowest_floor(&self, sector: SectorId) -> f32 {
        let own = self.sectors[sector].floor.z;
        self.neighbours(sector)
            .map(|s| s.floor.z)
            .filter(|&z| z < own)
            .fold(None, |acc: Option<f32>, z| Some(acc.map_or(z, |a| a.max(z))))
            .unwrap_or(own)
    }

    pub fn find_min_light_surrounding(&self, sector: SectorId, max: usize) -> usize {
        self.neighbours(sector)
            .map(|s| s.lightlevel)
            .fold(max, |acc, l| acc.min(l))
    }

    pub fn find_max_light_surrounding(&self, sector: SectorId, min: usize) -> usize {
        self.neighbours(sector)
            .map(|s| s.lightlevel)
            .fold(min, |acc, l| acc.max(l))
    }

    /// Fire a positional sound at a sector's origin. Uses the sector index
    /// as the owning uid so a follow-up start or stop replaces it.
    pub fn start_sector_sound(&self, sector: SectorId, sfx: SfxName, looping: bool) {
        if sfx == SfxName::None {
            return;
        }
        let origin = self.sectors[sector].sound_origin;
        // The backend may already be gone during shutdown.
        let _ = self.snd_command.send(SoundAction::StartSfx {
            uid: sector,
            sfx,
            x: origin.x,
            y: origin.y,
            looping,
        });
    }

    pub fn stop_sector_sound(&self, sector: SectorId) {
        let _ = self.snd_command.send(SoundAction::StopSfx { uid: sector });
    }

    pub fn start_line_sound(&self, line: LineId, sfx: SfxName) {
        let sector = self.lines[line].front_sector;
        self.start_sector_sound(sector, sfx, false);
    }

    pub fn start_thing_sound(&self, thing: ThingId, sfx: SfxName) {
        let t = &self.things[thing];
        let _ = self.snd_command.send(SoundAction::StartSfx {
            uid: self.sectors.len() + thing,
            sfx,
            x: t.pos.x,
            y: t.pos.y,
            looping: false,
        });
    }

    pub fn do_exit_level(&mut self) {
        log::debug!("Exit level at tic {}", self.level_time);
        self.exit = Some(ExitAction::Normal);
    }

    pub fn do_secret_exit_level(&mut self) {
        log::debug!("Secret exit level at tic {}", self.level_time);
        self.exit = Some(ExitAction::Secret);
    }

    /// Move a thing to a new position, keeping the per-sector occupancy
    /// lists coherent.
    pub fn relocate_thing(&mut self, thing: ThingId, dest_sector: SectorId) {
        let old = self.things[thing].sector;
        if old == dest_sector {
            return;
        }
        self.sectors[old].things.retain(|&t| t != thing);
        self.sectors[dest_sector].things.push(thing);
        self.things[thing].sector = dest_sector;
    }
}
