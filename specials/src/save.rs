//! Externalized forms of every registered special, for save games. Each
//! model is plain ids and numbers; restore validates those ids against the
//! level and skips anything that no longer resolves.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sound_traits::SfxName;

use crate::env::delay::{DelayedSpawn, ExitCountdown};
use crate::env::elevator::Elevator;
use crate::env::lights::{FireFlicker, Glow, LightChange, LightFlash, StrobeFlash};
use crate::env::manager::SpecialManager;
use crate::env::mover::{
    CrushData, MoveData, MoveDirection, Repetition, SectorMover, SectorSound, TexChange,
};
use crate::env::scroll::{ScrollTarget, Scroller};
use crate::env::stairs::{StairBuilder, StairCompat, StairPhase, StairStep};
use crate::env::switch::{ButtonRevert, TexSlot};
use crate::env::teleport::{Teleport, TeleportZ};
use crate::env::Special;
use crate::level::Level;
use crate::map_defs::PlaneKind;
use crate::random::Random;

fn sfx_to_id(sfx: Option<SfxName>) -> u8 {
    match sfx {
        None | Some(SfxName::None) => 0,
        Some(SfxName::Doropn) => 1,
        Some(SfxName::Dorcls) => 2,
        Some(SfxName::Bdopn) => 3,
        Some(SfxName::Bdcls) => 4,
        Some(SfxName::Pstart) => 5,
        Some(SfxName::Pstop) => 6,
        Some(SfxName::Stnmov) => 7,
        Some(SfxName::Swtchn) => 8,
        Some(SfxName::Swtchx) => 9,
        Some(SfxName::Telept) => 10,
        Some(SfxName::Oof) => 11,
    }
}

fn id_to_sfx(id: u8) -> Option<SfxName> {
    match id {
        1 => Some(SfxName::Doropn),
        2 => Some(SfxName::Dorcls),
        3 => Some(SfxName::Bdopn),
        4 => Some(SfxName::Bdcls),
        5 => Some(SfxName::Pstart),
        6 => Some(SfxName::Pstop),
        7 => Some(SfxName::Stnmov),
        8 => Some(SfxName::Swtchn),
        9 => Some(SfxName::Swtchx),
        10 => Some(SfxName::Telept),
        11 => Some(SfxName::Oof),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SoundModel {
    pub start: u8,
    pub ret: u8,
    pub stop: u8,
    pub movement: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoverModel {
    pub sector: usize,
    pub plane: PlaneKind,
    pub start_direction: MoveDirection,
    pub repetition: Repetition,
    pub move_speed: f32,
    pub delay: u32,
    pub crush: Option<CrushData>,
    pub change: Option<TexChange>,
    pub sound: SoundModel,
    pub start_z: f32,
    pub dest_z: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub speed: f32,
    pub direction: MoveDirection,
    pub delay_tics: u32,
    pub crushing: bool,
    pub played_start: bool,
    pub played_return: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevatorModel {
    pub lead: MoverModel,
    pub trail_plane: PlaneKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StairsModel {
    pub speed: f32,
    pub stair_height: f32,
    pub stair_delay: u32,
    pub reset_delay: u32,
    pub compat: StairCompat,
    pub steps: Vec<StairStep>,
    pub delay_tics: u32,
    pub phase: StairPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleportModel {
    pub thing: usize,
    pub tid: i16,
    pub tag: i16,
    pub z: TeleportZ,
    pub reverse_angle: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireFlickerModel {
    pub sector: usize,
    pub count: u32,
    pub max_light: i32,
    pub min_light: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightFlashModel {
    pub sector: usize,
    pub count: u32,
    pub max_light: usize,
    pub min_light: usize,
    pub max_time: i32,
    pub min_time: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrobeModel {
    pub sector: usize,
    pub count: u32,
    pub max_light: usize,
    pub min_light: usize,
    pub dark_time: u32,
    pub bright_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlowModel {
    pub sector: usize,
    pub max_light: i32,
    pub min_light: i32,
    pub direction: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightChangeModel {
    pub sector: usize,
    pub target: usize,
    pub step: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollModel {
    pub target: ScrollTarget,
    pub speed: [f32; 2],
    pub carry: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchModel {
    pub line: usize,
    pub side: usize,
    pub slot: TexSlot,
    pub texture: usize,
    pub tics: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitModel {
    pub tics: u32,
    pub secret: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SpecialModel {
    Mover(MoverModel),
    Elevator(ElevatorModel),
    Stairs(StairsModel),
    Teleport(TeleportModel),
    FireFlicker(FireFlickerModel),
    LightFlash(LightFlashModel),
    Strobe(StrobeModel),
    Glow(GlowModel),
    LightChange(LightChangeModel),
    Scroll(ScrollModel),
    Switch(SwitchModel),
    Delayed {
        tics: u32,
        special: Option<Box<SpecialModel>>,
    },
    Exit(ExitModel),
}

/// Everything the engine needs alongside the host's own level state to
/// resume identically: the RNG cursor, the clock, and the registered
/// specials in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialsSnapshot {
    pub rng_index: usize,
    pub level_time: u32,
    pub specials: Vec<SpecialModel>,
}

pub fn encode(snapshot: &SpecialsSnapshot) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(snapshot)
}

pub fn decode(bytes: &[u8]) -> Result<SpecialsSnapshot, bincode::Error> {
    bincode::deserialize(bytes)
}

fn mover_to_model(m: &SectorMover) -> MoverModel {
    MoverModel {
        sector: m.sector,
        plane: m.move_data.plane,
        start_direction: m.move_data.start_direction,
        repetition: m.move_data.repetition,
        move_speed: m.move_data.speed,
        delay: m.move_data.delay,
        crush: m.move_data.crush,
        change: m.move_data.change,
        sound: SoundModel {
            start: sfx_to_id(m.sound.start),
            ret: sfx_to_id(m.sound.ret),
            stop: sfx_to_id(m.sound.stop),
            movement: sfx_to_id(m.sound.movement),
        },
        start_z: m.start_z,
        dest_z: m.dest_z,
        min_z: m.min_z,
        max_z: m.max_z,
        speed: m.speed,
        direction: m.direction,
        delay_tics: m.delay_tics,
        crushing: m.crushing,
        played_start: m.played_start,
        played_return: m.played_return,
    }
}

fn mover_from_model(level: &Level, model: &MoverModel) -> Option<SectorMover> {
    if model.sector >= level.sectors.len() {
        log::warn!("Dropping saved mover for missing sector {}", model.sector);
        return None;
    }
    Some(SectorMover {
        sector: model.sector,
        move_data: MoveData {
            plane: model.plane,
            start_direction: model.start_direction,
            repetition: model.repetition,
            speed: model.move_speed,
            delay: model.delay,
            crush: model.crush,
            change: model.change,
        },
        sound: SectorSound {
            start: id_to_sfx(model.sound.start),
            ret: id_to_sfx(model.sound.ret),
            stop: id_to_sfx(model.sound.stop),
            movement: id_to_sfx(model.sound.movement),
        },
        start_z: model.start_z,
        dest_z: model.dest_z,
        min_z: model.min_z,
        max_z: model.max_z,
        speed: model.speed,
        direction: model.direction,
        delay_tics: model.delay_tics,
        crushing: model.crushing,
        played_start: model.played_start,
        played_return: model.played_return,
        last_blocked: false,
    })
}

fn special_to_model(special: &Special) -> SpecialModel {
    match special {
        Special::Mover(m) => SpecialModel::Mover(mover_to_model(m)),
        Special::Elevator(e) => SpecialModel::Elevator(ElevatorModel {
            lead: mover_to_model(&e.lead),
            trail_plane: e.trail_plane,
        }),
        Special::Stairs(s) => SpecialModel::Stairs(StairsModel {
            speed: s.speed,
            stair_height: s.stair_height,
            stair_delay: s.stair_delay,
            reset_delay: s.reset_delay,
            compat: s.compat,
            steps: s.steps.clone(),
            delay_tics: s.delay_tics,
            phase: s.phase,
        }),
        Special::Teleport(t) => SpecialModel::Teleport(TeleportModel {
            thing: t.thing,
            tid: t.tid,
            tag: t.tag,
            z: t.z,
            reverse_angle: t.reverse_angle,
        }),
        Special::FireFlicker(l) => SpecialModel::FireFlicker(FireFlickerModel {
            sector: l.sector,
            count: l.count,
            max_light: l.max_light,
            min_light: l.min_light,
        }),
        Special::LightFlash(l) => SpecialModel::LightFlash(LightFlashModel {
            sector: l.sector,
            count: l.count,
            max_light: l.max_light,
            min_light: l.min_light,
            max_time: l.max_time,
            min_time: l.min_time,
        }),
        Special::StrobeFlash(l) => SpecialModel::Strobe(StrobeModel {
            sector: l.sector,
            count: l.count,
            max_light: l.max_light,
            min_light: l.min_light,
            dark_time: l.dark_time,
            bright_time: l.bright_time,
        }),
        Special::Glow(l) => SpecialModel::Glow(GlowModel {
            sector: l.sector,
            max_light: l.max_light,
            min_light: l.min_light,
            direction: l.direction,
        }),
        Special::LightChange(l) => SpecialModel::LightChange(LightChangeModel {
            sector: l.sector,
            target: l.target,
            step: l.step,
        }),
        Special::Scroll(s) => SpecialModel::Scroll(ScrollModel {
            target: s.target,
            speed: [s.speed.x, s.speed.y],
            carry: s.carry,
        }),
        Special::Switch(s) => SpecialModel::Switch(SwitchModel {
            line: s.line,
            side: s.side,
            slot: s.slot,
            texture: s.texture,
            tics: s.tics,
        }),
        Special::Delayed(d) => SpecialModel::Delayed {
            tics: d.tics,
            special: d.special.as_deref().map(|s| Box::new(special_to_model(s))),
        },
        Special::Exit(e) => SpecialModel::Exit(ExitModel {
            tics: e.tics,
            secret: e.secret,
        }),
    }
}

fn special_from_model(level: &Level, model: &SpecialModel) -> Option<Special> {
    let sectors = level.sectors.len();
    let check_sector = |s: usize| {
        if s >= sectors {
            log::warn!("Dropping saved special for missing sector {s}");
            false
        } else {
            true
        }
    };
    match model {
        SpecialModel::Mover(m) => Some(Special::Mover(mover_from_model(level, m)?)),
        SpecialModel::Elevator(e) => Some(Special::Elevator(Elevator {
            lead: mover_from_model(level, &e.lead)?,
            trail_plane: e.trail_plane,
        })),
        SpecialModel::Stairs(s) => {
            if !s.steps.iter().all(|step| step.sector < sectors) {
                log::warn!("Dropping saved stairs with missing step sector");
                return None;
            }
            Some(Special::Stairs(StairBuilder {
                key: None,
                speed: s.speed,
                stair_height: s.stair_height,
                stair_delay: s.stair_delay,
                reset_delay: s.reset_delay,
                compat: s.compat,
                steps: s.steps.clone(),
                delay_tics: s.delay_tics,
                phase: s.phase,
            }))
        }
        SpecialModel::Teleport(t) => {
            if t.thing >= level.things.len() {
                log::warn!("Dropping saved teleport for missing thing {}", t.thing);
                return None;
            }
            Some(Special::Teleport(Teleport {
                thing: t.thing,
                tid: t.tid,
                tag: t.tag,
                z: t.z,
                reverse_angle: t.reverse_angle,
            }))
        }
        SpecialModel::FireFlicker(l) => check_sector(l.sector).then(|| {
            Special::FireFlicker(FireFlicker {
                sector: l.sector,
                // The count ticks down before it is checked; a corrupt
                // zero must not wrap.
                count: l.count.max(1),
                max_light: l.max_light,
                min_light: l.min_light,
            })
        }),
        SpecialModel::LightFlash(l) => check_sector(l.sector).then(|| {
            Special::LightFlash(LightFlash {
                sector: l.sector,
                count: l.count.max(1),
                max_light: l.max_light,
                min_light: l.min_light,
                max_time: l.max_time,
                min_time: l.min_time,
            })
        }),
        SpecialModel::Strobe(l) => check_sector(l.sector).then(|| {
            Special::StrobeFlash(StrobeFlash {
                sector: l.sector,
                count: l.count.max(1),
                max_light: l.max_light,
                min_light: l.min_light,
                dark_time: l.dark_time,
                bright_time: l.bright_time,
            })
        }),
        SpecialModel::Glow(l) => check_sector(l.sector).then(|| {
            Special::Glow(Glow {
                sector: l.sector,
                max_light: l.max_light,
                min_light: l.min_light,
                direction: l.direction,
            })
        }),
        SpecialModel::LightChange(l) => check_sector(l.sector).then(|| {
            Special::LightChange(LightChange {
                sector: l.sector,
                target: l.target,
                step: l.step,
            })
        }),
        SpecialModel::Scroll(s) => {
            let valid = match s.target {
                ScrollTarget::Side(side) => side < level.sides.len(),
                ScrollTarget::Plane(sector, _) => sector < sectors,
            };
            if !valid {
                log::warn!("Dropping saved scroller with missing target");
                return None;
            }
            Some(Special::Scroll(Scroller {
                target: s.target,
                speed: Vec2::new(s.speed[0], s.speed[1]),
                carry: s.carry,
            }))
        }
        SpecialModel::Switch(s) => {
            if s.line >= level.lines.len() || s.side >= level.sides.len() {
                log::warn!("Dropping saved button for missing line {}", s.line);
                return None;
            }
            Some(Special::Switch(ButtonRevert {
                line: s.line,
                side: s.side,
                slot: s.slot,
                texture: s.texture,
                tics: s.tics.max(1),
            }))
        }
        SpecialModel::Delayed { tics, special } => {
            let inner = special_from_model(level, special.as_deref()?)?;
            Some(Special::Delayed(DelayedSpawn {
                tics: *tics,
                special: Some(Box::new(inner)),
            }))
        }
        SpecialModel::Exit(e) => Some(Special::Exit(ExitCountdown {
            tics: e.tics,
            secret: e.secret,
        })),
    }
}

impl SpecialManager {
    /// Externalize the registry in registration order.
    pub fn snapshot(&self, level: &Level) -> SpecialsSnapshot {
        SpecialsSnapshot {
            rng_index: level.rng.index(),
            level_time: level.level_time,
            specials: self
                .registry
                .iter()
                .map(|(_, s)| special_to_model(s))
                .collect(),
        }
    }

    /// Rebuild the registry from a snapshot. Existing specials and plane
    /// claims are discarded first; models whose ids no longer resolve are
    /// skipped with a warning. Returns the number restored.
    pub fn restore(&mut self, level: &mut Level, snapshot: &SpecialsSnapshot) -> usize {
        self.registry.clear();
        for sector in &mut level.sectors {
            sector.set_owner(PlaneKind::Floor, None);
            sector.set_owner(PlaneKind::Ceiling, None);
        }
        level.rng = Random::with_index(snapshot.rng_index);
        level.level_time = snapshot.level_time;

        let mut restored = 0;
        for model in &snapshot.specials {
            if let Some(special) = special_from_model(level, model) {
                self.add_special(level, special);
                restored += 1;
            }
        }
        restored
    }
}
