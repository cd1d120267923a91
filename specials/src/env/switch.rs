//! Switch texture handling: flip the pressed texture immediately, and for
//! repeatable lines register a button that springs back after a hold.

use serde::{Deserialize, Serialize};
use sound_traits::SfxName;

use crate::env::TickStatus;
use crate::level::Level;
use crate::map_defs::{LineId, SideId};

/// Which texture slot of the sidedef holds the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TexSlot {
    Top,
    Middle,
    Bottom,
}

/// A pressed button waiting to pop back out.
#[derive(Debug, Clone)]
pub struct ButtonRevert {
    pub(crate) line: LineId,
    pub(crate) side: SideId,
    pub(crate) slot: TexSlot,
    /// Texture to restore when the timer runs out.
    pub(crate) texture: usize,
    pub(crate) tics: u32,
}

impl ButtonRevert {
    pub fn new(line: LineId, side: SideId, slot: TexSlot, texture: usize, tics: u32) -> Self {
        Self {
            line,
            side,
            slot,
            texture,
            tics,
        }
    }

    pub fn tick(&mut self, level: &mut Level) -> TickStatus {
        self.tics -= 1;
        if self.tics > 0 {
            return TickStatus::Continue;
        }
        let side = &mut level.sides[self.side];
        match self.slot {
            TexSlot::Top => side.toptexture = Some(self.texture),
            TexSlot::Middle => side.midtexture = Some(self.texture),
            TexSlot::Bottom => side.bottomtexture = Some(self.texture),
        }
        level.start_line_sound(self.line, SfxName::Swtchn);
        TickStatus::Destroy
    }
}

/// Swap the first matching switch texture on the line's front side. Returns
/// the slot and the original texture so the caller can schedule a revert.
/// One-shot presses get the "spent" sound, reusable ones the normal click.
pub fn change_switch_texture(
    level: &mut Level,
    line: LineId,
    reusable: bool,
) -> Option<(SideId, TexSlot, usize)> {
    let side_id = level.lines[line].front_sidedef;
    let side = &level.sides[side_id];
    let lookup = |tex: Option<usize>| -> Option<usize> {
        let tex = tex?;
        level
            .switch_pairs
            .iter()
            .find_map(|&(a, b)| match tex {
                t if t == a => Some(b),
                t if t == b => Some(a),
                _ => None,
            })
    };

    let hit = [
        (TexSlot::Top, side.toptexture),
        (TexSlot::Middle, side.midtexture),
        (TexSlot::Bottom, side.bottomtexture),
    ]
    .into_iter()
    .find_map(|(slot, tex)| lookup(tex).map(|swapped| (slot, tex.unwrap_or(0), swapped)));

    let (slot, original, swapped) = hit?;
    let side = &mut level.sides[side_id];
    match slot {
        TexSlot::Top => side.toptexture = Some(swapped),
        TexSlot::Middle => side.midtexture = Some(swapped),
        TexSlot::Bottom => side.bottomtexture = Some(swapped),
    }
    let sfx = if reusable {
        SfxName::Swtchn
    } else {
        SfxName::Swtchx
    };
    level.start_line_sound(line, sfx);
    Some((side_id, slot, original))
}
