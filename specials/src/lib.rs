//! Deterministic per-tick environment machinery for classic FPS levels:
//! sector movers (doors, lifts, floors, ceilings, crushers), stair builders,
//! elevators, teleports, light effects, texture scrollers, switch reverts,
//! delayed dispatch and exit countdowns.
//!
//! All state lives in plain arenas indexed by ids. Active specials are held
//! in a generation-tagged registry and ticked in registration order by
//! [`SpecialManager`]; randomness comes from an injected table-driven
//! [`Random`] so two runs with the same inputs produce identical worlds.
//!
//! Collision is behind the [`MoveResolver`] trait. The engine never writes a
//! plane height directly; every geometric change funnels through the resolver
//! so the host can veto or clip a move.

pub mod env;
mod level;
mod map_defs;
mod random;
mod registry;
pub mod save;

pub use env::manager::{
    ActivationContext, SpecialManager, SpeedCode, Trigger, TriggerKind, BUTTONTIME, LIFTWAIT,
    SPEED_FACTOR, VDOORWAIT,
};
pub use env::mover::{
    CrushData, CrushMode, FreeMove, MoveData, MoveDirection, MoveResolver, MoveResult, Repetition,
    SectorMover, SectorSound, TexChange,
};
pub use env::stairs::StairCompat;
pub use env::teleport::TeleportZ;
pub use env::{Special, TickStatus};
pub use level::{ExitAction, Level, SndServerTx};
pub use map_defs::{
    KeyCard, LineDef, LineId, PlaneKind, Sector, SectorId, SectorPlane, SideDef, SideId, Thing,
    ThingId,
};
pub use random::Random;
pub use registry::SpecialKey;
pub use save::{SpecialModel, SpecialsSnapshot};

/// Simulation rate. All waits and countdowns are expressed in these ticks.
pub const TICRATE: u32 = 35;
