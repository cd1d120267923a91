//! Identifiers for every sound effect the level simulation can request.

/// The SFX the sim-side environment machinery can start or stop. The backend
/// maps these to whatever samples it loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SfxName {
    None,
    /// Regular door opening swing
    Doropn,
    /// Regular door closing
    Dorcls,
    /// Blazing door open
    Bdopn,
    /// Blazing door close
    Bdcls,
    /// Platform/lift start
    Pstart,
    /// Platform/lift stop
    Pstop,
    /// Moving floor/ceiling grind
    Stnmov,
    /// Switch toggled on
    Swtchn,
    /// Switch springs back
    Swtchx,
    /// Teleport whoosh
    Telept,
    /// Bumped something that won't budge
    Oof,
}

impl Default for SfxName {
    fn default() -> Self {
        Self::None
    }
}
