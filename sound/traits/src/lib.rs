//! The sound boundary consumed by the level simulation. The sim side pushes
//! fire-and-forget commands down an mpsc channel; whatever device backend is
//! in use drains the channel on its own thread and owns all mixing state.

use std::fmt::Debug;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

mod sounds;
pub use sounds::*;

/// `S` is the SFX enum of the game flavour in use
pub type InitResult<S, E> = Result<Sender<SoundAction<S>>, E>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundAction<S: Debug + Copy> {
    StartSfx {
        /// Objects unique ID or hash. This should be used to track which
        /// object owns which sounds so it can be stopped e.g, death, shoot..
        uid: usize,
        /// The Sound effect this object has
        sfx: S,
        /// The world XY coords of this object
        x: f32,
        y: f32,
        /// Keep repeating until stopped by uid
        looping: bool,
    },
    StopSfx {
        uid: usize,
    },
    StopSfxAll,
    SfxVolume(i32),
    Shutdown,
}

/// A sound server implementing `SoundServer` must also implement
/// `SoundServerTic`, typically by a one-liner:
/// `impl SoundServerTic<SndFx, Error> for Snd {}`
pub trait SoundServer<S, E>
where
    S: Debug + Copy,
    E: std::error::Error,
{
    /// Start up all sound stuff and grab the `Sender` channel for cloning so
    /// that the simulation side can queue commands.
    fn init(&mut self) -> InitResult<S, E>;

    /// Playback a sound
    fn start_sound(&mut self, uid: usize, sfx: S, x: f32, y: f32, looping: bool);

    /// Stop this sound playback
    fn stop_sound(&mut self, uid: usize);

    fn stop_sound_all(&mut self);

    fn set_sfx_volume(&mut self, volume: i32);

    fn get_sfx_volume(&mut self) -> i32;

    /// Start, stop, change, remove sounds. Anything that a sound server needs
    /// to do each tic
    fn update_self(&mut self);

    /// Helper function used by the `SoundServerTic` trait
    fn get_rx(&mut self) -> &mut Receiver<SoundAction<S>>;

    /// Stop all sound and release the sound device
    fn shutdown_sound(&mut self);
}

/// Run the `SoundServer`
pub trait SoundServerTic<S, E>
where
    Self: SoundServer<S, E>,
    S: Debug + Copy,
    E: std::error::Error,
{
    /// Will be called every period on a thread containing `SoundServer`,
    /// returns `true` if the thread should continue running, else `false`
    /// if it should exit.
    fn tic(&mut self) -> bool {
        if let Ok(sound) = self.get_rx().recv_timeout(Duration::from_micros(500)) {
            match sound {
                SoundAction::StartSfx {
                    uid,
                    sfx,
                    x,
                    y,
                    looping,
                } => self.start_sound(uid, sfx, x, y, looping),
                SoundAction::StopSfx { uid } => self.stop_sound(uid),
                SoundAction::StopSfxAll => self.stop_sound_all(),
                SoundAction::SfxVolume(v) => self.set_sfx_volume(v),
                SoundAction::Shutdown => {
                    self.shutdown_sound();
                    return false;
                }
            }
        }
        true
    }
}
