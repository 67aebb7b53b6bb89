use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::{
        static_sound::{StaticSoundData, StaticSoundHandle},
        PlaybackState,
    },
    tween::Tween,
};
use tracing::warn;

/// Name-keyed sound table over a kira manager. When no audio device is
/// available the manager is `None` and every call is a no-op, so headless
/// runs and tests never fail on audio.
pub struct AudioContext {
    manager: Option<AudioManager>,
    sounds: HashMap<String, StaticSoundData>,
    active: Vec<StaticSoundHandle>,
}

impl AudioContext {
    pub fn new() -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => Some(manager),
            Err(error) => {
                warn!(error = %error, "audio_manager_init_failed_audio_disabled");
                None
            }
        };
        Self {
            manager,
            sounds: HashMap::new(),
            active: Vec::new(),
        }
    }

    /// A context that never touches audio hardware.
    pub fn disabled() -> Self {
        Self {
            manager: None,
            sounds: HashMap::new(),
            active: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    /// Loads one sound file (OGG, WAV) into memory. A failed read logs and
    /// leaves the name unknown.
    pub fn load(&mut self, name: impl Into<String>, path: impl AsRef<Path>) {
        let name = name.into();
        let path = path.as_ref();
        match StaticSoundData::from_file(path) {
            Ok(sound) => {
                self.sounds.insert(name, sound);
            }
            Err(error) => {
                warn!(
                    name = name.as_str(),
                    path = %path.display(),
                    error = %error,
                    "sound_load_failed"
                );
            }
        }
    }

    pub fn load_all(&mut self, sounds: &BTreeMap<String, PathBuf>) {
        for (name, path) in sounds {
            self.load(name.clone(), path);
        }
    }

    /// Fire-and-forget playback. Unknown names and unavailable hardware
    /// are no-ops.
    pub fn play(&mut self, name: &str) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        self.active
            .retain(|handle| handle.state() != PlaybackState::Stopped);
        if let Some(data) = self.sounds.get(name) {
            match manager.play(data.clone()) {
                Ok(handle) => self.active.push(handle),
                Err(error) => warn!(name, error = %error, "sound_play_failed"),
            }
        }
    }

    /// Cuts every active playback and rewinds it; the next `play` starts
    /// from the top of the sound.
    pub fn stop_all(&mut self) {
        for handle in &mut self.active {
            let _ = handle.stop(Tween::default());
        }
        self.active.clear();
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new()
    }
}
