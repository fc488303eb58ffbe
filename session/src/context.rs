//! Collaborators injected into a session: persistence, audio and themes.

use std::{io, path::PathBuf};

use log::debug;
use thiserror::Error;
use vision_drill_core::{AudioCue, Setting, SettingKey, Settings};
use vision_drill_system_themes::ThemeCatalog;

/// Failures raised while persisting settings.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The settings file could not be written.
    #[error("could not write settings to {}", path.display())]
    Io {
        /// File the store attempted to write.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The settings could not be encoded.
    #[error("could not encode settings: {0}")]
    Encode(String),
}

/// Key-value store holding settings and daily totals.
pub trait Store {
    /// Current in-memory settings.
    fn settings(&self) -> &Settings;

    /// Updates a single setting without persisting it.
    fn set(&mut self, setting: Setting);

    /// Applies `patch` and persists the result.
    fn save(&mut self, patch: &[Setting]) -> Result<(), StoreError>;

    /// Reads a single setting.
    fn get(&self, key: SettingKey) -> Setting {
        self.settings().get(key)
    }
}

/// Store that keeps settings in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    settings: Settings,
    saves: usize,
}

impl MemoryStore {
    /// Creates a store seeded with `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings, saves: 0 }
    }

    /// Number of successful saves.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl Store for MemoryStore {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn set(&mut self, setting: Setting) {
        self.settings.set(setting);
    }

    fn save(&mut self, patch: &[Setting]) -> Result<(), StoreError> {
        for setting in patch {
            self.settings.set(*setting);
        }
        self.saves += 1;
        Ok(())
    }
}

/// Fire-and-forget sound output.
pub trait AudioSink {
    /// Plays the named cue.
    fn play(&mut self, cue: AudioCue);
}

/// Sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, cue: AudioCue) {
        debug!("audio cue '{}' discarded", cue.name());
    }
}

/// Explicitly constructed services shared by the session and its layers.
pub struct SessionContext {
    store: Box<dyn Store>,
    audio: Box<dyn AudioSink>,
    themes: ThemeCatalog,
}

impl SessionContext {
    /// Creates a context using the default theme catalog.
    pub fn new<S, A>(store: S, audio: A) -> Self
    where
        S: Store + 'static,
        A: AudioSink + 'static,
    {
        Self {
            store: Box::new(store),
            audio: Box::new(audio),
            themes: ThemeCatalog::default(),
        }
    }

    /// Replaces the theme catalog.
    #[must_use]
    pub fn with_themes(mut self, themes: ThemeCatalog) -> Self {
        self.themes = themes;
        self
    }

    /// Settings and totals store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        &*self.store
    }

    /// Mutable access to the store.
    pub fn store_mut(&mut self) -> &mut dyn Store {
        &mut *self.store
    }

    /// Themes available to rounds.
    #[must_use]
    pub fn themes(&self) -> &ThemeCatalog {
        &self.themes
    }

    /// Plays `cue` when sound effects are enabled.
    pub fn play(&mut self, cue: AudioCue) {
        if self.store.settings().is_sound_effect {
            self.audio.play(cue);
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("settings", self.store.settings())
            .field("themes", &self.themes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<AudioCue>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, cue: AudioCue) {
            self.0.borrow_mut().push(cue);
        }
    }

    #[test]
    fn muted_sound_effects_suppress_cues() {
        let recorder = Recorder::default();
        let mut settings = Settings::default();
        settings.is_sound_effect = false;
        let mut context = SessionContext::new(MemoryStore::new(settings), recorder.clone());
        context.play(AudioCue::Click);
        assert!(recorder.0.borrow().is_empty());

        context.store_mut().set(Setting::SoundEffect(true));
        context.play(AudioCue::Click);
        assert_eq!(*recorder.0.borrow(), vec![AudioCue::Click]);
    }

    #[test]
    fn memory_store_applies_patches_on_save() {
        let mut store = MemoryStore::default();
        store
            .save(&[Setting::TodayScore(12), Setting::TodayTime(30)])
            .expect("memory store never fails");
        assert_eq!(store.get(SettingKey::TodayScore), Setting::TodayScore(12));
        assert_eq!(store.settings().today_time, 30);
        assert_eq!(store.saves(), 1);
    }
}
