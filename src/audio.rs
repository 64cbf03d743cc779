//! Sound cue contract
//!
//! The core never plays audio itself. It raises cues on an injected
//! `AudioSink`; the presentation layer decides what they sound like.

use serde::{Deserialize, Serialize};

/// Which mixer bus a cue is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixerGroup {
    Music,
    Sfx,
}

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player jumped
    Jump,
    /// Player started a slide
    Slide,
    /// Turn committed
    Turn,
    /// Player ran into an obstacle
    ObstacleHit,
    /// Run ended
    GameOver,
    /// Menu music loop
    MenuTheme,
    /// In-game music loop
    GameplayTheme,
}

impl SoundCue {
    pub fn group(self) -> MixerGroup {
        match self {
            SoundCue::MenuTheme | SoundCue::GameplayTheme => MixerGroup::Music,
            _ => MixerGroup::Sfx,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Jump => "Jump",
            SoundCue::Slide => "Slide",
            SoundCue::Turn => "Turn",
            SoundCue::ObstacleHit => "ObstacleHit",
            SoundCue::GameOver => "GameOver",
            SoundCue::MenuTheme => "MenuTheme",
            SoundCue::GameplayTheme => "GameplayTheme",
        }
    }
}

/// Slider positions (0.0 - 1.0) for each bus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volumes {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            master: 0.8,
            music: 0.7,
            sfx: 1.0,
        }
    }
}

/// Quietest slider value; keeps the log mapping finite
const MIN_SLIDER: f32 = 0.0001;

/// Map a linear slider value to mixer attenuation in decibels
pub fn slider_to_db(value: f32) -> f32 {
    value.clamp(MIN_SLIDER, 1.0).log10() * 20.0
}

/// Anything that can act on sound cues
pub trait AudioSink {
    /// Fire an effect, or switch the music loop for music cues
    fn play(&mut self, cue: SoundCue);

    fn pause_music(&mut self);

    fn resume_music(&mut self);

    fn set_volumes(&mut self, _volumes: Volumes) {}
}

/// Headless sink: logs cues and tracks what music would be playing
#[derive(Debug, Clone, Default)]
pub struct LogAudio {
    volumes: Volumes,
    music: Option<SoundCue>,
    music_paused: bool,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_music(&self) -> Option<SoundCue> {
        self.music
    }

    pub fn is_music_paused(&self) -> bool {
        self.music_paused
    }

    fn bus_db(&self, group: MixerGroup) -> f32 {
        let bus = match group {
            MixerGroup::Music => self.volumes.music,
            MixerGroup::Sfx => self.volumes.sfx,
        };
        slider_to_db(self.volumes.master) + slider_to_db(bus)
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        let group = cue.group();
        if group == MixerGroup::Music {
            self.music = Some(cue);
            self.music_paused = false;
        }
        log::debug!("Sound {} ({:?}, {:.1} dB)", cue.name(), group, self.bus_db(group));
    }

    fn pause_music(&mut self) {
        if self.music.is_some() && !self.music_paused {
            self.music_paused = true;
            log::debug!("Music paused");
        }
    }

    fn resume_music(&mut self) {
        if self.music_paused {
            self.music_paused = false;
            log::debug!("Music resumed");
        }
    }

    fn set_volumes(&mut self, volumes: Volumes) {
        self.volumes = volumes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_to_db() {
        assert_eq!(slider_to_db(1.0), 0.0);
        assert!((slider_to_db(0.1) + 20.0).abs() < 1e-4);
        assert!((slider_to_db(0.0) + 80.0).abs() < 1e-3);
        assert_eq!(slider_to_db(3.0), 0.0);
    }

    #[test]
    fn test_cue_groups() {
        assert_eq!(SoundCue::MenuTheme.group(), MixerGroup::Music);
        assert_eq!(SoundCue::Jump.group(), MixerGroup::Sfx);
    }

    #[test]
    fn test_music_switch_and_pause() {
        let mut audio = LogAudio::new();
        audio.pause_music();
        assert!(!audio.is_music_paused());

        audio.play(SoundCue::MenuTheme);
        audio.play(SoundCue::Jump);
        assert_eq!(audio.current_music(), Some(SoundCue::MenuTheme));

        audio.pause_music();
        assert!(audio.is_music_paused());
        audio.play(SoundCue::GameplayTheme);
        assert_eq!(audio.current_music(), Some(SoundCue::GameplayTheme));
        assert!(!audio.is_music_paused());
    }
}
