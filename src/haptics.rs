//! Haptic feedback
//!
//! Vibration is fire-and-forget: a device without a motor (or no device at
//! all) silently ignores pulses.

use crate::sim::GameEvent;

/// Vibration cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticCue {
    /// Player fell into a hole
    Fall,
    /// A bomb went off
    Explosion,
}

impl HapticCue {
    /// Alternating on/off durations in milliseconds
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            HapticCue::Fall => &[100, 50, 100],
            HapticCue::Explosion => &[200],
        }
    }

    /// Cue for a game event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::FellIntoHazard { .. } => Some(HapticCue::Fall),
            GameEvent::BombDetonated { .. } => Some(HapticCue::Explosion),
            _ => None,
        }
    }
}

/// A vibration motor
pub trait Haptics: Send {
    fn pulse(&self, pattern: &[u32]);
}

/// Drops every pulse
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, _pattern: &[u32]) {}
}

/// Logs pulses instead of vibrating (terminal builds)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn pulse(&self, pattern: &[u32]) {
        log::debug!("Haptic pulse {:?}", pattern);
    }
}

/// Routes event cues to a motor, if enabled
pub struct HapticsDriver {
    motor: Box<dyn Haptics>,
    enabled: bool,
}

impl HapticsDriver {
    pub fn new(motor: Box<dyn Haptics>, enabled: bool) -> Self {
        Self { motor, enabled }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Pulse once per cue-bearing event
    pub fn dispatch(&self, events: &[GameEvent]) {
        if !self.enabled {
            return;
        }
        for cue in events.iter().filter_map(HapticCue::for_event) {
            self.motor.pulse(cue.pattern());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::IVec2;
    use std::sync::{Arc, Mutex};

    /// Records every pulse it receives
    #[derive(Clone, Default)]
    pub(crate) struct RecordingHaptics(pub Arc<Mutex<Vec<Vec<u32>>>>);

    impl Haptics for RecordingHaptics {
        fn pulse(&self, pattern: &[u32]) {
            if let Ok(mut pulses) = self.0.lock() {
                pulses.push(pattern.to_vec());
            }
        }
    }

    #[test]
    fn test_cues() {
        let fall = GameEvent::FellIntoHazard {
            hazard: 3,
            penalty: 200,
        };
        let boom = GameEvent::BombDetonated {
            bomb: 1,
            pos: IVec2::new(4, 4),
        };
        assert_eq!(HapticCue::for_event(&fall), Some(HapticCue::Fall));
        assert_eq!(HapticCue::for_event(&boom), Some(HapticCue::Explosion));
        assert_eq!(
            HapticCue::for_event(&GameEvent::BombRemoved { bomb: 1 }),
            None
        );
        assert_eq!(HapticCue::Fall.pattern(), &[100, 50, 100]);
    }

    #[test]
    fn test_driver_dispatch() {
        let recorder = RecordingHaptics::default();
        let mut driver = HapticsDriver::new(Box::new(recorder.clone()), true);
        let events = [
            GameEvent::BombUnderfoot { bomb: 1 },
            GameEvent::BombDetonated {
                bomb: 1,
                pos: IVec2::ZERO,
            },
        ];
        driver.dispatch(&events);
        assert_eq!(*recorder.0.lock().unwrap(), vec![vec![200]]);

        driver.set_enabled(false);
        driver.dispatch(&events);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_silent_motors_accept_pulses() {
        let events = [GameEvent::FellIntoHazard {
            hazard: 2,
            penalty: 200,
        }];
        HapticsDriver::new(Box::new(NoHaptics), true).dispatch(&events);
        HapticsDriver::new(Box::new(LogHaptics), true).dispatch(&events);
    }
}
