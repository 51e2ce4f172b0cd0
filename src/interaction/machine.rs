use super::types::{InteractionMode, Navigation, Transition};
use crate::classifier::GestureSignals;
use crate::config::InteractionConfig;
use tracing::{debug, info};

/// Everything the state machine remembers between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineState {
    pub mode: InteractionMode,
    pub was_pinching: bool,
}

/// One state machine step as a pure function.
///
/// Priority, first match wins: pinching ⇒ Closed, hand visible ⇒
/// Interactive, otherwise Idle. Selection is requested only on the tick the
/// pinch starts. Navigation is produced only in Interactive, after the mode
/// update, and only for deltas outside the dead-zone.
pub fn step(
    config: &InteractionConfig,
    state: MachineState,
    signals: &GestureSignals,
    wave_completed: bool,
) -> (MachineState, Transition) {
    let previous = state.mode;

    let (mode, select) = if signals.pinching {
        (InteractionMode::Closed, !state.was_pinching)
    } else if signals.hand_visible {
        (InteractionMode::Interactive, false)
    } else {
        (InteractionMode::Idle, false)
    };

    let entered = (mode != previous).then_some(mode);

    let navigation = if mode == InteractionMode::Interactive {
        navigation_for(config, signals)
    } else {
        None
    };

    let next = MachineState {
        mode,
        was_pinching: signals.pinching,
    };

    let transition = Transition {
        previous,
        mode,
        entered,
        select,
        navigation,
        blessing: wave_completed,
    };

    (next, transition)
}

fn navigation_for(config: &InteractionConfig, signals: &GestureSignals) -> Option<Navigation> {
    let horizontal = signals.delta_x.abs() > config.dead_zone;
    let vertical = signals.delta_y.abs() > config.dead_zone;

    if !horizontal && !vertical {
        return None;
    }

    let mut navigation = Navigation::default();
    if horizontal {
        navigation.rotation = signals.delta_x * config.rotation_gain;
    }
    if vertical {
        // Raising the hand pulls the camera in and up
        navigation.distance = signals.delta_y * config.distance_gain;
        navigation.height = -signals.delta_y * config.height_gain;
    }
    Some(navigation)
}

/// Owner of the interaction mode
#[derive(Debug, Clone)]
pub struct InteractionStateMachine {
    config: InteractionConfig,
    state: MachineState,
}

impl Default for InteractionStateMachine {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionStateMachine {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: MachineState::default(),
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.state.mode
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Advance one gesture tick
    pub fn update(&mut self, signals: &GestureSignals, wave_completed: bool) -> Transition {
        let (next, transition) = step(&self.config, self.state, signals, wave_completed);
        self.state = next;

        if let Some(mode) = transition.entered {
            info!("Interaction mode: {} -> {}", transition.previous, mode);
        }
        if transition.select {
            debug!("Pinch started, selection requested");
        }

        transition
    }

    pub fn reset(&mut self) {
        self.state = MachineState::default();
    }
}
