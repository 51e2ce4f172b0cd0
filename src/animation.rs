//! Smoothed animation targets for the renderer.
//!
//! Targets are written once per gesture tick; [`AnimationSynchronizer::tick`]
//! moves the current values toward them once per render tick with fixed
//! per-tick factors.

use crate::config::{AnimationConfig, InteractionConfig};
use crate::interaction::{InteractionMode, Navigation};
use crate::landmarks::Position3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the renderer should be heading toward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationTargets {
    pub camera_distance: f32,
    pub camera_height: f32,
    pub group_rotation: f32,
    pub effect_intensity: f32,
    pub selected_item: Option<usize>,
}

impl AnimationTargets {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            camera_distance: config.default_camera_distance,
            camera_height: config.default_camera_height,
            group_rotation: 0.0,
            effect_intensity: config.active_intensity,
            selected_item: None,
        }
    }
}

impl Default for AnimationTargets {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

/// Smoothed values the renderer actually draws with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub camera_distance: f32,
    pub camera_height: f32,
    pub group_rotation: f32,
    pub effect_intensity: f32,
}

impl From<&AnimationTargets> for AnimationState {
    fn from(targets: &AnimationTargets) -> Self {
        Self {
            camera_distance: targets.camera_distance,
            camera_height: targets.camera_height,
            group_rotation: targets.group_rotation,
            effect_intensity: targets.effect_intensity,
        }
    }
}

/// Ambient particle look for a given effect intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectAppearance {
    pub particle_size: f32,
    pub particle_opacity: f32,
}

impl EffectAppearance {
    pub fn from_intensity(intensity: f32) -> Self {
        Self {
            particle_size: 0.4 + intensity * 0.1,
            particle_opacity: 0.7 + intensity * 0.08,
        }
    }
}

/// Clamp ranges for navigated camera targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub distance: (f32, f32),
    pub height: (f32, f32),
}

impl From<&InteractionConfig> for CameraBounds {
    fn from(config: &InteractionConfig) -> Self {
        Self {
            distance: config.distance_range,
            height: config.height_range,
        }
    }
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self::from(&InteractionConfig::default())
    }
}

fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Single writer of [`AnimationTargets`] and [`AnimationState`]
#[derive(Debug, Clone)]
pub struct AnimationSynchronizer {
    config: AnimationConfig,
    bounds: CameraBounds,
    targets: AnimationTargets,
    state: AnimationState,
    mode: InteractionMode,
    hand_visible: bool,
}

impl Default for AnimationSynchronizer {
    fn default() -> Self {
        Self::new(AnimationConfig::default(), CameraBounds::default())
    }
}

impl AnimationSynchronizer {
    pub fn new(config: AnimationConfig, bounds: CameraBounds) -> Self {
        let targets = AnimationTargets::from_config(&config);
        Self {
            state: AnimationState::from(&targets),
            config,
            bounds,
            targets,
            mode: InteractionMode::Idle,
            hand_visible: false,
        }
    }

    pub fn targets(&self) -> &AnimationTargets {
        &self.targets
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn appearance(&self) -> EffectAppearance {
        EffectAppearance::from_intensity(self.state.effect_intensity)
    }

    /// Where the camera currently is, looking at the origin down the z axis
    pub fn camera_position(&self) -> Position3 {
        Position3::new(0.0, self.state.camera_height, self.state.camera_distance)
    }

    /// Add navigation deltas to the targets, clamping camera distance and height
    pub fn apply_navigation(&mut self, navigation: &Navigation) {
        let (min_distance, max_distance) = self.bounds.distance;
        let (min_height, max_height) = self.bounds.height;

        self.targets.group_rotation += navigation.rotation;
        self.targets.camera_distance =
            (self.targets.camera_distance + navigation.distance).clamp(min_distance, max_distance);
        self.targets.camera_height =
            (self.targets.camera_height + navigation.height).clamp(min_height, max_height);
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.targets.effect_intensity = match mode {
            InteractionMode::Closed => self.config.closed_intensity,
            InteractionMode::Idle | InteractionMode::Interactive => self.config.active_intensity,
        };
    }

    pub fn set_hand_visible(&mut self, visible: bool) {
        self.hand_visible = visible;
    }

    pub fn set_selection(&mut self, index: usize) {
        if self.targets.selected_item != Some(index) {
            debug!("Selected item target: {}", index);
        }
        self.targets.selected_item = Some(index);
    }

    /// Advance the smoothed values by one render tick
    pub fn tick(&mut self) {
        let config = &self.config;

        self.state.effect_intensity = approach(
            self.state.effect_intensity,
            self.targets.effect_intensity,
            config.intensity_smoothing,
        );

        self.state.group_rotation = approach(
            self.state.group_rotation,
            self.targets.group_rotation,
            config.rotation_smoothing,
        );
        if !self.hand_visible {
            self.targets.group_rotation += config.idle_rotation_step;
        }

        match self.mode {
            InteractionMode::Closed => {}
            InteractionMode::Idle => {
                self.targets.camera_distance = approach(
                    self.targets.camera_distance,
                    config.default_camera_distance,
                    config.idle_camera_return,
                );
                self.targets.camera_height = approach(
                    self.targets.camera_height,
                    config.default_camera_height,
                    config.idle_camera_return,
                );
                self.chase_camera();
            }
            InteractionMode::Interactive => self.chase_camera(),
        }
    }

    fn chase_camera(&mut self) {
        self.state.camera_distance = approach(
            self.state.camera_distance,
            self.targets.camera_distance,
            self.config.camera_smoothing,
        );
        self.state.camera_height = approach(
            self.state.camera_height,
            self.targets.camera_height,
            self.config.camera_smoothing,
        );
    }

    /// Back to rest: default targets, state snapped to them, no selection
    pub fn reset(&mut self) {
        self.targets = AnimationTargets::from_config(&self.config);
        self.state = AnimationState::from(&self.targets);
        self.mode = InteractionMode::Idle;
        self.hand_visible = false;
    }
}
