use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::fs;
use std::path::Path;

use crate::geo::{ConicProjection, MAP_ASPECT};

pub struct CorePlugin;

// =============================================================================
// Configuration
// =============================================================================

/// Height of the control strip under the map, in pixels.
pub const CONTROL_STRIP_HEIGHT: f32 = 90.0;

/// Startup configuration. Defaults match the source map; an optional
/// `assets/config.ron` overrides individual fields.
#[derive(Resource, Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Rendered map width in pixels; height follows the map image aspect.
    pub map_width: f32,
    pub dataset_path: String,
    pub map_image_path: String,
    /// Rating change applied by one slider key nudge.
    pub slider_step: f64,
    pub region_border_thickness: f32,
    pub label_offset: f32,
    pub tooltip_offset: f32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            map_width: 1000.0,
            dataset_path: "assets/data/companies.csv".to_string(),
            map_image_path: "map.png".to_string(),
            slider_step: 0.5,
            region_border_thickness: 6.0,
            label_offset: 6.0,
            tooltip_offset: 6.0,
        }
    }
}

impl ExplorerConfig {
    pub fn map_height(&self) -> f32 {
        (MAP_ASPECT * f64::from(self.map_width)).floor() as f32
    }

    pub fn window_size(&self) -> Vec2 {
        Vec2::new(self.map_width, self.map_height() + CONTROL_STRIP_HEIGHT)
    }

    /// Read the config file if present; a missing file means defaults and a
    /// malformed one logs and falls back.
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };

        match ron::de::from_str::<Self>(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!("Ignoring malformed config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}

// =============================================================================
// Input bindings
// =============================================================================

#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub min_rating_down: KeyCode,
    pub min_rating_up: KeyCode,
    pub max_rating_down: KeyCode,
    pub max_rating_up: KeyCode,
    pub reset_regions: KeyCode,
    pub toggle_debug: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            min_rating_down: KeyCode::Comma,
            min_rating_up: KeyCode::Period,
            max_rating_down: KeyCode::BracketLeft,
            max_rating_up: KeyCode::BracketRight,
            reset_regions: KeyCode::KeyR,
            toggle_debug: KeyCode::F3,
        }
    }
}

// =============================================================================
// Event log
// =============================================================================

#[derive(Resource, Debug)]
pub struct EventLog {
    entries: Vec<String>,
    max_entries: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 8,
        }
    }
}

impl EventLog {
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[derive(Resource, Debug, Default)]
pub struct DebugWindow {
    pub open: bool,
}

// =============================================================================
// App states and system ordering
// =============================================================================

#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Boot,
    Loading,
    Exploring,
}

/// Frame ordering: pointer/key handling mutates state, the filter pass
/// derives membership, then visuals sync.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplorerSet {
    Input,
    Filter,
    Render,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        let config = ExplorerConfig::load_or_default(Path::new("assets/config.ron"));
        let projection = ConicProjection::bay_area(
            f64::from(config.map_width),
            f64::from(config.map_height()),
        );

        app.init_state::<AppState>()
            .insert_resource(config)
            .insert_resource(projection)
            .init_resource::<InputBindings>()
            .init_resource::<EventLog>()
            .init_resource::<DebugWindow>()
            .configure_sets(
                Update,
                (ExplorerSet::Input, ExplorerSet::Filter, ExplorerSet::Render).chain(),
            )
            .add_systems(
                OnEnter(AppState::Boot),
                (log_enter_boot, apply_window_size, transition_to_loading),
            )
            .add_systems(OnEnter(AppState::Exploring), log_enter_exploring)
            .add_systems(Update, handle_debug_toggle.in_set(ExplorerSet::Input));
    }
}

fn log_enter_boot(mut log: ResMut<EventLog>) {
    log.push("State: Boot".to_string());
    info!("State: Boot");
}

fn transition_to_loading(mut next_state: ResMut<NextState<AppState>>) {
    next_state.set(AppState::Loading);
}

/// Size the window from the loaded config, which may differ from the compiled
/// defaults the window was created with.
fn apply_window_size(
    config: Res<ExplorerConfig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };
    let size = config.window_size();
    window.resolution.set(size.x, size.y);
}

fn log_enter_exploring(mut log: ResMut<EventLog>) {
    log.push("State: Exploring".to_string());
    info!("State: Exploring");
}

fn handle_debug_toggle(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut debug_window: ResMut<DebugWindow>,
) {
    if input.just_pressed(bindings.toggle_debug) {
        debug_window.open = !debug_window.open;
        info!(
            "Debug window: {}",
            if debug_window.open { "open" } else { "closed" }
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
