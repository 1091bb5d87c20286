//! Dataset loading: reads the company CSV once and spawns the catalog.

use bevy::prelude::*;
use std::path::Path;

use crate::catalog::{load_catalog, Company, InFilter};
use crate::filter::{refresh_filter, FilterBounds, FilterStats};
use crate::plugins::core::{AppState, EventLog, ExplorerConfig, ExplorerSet};
use crate::regions::Regions;

pub struct DatasetPlugin;

impl Plugin for DatasetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Regions>()
            .init_resource::<FilterBounds>()
            .init_resource::<FilterStats>()
            .add_systems(OnEnter(AppState::Loading), load_dataset)
            .add_systems(
                Update,
                refresh_filter
                    .in_set(ExplorerSet::Filter)
                    .run_if(in_state(AppState::Exploring)),
            );
    }
}

/// Load the catalog and spawn one entity per company. A missing or unreadable
/// dataset is logged and leaves the catalog empty; the app still runs.
fn load_dataset(
    mut commands: Commands,
    config: Res<ExplorerConfig>,
    mut log: ResMut<EventLog>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let path = Path::new(&config.dataset_path);

    match load_catalog(path) {
        Ok(load) => {
            if load.skipped_rows > 0 {
                warn!("Skipped {} malformed catalog rows", load.skipped_rows);
                log.push(format!("Skipped {} malformed rows", load.skipped_rows));
            }

            let count = load.companies.len();
            for record in load.companies {
                commands.spawn((Company::from_record(record), InFilter::default()));
            }

            info!("Loaded {} companies from {}", count, path.display());
            log.push(format!("Loaded {} companies", count));
        }
        Err(err) => {
            error!("Failed to load catalog: {:#}", err);
            log.push("Dataset missing: catalog is empty".to_string());
        }
    }

    next_state.set(AppState::Exploring);
}

// =============================================================================
// Tests
// =============================================================================
