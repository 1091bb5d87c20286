use bevy::prelude::*;

mod catalog;
mod compat;
mod filter;
mod geo;
mod plugins;
mod regions;

fn main() {
    let window = plugins::core::ExplorerConfig::default().window_size();

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.93, 0.93, 0.95)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Catchmap".to_string(),
                resolution: (window.x as u32, window.y as u32).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            plugins::core::CorePlugin,
            plugins::dataset::DatasetPlugin,
            plugins::interaction::InteractionPlugin,
            plugins::sliders::SlidersPlugin,
            plugins::render2d::Render2DPlugin,
            plugins::ui::UIPlugin,
        ))
        .run();
}
