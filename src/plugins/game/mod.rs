use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use iyes_loopless::prelude::*;

use crate::{plugins::*, util::scenes::make_chamber};

mod config;
pub use config::ChamberConfig;

#[derive(Debug)]
/// Main game plugin, responsible for loading the other game plugins and bootstrapping the game.
pub struct GamePlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Running,
    Paused,
}

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            window: WindowDescriptor {
                title: "Portal Chamber".to_string(),
                width: 1280.,
                height: 720.,
                ..default()
            },
            ..default()
        }));

        #[cfg(feature = "devel")]
        app.add_plugin(bevy_prototype_debug_lines::DebugLinesPlugin::default());

        app.insert_resource(ChamberConfig::load_or_default(config::CONFIG_PATH));
        app.add_loopless_state(GameState::Running);

        app.add_plugin(input::InputPlugin)
            .add_plugin(prop::PropPlugin)
            .add_plugin(first_person_controller::FirstPersonControllerPlugin)
            .add_plugin(physics::PhysicsPlugin)
            .add_plugin(portal::PortalPlugin);

        app.add_startup_system(setup);
        app.add_system(toggle_pause);
    }
}

/// Perform game initialization
fn setup(
    mut commands: Commands,
    config: Res<ChamberConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    make_chamber(&mut commands, &mut meshes, &mut materials, &config);

    // Light
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            color: Color::ANTIQUE_WHITE,
            illuminance: 20_000.,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform {
            translation: Vec3::Y * config.height,
            rotation: Quat::from_euler(EulerRot::YXZ, FRAC_PI_4, FRAC_PI_4, 0.),
            scale: Vec3::ONE,
        },
        ..default()
    });
}

fn toggle_pause(
    mut commands: Commands,
    state: Res<CurrentState<GameState>>,
    keys: Res<Input<KeyCode>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        let next = match state.0 {
            GameState::Running => GameState::Paused,
            GameState::Paused => GameState::Running,
        };
        commands.insert_resource(NextState(next));
    }
}
