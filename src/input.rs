use bevy::prelude::*;

pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputBindings>()
            .add_systems(Update, player_input_system);
    }
}

/// Which keys drive the player's toggles and trigger.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBindings {
    pub stealth: KeyCode,
    pub running: KeyCode,
    pub fire: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            stealth: KeyCode::KeyC,
            running: KeyCode::ShiftLeft,
            fire: KeyCode::Space,
        }
    }
}

#[derive(Event, Clone, Copy, Debug)]
pub struct StealthToggled;

#[derive(Event, Clone, Copy, Debug)]
pub struct RunningToggled;

#[derive(Event, Clone, Copy, Debug)]
pub struct FireRequested;

/// One trigger per key press, on the frame it goes down.
pub fn player_input_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
) {
    if keys.just_pressed(bindings.stealth) {
        commands.trigger(StealthToggled);
    }
    if keys.just_pressed(bindings.running) {
        commands.trigger(RunningToggled);
    }
    if keys.just_pressed(bindings.fire) {
        commands.trigger(FireRequested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{PlayerMode, PlayerPlugin};

    fn input_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, PlayerInputPlugin, PlayerPlugin))
            .init_resource::<ButtonInput<KeyCode>>();
        app
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.press(key);
        app.update();
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release(key);
        keys.clear();
    }

    #[test]
    fn each_press_toggles_once() {
        let mut app = input_app();

        press(&mut app, KeyCode::KeyC);
        assert!(app.world().resource::<PlayerMode>().stealth);

        // no new press, no new toggle
        app.update();
        assert!(app.world().resource::<PlayerMode>().stealth);

        press(&mut app, KeyCode::KeyC);
        assert!(!app.world().resource::<PlayerMode>().stealth);

        press(&mut app, KeyCode::ShiftLeft);
        let mode = *app.world().resource::<PlayerMode>();
        assert!(mode.running);
        assert!(!mode.stealth);
    }

    #[test]
    fn rebinding_moves_the_toggle() {
        let mut app = input_app();
        app.insert_resource(InputBindings {
            stealth: KeyCode::KeyX,
            ..default()
        });

        press(&mut app, KeyCode::KeyC);
        assert!(!app.world().resource::<PlayerMode>().stealth);
        press(&mut app, KeyCode::KeyX);
        assert!(app.world().resource::<PlayerMode>().stealth);
    }
}
