use anyhow::{Context, Result};
use tracing::info;

use tank_arena::{
    arena::Arena,
    core::{
        audio::RecordingAudio,
        config::{ArenaConfig, DEFAULT_TIMESTEP_S},
        input::{ElementState, InputHandler, KeyCode},
        render::RecordingRenderer,
    },
    resource::ResourceHandler,
    util::{linalg::Vec2, setup_log, LogTarget},
};

const FRAMES: usize = 600;
const FRAME_TIME_S: f32 = 1. / 60.;

/// Scripted input: drive forwards while turning, swing the barrel towards the top-right of the
/// screen, and fire every second.
fn script(frame: usize, input: &mut InputHandler, config: &ArenaConfig) {
    match frame {
        0 => {
            input.queue_event(KeyCode::KeyW, ElementState::Pressed);
            input.queue_event(KeyCode::MouseRight, ElementState::Pressed);
            input.set_mouse_pos(Vec2 {
                x: config.screen_width,
                y: 0.,
            });
        }
        120 => input.queue_event(KeyCode::KeyD, ElementState::Pressed),
        180 => input.queue_event(KeyCode::KeyD, ElementState::Released),
        400 => input.queue_event(KeyCode::KeyW, ElementState::Released),
        _ => {}
    }
    if frame % 60 == 30 {
        input.queue_event(KeyCode::MouseLeft, ElementState::Pressed);
    } else if frame % 60 == 31 {
        input.queue_event(KeyCode::MouseLeft, ElementState::Released);
    }
    input.update_step();
}

fn main() -> Result<()> {
    setup_log(LogTarget::Stderr)?;

    let config = ArenaConfig::default();
    let mut resources = ResourceHandler::new();
    let mut arena = Arena::new(config.clone(), &mut resources).context("building arena")?;
    for (x, y) in [(0., 600.), (-500., 250.), (650., -300.), (900., 900.)] {
        arena.add_obstacle(Vec2 { x, y }, Vec2::splat(3.))?;
    }
    arena.add_obstacle(Vec2 { x: 1200., y: 0. }, Vec2 { x: 1., y: 40. })?;

    let mut input = InputHandler::new();
    let mut audio = RecordingAudio::new();
    let mut renderer = RecordingRenderer::new();
    let mut collisions = 0;
    let mut destroyed = 0;
    for frame in 0..FRAMES {
        script(frame, &mut input, &config);
        let delta = if frame == 0 {
            DEFAULT_TIMESTEP_S
        } else {
            FRAME_TIME_S
        };
        let report = arena.update(delta, &input, &mut audio);
        collisions += report.collisions.len();
        destroyed += report.destroyed.len();
        arena.render(&mut renderer, true);
        renderer.take_commands();
    }

    let body = arena.scene().node(arena.body())?;
    info!(
        "simulated {FRAMES} frames: {collisions} collisions, {destroyed} nodes destroyed, \
        {} shots fired, {} projectiles in flight",
        audio.played().len(),
        arena.projectiles().len()
    );
    info!(
        "tank at {} facing {:.2} rad",
        body.world_position(),
        body.world_rotation()
    );
    Ok(())
}
