//! Shovelstone headless runner
//!
//! Loads a level (or the built-in demo), plays a scripted input sequence
//! through the fixed-timestep loop and prints a JSON summary of the run.
//!
//! Usage: `shovelstone [level.json] [settings.json]`

use std::error::Error;

use glam::{Vec2, Vec3};
use serde::Serialize;

use shovelstone::audio::{AudioCues, LEVEL_AMBIENCE, PlayRequest};
use shovelstone::consts::*;
use shovelstone::sim::{GridWorld, Session, TickInput, Tool, tick};
use shovelstone::{LevelDesc, Settings};

/// Host frame time (the sim runs at `SIM_DT` underneath)
const FRAME_DT: f32 = 1.0 / 30.0;

/// Outcome of a run
#[derive(Debug, Serialize)]
struct Summary {
    level: String,
    ticks: u64,
    player: Vec3,
    health: u8,
    gold: u32,
    deaths: u32,
    checkpoints_found: usize,
    blocks: Vec<Vec3>,
    events: usize,
    sounds: usize,
}

/// Drives a session the way a frame loop would
struct Runner {
    session: Session,
    world: GridWorld,
    accumulator: f32,
    input: TickInput,
    cues: AudioCues,
    events: usize,
    sounds: usize,
}

impl Runner {
    fn new(session: Session, world: GridWorld) -> Self {
        Self {
            session,
            world,
            accumulator: 0.0,
            input: TickInput::default(),
            cues: AudioCues::new(),
            events: 0,
            sounds: 0,
        }
    }

    /// Run simulation ticks for one host frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.session, &mut self.world, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.equip = None;
            self.input.dig = false;
            self.input.jump = false;
            self.input.interact = false;
            self.input.pause = false;
            self.input.next_checkpoint = false;
        }

        self.flush_events();
    }

    fn flush_events(&mut self) {
        let events = self.session.drain_events();
        for event in &events {
            log::debug!("[tick {}] {:?}", self.session.time_ticks, event);
        }
        for request in self.cues.cues(&events, &self.session.settings) {
            log::trace!("play {} at {:.2}", request.effect.clip_name(), request.volume);
            self.sounds += 1;
        }
        self.events += events.len();
    }

    /// Hold `input` for `secs` of host time
    fn play(&mut self, input: TickInput, secs: f32) {
        self.input = input;
        let frames = (secs / FRAME_DT).round().max(1.0) as u32;
        for _ in 0..frames {
            self.update(FRAME_DT);
        }
    }

    fn summary(&self, level: &str) -> Summary {
        let session = &self.session;
        Summary {
            level: level.to_string(),
            ticks: session.time_ticks,
            player: session.player.position,
            health: session.player.health,
            gold: session.stats.gold,
            deaths: session.stats.deaths,
            checkpoints_found: session.ledger.discovered_count(),
            blocks: session.blocks.iter().map(|b| b.position).collect(),
            events: self.events,
            sounds: self.sounds,
        }
    }
}

/// Scripted play-through: walk to the first block, shove it, dig, charge a
/// swing, then skip ahead and wait out the cannon.
fn demo_script() -> Vec<(TickInput, f32)> {
    let walk = |x: f32, y: f32| TickInput {
        movement: Vec2::new(x, y),
        ..Default::default()
    };
    vec![
        (
            TickInput {
                equip: Some(Tool::Shovel),
                ..Default::default()
            },
            0.1,
        ),
        (walk(1.0, 0.0), 0.2),
        (
            TickInput {
                swing: true,
                ..Default::default()
            },
            0.1,
        ),
        (TickInput::default(), 1.0),
        (
            TickInput {
                dig: true,
                ..Default::default()
            },
            0.1,
        ),
        (TickInput::default(), 2.5),
        (
            TickInput {
                interact: true,
                ..Default::default()
            },
            0.1,
        ),
        (walk(1.0, 0.0), 0.4),
        (
            TickInput {
                swing: true,
                ..Default::default()
            },
            1.6,
        ),
        (TickInput::default(), 2.0),
        (
            TickInput {
                next_checkpoint: true,
                ..Default::default()
            },
            0.1,
        ),
        (TickInput::default(), 6.0),
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Shovelstone (headless) starting...");

    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => LevelDesc::load(path)?,
        None => LevelDesc::demo(),
    };
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };

    for track in LEVEL_AMBIENCE {
        if let Some(request) = PlayRequest::new(track, &settings) {
            log::debug!("loop {} at {:.2}", request.effect.clip_name(), request.volume);
        }
    }

    let (session, world) = level.build(settings)?;
    let mut runner = Runner::new(session, world);
    for (input, secs) in demo_script() {
        runner.play(input, secs);
    }

    let summary = runner.summary(&level.name);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
