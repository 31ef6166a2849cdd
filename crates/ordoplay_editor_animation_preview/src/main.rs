// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` animation preview - headless playback of a keyframed scene.
//!
//! Usage: `ordoplay_editor_animation_preview [settings.ron]`
//!
//! Without a settings file the default timeline (300 frames at 30 fps) is used.

mod preview;

use ordoplay_editor_animation::{PoseRecord, Result, TimelineSettings};
use preview::PreviewScene;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ordoplay_editor_animation=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OrdoPlay animation preview v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        tracing::error!("Preview failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => TimelineSettings::load(&path)?,
        None => TimelineSettings::default(),
    };
    tracing::info!(
        duration = settings.duration,
        frame_rate = settings.frame_rate,
        smoothness = settings.smoothness,
        "Timeline settings"
    );

    let mut scene = PreviewScene::new(&settings);
    scene.author();
    scene.play_loop((settings.frame_rate as u32).max(1));

    println!("{}", PoseRecord::list_to_json(&scene.export_camera())?);
    Ok(())
}
