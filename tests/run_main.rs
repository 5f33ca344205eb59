use std::time::Duration;

use assert_cmd::Command;
use wgpu_sketchbook::sketches::sketch_names;

const TIMEOUT_DURATION: Duration = Duration::from_secs(30);

fn headless() -> Result<Command, anyhow::Error> {
    let mut command = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
    command
        .env("HEADLESS", "true")
        .env("HEADLESS_FRAMES", "30")
        .timeout(TIMEOUT_DURATION);
    Ok(command)
}

#[test]
fn main_doesnt_panic() -> Result<(), anyhow::Error> {
    headless()?.assert().success();
    Ok(())
}

#[test]
fn sketches_dont_panic() -> Result<(), anyhow::Error> {
    for sketch in sketch_names() {
        headless()?.env("SKETCH", sketch).assert().success();
    }
    Ok(())
}

#[test]
fn unknown_sketch_fails() -> Result<(), anyhow::Error> {
    headless()?
        .env("SKETCH", "does-not-exist")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn bad_frame_count_fails() -> Result<(), anyhow::Error> {
    headless()?
        .env("HEADLESS_FRAMES", "forever")
        .assert()
        .failure();
    Ok(())
}
