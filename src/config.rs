/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::{env, path::PathBuf};

use anyhow::Context;

pub const ENV_HEADLESS: &str = "HEADLESS";
pub const ENV_SKETCH: &str = "SKETCH";
pub const ENV_HEADLESS_FRAMES: &str = "HEADLESS_FRAMES";
pub const ENV_ASSETS_DIR: &str = "ASSETS_DIR";
const DEFAULT_SKETCH: &str = "debug";
const DEFAULT_HEADLESS_FRAMES: u64 = 120;
const DEFAULT_ASSETS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// Launch options, read from environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct LaunchConfig {
    /// Run without a window, for a fixed number of frames.
    pub headless: bool,
    pub sketch: String,
    pub headless_frames: u64,
    pub assets_dir: PathBuf,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: false,
            sketch: DEFAULT_SKETCH.to_owned(),
            headless_frames: DEFAULT_HEADLESS_FRAMES,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

impl LaunchConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Unset keys keep
    /// their default; `HEADLESS` only needs to be present.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self {
            headless: lookup(ENV_HEADLESS).is_some(),
            ..Self::default()
        };
        if let Some(sketch) = lookup(ENV_SKETCH).filter(|s| !s.trim().is_empty()) {
            config.sketch = sketch.trim().to_owned();
        }
        if let Some(frames) = lookup(ENV_HEADLESS_FRAMES) {
            config.headless_frames = frames
                .trim()
                .parse()
                .with_context(|| format!("{ENV_HEADLESS_FRAMES} must be a frame count, got {frames:?}"))?;
        }
        if let Some(dir) = lookup(ENV_ASSETS_DIR) {
            config.assets_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<LaunchConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        LaunchConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config, LaunchConfig::default());
        assert!(!config.headless);
        assert_eq!(config.sketch, "debug");
        assert_eq!(config.headless_frames, 120);
    }

    #[test]
    fn reads_every_variable() {
        let config = from_pairs(&[
            ("HEADLESS", ""),
            ("SKETCH", " camera "),
            ("HEADLESS_FRAMES", "10"),
            ("ASSETS_DIR", "/tmp/assets"),
        ])
        .unwrap();
        assert!(config.headless);
        assert_eq!(config.sketch, "camera");
        assert_eq!(config.headless_frames, 10);
        assert_eq!(config.assets_dir, PathBuf::from("/tmp/assets"));
    }

    #[test]
    fn bad_frame_count_is_an_error() {
        let err = from_pairs(&[("HEADLESS_FRAMES", "many")]).unwrap_err();
        assert!(err.to_string().contains("HEADLESS_FRAMES"));
    }
}
