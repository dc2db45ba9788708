// Copyright 2026 the atrium project authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The atrium launcher.
//!
//! Loads the preferences file, assembles a runtime context over the headless
//! collaborators, installs the listed plugins, runs the startup scripts, and
//! drives the frame loop until the window closes.
//!
//! Usage: `atrium [prefs.json] [--frames N]`. `--frames` bounds the run,
//! which is what keeps a headless session from spinning forever.

use anyhow::{bail, Context, Result};
use atrium_core::render::RenderDevice;
use atrium_infra::{EchoInterpreter, HeadlessBackend, HeadlessWindow};
use atrium_runtime::{
    CoreApplication, GuiApplication, PluginManager, Preferences, RuntimeContext,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

// Keep the plugin registrations linked in.
use atrium_plugins as _;

const DEFAULT_PREFS: &str = "atrium.json";
const DEFAULT_FRAMES: u64 = 300;

struct Options {
    prefs: PathBuf,
    frames: u64,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options {
        prefs: PathBuf::from(DEFAULT_PREFS),
        frames: DEFAULT_FRAMES,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter
                    .next()
                    .context("--frames expects a number")?;
                options.frames = value
                    .parse()
                    .with_context(|| format!("bad --frames value {value:?}"))?;
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path => options.prefs = PathBuf::from(path),
        }
    }
    Ok(options)
}

fn run(options: Options) -> Result<i32> {
    let preferences = Preferences::load_or_default(&options.prefs);

    let window = HeadlessWindow::open(&preferences.window).with_frame_budget(options.frames);
    let mut device = RenderDevice::new(Box::new(HeadlessBackend::new()));
    let context = device
        .new_context(&preferences.context)
        .context("render context creation failed")?;
    device
        .set_active_context(Some(context))
        .context("render context activation failed")?;

    let ctx = RuntimeContext::new(
        preferences.clone(),
        Rc::new(RefCell::new(window)),
        Rc::new(RefCell::new(device)),
        Rc::new(RefCell::new(EchoInterpreter::new())),
    );

    let mut plugins = PluginManager::new(&ctx);
    let plugin_paths: Vec<PathBuf> = preferences
        .plugins
        .iter()
        .map(|entry| entry.path.clone())
        .collect();
    let installed = plugins.install_all(&plugin_paths);
    log::info!(
        "{} of {} plugin(s) installed",
        installed.len(),
        plugin_paths.len()
    );

    let core = CoreApplication::new("atrium", ctx);
    let mut app = GuiApplication::new(core);
    let code = app.run_until_closed();
    log::info!(
        "{} frame(s), {:.1} fps average",
        app.frame_index(),
        app.average_fps()
    );
    Ok(code)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(err) => {
            log::error!("{err:#}");
            std::process::exit(2);
        }
    };
    match run(options) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            log::error!("{err:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let options = parse_options(&[]).unwrap();
        assert_eq!(options.prefs, PathBuf::from(DEFAULT_PREFS));
        assert_eq!(options.frames, DEFAULT_FRAMES);
    }

    #[test]
    fn prefs_path_and_frames_are_parsed() {
        let args: Vec<String> = ["editor.json", "--frames", "12"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let options = parse_options(&args).unwrap();
        assert_eq!(options.prefs, PathBuf::from("editor.json"));
        assert_eq!(options.frames, 12);
    }

    #[test]
    fn bad_flags_are_rejected() {
        let args = vec!["--bogus".to_string()];
        assert!(parse_options(&args).is_err());
        let args = vec!["--frames".to_string(), "many".to_string()];
        assert!(parse_options(&args).is_err());
    }
}
