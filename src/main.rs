// Copyright © 2025 Soft Sprint Studios
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Headless CLI bootstrap (§6). Parses the command-line surface, acquires
//! the single-instance lock, wires up a no-op [`Backends`] bundle since
//! rendering/physics/sound/video are external collaborators out of scope
//! for this crate (§1), and runs the tick loop.

use std::process::exit;

use docopt::Docopt;
use log::{error, info};

use tectonic_core::backends::Backends;
use tectonic_core::engine::{Engine, SingleInstanceLock};

const USAGE: &str = "
Tectonic engine core.

Usage:
  tectonic-core [-fullscreen] [-window] [-console] [-dev] [-w <int>] [-h <int>]
  tectonic-core (--help)

Options:
  -fullscreen   Start in fullscreen mode (no-op without a renderer).
  -window       Start windowed (no-op without a renderer).
  -console      Start with the developer console open (no-op headless).
  -dev          Enable developer diagnostics (sets the developer cvar).
  -w <int>      Window width in pixels.
  -h <int>      Window height in pixels.
  --help        Show this message.
";

fn main() {
    env_logger::init();

    let args = Docopt::new(USAGE)
        .and_then(|d| d.parse())
        .unwrap_or_else(|e| e.exit());

    let lock = match SingleInstanceLock::acquire("tectonic-core") {
        Ok(lock) => lock,
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    };

    let mut engine = Engine::new(Backends::null());

    if args.get_bool("-dev") {
        engine.cvars.engine_set("developer", "1");
    }
    if let Some(w) = args.get_str("-w").parse::<i32>().ok() {
        engine.cvars.engine_set("vid_width", &w.to_string());
    }
    if let Some(h) = args.get_str("-h").parse::<i32>().ok() {
        engine.cvars.engine_set("vid_height", &h.to_string());
    }
    if args.get_bool("-console") {
        info!("starting with the developer console open");
    }

    info!("tectonic-core starting");

    while engine.is_running() {
        engine.tick();
    }

    info!("tectonic-core shutting down");
    drop(lock);
}
