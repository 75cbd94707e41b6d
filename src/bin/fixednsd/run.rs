// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements the `run` command (i.e., running the endpoint).

use std::fmt::Write;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use fixedns::server::{self, Server};
use fixedns::thread::ThreadGroup;

use crate::args::RunArgs;
use crate::config;

/// Runs the endpoint.
pub fn run(args: RunArgs) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    if let Err(e) = try_running(args) {
        let mut message = String::from("Failed to run:");
        for (i, cause) in e.chain().enumerate() {
            let _ = write!(message, "\n[{}] {}", i + 1, cause);
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
    info!("Exiting with success.");
}

fn try_running(run_args: RunArgs) -> Result<()> {
    info!(
        "fixednsd v{}.{}.{} starting.",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR"),
        env!("CARGO_PKG_VERSION_PATCH"),
    );

    // Get the configuration, either from the file system or from the
    // command line arguments, as appropriate.
    let config = if let Some(ref config_path) = run_args.config {
        info!("Loading the configuration from {}.", config_path.display());
        config::load_from_path(config_path).context("failed to load the configuration")?
    } else {
        info!("Loading the configuration from the command line.");
        config::load_from_args(run_args)
    };

    // Build the response before binding, so a bad response never
    // reaches the network.
    let response = server::demo_response().context("failed to build the response message")?;
    let server = Arc::new(Server::new(response));

    let io_provider = config
        .io
        .bind_provider(config.bind)
        .with_context(|| format!("failed to bind {}", config.bind))?;

    let mut signals = set_up_signal_handling().context("failed to set up signal handling")?;

    info!("Set-up is complete; listening on {}.", config.bind);
    let thread_group = ThreadGroup::new();
    io_provider
        .start(&server, &thread_group)
        .context("failed to start the I/O provider")?;

    // Wait for a termination signal.
    if let Some(signal) = signals.forever().next() {
        let name = match signal {
            SIGINT => "SIGINT",
            SIGTERM => "SIGTERM",
            _ => "a termination signal",
        };
        info!("Received {}; shutting down.", name);
    }

    thread_group.shut_down();
    thread_group.await_shutdown();
    info!("Shutdown complete.");
    Ok(())
}

fn set_up_signal_handling() -> Result<Signals> {
    let term_signals = &[SIGINT, SIGTERM];
    let already_terminating = Arc::new(AtomicBool::new(false));

    // A second termination signal that arrives before the graceful
    // shutdown finishes exits immediately.
    for sig in term_signals {
        signal_hook::flag::register_conditional_shutdown(*sig, 1, already_terminating.clone())?;
        signal_hook::flag::register(*sig, already_terminating.clone())?;
    }

    Signals::new(term_signals).map_err(Into::into)
}
