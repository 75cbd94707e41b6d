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

//! Groups of restartable worker threads.

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info};

/// A group of worker threads managed together.
///
/// Each thread started with [`ThreadGroup::start_respawnable`] runs its
/// task over and over: if the task returns or panics while the group
/// is not shutting down, it is started again, no sooner than
/// [`THREAD_RESPAWN_DELAY`] after its previous start.
///
/// [`ThreadGroup::shut_down`] stops the group. No new threads may be
/// started afterward, and tasks that end are not restarted.
/// [`ThreadGroup::await_shutdown`] waits for every thread to exit, so
/// long-running tasks should hold an [`Arc`] to the group and poll
/// [`ThreadGroup::is_shutting_down`].
pub struct ThreadGroup {
    state: Mutex<GroupState>,

    /// Notified when shutdown begins and when the last thread exits.
    wakeup: Condvar,
}

#[derive(Default)]
struct GroupState {
    running: usize,
    restarts: u64,
    shutting_down: bool,
}

/// How long to wait between successive starts of a task. If a task
/// ends within `THREAD_RESPAWN_DELAY` of its last start, the thread
/// sleeps out the remainder before starting it again.
pub const THREAD_RESPAWN_DELAY: Duration = Duration::from_secs(1);

impl ThreadGroup {
    /// Creates a new thread group.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GroupState::default()),
            wakeup: Condvar::new(),
        })
    }

    /// Starts a thread named `name` that runs `task` until the group
    /// shuts down, restarting it whenever it returns or panics.
    pub fn start_respawnable<F>(self: &Arc<Self>, name: String, task: F) -> Result<(), Error>
    where
        F: Fn() + Send + 'static,
    {
        let mut state = self.state.lock().unwrap();
        if state.shutting_down {
            return Err(Error::ShuttingDown);
        }
        let group = self.clone();
        thread::Builder::new()
            .name(name)
            .spawn(move || {
                let _running = RunningGuard(group.clone());
                group.run_respawnable(task);
            })?;
        state.running += 1;
        Ok(())
    }

    /// Shuts down the `ThreadGroup`.
    pub fn shut_down(&self) {
        self.state.lock().unwrap().shutting_down = true;
        self.wakeup.notify_all();
    }

    /// Waits until shutdown has been initiated and every thread in the
    /// group has exited. Calling this from a thread within the group
    /// deadlocks.
    pub fn await_shutdown(&self) {
        let state = self.state.lock().unwrap();
        let _state = self
            .wakeup
            .wait_while(state, |s| !s.shutting_down || s.running > 0)
            .unwrap();
    }

    /// Returns whether the `ThreadGroup` is shutting down.
    pub fn is_shutting_down(&self) -> bool {
        self.state.lock().unwrap().shutting_down
    }

    /// Returns the number of threads currently running in the group.
    pub fn running(&self) -> usize {
        self.state.lock().unwrap().running
    }

    /// Returns how many times tasks in the group have been restarted.
    pub fn restarts(&self) -> u64 {
        self.state.lock().unwrap().restarts
    }

    /// The body of a respawnable thread.
    fn run_respawnable<F: Fn()>(&self, task: F) {
        let current_thread = thread::current();
        let thread_name = current_thread.name().unwrap_or("anonymous");
        loop {
            let last_start = Instant::now();
            if panic::catch_unwind(AssertUnwindSafe(&task)).is_err() {
                error!("Respawnable thread {} panicked", thread_name);
            }

            let mut state = self.state.lock().unwrap();
            if state.shutting_down {
                return;
            }
            error!("Respawnable thread {} exited prematurely", thread_name);

            // The wait ends early if shutdown begins.
            let since_last_start = last_start.elapsed();
            if since_last_start < THREAD_RESPAWN_DELAY {
                let wait_for = THREAD_RESPAWN_DELAY - since_last_start;
                info!(
                    "Respawn of thread {} throttled: delayed by {} ms",
                    thread_name,
                    wait_for.as_millis()
                );
                state = self.wakeup.wait_timeout(state, wait_for).unwrap().0;
                if state.shutting_down {
                    return;
                }
            }
            state.restarts += 1;
        }
    }
}

/// Decrements the group's thread count when a thread exits, however it
/// exits.
struct RunningGuard(Arc<ThreadGroup>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut state = self.0.state.lock().unwrap_or_else(|e| e.into_inner());
        state.running -= 1;
        if state.shutting_down && state.running == 0 {
            self.0.wakeup.notify_all();
        }
    }
}

/// An error that can occur when starting a thread.
#[derive(Debug)]
pub enum Error {
    /// An OS-level error occurred during the creation of a thread.
    Io(io::Error),

    /// The [`ThreadGroup`] is shutting down.
    ShuttingDown,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to start thread: {err}"),
            Self::ShuttingDown => f.write_str("thread group is shutting down"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::ShuttingDown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn await_shutdown_works() {
        let exited = Arc::new(Mutex::new(0));
        let group = ThreadGroup::new();
        const SLEEP_DURATION: Duration = Duration::from_millis(100);
        let start = Instant::now();
        for i in 0..2 {
            let exited_cloned = exited.clone();
            let group_cloned = group.clone();
            group
                .start_respawnable(format!("sleeper {i}"), move || loop {
                    thread::sleep(SLEEP_DURATION);
                    if group_cloned.is_shutting_down() {
                        *exited_cloned.lock().unwrap() += 1;
                        return;
                    }
                })
                .unwrap();
        }
        assert_eq!(group.running(), 2);
        group.shut_down();
        group.await_shutdown();
        assert!(start.elapsed() > SLEEP_DURATION);
        assert_eq!(*exited.lock().unwrap(), 2);
        assert_eq!(group.running(), 0);
        assert_eq!(group.restarts(), 0);
    }

    #[test]
    fn respawnable_threads_respawn() {
        let times_executed = Arc::new(Mutex::new(0));
        let times_executed_cloned = times_executed.clone();
        let wakeup = Arc::new(Condvar::new());
        let wakeup_cloned = wakeup.clone();
        let group = ThreadGroup::new();
        group
            .start_respawnable("exits".to_owned(), move || {
                let mut times_executed = times_executed_cloned.lock().unwrap();
                *times_executed += 1;
                wakeup_cloned.notify_all();
            })
            .unwrap();
        let times_executed = times_executed.lock().unwrap();
        let times_executed = wakeup.wait_while(times_executed, |n| *n < 2).unwrap();
        assert!(*times_executed >= 2);
        drop(times_executed);
        group.shut_down();
        group.await_shutdown();
        assert!(group.restarts() >= 1);
    }

    #[test]
    fn panicking_threads_respawn() {
        let times_executed = Arc::new(Mutex::new(0));
        let times_executed_cloned = times_executed.clone();
        let group = ThreadGroup::new();
        group
            .start_respawnable("panics".to_owned(), move || {
                *times_executed_cloned.lock().unwrap() += 1;
                panic!("task failure");
            })
            .unwrap();
        while *times_executed.lock().unwrap() < 2 {
            thread::sleep(Duration::from_millis(50));
        }
        group.shut_down();
        group.await_shutdown();
    }

    #[test]
    fn thread_group_rejects_new_threads_after_shutdown() {
        let group = ThreadGroup::new();
        group.shut_down();
        assert!(matches!(
            group.start_respawnable("late".to_owned(), || ()),
            Err(Error::ShuttingDown)
        ));
        group.await_shutdown();
    }
}
