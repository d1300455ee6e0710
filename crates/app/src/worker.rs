//! Background execution of one session.
//!
//! Each session runs on its own thread and owns its `Scheduler` outright. The
//! only contact with the outside is two channels: commands in, events out.

use simcore::{SimError, SimResult, Snapshot};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::protocol::{Command, Event};
use crate::scheduler::Scheduler;

enum Envelope {
    Command(Command),
    Shutdown,
}

/// Cloneable sender for feeding commands from another thread.
#[derive(Clone)]
pub struct Commander {
    tx: Sender<Envelope>,
}

impl Commander {
    pub fn send(&self, command: Command) -> SimResult<()> {
        self.tx
            .send(Envelope::Command(command))
            .map_err(|_| SimError::SessionClosed)
    }
}

/// Owner side of a running session. Dropping it tears the session down.
pub struct SessionHandle {
    commander: Commander,
    events: Receiver<Event>,
    latest: Option<Snapshot>,
    worker: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Spawn the worker thread. It posts `Event::Ready` and then idles until
    /// the first `start`/`update`.
    pub fn spawn(config: EngineConfig) -> SimResult<Self> {
        config.validate()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("loopsim-session".into())
            .spawn(move || run_worker(config, cmd_rx, evt_tx))?;

        Ok(SessionHandle {
            commander: Commander { tx: cmd_tx },
            events: evt_rx,
            latest: None,
            worker: Some(worker),
        })
    }

    pub fn send(&self, command: Command) -> SimResult<()> {
        self.commander.send(command)
    }

    pub fn commander(&self) -> Commander {
        self.commander.clone()
    }

    /// Everything that has arrived so far, without blocking
    pub fn try_events(&self) -> Vec<Event> {
        self.events.try_iter().collect()
    }

    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<Event> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Newest snapshot received, or the last known one if nothing new has
    /// arrived since the previous call.
    pub fn latest_snapshot(&mut self) -> Option<&Snapshot> {
        for event in self.events.try_iter() {
            if let Event::Data(snapshot) = event {
                self.latest = Some(snapshot);
            }
        }
        self.latest.as_ref()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        // The worker may already be gone; either way it is done after this
        let _ = self.commander.tx.send(Envelope::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("session worker panicked");
            }
        }
    }
}

struct Deadlines {
    physics: Instant,
    physics_interval: Duration,
    flush: Instant,
    flush_interval: Duration,
}

impl Deadlines {
    fn armed(now: Instant, physics_interval: Duration, flush_interval: Duration) -> Self {
        Deadlines {
            physics: now + physics_interval,
            physics_interval,
            flush: now + flush_interval,
            flush_interval,
        }
    }

    fn rearm_physics(&mut self, now: Instant, interval: Duration) {
        self.physics = now + interval;
        self.physics_interval = interval;
    }

    fn earliest(&self) -> Instant {
        self.physics.min(self.flush)
    }
}

/// Next deadline after `due` fired at `now`; re-based on `now` when more than
/// one interval behind so a stalled worker does not burst.
fn next_deadline(due: Instant, interval: Duration, now: Instant) -> Instant {
    let next = due + interval;
    if now.saturating_duration_since(next) > interval {
        now + interval
    } else {
        next
    }
}

fn run_worker(config: EngineConfig, commands: Receiver<Envelope>, events: Sender<Event>) {
    let mut scheduler = Scheduler::new(&config);
    log::info!("session worker started");
    if events.send(Event::Ready).is_err() {
        log::warn!("consumer gone before ready, stopping session");
        return;
    }

    let mut deadlines: Option<Deadlines> = None;
    loop {
        let received = match &deadlines {
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(d) => commands.recv_timeout(d.earliest().saturating_duration_since(Instant::now())),
        };

        match received {
            Ok(Envelope::Command(command)) => {
                if scheduler.handle(command) {
                    if let Some(cadence) = scheduler.cadence() {
                        let now = Instant::now();
                        match deadlines.as_mut() {
                            // The flush keeps its phase for the life of the session
                            Some(d) => d.rearm_physics(now, cadence.interval),
                            None => {
                                deadlines = Some(Deadlines::armed(
                                    now,
                                    cadence.interval,
                                    scheduler.flush_interval(),
                                ))
                            }
                        }
                    }
                }
            }
            Ok(Envelope::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let Some(d) = deadlines.as_mut() else {
            continue;
        };
        let now = Instant::now();
        if now >= d.physics {
            scheduler.tick();
            d.physics = next_deadline(d.physics, d.physics_interval, now);
        }
        if now >= d.flush {
            if events.send(Event::Data(scheduler.flush())).is_err() {
                log::warn!("consumer gone, dropping snapshot and stopping session");
                break;
            }
            d.flush = next_deadline(d.flush, d.flush_interval, now);
        }
    }
    log::info!("session worker stopped at t={:.3}", scheduler.session().time());
}
