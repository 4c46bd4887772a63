use std::{
    ops::Deref,
    sync::{
        Arc,
        mpsc,
    },
    thread,
    time::{
        Duration,
        Instant,
    },
};

use parking_lot::{
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use crate::{
    error::Error,
    simulation::Simulation,
};

/// Called after every completed step with the post-step simulation state;
/// this is where a renderer or recorder consumes snapshots.
pub type Observer = Box<dyn FnMut(&Simulation) + Send + Sync + 'static>;

/// Drives a [`Simulation`] from a background thread.
///
/// Collaborators share the simulation through read/write guards; the thread
/// owns the step cadence. A step error stops the run and is kept for the
/// collaborator to read.
#[derive(Clone, Debug)]
pub struct Executor {
    shared: Arc<RwLock<Shared>>,
    command_tx: mpsc::Sender<Command>,
}

impl Executor {
    pub fn new(simulation: Simulation) -> Self {
        let shared = Arc::new(RwLock::new(Shared {
            simulation,
            cadence: None,
            fault: None,
        }));

        let (command_tx, command_rx) = mpsc::channel();

        let _join_handle = thread::spawn({
            let shared = shared.clone();
            move || {
                run_step_loop(command_rx, shared);
            }
        });

        Self { shared, command_tx }
    }

    fn send_command(&self, command: Command) {
        // the loop thread only exits when every sender is dropped
        let _ = self.command_tx.send(command);
    }

    pub fn read(&self) -> ReadGuard<'_> {
        ReadGuard {
            guard: self.shared.read(),
        }
    }

    pub fn write(&self) -> WriteGuard<'_> {
        WriteGuard {
            guard: self.shared.write(),
        }
    }

    pub fn single_step(&self) {
        self.send_command(Command::SingleStep);
    }

    pub fn start(&self, step_interval: Duration, on_step: Option<Observer>) {
        self.send_command(Command::Start {
            step_interval,
            on_step,
        });
    }

    pub fn stop(&self) {
        self.send_command(Command::Stop);
    }
}

#[derive(derive_more::Debug)]
struct Shared {
    simulation: Simulation,
    cadence: Option<Cadence>,
    /// set when a step failed; cleared by the next start
    fault: Option<Error>,
}

#[derive(derive_more::Debug)]
struct Cadence {
    next_step: Instant,
    step_interval: Duration,
    #[debug(ignore)]
    on_step: Option<Observer>,
}

enum Command {
    Start {
        step_interval: Duration,
        on_step: Option<Observer>,
    },
    Stop,
    SingleStep,
}

/// Steps the shared simulation; on failure records the fault and returns
/// false so the caller drops the cadence.
fn step_shared(shared: &mut Shared) -> bool {
    let Shared {
        simulation,
        cadence,
        fault,
    } = shared;

    match simulation.step() {
        Ok(_snapshot) => {
            if let Some(on_step) = cadence.as_mut().and_then(|cadence| cadence.on_step.as_mut()) {
                on_step(simulation);
            }
            true
        }
        Err(error) => {
            tracing::error!(%error, "step failed; stopping run");
            *fault = Some(error);
            false
        }
    }
}

fn run_step_loop(command_rx: mpsc::Receiver<Command>, shared: Arc<RwLock<Shared>>) {
    loop {
        let mut shared_guard = shared.upgradable_read();

        // step if due, then always fall through to the channel so commands
        // are received even when the cadence keeps the loop saturated
        let recv_timeout = if shared_guard.cadence.is_some() {
            let now = Instant::now();

            if shared_guard
                .cadence
                .as_ref()
                .is_some_and(|cadence| cadence.next_step <= now)
            {
                shared_guard.with_upgraded(|shared| {
                    if step_shared(shared) {
                        if let Some(cadence) = &mut shared.cadence {
                            cadence.next_step = now + cadence.step_interval;
                        }
                    }
                    else {
                        shared.cadence = None;
                    }
                });
            }

            shared_guard
                .cadence
                .as_ref()
                .map(|cadence| cadence.next_step.saturating_duration_since(Instant::now()))
        }
        else {
            None
        };

        drop(shared_guard);

        match recv_timeout {
            Some(recv_timeout) => match command_rx.recv_timeout(recv_timeout) {
                Ok(command) => handle_command(&shared, command),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            },
            None => match command_rx.recv() {
                Ok(command) => handle_command(&shared, command),
                Err(mpsc::RecvError) => break,
            },
        }
    }
}

fn handle_command(shared: &Arc<RwLock<Shared>>, command: Command) {
    match command {
        Command::Start {
            step_interval,
            on_step,
        } => {
            let mut shared = shared.write();
            tracing::debug!(?step_interval, "starting run");
            shared.fault = None;
            shared.cadence = Some(Cadence {
                next_step: Instant::now(),
                step_interval,
                on_step,
            });
        }
        Command::Stop => {
            let mut shared = shared.write();
            tracing::debug!("stopping run");
            shared.cadence = None;
        }
        Command::SingleStep => {
            let mut shared = shared.write();
            if shared.cadence.is_none() {
                step_shared(&mut shared);
            }
        }
    }
}

#[derive(Debug)]
pub struct ReadGuard<'a> {
    guard: RwLockReadGuard<'a, Shared>,
}

impl<'a> ReadGuard<'a> {
    pub fn running(&self) -> bool {
        self.guard.cadence.is_some()
    }

    pub fn fault(&self) -> Option<&Error> {
        self.guard.fault.as_ref()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.guard.simulation
    }
}

impl<'a> Deref for ReadGuard<'a> {
    type Target = Simulation;

    fn deref(&self) -> &Self::Target {
        &self.guard.simulation
    }
}

pub struct WriteGuard<'a> {
    guard: RwLockWriteGuard<'a, Shared>,
}

impl<'a> WriteGuard<'a> {
    pub fn simulation(&mut self) -> &mut Simulation {
        &mut self.guard.simulation
    }
}

impl<'a> Deref for WriteGuard<'a> {
    type Target = Simulation;

    fn deref(&self) -> &Self::Target {
        &self.guard.simulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        boundary::AbcOrder,
        material::{
            Material,
            Region,
        },
        simulation::{
            SimulationConfig,
            SourceConfig,
        },
        source::SourceKind,
    };

    fn simulation() -> Simulation {
        Simulation::new(&SimulationConfig {
            size: 200,
            courant_number: 1.0,
            regions: vec![Region {
                start: 0,
                material: Material::VACUUM,
            }],
            source: SourceConfig {
                kind: SourceKind::TotalFieldScatteredField { boundary: 49 },
                delay: 30.0,
                width: 10.0,
            },
            boundary: AbcOrder::First,
        })
        .unwrap()
    }

    fn wait_for(executor: &Executor, condition: impl Fn(&ReadGuard<'_>) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if condition(&executor.read()) {
                return;
            }
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn it_steps_once_on_command() {
        let executor = Executor::new(simulation());
        assert_eq!(executor.read().step_count(), 0);

        executor.single_step();
        wait_for(&executor, |guard| guard.step_count() == 1);
        assert!(executor.read().fault().is_none());
    }

    #[test]
    fn it_runs_and_stops() {
        let executor = Executor::new(simulation());
        executor.start(Duration::ZERO, None);
        wait_for(&executor, |guard| guard.step_count() >= 10);

        executor.stop();
        wait_for(&executor, |guard| !guard.running());
    }

    #[test]
    fn it_stops_while_steps_are_continuously_due() {
        // a zero interval means a step is due on every loop iteration; the
        // command channel must still be polled between steps
        let executor = Executor::new(simulation());
        executor.start(Duration::ZERO, None);
        wait_for(&executor, |guard| guard.step_count() >= 100);

        executor.stop();
        wait_for(&executor, |guard| !guard.running());
        let stopped_at = executor.read().step_count();

        // the loop is idle again and still responsive
        executor.single_step();
        wait_for(&executor, |guard| guard.step_count() == stopped_at + 1);
    }
}
