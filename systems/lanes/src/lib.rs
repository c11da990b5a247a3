#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Feeds pieces into the grid along predefined lanes.
//!
//! Generation and regeneration are explicit tasks. Each call to `poll` runs
//! until the next point where the caller must wait for an animation, and the
//! caller resumes the task once that animation completes. No task touches
//! another task's chain; tasks meet only through grid placement and a shared
//! [`CancelToken`].

mod path;
mod roller;
mod tasks;

pub use path::{LanePath, PendingChain};
pub use roller::PieceRoller;
pub use tasks::{missing_segment, GenerationTask, RegenerationTask};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use hexburst_core::{Event, LaneId, LevelConfig, PieceFactory};
use hexburst_world::{query, World};

/// Outcome of polling a lane task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskPoll {
    /// Waiting for the movement animation of the last advance.
    AwaitingAnimation,
    /// Every piece has been placed or returned.
    Complete,
    /// The task was abandoned and its pieces returned.
    Cancelled,
}

/// Per-lane activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaneState {
    /// Nothing in flight.
    Idle,
    /// Pending pieces are moving one cell along the path.
    Advancing,
    /// A new piece is entering at the head.
    Filling,
}

/// Shared flag that abandons every task holding a clone of it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Reports whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
enum Job {
    Generation(GenerationTask),
    Regeneration(Vec<(RegenerationTask, TaskPoll)>),
}

/// Owns the lanes of a level and drives their tasks.
#[derive(Debug)]
pub struct LaneSpawner {
    lanes: Vec<(LaneId, LanePath)>,
    roller: PieceRoller,
    min_spawn_count: usize,
    max_spawn_count: usize,
    cancel: CancelToken,
    job: Option<Job>,
}

impl LaneSpawner {
    /// Builds the lanes described by `level`, rolling pieces from `seed`.
    #[must_use]
    pub fn new(level: &LevelConfig, seed: u64) -> Self {
        let lanes = level
            .lanes
            .iter()
            .enumerate()
            .map(|(index, lane)| (LaneId::new(index as u32), LanePath::from_config(lane)))
            .collect();
        Self {
            lanes,
            roller: PieceRoller::new(seed, level.spawn_weights),
            min_spawn_count: level.min_spawn_count as usize,
            max_spawn_count: level.max_spawn_count as usize,
            cancel: CancelToken::new(),
            job: None,
        }
    }

    /// Every lane with its path.
    #[must_use]
    pub fn lanes(&self) -> &[(LaneId, LanePath)] {
        &self.lanes
    }

    /// Reports whether a task is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    /// Current state of a lane.
    #[must_use]
    pub fn lane_state(&self, lane: LaneId) -> LaneState {
        let state = match &self.job {
            Some(Job::Generation(task)) => task
                .lane_states()
                .find(|(id, _)| *id == lane)
                .map(|(_, state)| state),
            Some(Job::Regeneration(tasks)) => tasks
                .iter()
                .find(|(task, _)| task.lane() == lane)
                .map(|(task, _)| task.lane_state()),
            None => None,
        };
        state.unwrap_or(LaneState::Idle)
    }

    /// Number of leading path cells regrown at the given boss health rate.
    #[must_use]
    pub fn regeneration_span(&self, boss_rate: f32) -> usize {
        let rate = boss_rate.clamp(0.0, 1.0);
        let min = self.min_spawn_count as f32;
        let max = self.max_spawn_count as f32;
        (min + (max - min) * rate) as usize
    }

    /// Starts the initial fill of every lane.
    ///
    /// Returns false when a task is already running.
    pub fn start_generation(&mut self) -> bool {
        if self.is_busy() {
            log::warn!("lane generation requested while lanes are busy");
            return false;
        }
        let task = GenerationTask::new(
            self.lanes.clone(),
            self.max_spawn_count,
            self.roller.fork(),
            self.cancel.clone(),
        );
        self.job = Some(Job::Generation(task));
        true
    }

    /// Schedules regeneration for every lane with an empty path cell.
    ///
    /// Each lane is scheduled at most once. Returns the number of lanes
    /// scheduled; zero when nothing is missing or a task is already running.
    pub fn schedule_regeneration(&mut self, world: &World, boss_rate: f32) -> usize {
        if self.is_busy() {
            log::warn!("lane regeneration requested while lanes are busy");
            return 0;
        }

        let span = self.regeneration_span(boss_rate);
        let grid = query::grid(world);
        let mut tasks = Vec::new();
        for (id, path) in &self.lanes {
            if path.cells().iter().all(|cell| grid.is_occupied(*cell)) {
                continue;
            }
            let task = RegenerationTask::new(
                *id,
                path.clone(),
                span,
                self.roller.fork(),
                self.cancel.clone(),
            );
            tasks.push((task, TaskPoll::AwaitingAnimation));
        }

        let scheduled = tasks.len();
        if scheduled > 0 {
            log::debug!("scheduled regeneration for {scheduled} lanes with span {span}");
            self.job = Some(Job::Regeneration(tasks));
        }
        scheduled
    }

    /// Drives the running task to its next await point.
    ///
    /// Regeneration tasks run side by side: every unfinished task is polled
    /// once per call, and the call reports an await while any of them waits.
    pub fn poll(
        &mut self,
        world: &mut World,
        factory: &mut dyn PieceFactory,
        out: &mut Vec<Event>,
    ) -> TaskPoll {
        let Some(job) = self.job.as_mut() else {
            return TaskPoll::Complete;
        };

        let result = match job {
            Job::Generation(task) => task.poll(world, factory, out),
            Job::Regeneration(tasks) => {
                for (task, last) in tasks.iter_mut() {
                    if *last == TaskPoll::AwaitingAnimation {
                        *last = task.poll(world, factory, out);
                    }
                }
                if tasks.iter().any(|(_, last)| *last == TaskPoll::AwaitingAnimation) {
                    TaskPoll::AwaitingAnimation
                } else if tasks.iter().any(|(_, last)| *last == TaskPoll::Cancelled) {
                    TaskPoll::Cancelled
                } else {
                    TaskPoll::Complete
                }
            }
        };

        if result != TaskPoll::AwaitingAnimation {
            self.job = None;
        }
        result
    }

    /// Abandons the running task, returning every piece it holds to `factory`.
    pub fn stop(&mut self, world: &mut World, factory: &mut dyn PieceFactory) {
        if self.job.is_none() {
            return;
        }
        self.cancel.cancel();
        let mut discarded = Vec::new();
        let _ = self.poll(world, factory, &mut discarded);
        self.job = None;
        self.cancel = CancelToken::new();
        log::info!("lane tasks stopped");
    }
}
