#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Phased turn pipeline tying the board systems together.
//!
//! A [`Session`] owns every piece of mutable state for one level. Each call
//! runs until the next point where the caller must play an animation, and
//! [`Session::resume`] continues once that animation has finished.

use std::mem;

use glam::Vec2;
use hexburst_core::{
    AxialCoord, Command, Event, LevelConfig, Outcome, Piece, PieceColor, PieceFactory, PieceKind,
    WasteReason,
};
use hexburst_system_clusters::find_destroy_set;
use hexburst_system_gravity::Gravity;
use hexburst_system_lanes::{LaneSpawner, TaskPoll};
use hexburst_system_loadout::{ReadyRack, SacrificeGauge};
use hexburst_system_trajectory::{
    resolve_placement, BoardColliders, Raycaster, TrajectoryPlanner, TrajectoryResult,
};
use hexburst_world::{apply, query, PiecePool, World, DEFAULT_POOL_CAPACITY};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Reasons a player action was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FireError {
    /// The session has not been started or was stopped.
    #[error("session has not been started")]
    NotStarted,
    /// A shot, animation, or lane task is still resolving.
    #[error("session is busy resolving the previous action")]
    Busy,
    /// The session already ended.
    #[error("session is over")]
    SessionOver,
    /// Every shot has been spent.
    #[error("no shots remaining")]
    NoShotsRemaining,
    /// The ready rack holds no piece.
    #[error("ready rack is empty")]
    EmptyRack,
    /// The gauge is armed or locked and cannot take a sacrifice.
    #[error("sacrifice gauge is not accepting pieces")]
    GaugeUnavailable,
}

/// Animation the caller must play before resuming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Lane pieces moving one cell along their paths.
    LaneAdvance,
    /// The fired piece travelling along its trajectory.
    Shot,
    /// A destroy-set disappearing.
    Destroy,
    /// Unanchored pieces falling off the board.
    Fall,
}

/// Where the session stands after a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnStatus {
    /// Nothing is running; the session must be started.
    Idle,
    /// Waiting for the caller to finish an animation.
    Awaiting(AnimationKind),
    /// Waiting for the player to fire or sacrifice.
    Ready,
    /// The session has ended.
    Finished(Outcome),
}

/// Previewed shot: its path and where it would settle.
#[derive(Clone, Debug, PartialEq)]
pub struct Aim {
    trajectory: TrajectoryResult,
    placement: Result<AxialCoord, WasteReason>,
}

impl Aim {
    /// Path the shot follows.
    #[must_use]
    pub fn trajectory(&self) -> &TrajectoryResult {
        &self.trajectory
    }

    /// Cell the shot would occupy, or why it would be wasted.
    #[must_use]
    pub fn placement(&self) -> Result<AxialCoord, WasteReason> {
        self.placement
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Generating,
    Ready,
    ShotInFlight {
        piece: Piece,
        placement: Result<AxialCoord, WasteReason>,
    },
    Destroying,
    Falling,
    Regenerating,
    Finished(Outcome),
}

/// One level being played.
#[derive(Debug)]
pub struct Session {
    level: LevelConfig,
    world: World,
    pool: PiecePool,
    spawner: LaneSpawner,
    rack: ReadyRack,
    gauge: SacrificeGauge,
    planner: TrajectoryPlanner,
    gravity: Gravity,
    phase: Phase,
    animating: Vec<Piece>,
}

impl Session {
    /// Builds an inert session for `level`, deriving every random stream
    /// from `seed`.
    ///
    /// # Panics
    ///
    /// Panics when the level fails [`LevelConfig::validate`].
    #[must_use]
    pub fn new(level: LevelConfig, seed: u64) -> Self {
        if let Err(error) = level.validate() {
            panic!("invalid level: {error}");
        }

        let mut seeds = ChaCha8Rng::seed_from_u64(seed);
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                extent: level.extent,
                layout: level.layout(),
            },
            &mut events,
        );

        Self {
            spawner: LaneSpawner::new(&level, seeds.gen()),
            rack: ReadyRack::new(seeds.gen()),
            gauge: SacrificeGauge::new(level.sacrifice_goal),
            planner: TrajectoryPlanner::new(level.shooter.max_distance),
            gravity: Gravity::new(level.boundary_row),
            pool: PiecePool::prewarmed(DEFAULT_POOL_CAPACITY),
            world,
            level,
            phase: Phase::Idle,
            animating: Vec::new(),
        }
    }

    /// Level being played.
    #[must_use]
    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    /// Board state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Pieces waiting to be fired.
    #[must_use]
    pub fn rack(&self) -> &ReadyRack {
        &self.rack
    }

    /// Progress towards the next large bomb.
    #[must_use]
    pub fn gauge(&self) -> &SacrificeGauge {
        &self.gauge
    }

    /// Piece storage backing the board, lanes, and rack.
    #[must_use]
    pub fn pool(&self) -> &PiecePool {
        &self.pool
    }

    /// Lanes feeding the board.
    #[must_use]
    pub fn lanes(&self) -> &LaneSpawner {
        &self.spawner
    }

    /// Pieces held back until the current animation completes.
    #[must_use]
    pub fn animating(&self) -> &[Piece] {
        &self.animating
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> TurnStatus {
        match &self.phase {
            Phase::Idle => TurnStatus::Idle,
            Phase::Generating | Phase::Regenerating => {
                TurnStatus::Awaiting(AnimationKind::LaneAdvance)
            }
            Phase::Ready => TurnStatus::Ready,
            Phase::ShotInFlight { .. } => TurnStatus::Awaiting(AnimationKind::Shot),
            Phase::Destroying => TurnStatus::Awaiting(AnimationKind::Destroy),
            Phase::Falling => TurnStatus::Awaiting(AnimationKind::Fall),
            Phase::Finished(outcome) => TurnStatus::Finished(*outcome),
        }
    }

    /// Resets the board and begins filling the lanes.
    pub fn start(&mut self, out: &mut Vec<Event>) -> TurnStatus {
        self.stop();
        self.apply(
            Command::StartSession {
                boss_health: self.level.boss_health,
                shots: self.level.shot_count,
            },
            out,
        );
        self.gauge = SacrificeGauge::new(self.level.sacrifice_goal);
        self.rack.reload(&mut self.pool);

        if !self.spawner.start_generation() {
            log::warn!("lane generation did not start");
        }
        log::info!(
            "session started: boss health {}, {} shots",
            self.level.boss_health,
            self.level.shot_count
        );
        self.phase = Phase::Generating;
        self.drive(out)
    }

    /// Continues after the animation the last status asked for.
    pub fn resume(&mut self, out: &mut Vec<Event>) -> TurnStatus {
        self.drive(out)
    }

    /// Previews a shot against an arbitrary collider set.
    #[must_use]
    pub fn aim(&self, origin: Vec2, direction: Vec2, raycaster: &dyn Raycaster) -> Aim {
        let trajectory = self.planner.plan(origin, direction, raycaster);
        let placement = resolve_placement(&trajectory, query::grid(&self.world));
        Aim {
            trajectory,
            placement,
        }
    }

    /// Previews a shot from the level shooter against the current board.
    #[must_use]
    pub fn aim_from_shooter(&self, direction: Vec2) -> Aim {
        let colliders = BoardColliders::new(query::grid(&self.world), self.level.walls);
        self.aim(self.level.shooter.origin, direction, &colliders)
    }

    /// Fires the current rack piece against an arbitrary collider set.
    pub fn fire(
        &mut self,
        origin: Vec2,
        direction: Vec2,
        raycaster: &dyn Raycaster,
        out: &mut Vec<Event>,
    ) -> Result<(), FireError> {
        self.ensure_ready()?;
        let aim = self.aim(origin, direction, raycaster);
        self.launch(aim, out)
    }

    /// Fires the current rack piece from the level shooter.
    pub fn fire_from_shooter(
        &mut self,
        direction: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<(), FireError> {
        self.ensure_ready()?;
        let aim = self.aim_from_shooter(direction);
        self.launch(aim, out)
    }

    /// Moves the current rack piece to the back.
    pub fn rotate_rack(&mut self) -> Result<(), FireError> {
        self.ensure_ready()?;
        self.rack.rotate();
        Ok(())
    }

    /// Trades the current rack piece and one shot for a gauge point.
    ///
    /// Filling the gauge puts a large bomb at the front of the rack.
    pub fn sacrifice(&mut self, out: &mut Vec<Event>) -> Result<(), FireError> {
        self.ensure_ready()?;
        if !self.gauge.accepts_sacrifice() {
            return Err(FireError::GaugeUnavailable);
        }
        if query::shots_remaining(&self.world) == 0 {
            return Err(FireError::NoShotsRemaining);
        }
        let piece = self.rack.take().ok_or(FireError::EmptyRack)?;

        self.apply(Command::ConsumeShot, out);
        let id = piece.id();
        self.pool.release(piece);
        self.rack.reload(&mut self.pool);

        let armed = self.gauge.fill();
        out.push(Event::PieceSacrificed {
            piece: id,
            gauge: self.gauge.level(),
        });
        if armed {
            let bomb = self.pool.acquire(PieceKind::LargeBomb, PieceColor::Red);
            out.push(Event::LargeBombArmed { piece: bomb.id() });
            self.rack.push_front(bomb);
        }

        if query::shots_remaining(&self.world) == 0 {
            self.phase = self.finish(Outcome::Defeat, out);
        }
        Ok(())
    }

    /// Abandons everything in flight and returns every loose piece to the
    /// pool. Pieces on the board stay where they are.
    pub fn stop(&mut self) {
        self.spawner.stop(&mut self.world, &mut self.pool);
        if let Phase::ShotInFlight { piece, .. } = mem::replace(&mut self.phase, Phase::Idle) {
            self.pool.release(piece);
        }
        self.release_animating();
        self.rack.clear(&mut self.pool);
        self.gauge.unlock();
    }

    fn ensure_ready(&self) -> Result<(), FireError> {
        match self.phase {
            Phase::Ready => Ok(()),
            Phase::Idle => Err(FireError::NotStarted),
            Phase::Finished(_) => Err(FireError::SessionOver),
            _ => Err(FireError::Busy),
        }
    }

    fn launch(&mut self, aim: Aim, out: &mut Vec<Event>) -> Result<(), FireError> {
        if query::shots_remaining(&self.world) == 0 {
            return Err(FireError::NoShotsRemaining);
        }
        let piece = self.rack.take().ok_or(FireError::EmptyRack)?;

        self.apply(Command::ConsumeShot, out);
        if piece.kind() == PieceKind::LargeBomb {
            self.gauge.reset();
        }
        self.gauge.lock();
        self.rack.reload(&mut self.pool);

        match aim.placement {
            Ok(cell) => out.push(Event::ShotFired {
                piece: piece.id(),
                cell,
            }),
            Err(reason) => {
                log::debug!("shot {:?} wasted: {reason:?}", piece.id());
                out.push(Event::ShotWasted {
                    piece: piece.id(),
                    reason,
                });
            }
        }
        self.phase = Phase::ShotInFlight {
            piece,
            placement: aim.placement,
        };
        Ok(())
    }

    fn drive(&mut self, out: &mut Vec<Event>) -> TurnStatus {
        loop {
            let next = match mem::replace(&mut self.phase, Phase::Idle) {
                Phase::Generating => {
                    match self.spawner.poll(&mut self.world, &mut self.pool, out) {
                        TaskPoll::AwaitingAnimation => {
                            self.phase = Phase::Generating;
                            return self.status();
                        }
                        TaskPoll::Complete | TaskPoll::Cancelled => {
                            log::debug!("initial generation finished");
                            Phase::Ready
                        }
                    }
                }
                Phase::Regenerating => {
                    match self.spawner.poll(&mut self.world, &mut self.pool, out) {
                        TaskPoll::AwaitingAnimation => {
                            self.phase = Phase::Regenerating;
                            return self.status();
                        }
                        TaskPoll::Complete | TaskPoll::Cancelled => self.end_turn(out),
                    }
                }
                Phase::ShotInFlight { piece, placement } => {
                    let next = self.land(piece, placement, out);
                    if matches!(next, Phase::Destroying) {
                        self.phase = next;
                        return self.status();
                    }
                    next
                }
                Phase::Destroying => {
                    self.release_animating();
                    if query::boss(&self.world).is_depleted() {
                        self.finish(Outcome::Victory, out)
                    } else {
                        let next = self.collapse(out);
                        if matches!(next, Phase::Falling) {
                            self.phase = next;
                            return self.status();
                        }
                        next
                    }
                }
                Phase::Falling => {
                    self.release_animating();
                    self.regenerate(out)
                }
                settled @ (Phase::Idle | Phase::Ready | Phase::Finished(_)) => {
                    self.phase = settled;
                    return self.status();
                }
            };
            self.phase = next;
        }
    }

    fn land(
        &mut self,
        piece: Piece,
        placement: Result<AxialCoord, WasteReason>,
        out: &mut Vec<Event>,
    ) -> Phase {
        let Ok(cell) = placement else {
            self.pool.release(piece);
            return self.end_turn(out);
        };

        let id = piece.id();
        self.apply(Command::PlacePiece { cell, piece }, out);
        if query::piece_at(&self.world, cell).map(Piece::id) != Some(id) {
            return self.end_turn(out);
        }

        let destroy = find_destroy_set(query::grid(&self.world), cell);
        let Some(command) = destroy.to_command() else {
            return self.end_turn(out);
        };
        if !destroy.blast().detonations.is_empty() {
            out.push(Event::BombsDetonated {
                cells: destroy.blast().detonations.clone(),
            });
        }
        log::debug!("shot at {cell} destroys {} pieces", destroy.len());
        self.apply(command, out);
        Phase::Destroying
    }

    fn collapse(&mut self, out: &mut Vec<Event>) -> Phase {
        let mut commands = Vec::new();
        self.gravity.handle(query::grid(&self.world), &mut commands);
        if commands.is_empty() {
            return self.regenerate(out);
        }
        for command in commands {
            self.apply(command, out);
        }
        Phase::Falling
    }

    fn regenerate(&mut self, out: &mut Vec<Event>) -> Phase {
        let rate = query::boss(&self.world).rate();
        if self.spawner.schedule_regeneration(&self.world, rate) == 0 {
            return self.end_turn(out);
        }
        Phase::Regenerating
    }

    fn end_turn(&mut self, out: &mut Vec<Event>) -> Phase {
        self.gauge.unlock();
        if query::boss(&self.world).is_depleted() {
            self.finish(Outcome::Victory, out)
        } else if query::shots_remaining(&self.world) == 0 {
            self.finish(Outcome::Defeat, out)
        } else {
            Phase::Ready
        }
    }

    fn finish(&mut self, outcome: Outcome, out: &mut Vec<Event>) -> Phase {
        log::info!(
            "session finished: {outcome:?} with score {}",
            query::score(&self.world)
        );
        out.push(Event::SessionFinished { outcome });
        Phase::Finished(outcome)
    }

    /// Applies a command, keeping removed pieces until their animation ends.
    fn apply(&mut self, command: Command, out: &mut Vec<Event>) {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events);
        for event in events {
            match &event {
                Event::ClusterDestroyed { pieces, .. } | Event::PiecesFell { pieces, .. } => {
                    self.animating.extend(pieces.iter().cloned());
                }
                Event::GridCleared { pieces } => {
                    for piece in pieces {
                        self.pool.release(piece.clone());
                    }
                }
                Event::PlacementRejected { piece, .. } | Event::PieceDisplaced { piece, .. } => {
                    self.pool.release(piece.clone());
                }
                _ => {}
            }
            out.push(event);
        }
    }

    fn release_animating(&mut self) {
        for piece in self.animating.drain(..) {
            self.pool.release(piece);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexburst_core::{
        GridExtent, HexDirection, LaneConfig, ShooterConfig, SpawnWeights, WallConfig,
    };

    fn level() -> LevelConfig {
        LevelConfig {
            extent: GridExtent::new(6, 6),
            hex_size: 0.5,
            origin: Vec2::ZERO,
            boundary_row: 4,
            lanes: vec![LaneConfig {
                start: AxialCoord::new(0, 4),
                directions: vec![HexDirection::Right; 3],
            }],
            min_spawn_count: 1,
            max_spawn_count: 4,
            shot_count: 4,
            boss_health: 3,
            sacrifice_goal: 2,
            spawn_weights: SpawnWeights::default(),
            walls: WallConfig {
                left: -4.0,
                right: 4.0,
            },
            shooter: ShooterConfig {
                origin: Vec2::new(0.0, -3.0),
                max_distance: 20.0,
            },
        }
    }

    #[test]
    #[should_panic(expected = "invalid level")]
    fn invalid_level_is_fatal() {
        let mut level = level();
        level.lanes.clear();
        let _ = Session::new(level, 0);
    }

    #[test]
    fn actions_before_start_are_refused() {
        let mut session = Session::new(level(), 0);
        let mut events = Vec::new();
        assert_eq!(session.status(), TurnStatus::Idle);
        assert_eq!(
            session.fire_from_shooter(Vec2::Y, &mut events),
            Err(FireError::NotStarted)
        );
        assert_eq!(session.sacrifice(&mut events), Err(FireError::NotStarted));
        assert!(events.is_empty());
    }

    #[test]
    fn generation_awaits_each_lane_advance() {
        let mut session = Session::new(level(), 3);
        let mut events = Vec::new();

        assert_eq!(
            session.start(&mut events),
            TurnStatus::Awaiting(AnimationKind::LaneAdvance)
        );
        assert_eq!(session.sacrifice(&mut events), Err(FireError::Busy));

        let mut status = session.status();
        while status != TurnStatus::Ready {
            status = session.resume(&mut events);
        }
        assert_eq!(query::grid(session.world()).len(), 4);
        assert_eq!(session.rack().len(), 3);
    }

    #[test]
    fn second_sacrifice_arms_a_large_bomb() {
        let mut session = Session::new(level(), 5);
        let mut events = Vec::new();
        let _ = session.start(&mut events);
        while session.resume(&mut events) != TurnStatus::Ready {}
        events.clear();

        assert_eq!(session.sacrifice(&mut events), Ok(()));
        assert_eq!(session.sacrifice(&mut events), Ok(()));

        assert!(session.gauge().is_armed());
        assert_eq!(
            session.rack().current().map(Piece::kind),
            Some(PieceKind::LargeBomb)
        );
        assert_eq!(query::shots_remaining(session.world()), 2);
        assert_eq!(
            session.sacrifice(&mut events),
            Err(FireError::GaugeUnavailable)
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::LargeBombArmed { .. })));
    }
}
