use std::ops::Range;

use hexburst_core::{Command, Event, LaneId, Piece, PieceFactory};
use hexburst_world::{apply, query, Grid, World};

use crate::{CancelToken, LanePath, LaneState, PendingChain, PieceRoller, TaskPoll};

/// First contiguous run of empty cells among the first `span` path cells.
#[must_use]
pub fn missing_segment(path: &LanePath, span: usize, grid: &Grid) -> Option<Range<usize>> {
    let span = span.min(path.len());
    let cells = &path.cells()[..span];
    let first = cells.iter().position(|cell| !grid.is_occupied(*cell))?;
    let length = cells[first..]
        .iter()
        .take_while(|cell| !grid.is_occupied(**cell))
        .count();
    Some(first..first + length)
}

#[derive(Debug)]
struct LaneRun {
    id: LaneId,
    path: LanePath,
    chain: PendingChain,
    state: LaneState,
    discarded: usize,
}

impl LaneRun {
    fn new(id: LaneId, path: LanePath) -> Self {
        Self {
            id,
            path,
            chain: PendingChain::new(),
            state: LaneState::Idle,
            discarded: 0,
        }
    }

    fn advance(&mut self, out: &mut Vec<Event>) {
        if self.chain.is_empty() {
            return;
        }
        self.state = LaneState::Advancing;
        out.push(Event::LaneAdvanced {
            lane: self.id,
            moves: self.chain.advance(&self.path),
        });
    }

    fn spawn(
        &mut self,
        roller: &mut PieceRoller,
        factory: &mut dyn PieceFactory,
        out: &mut Vec<Event>,
    ) {
        self.state = LaneState::Filling;
        let piece = roller.roll(factory);
        out.push(Event::LanePieceSpawned {
            lane: self.id,
            piece: piece.id(),
            cell: self.path.head(),
        });
        if let Some(overflow) = self.chain.push_head(piece, &self.path) {
            factory.release(overflow);
            self.discarded += 1;
        }
    }

    /// Places the first `count` pending pieces on their path cells.
    fn settle(
        &mut self,
        count: usize,
        world: &mut World,
        factory: &mut dyn PieceFactory,
        out: &mut Vec<Event>,
    ) {
        let mut placed = 0;
        let pending: Vec<Piece> = self.chain.drain().collect();
        for (index, piece) in pending.into_iter().enumerate() {
            let target = self.path.get(index).filter(|_| index < count);
            let Some(cell) = target else {
                factory.release(piece);
                self.discarded += 1;
                continue;
            };
            if query::is_occupied(world, cell) {
                log::warn!("lane {} lost cell {cell} to another lane", self.id.get());
                factory.release(piece);
                self.discarded += 1;
                continue;
            }

            let mut events = Vec::new();
            apply(world, Command::PlacePiece { cell, piece }, &mut events);
            for event in events {
                match event {
                    Event::PlacementRejected { piece, .. } => {
                        factory.release(piece.clone());
                        self.discarded += 1;
                        out.push(Event::PlacementRejected { cell, piece });
                    }
                    Event::PiecePlaced { .. } => {
                        placed += 1;
                        out.push(event);
                    }
                    other => out.push(other),
                }
            }
        }

        self.state = LaneState::Idle;
        out.push(Event::LaneSettled {
            lane: self.id,
            placed,
            discarded: self.discarded,
        });
    }

    fn abandon(&mut self, factory: &mut dyn PieceFactory) {
        for piece in self.chain.drain() {
            factory.release(piece);
        }
        self.state = LaneState::Idle;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Scan,
    Advance,
    Spawn,
    Finished(TaskPoll),
}

/// Initial fill of every lane at once.
///
/// Each phase advances every non-empty chain, waits for the animation, then
/// spawns one piece at every lane head. After the final phase each pending
/// piece is placed on the path cell it reached.
#[derive(Debug)]
pub struct GenerationTask {
    lanes: Vec<LaneRun>,
    roller: PieceRoller,
    total_phases: usize,
    phases_done: usize,
    step: Step,
    cancel: CancelToken,
}

impl GenerationTask {
    /// Creates a task that runs `phases` spawn phases across `lanes`.
    #[must_use]
    pub fn new(
        lanes: Vec<(LaneId, LanePath)>,
        phases: usize,
        roller: PieceRoller,
        cancel: CancelToken,
    ) -> Self {
        Self {
            lanes: lanes
                .into_iter()
                .map(|(id, path)| LaneRun::new(id, path))
                .collect(),
            roller,
            total_phases: phases,
            phases_done: 0,
            step: Step::Advance,
            cancel,
        }
    }

    /// Current state of every lane the task drives.
    pub fn lane_states(&self) -> impl Iterator<Item = (LaneId, LaneState)> + '_ {
        self.lanes.iter().map(|lane| (lane.id, lane.state))
    }

    /// Runs until the next animation await point or the end of the task.
    pub fn poll(
        &mut self,
        world: &mut World,
        factory: &mut dyn PieceFactory,
        out: &mut Vec<Event>,
    ) -> TaskPoll {
        loop {
            if let Step::Finished(result) = self.step {
                return result;
            }
            if self.cancel.is_cancelled() {
                for lane in &mut self.lanes {
                    lane.abandon(factory);
                }
                self.step = Step::Finished(TaskPoll::Cancelled);
                continue;
            }

            match self.step {
                Step::Scan | Step::Advance => {
                    if self.phases_done == self.total_phases {
                        for lane in &mut self.lanes {
                            let count = lane.chain.len();
                            lane.settle(count, world, factory, out);
                        }
                        self.step = Step::Finished(TaskPoll::Complete);
                        continue;
                    }
                    self.step = Step::Spawn;
                    if self.lanes.iter().any(|lane| !lane.chain.is_empty()) {
                        for lane in &mut self.lanes {
                            lane.advance(out);
                        }
                        return TaskPoll::AwaitingAnimation;
                    }
                }
                Step::Spawn => {
                    for lane in &mut self.lanes {
                        lane.spawn(&mut self.roller, factory, out);
                    }
                    self.phases_done += 1;
                    log::debug!(
                        "generation phase {}/{} spawned",
                        self.phases_done,
                        self.total_phases
                    );
                    self.step = Step::Advance;
                }
                Step::Finished(_) => {}
            }
        }
    }
}

/// Regrows the first missing segment of a single lane.
///
/// Pieces sitting before the gap are lifted out of the grid and pushed along
/// the path together with freshly spawned ones, one phase per missing cell.
/// Cells taken by another lane in the meantime are left alone and the piece
/// meant for them goes back to the factory.
#[derive(Debug)]
pub struct RegenerationTask {
    lane: LaneRun,
    span: usize,
    roller: PieceRoller,
    gap: Range<usize>,
    phases_done: usize,
    step: Step,
    cancel: CancelToken,
}

impl RegenerationTask {
    /// Creates a task that scans the first `span` cells of the lane.
    #[must_use]
    pub fn new(
        lane: LaneId,
        path: LanePath,
        span: usize,
        roller: PieceRoller,
        cancel: CancelToken,
    ) -> Self {
        Self {
            lane: LaneRun::new(lane, path),
            span,
            roller,
            gap: 0..0,
            phases_done: 0,
            step: Step::Scan,
            cancel,
        }
    }

    /// Lane the task regrows.
    #[must_use]
    pub fn lane(&self) -> LaneId {
        self.lane.id
    }

    /// Current state of the lane.
    #[must_use]
    pub fn lane_state(&self) -> LaneState {
        self.lane.state
    }

    /// Runs until the next animation await point or the end of the task.
    pub fn poll(
        &mut self,
        world: &mut World,
        factory: &mut dyn PieceFactory,
        out: &mut Vec<Event>,
    ) -> TaskPoll {
        loop {
            if let Step::Finished(result) = self.step {
                return result;
            }
            if self.cancel.is_cancelled() {
                self.lane.abandon(factory);
                self.step = Step::Finished(TaskPoll::Cancelled);
                continue;
            }

            match self.step {
                Step::Scan => {
                    let Some(gap) =
                        missing_segment(&self.lane.path, self.span, query::grid(world))
                    else {
                        self.step = Step::Finished(TaskPoll::Complete);
                        continue;
                    };
                    log::debug!(
                        "lane {} regrowing cells {}..{}",
                        self.lane.id.get(),
                        gap.start,
                        gap.end
                    );
                    self.lift(gap.start, world, out);
                    self.gap = gap;
                    self.step = Step::Advance;
                }
                Step::Advance => {
                    if self.phases_done == self.gap.len() {
                        let count = self.gap.end.min(self.lane.chain.len());
                        self.lane.settle(count, world, factory, out);
                        self.step = Step::Finished(TaskPoll::Complete);
                        continue;
                    }
                    self.step = Step::Spawn;
                    if !self.lane.chain.is_empty() {
                        self.lane.advance(out);
                        return TaskPoll::AwaitingAnimation;
                    }
                }
                Step::Spawn => {
                    self.lane.spawn(&mut self.roller, factory, out);
                    self.phases_done += 1;
                    self.step = Step::Advance;
                }
                Step::Finished(_) => {}
            }
        }
    }

    fn lift(&mut self, before: usize, world: &mut World, out: &mut Vec<Event>) {
        for index in 0..before {
            let Some(cell) = self.lane.path.get(index) else {
                break;
            };
            let mut events = Vec::new();
            apply(world, Command::RemovePiece { cell }, &mut events);
            for event in events {
                if let Event::PieceRemoved { piece, .. } = &event {
                    self.lane.chain.push_tail(piece.clone());
                }
                out.push(event);
            }
        }
    }
}
