use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::board::ChessMove;
use crate::types::Score;

/// A node attached to one depth of the search recursion. `child()` lazily creates
/// the node for the next depth down; its lifetime is scoped to the recursive call
/// that owns it. The recursive call site always holds both a visitor and its
/// freshly-created child at once, so hooks that need "the child" (PV assembly)
/// take it as a parameter rather than reaching for a parent back-pointer.
pub trait SearchVisitor: Sized {
    fn start(&mut self) {}
    fn end(&mut self) {}
    fn current_move(&mut self, _mv: ChessMove) {}
    fn new_best_move(&mut self, _child: &Self, _score: Score, _is_pv: bool) {}
    fn mated(&mut self) {}
    fn stalemated(&mut self) {}
    fn skip(&mut self, _mv: ChessMove) -> bool {
        false
    }
    fn halt(&self) -> bool {
        false
    }
    fn child(&self) -> Self;
}

/// Assembles the principal variation: the move sequence that repeatedly raised
/// alpha at each depth.
#[derive(Clone, Debug, Default)]
pub struct PvVisitor {
    current: Option<ChessMove>,
    pub best_move: Option<ChessMove>,
    pub pv: Vec<ChessMove>,
}

impl SearchVisitor for PvVisitor {
    fn current_move(&mut self, mv: ChessMove) {
        self.current = Some(mv);
    }

    fn new_best_move(&mut self, child: &Self, _score: Score, is_pv: bool) {
        if !is_pv {
            return;
        }
        self.best_move = self.current;
        self.pv.clear();
        if let Some(mv) = self.current {
            self.pv.push(mv);
        }
        self.pv.extend(child.pv.iter().copied());
    }

    fn child(&self) -> Self {
        PvVisitor::default()
    }
}

/// Node count (shared across the whole tree) and root wall-clock time.
#[derive(Clone)]
pub struct StatsVisitor {
    nodes: Arc<AtomicU64>,
    start: Option<Instant>,
}

impl StatsVisitor {
    pub fn new() -> Self {
        Self { nodes: Arc::new(AtomicU64::new(0)), start: None }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start.map(|s| s.elapsed())
    }
}

impl Default for StatsVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchVisitor for StatsVisitor {
    fn start(&mut self) {
        if self.start.is_none() {
            self.start = Some(Instant::now());
        }
    }

    fn current_move(&mut self, _mv: ChessMove) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    fn child(&self) -> Self {
        Self { nodes: Arc::clone(&self.nodes), start: None }
    }
}

/// Halts once elapsed time since the root's first `start()` exceeds `timeout`.
/// The deadline is computed once (by whichever node reaches `start()` first,
/// always the root in practice) and shared by cloning the `Arc` into every
/// descendant, so all nodes agree on the same deadline without re-deriving it.
#[derive(Clone)]
pub struct TimeoutHaltVisitor {
    deadline: Arc<OnceLock<Instant>>,
    timeout: Duration,
}

impl TimeoutHaltVisitor {
    pub fn new(timeout: Duration) -> Self {
        Self { deadline: Arc::new(OnceLock::new()), timeout }
    }
}

impl SearchVisitor for TimeoutHaltVisitor {
    fn start(&mut self) {
        let timeout = self.timeout;
        self.deadline.get_or_init(|| Instant::now() + timeout);
    }

    fn halt(&self) -> bool {
        self.deadline.get().is_some_and(|deadline| Instant::now() >= *deadline)
    }

    fn child(&self) -> Self {
        self.clone()
    }
}

/// Halts once the shared node count reaches `limit`.
#[derive(Clone)]
pub struct NodesHaltVisitor {
    stats: StatsVisitor,
    limit: u64,
}

impl NodesHaltVisitor {
    pub fn new(limit: u64) -> Self {
        Self { stats: StatsVisitor::new(), limit }
    }

    pub fn nodes(&self) -> u64 {
        self.stats.nodes()
    }
}

impl SearchVisitor for NodesHaltVisitor {
    fn start(&mut self) {
        self.stats.start();
    }

    fn current_move(&mut self, mv: ChessMove) {
        self.stats.current_move(mv);
    }

    fn halt(&self) -> bool {
        self.stats.nodes() >= self.limit
    }

    fn child(&self) -> Self {
        Self { stats: self.stats.child(), limit: self.limit }
    }
}

/// Restricts the root ply to an allow-list; every deeper node lets all moves
/// through, since only the root has no parent to have already filtered on.
#[derive(Clone)]
pub struct FilterMovesVisitor {
    allowed: Arc<Vec<ChessMove>>,
    is_root: bool,
}

impl FilterMovesVisitor {
    pub fn new(allowed: Vec<ChessMove>) -> Self {
        Self { allowed: Arc::new(allowed), is_root: true }
    }
}

impl SearchVisitor for FilterMovesVisitor {
    fn skip(&mut self, mv: ChessMove) -> bool {
        self.is_root && !self.allowed.contains(&mv)
    }

    fn child(&self) -> Self {
        Self { allowed: Arc::clone(&self.allowed), is_root: false }
    }
}

/// Halts when the engine facade's cooperative termination flag is set.
#[derive(Clone)]
pub struct EngineHaltVisitor {
    terminate: Arc<AtomicBool>,
}

impl EngineHaltVisitor {
    pub fn new(terminate: Arc<AtomicBool>) -> Self {
        Self { terminate }
    }
}

impl SearchVisitor for EngineHaltVisitor {
    fn halt(&self) -> bool {
        self.terminate.load(Ordering::Relaxed)
    }

    fn child(&self) -> Self {
        self.clone()
    }
}

/// A no-op visitor. Used as `Bag`'s "externally injected" slot when a caller has
/// nothing to inject, so `Bag` (and `Engine::search`) don't need a special case
/// for "no extra visitor" on top of "an extra visitor".
#[derive(Clone, Copy, Debug, Default)]
pub struct NullVisitor;

impl SearchVisitor for NullVisitor {
    fn child(&self) -> Self {
        NullVisitor
    }
}

/// Fans every hook out to a fixed, named set of sub-visitors and reduces
/// `halt`/`skip` by logical-or. A `Vec<Box<dyn SearchVisitor>>` isn't an option
/// here: `new_best_move` takes `&Self` as a parameter, which rules out a trait
/// object, so this holds exactly the sub-visitors the engine facade composes,
/// plus `extra`: a slot for one caller-supplied visitor of any concrete type,
/// generic rather than boxed for the same object-safety reason.
pub struct Bag<E = NullVisitor> {
    pub engine_halt: EngineHaltVisitor,
    pub pv: PvVisitor,
    pub stats: StatsVisitor,
    pub timeout_halt: Option<TimeoutHaltVisitor>,
    pub nodes_halt: Option<NodesHaltVisitor>,
    pub filter: Option<FilterMovesVisitor>,
    pub extra: Option<E>,
}

impl<E: SearchVisitor> SearchVisitor for Bag<E> {
    fn start(&mut self) {
        self.engine_halt.start();
        self.pv.start();
        self.stats.start();
        if let Some(v) = &mut self.timeout_halt {
            v.start();
        }
        if let Some(v) = &mut self.nodes_halt {
            v.start();
        }
        if let Some(v) = &mut self.filter {
            v.start();
        }
        if let Some(v) = &mut self.extra {
            v.start();
        }
    }

    fn end(&mut self) {
        self.engine_halt.end();
        self.pv.end();
        self.stats.end();
        if let Some(v) = &mut self.timeout_halt {
            v.end();
        }
        if let Some(v) = &mut self.nodes_halt {
            v.end();
        }
        if let Some(v) = &mut self.filter {
            v.end();
        }
        if let Some(v) = &mut self.extra {
            v.end();
        }
    }

    fn current_move(&mut self, mv: ChessMove) {
        self.pv.current_move(mv);
        self.stats.current_move(mv);
        if let Some(v) = &mut self.nodes_halt {
            v.current_move(mv);
        }
        if let Some(v) = &mut self.extra {
            v.current_move(mv);
        }
    }

    fn new_best_move(&mut self, child: &Self, score: Score, is_pv: bool) {
        self.pv.new_best_move(&child.pv, score, is_pv);
        if let (Some(v), Some(child_v)) = (&mut self.extra, &child.extra) {
            v.new_best_move(child_v, score, is_pv);
        }
    }

    fn mated(&mut self) {
        self.pv.mated();
        if let Some(v) = &mut self.extra {
            v.mated();
        }
    }

    fn stalemated(&mut self) {
        self.pv.stalemated();
        if let Some(v) = &mut self.extra {
            v.stalemated();
        }
    }

    fn skip(&mut self, mv: ChessMove) -> bool {
        self.filter.as_mut().is_some_and(|v| v.skip(mv)) || self.extra.as_mut().is_some_and(|v| v.skip(mv))
    }

    fn halt(&self) -> bool {
        self.engine_halt.halt()
            || self.timeout_halt.as_ref().is_some_and(|v| v.halt())
            || self.nodes_halt.as_ref().is_some_and(|v| v.halt())
            || self.extra.as_ref().is_some_and(|v| v.halt())
    }

    fn child(&self) -> Self {
        Bag {
            engine_halt: self.engine_halt.child(),
            pv: self.pv.child(),
            stats: self.stats.child(),
            timeout_halt: self.timeout_halt.as_ref().map(|v| v.child()),
            nodes_halt: self.nodes_halt.as_ref().map(|v| v.child()),
            filter: self.filter.as_ref().map(|v| v.child()),
            extra: self.extra.as_ref().map(|v| v.child()),
        }
    }
}
