use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::board::{Board, ChessMove};
use crate::error::{ChessError, ChessResult};
use crate::search::alphabeta;
use crate::types::{EngineConfig, INFINITY};
use crate::visitor::{
    Bag, EngineHaltVisitor, FilterMovesVisitor, NodesHaltVisitor, NullVisitor, PvVisitor, SearchVisitor, StatsVisitor,
    TimeoutHaltVisitor,
};

/// Outcome of the most recent (or still-running) non-blocking search. A tagged
/// union rather than an untyped sentinel, so a crashed worker still surfaces
/// something actionable instead of silently discarding the panic.
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    Running,
    Done(ChessMove),
    Failed(String),
}

#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub filter_moves: Option<Vec<ChessMove>>,
    pub timeout: Option<Duration>,
    pub blocking: bool,
}

/// Holds the current position, runs blocking or background searches, and
/// exposes cooperative termination. At most one background search runs at a
/// time; the board is mutated only by the worker thread while one is in flight.
pub struct Engine {
    board: Board,
    config: EngineConfig,
    terminate: Arc<AtomicBool>,
    search_done: Arc<Mutex<Option<SearchOutcome>>>,
    worker: Option<JoinHandle<()>>,
    live_stats: Option<StatsVisitor>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            board: Board::default(),
            config,
            terminate: Arc::new(AtomicBool::new(false)),
            search_done: Arc::new(Mutex::new(None)),
            worker: None,
            live_stats: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// reset per-game state; a no-op for this minimal core.
    pub fn new_game(&mut self) {}

    /// replace the board from `fen` (if given) and/or play `moves` onto the
    /// current position. Rejects a move absent from `legal_move_gen`, leaving
    /// the board unchanged.
    pub fn modify_position(&mut self, fen: Option<&str>, moves: &[ChessMove]) -> ChessResult<()> {
        let mut next = if let Some(fen) = fen { Board::from_fen(fen)? } else { self.board };

        for &mv in moves {
            if !next.legal(mv) {
                return Err(ChessError::IllegalMove(format!("{mv} is not legal in the current position")));
            }
            next.make_move(mv);
        }

        self.board = next;
        Ok(())
    }

    /// true iff a worker exists and the latest stored outcome is `Running`.
    pub fn search_in_progress(&self) -> bool {
        matches!(*self.search_done.lock().unwrap(), Some(SearchOutcome::Running))
    }

    pub fn search_outcome(&self) -> Option<SearchOutcome> {
        self.search_done.lock().unwrap().clone()
    }

    pub fn node_count(&self) -> u64 {
        self.live_stats.as_ref().map(StatsVisitor::nodes).unwrap_or(0)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.live_stats.as_ref().and_then(StatsVisitor::elapsed)
    }

    fn build_bag<E: SearchVisitor>(&mut self, opts: &SearchOptions, extra: Option<E>) -> Bag<E> {
        let stats = StatsVisitor::new();
        self.live_stats = Some(stats.clone());
        Bag {
            engine_halt: EngineHaltVisitor::new(Arc::clone(&self.terminate)),
            pv: PvVisitor::default(),
            stats,
            timeout_halt: opts.timeout.map(TimeoutHaltVisitor::new),
            nodes_halt: opts.nodes.map(NodesHaltVisitor::new),
            filter: opts.filter_moves.clone().map(FilterMovesVisitor::new),
            extra,
        }
    }

    /// run alpha-beta to `opts.depth` (or the configured default). Blocking
    /// searches run on the calling thread and return the PV best move directly;
    /// non-blocking searches spawn a worker and return `None` immediately,
    /// leaving the result to be read back via `search_outcome`.
    pub fn search(&mut self, opts: SearchOptions) -> Option<ChessMove> {
        self.search_with(opts, None::<NullVisitor>)
    }

    /// same as `search`, with one externally supplied visitor fanned into the
    /// bag alongside the engine's own halt/PV/stats/filter sub-visitors.
    pub fn search_with<E: SearchVisitor + Send + 'static>(&mut self, opts: SearchOptions, extra: Option<E>) -> Option<ChessMove> {
        self.terminate.store(false, Ordering::Relaxed);
        let depth = opts.depth.unwrap_or(self.config.default_depth as u32);
        let mut bag = self.build_bag(&opts, extra);

        if opts.blocking {
            let mut board = self.board;
            alphabeta(&mut board, depth, -INFINITY, INFINITY, &mut bag);
            let best = bag.pv.best_move;
            *self.search_done.lock().unwrap() = Some(outcome_for(best));
            best
        } else {
            *self.search_done.lock().unwrap() = Some(SearchOutcome::Running);
            let board = self.board;
            let search_done = Arc::clone(&self.search_done);

            let handle = std::thread::spawn(move || {
                let mut board = board;
                let mut bag = bag;
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    alphabeta(&mut board, depth, -INFINITY, INFINITY, &mut bag);
                    bag.pv.best_move
                }));

                let outcome = match result {
                    Ok(best) => outcome_for(best),
                    Err(payload) => SearchOutcome::Failed(panic_message(&payload)),
                };
                *search_done.lock().unwrap() = Some(outcome);
            });

            self.worker = Some(handle);
            None
        }
    }

    /// same contract as `search`, restricted to proving forced mate. Left
    /// unimplemented — the distilled source this crate is based on never
    /// implemented it either — but kept in the public interface so callers can
    /// name the operation and the front-end can recognise `go mate N`.
    pub fn search_mate(&mut self, _opts: SearchOptions) -> ChessResult<Option<ChessMove>> {
        Err(ChessError::SearchFailure("search_mate is not implemented".into()))
    }

    pub fn terminate_search(&self) {
        self.terminate.store(true, Ordering::Relaxed);
    }

    pub fn is_search_terminating(&self) -> bool {
        self.terminate.load(Ordering::Relaxed)
    }

    /// terminate any in-flight search and join its worker.
    pub fn quit(&mut self) {
        self.terminate_search();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn outcome_for(best: Option<ChessMove>) -> SearchOutcome {
    match best {
        Some(mv) => SearchOutcome::Done(mv),
        None => SearchOutcome::Failed("search produced no move".into()),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "search worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modify_position_rejects_illegal_move() {
        let mut engine = Engine::new(EngineConfig::default());
        let bogus = ChessMove::new(crate::board::Square::new(0), crate::board::Square::new(63), None);
        let before = *engine.board();
        let err = engine.modify_position(None, &[bogus]).unwrap_err();
        assert!(matches!(err, ChessError::IllegalMove(_)));
        assert_eq!(*engine.board(), before);
    }

    #[test]
    fn test_modify_position_from_fen_and_moves() {
        let mut engine = Engine::new(EngineConfig::default());
        let e2e4 = ChessMove::from_text("e2e4").unwrap();
        engine.modify_position(None, &[e2e4]).unwrap();
        assert_eq!(engine.board().side_to_move(), crate::board::Color::Black);
    }

    #[test]
    fn test_blocking_search_finds_mate_in_one() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.modify_position(Some("7k/8/8/8/3r4/8/2r5/K7 b - - 0 1"), &[]).unwrap();
        let best = engine.search(SearchOptions { depth: Some(2), blocking: true, ..Default::default() });
        assert_eq!(best, Some(ChessMove::from_text("d4d1").unwrap()));
        assert!(matches!(engine.search_outcome(), Some(SearchOutcome::Done(_))));
    }

    #[test]
    fn test_filter_moves_restricts_root() {
        let mut engine = Engine::new(EngineConfig::default());
        let only = ChessMove::from_text("g1f3").unwrap();
        let best = engine.search(SearchOptions {
            depth: Some(2),
            blocking: true,
            filter_moves: Some(vec![only]),
            ..Default::default()
        });
        assert_eq!(best, Some(only));
    }

    #[test]
    fn test_non_blocking_search_terminates_promptly() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.search(SearchOptions { depth: Some(4), blocking: false, ..Default::default() });
        engine.terminate_search();
        engine.quit();
        assert!(!engine.search_in_progress());
    }

    #[test]
    fn test_timeout_halts_deep_search() {
        let mut engine = Engine::new(EngineConfig::default());
        let start = std::time::Instant::now();
        engine.search(SearchOptions {
            depth: Some(20),
            blocking: true,
            timeout: Some(Duration::from_millis(1)),
            ..Default::default()
        });
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_search_mate_is_a_documented_stub() {
        let mut engine = Engine::new(EngineConfig::default());
        let err = engine.search_mate(SearchOptions::default()).unwrap_err();
        assert!(matches!(err, ChessError::SearchFailure(_)));
    }

    #[test]
    fn test_search_with_injects_an_external_visitor() {
        let mut engine = Engine::new(EngineConfig::default());
        let injected = NodesHaltVisitor::new(1);
        let best = engine.search_with(
            SearchOptions { depth: Some(6), blocking: true, ..Default::default() },
            Some(injected.clone()),
        );
        assert!(best.is_some());
        // the injected halt visitor shares its node counter, so it observed the search.
        assert!(injected.nodes() >= 1);
    }
}
