use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::board::{Board, ChessMove, File, Rank, Square};
use crate::engine::{Engine, SearchOptions, SearchOutcome};
use crate::error::{ChessError, ChessResult};
use crate::types::{EngineConfig, WAITING_STEP_MS};

const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const GO_KEYWORDS: &[&str] =
    &["depth", "nodes", "movetime", "mate", "infinite", "wtime", "btime", "winc", "binc", "movestogo", "searchmoves"];

/// Reads UCI commands from stdin and writes responses to stdout until `quit`
/// or end of input.
pub fn run() {
    let stdin = io::stdin();
    run_io(stdin.lock(), io::stdout());
}

pub fn run_io<R: BufRead, W: Write>(input: R, mut output: W) {
    let engine = Arc::new(Mutex::new(Engine::new(EngineConfig::default())));
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if !dispatch(line.trim(), &engine, &mut output) {
            break;
        }
    }
}

/// handles one input line; returns `false` when the loop should stop (`quit`
/// or end of input).
fn dispatch(line: &str, engine: &Arc<Mutex<Engine>>, out: &mut impl Write) -> bool {
    if line.is_empty() {
        return true;
    }
    let args: Vec<&str> = line.split_whitespace().collect();
    let cmd = args[0];
    let rest = &args[1..];

    match cmd {
        "uci" => {
            let _ = writeln!(out, "id name tarrasch");
            let _ = writeln!(out, "id author the tarrasch contributors");
            let _ = writeln!(out, "uciok");
        }
        "isready" => {
            loop {
                if !engine.lock().unwrap().search_in_progress() {
                    break;
                }
                thread::sleep(Duration::from_millis(WAITING_STEP_MS));
            }
            let _ = writeln!(out, "readyok");
        }
        "ucinewgame" => engine.lock().unwrap().new_game(),
        "position" => {
            if let Err(e) = parse_position(rest, engine) {
                eprintln!("{e}");
            }
        }
        "go" => handle_go(rest, engine),
        "stop" => engine.lock().unwrap().terminate_search(),
        "quit" => {
            engine.lock().unwrap().quit();
            return false;
        }
        "d" | "print" => print_debug(engine),
        _ => {
            let _ = writeln!(out, "Unknown command: {line}");
        }
    }
    let _ = out.flush();
    true
}

fn parse_position(args: &[&str], engine: &Arc<Mutex<Engine>>) -> ChessResult<()> {
    let moves_idx = args.iter().position(|&t| t == "moves");
    let (position_tokens, move_tokens) = match moves_idx {
        Some(i) => (&args[..i], &args[i + 1..]),
        None => (args, &[][..]),
    };

    let fen_text = match position_tokens.first() {
        Some(&"startpos") => STARTPOS_FEN.to_string(),
        Some(&"fen") => position_tokens[1..].join(" "),
        _ => return Err(ChessError::MalformedInput("position requires startpos or fen".into())),
    };

    let mut moves = Vec::with_capacity(move_tokens.len());
    for tok in move_tokens {
        moves.push(ChessMove::from_text(tok)?);
    }

    engine.lock().unwrap().modify_position(Some(&fen_text), &moves)
}

#[derive(Default)]
struct GoParams {
    depth: Option<u32>,
    nodes: Option<u64>,
    movetime: Option<u64>,
    mate: Option<u32>,
    infinite: bool,
    searchmoves: Vec<ChessMove>,
}

/// keyword-partitioned: each recognised keyword consumes the tokens following
/// it up to the next recognised keyword. `wtime`/`btime`/`winc`/`binc`/`movestogo`
/// are parsed (a compliant GUI always sends them) but never used — only
/// `movetime`/`depth`/`nodes`/`infinite` actually bound a search here.
fn parse_go(args: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "depth" => {
                params.depth = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "nodes" => {
                params.nodes = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "movetime" => {
                params.movetime = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "mate" => {
                params.mate = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            "wtime" | "btime" | "winc" | "binc" | "movestogo" => i += 2,
            "searchmoves" => {
                i += 1;
                while i < args.len() && !GO_KEYWORDS.contains(&args[i]) {
                    if let Ok(mv) = ChessMove::from_text(args[i]) {
                        params.searchmoves.push(mv);
                    }
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    params
}

fn handle_go(args: &[&str], engine: &Arc<Mutex<Engine>>) {
    let params = parse_go(args);

    let opts = SearchOptions {
        depth: params.depth,
        nodes: params.nodes,
        filter_moves: if params.searchmoves.is_empty() { None } else { Some(params.searchmoves) },
        timeout: params.movetime.map(Duration::from_millis),
        blocking: false,
    };
    let _ = params.infinite; // infinite search is bounded only by `stop`/an explicit limit above

    if let Some(mate_depth) = params.mate {
        let mut guard = engine.lock().unwrap();
        if let Err(e) = guard.search_mate(SearchOptions { depth: Some(mate_depth), ..opts }) {
            println!("info string {e}");
            println!("bestmove 0000");
        }
        return;
    }

    let monitor_interval = engine.lock().unwrap().config().monitor_interval_ms;
    engine.lock().unwrap().search(opts);

    let monitor_engine = Arc::clone(engine);
    thread::spawn(move || loop {
        thread::sleep(Duration::from_millis(monitor_interval));
        let guard = monitor_engine.lock().unwrap();
        if guard.search_in_progress() {
            let nodes = guard.node_count();
            let elapsed_ms = guard.elapsed().map(|d| d.as_millis()).unwrap_or(0).max(1);
            let npc = (nodes as u128 * 1000 / elapsed_ms) as u64;
            println!("info npc {npc} nodes {nodes}");
        } else {
            let outcome = guard.search_outcome();
            drop(guard);
            match outcome {
                Some(SearchOutcome::Done(mv)) => println!("bestmove {mv}"),
                Some(SearchOutcome::Failed(reason)) => {
                    println!("info string search failed: {reason}");
                    println!("bestmove 0000");
                }
                _ => {}
            }
            break;
        }
    });
}

fn print_debug(engine: &Arc<Mutex<Engine>>) {
    let board = *engine.lock().unwrap().board();
    eprintln!("{}", render_ascii(&board));
    eprintln!("fen: {}", board.to_fen());
}

fn render_ascii(board: &Board) -> String {
    let mut out = String::new();
    for rank in (0..8).rev() {
        for file in 0..8 {
            let sq = Square::make_square(Rank::from_index(rank), File::from_index(file));
            let ch = match board.piece_on(sq) {
                Some(p) => p.to_char(board.color_on(sq).unwrap()),
                None => '.',
            };
            out.push(ch);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}
