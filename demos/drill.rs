//! Walk through every drill mode with fixed seeds.
//!
//! Run with: `cargo run --example drill`
//! Set `RUST_LOG=debug` to see the engines' sampling decisions.
//!
//! 1. **One-off problems**: one `generate_problem` call per mode and
//!    difficulty, printed with its ID.
//! 2. **Sessions**: each session type is played by a "perfect" player on a
//!    shared in-memory store, then the persisted records are dumped as JSON.

use std::{cell::RefCell, rc::Rc};

use mental_math_drill::{
    generate_problem,
    session::{
        store::KeyValueStore, ArithmeticSession, ChainSession, DivisibilitySession,
        ManualClock, MemoryStore, PercentageSession, RatioSession,
    },
    Difficulty, DrillError, DrillMode, ProblemRequest,
};

const MODES: [DrillMode; 5] = [
    DrillMode::Arithmetic,
    DrillMode::Percentage,
    DrillMode::Ratio,
    DrillMode::Divisibility,
    DrillMode::Chain,
];

fn print_problems() -> Result<(), DrillError> {
    for mode in MODES {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("  {mode}");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for difficulty in Difficulty::ALL {
            let generated = generate_problem(ProblemRequest {
                difficulty,
                rng_seed: Some(2024),
                ..ProblemRequest::new(mode)
            })?;
            println!("  {:<12} {}  {}", difficulty.to_string(), generated.problem_id, generated.problem.display());
        }
        println!();
    }
    Ok(())
}

fn play_sessions() -> Result<(), DrillError> {
    let store = Rc::new(RefCell::new(MemoryStore::new()));
    let clock = ManualClock::new(0);

    let mut arithmetic = ArithmeticSession::new(Rc::clone(&store), Box::new(clock.clone()), Some(1));
    let mut answer = arithmetic.start()?.answer;
    for _ in 0..5 {
        clock.advance(2_000);
        let outcome = arithmetic.submit_answer(answer)?;
        println!("  {} = {}  streak {}", outcome.problem.display, outcome.problem.answer, outcome.streak);
        answer = match arithmetic.current_problem() {
            Some(p) => p.answer,
            None => break,
        };
    }
    if let Some(summary) = arithmetic.end() {
        println!("  arithmetic: {}/{} in {} ms\n", summary.correct, summary.attempted, summary.duration_ms);
    }

    let mut pct = PercentageSession::new(Rc::clone(&store), Box::new(clock.clone()), Some(2));
    pct.start()?;
    while let Some(problem) = pct.current_problem().cloned() {
        clock.advance(4_000);
        let outcome = pct.submit_answer(problem.answer)?;
        println!("  {} ≈ {}%", problem.display, problem.answer);
        if let Some(summary) = outcome.summary {
            println!("  percentage: {:.0}% accuracy\n", summary.accuracy);
        }
    }

    let mut ratio = RatioSession::new(Rc::clone(&store), Box::new(clock.clone()), Some(3));
    ratio.start()?;
    while let Some(problem) = ratio.current_problem().cloned() {
        clock.advance(1_500);
        let outcome = ratio.submit_answer(problem.correct_answer)?;
        println!("  {}  ({}% apart)", problem.display, problem.percentage_diff);
        if let Some(summary) = outcome.summary {
            println!("  ratio: best streak {}\n", summary.best_streak);
        }
    }

    let mut div = DivisibilitySession::new(Rc::clone(&store), Box::new(clock.clone()), Some(4));
    div.start()?;
    while let Some(problem) = div.current_problem().cloned() {
        clock.advance(3_000);
        div.submit_divisibility(problem.is_divisible)?;
        let outcome = div.submit_remainder(problem.remainder)?;
        println!("  {} → remainder {}", problem.display, problem.remainder);
        div.advance(outcome.ticket)?;
    }
    if let Some(summary) = div.summary() {
        println!("  divisibility: {}/{}\n", summary.correct, summary.attempted);
    }

    let mut chain = ChainSession::new(Rc::clone(&store), Box::new(clock.clone()), Some(5));
    chain.start()?;
    while let Some(step) = chain.current_step().cloned() {
        clock.advance(2_500);
        println!("  {} → {}", step.display, step.result);
        if let Some(ticket) = chain.submit_answer(step.result)?.review {
            chain.complete(ticket);
        }
    }
    if let Some(stats) = chain.final_stats() {
        println!("  chain: score {}\n", stats.final_score);
    }

    for key in ["mental-math:arithmetic", "mental-math:percentage", "mental-math:ratio",
                "mental-math:divisibility", "mental-math:chain"] {
        if let Some(record) = store.borrow().load(key) {
            println!("  {key}: {record}");
        }
    }
    Ok(())
}

fn main() -> Result<(), DrillError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    print_problems()?;
    play_sessions()
}
