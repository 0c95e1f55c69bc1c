use rand::{rngs::StdRng, SeedableRng};
use rand::RngCore;

use crate::training_engine::{
    errors::DrillError,
    models::{DrillMode, GeneratedProblem, Problem, ProblemRequest},
    topics,
};

/// Generate a unique problem ID from mode + RNG.
fn make_problem_id(mode: DrillMode, rng: &mut impl RngCore) -> String {
    let prefix = match mode {
        DrillMode::Arithmetic   => "AR",
        DrillMode::Percentage   => "PC",
        DrillMode::Ratio        => "RC",
        DrillMode::Divisibility => "DV",
        DrillMode::Chain        => "CH",
    };
    format!("{}-{:08X}", prefix, rng.next_u32())
}

/// Build the RNG for a request: seeded when `rng_seed` is set, entropy
/// otherwise.
pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    }
}

/// Core dispatch: routes to the engine for the requested mode.
pub fn generate_problem(request: ProblemRequest) -> Result<GeneratedProblem, DrillError> {
    let mut rng = rng_for(request.rng_seed);
    let problem_id = make_problem_id(request.mode, &mut rng);
    let opts = &request.options;

    let problem = match request.mode {
        DrillMode::Arithmetic => Problem::Arithmetic(
            topics::arithmetic::generate(&mut rng, opts.operation, request.difficulty),
        ),

        DrillMode::Percentage => Problem::Percentage(
            topics::percentage::generate(&mut rng, request.difficulty)?,
        ),

        DrillMode::Ratio => Problem::Ratio(
            topics::ratio::generate(&mut rng, request.difficulty)?,
        ),

        DrillMode::Divisibility => Problem::Divisibility(
            topics::divisibility::generate(&mut rng, request.difficulty, opts.include_exact)?,
        ),

        DrillMode::Chain => Problem::Chain(topics::chain::generate_chain(
            &mut rng,
            opts.chain_min_length,
            opts.chain_max_length,
            request.difficulty,
        )?),
    };

    Ok(GeneratedProblem { problem_id, problem })
}
