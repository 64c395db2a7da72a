use derivatives::{CheckerConfig, Problem, Verdict};
use std::io::{BufRead, BufReader};
use tracing_subscriber::EnvFilter;

/// Reads lines of either `equation` or `equation | answer` from stdin.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CheckerConfig::default();
    let stdin = std::io::stdin();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        let mut parts = line.splitn(2, '|');
        let equation = parts.next().unwrap_or_default();

        let problem = match Problem::new(equation) {
            Ok(problem) => problem,
            Err(e) => {
                eprintln!("Unable to use \"{}\": {}", equation.trim(), e);
                continue;
            },
        };

        println!("d/dx {} = {}", problem.expression(), problem.derivative());

        if let Some(answer) = parts.next() {
            match problem.check(answer, &config) {
                Verdict::Correct => println!("  \"{}\" is correct", answer.trim()),
                Verdict::Incorrect(mismatch) => {
                    println!("  \"{}\" is incorrect: {}", answer.trim(), mismatch)
                },
                Verdict::InvalidInput(e) => {
                    println!("  \"{}\" is invalid: {}", answer.trim(), e)
                },
            }
        }
    }

    Ok(())
}
