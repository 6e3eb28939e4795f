use anyhow::Result;
use ingredient_amounts::config::AppConfig;
use ingredient_amounts::observability;
use ingredient_amounts::IngredientParser;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

/// Parse ingredient lines given as arguments, or one per line on stdin, and
/// print one JSON record per line.
fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    config.validate()?;
    observability::init_observability_with_config(&config.observability)?;
    info!("{}", config.summary());

    let parser = IngredientParser::new(config.parser.clone())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let lines: Vec<String> = if args.is_empty() {
        io::stdin().lock().lines().collect::<io::Result<Vec<String>>>()?
    } else {
        args
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;
    for (line, result) in lines.iter().zip(parser.parse_batch(&lines)) {
        match result {
            Ok(parsed) => writeln!(out, "{}", serde_json::to_string(&parsed)?)?,
            Err(e) => {
                failures += 1;
                warn!(line = %line, error = %e, "Failed to parse ingredient line");
            }
        }
    }

    info!(lines = lines.len(), failures, "Finished parsing");
    Ok(())
}
