// Fan-roster picker entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Ensure/load config
// 3. Load the player pool CSV
// 4. Classify the tournament-format text (argv or stdin prompt)
// 5. Score and optimize per profile, printing each report
// 6. Optionally run the booster/role assignment matchers

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info, warn};

use squad_assistant::config::{self, Profile};
use squad_assistant::ingest;
use squad_assistant::optimizer::assign::{self, EvTable, Strategy};
use squad_assistant::optimizer::roster;
use squad_assistant::report;
use squad_assistant::scoring::expected::{score_players, ScoredPlayer};
use squad_assistant::tournament::format;

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

struct Args {
    players_path: PathBuf,
    format_text: Option<String>,
    boosters_path: Option<PathBuf>,
    roles_path: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        players_path: PathBuf::from("data/players.csv"),
        format_text: None,
        boosters_path: None,
        roles_path: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .with_context(|| format!("{name} requires a value"))
        };
        match flag.as_str() {
            "--players" => args.players_path = PathBuf::from(value("--players")?),
            "--format" => args.format_text = Some(value("--format")?),
            "--boosters" => args.boosters_path = Some(PathBuf::from(value("--boosters")?)),
            "--roles" => args.roles_path = Some(PathBuf::from(value("--roles")?)),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(args)
}

/// Ask for the tournament-format text on stdin when not given on the
/// command line.
fn prompt_format() -> anyhow::Result<String> {
    print!("Tournament format: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// ---------------------------------------------------------------------------
// Assignment matchers
// ---------------------------------------------------------------------------

/// The profile whose scoring feeds the greedy matcher caps: "balanced" when
/// configured, otherwise the first profile by name. An explicit choice, so
/// caps never depend on profile iteration order.
fn cap_profile(
    profiles: &std::collections::BTreeMap<String, Profile>,
) -> Option<(&str, &Profile)> {
    profiles
        .get_key_value("balanced")
        .or_else(|| profiles.iter().next())
        .map(|(name, profile)| (name.as_str(), profile))
}

/// Run both matcher strategies over one EV table and print the results.
/// Greedy caps come from each agent's expected matches where the agent name
/// matches a scored player; unknown agents default to a single slot.
fn run_matcher(label: &str, table: &EvTable, scored: &[ScoredPlayer]) {
    let expected: Vec<f64> = table
        .agents
        .iter()
        .map(|agent| {
            scored
                .iter()
                .find(|s| &s.player.name == agent)
                .map(|s| s.expected_matches)
                .unwrap_or(1.0)
        })
        .collect();
    let caps = assign::caps_from_expected_matches(&expected);

    println!("--- {label}: exact optimum ---");
    match assign::best_assignment(table, Strategy::Exact, &caps) {
        Some(assignment) => print!("{}", report::assignment_table(&assignment, table)),
        None => println!("no full assignment exists (fewer resources than agents)"),
    }

    println!("--- {label}: greedy ---");
    if let Some(assignment) = assign::best_assignment(table, Strategy::Greedy, &caps) {
        print!("{}", report::assignment_table(&assignment, table));
    }
    println!();
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("squadpick starting up");

    let args = parse_args()?;
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "config loaded: budget {}, roster size {}, {} profiles",
        config.roster.budget,
        config.roster.roster_size,
        config.profiles.len()
    );

    let players =
        ingest::load_players(&args.players_path).context("failed to load player pool")?;
    let entrants = players
        .iter()
        .map(|p| p.team.as_str())
        .collect::<HashSet<_>>()
        .len();
    info!("loaded {} players across {} teams", players.len(), entrants);

    let format_text = match args.format_text {
        Some(text) => text,
        None => prompt_format().context("failed to read format text")?,
    };
    let descriptor = format::classify(&format_text);
    info!(
        "format classified as {} (bo5: {})",
        descriptor.kind.label(),
        descriptor.best_of_five
    );

    // Score and optimize once per profile. A failing profile is reported and
    // skipped; the run continues with the rest.
    for (name, profile) in &config.profiles {
        let scored = score_players(&players, descriptor, entrants, &config.model, profile);

        println!("=== profile: {name} ===");
        print!("{}", report::scored_table(&scored));

        let ranked = roster::top_rosters(&scored, &config.roster, config.roster.top_candidates);
        if ranked.is_empty() {
            // A normal empty result, distinct from a computation error.
            warn!("profile '{name}': no valid roster under current constraints");
            println!("no valid roster under current constraints\n");
        } else {
            println!("top rosters:");
            print!("{}", report::roster_table(&ranked, &scored));
            println!();
        }
    }

    if args.boosters_path.is_some() || args.roles_path.is_some() {
        // Config validation guarantees at least one profile.
        let Some((cap_name, profile)) = cap_profile(&config.profiles) else {
            anyhow::bail!("no scoring profile available for matcher caps");
        };
        info!("matcher caps use profile '{cap_name}'");
        let scored = score_players(&players, descriptor, entrants, &config.model, profile);

        if let Some(path) = &args.boosters_path {
            match ingest::load_boosters(path)
                .map_err(anyhow::Error::from)
                .and_then(|t| EvTable::from_boosters(&t).map_err(anyhow::Error::from))
            {
                Ok(table) => run_matcher("boosters", &table, &scored),
                Err(e) => error!("booster matcher failed: {e:#}"),
            }
        }

        if let Some(path) = &args.roles_path {
            match ingest::load_roles(path)
                .map_err(anyhow::Error::from)
                .and_then(|t| EvTable::from_roles(&t).map_err(anyhow::Error::from))
            {
                Ok(table) => run_matcher("roles", &table, &scored),
                Err(e) => error!("role matcher failed: {e:#}"),
            }
        }
    }

    info!("squadpick finished");
    Ok(())
}

/// Initialize tracing to stderr so stdout stays clean for the reports.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("squad_assistant=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn cap_profile_prefers_balanced() {
        let mut profiles = BTreeMap::new();
        profiles.insert("aggressive".to_string(), Profile::default());
        profiles.insert(
            "balanced".to_string(),
            Profile {
                lambda: 0.7,
                ..Profile::default()
            },
        );
        let (name, profile) = cap_profile(&profiles).unwrap();
        assert_eq!(name, "balanced");
        assert!((profile.lambda - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn cap_profile_falls_back_to_first_by_name() {
        let mut profiles = BTreeMap::new();
        profiles.insert("zeta".to_string(), Profile::default());
        profiles.insert("alpha".to_string(), Profile::default());
        let (name, _) = cap_profile(&profiles).unwrap();
        assert_eq!(name, "alpha");
    }

    #[test]
    fn cap_profile_empty_is_none() {
        assert!(cap_profile(&BTreeMap::new()).is_none());
    }
}
