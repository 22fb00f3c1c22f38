mod common;
mod logic;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use skymate_game::{AirportGraph, AppSettings, SessionConfig, SettingsPatch};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::scenario::{ALL_SCENARIOS, get_scenario, list_scenarios};
use common::split_csv;
use logic::{DEFAULT_JOURNEY_SPINS, JourneyTester, LogicTester, resolve_seed_inputs};

#[derive(Debug, Parser)]
#[command(name = "skymate-tester", version)]
#[command(about = "Automated journey testing for the Skymate airport roulette engine")]
struct Args {
    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated; integers, 0x hex, or a..b ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Spins per journey for scenarios that do not fix their own length
    #[arg(long, default_value_t = DEFAULT_JOURNEY_SPINS)]
    spins: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Starting airport (IATA code)
    #[arg(long, default_value = skymate_game::constants::STARTING_AIRPORT)]
    start: String,

    /// Probability of drawing a hub when both classes are available (0.0 - 1.0)
    #[arg(long)]
    big_ratio: Option<f64>,

    /// Exclude destinations closer than this many kilometres
    #[arg(long)]
    exclude_radius_km: Option<f64>,

    /// Park each result for confirmation instead of committing it
    #[arg(long)]
    retry_mode: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let base_config = build_session_config(&args)?;
    let scenarios = expand_scenarios(&args.scenarios);
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();
    if args.verbose {
        for info in &seed_infos {
            println!("🎲 Seed {} (from {})", info.seed, info.source);
        }
    }

    let journey_tester = JourneyTester::new(base_config, args.spins, args.verbose);
    let all_results = run_logic_scenarios(&args, &scenarios, &seeds, journey_tester);

    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "✈️  Skymate Journey Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn build_session_config(args: &Args) -> Result<SessionConfig> {
    let start = args.start.to_uppercase();
    anyhow::ensure!(
        AirportGraph::builtin().contains(&start),
        "unknown starting airport {start}"
    );

    let mut patch = SettingsPatch::default();
    patch.big_airport_ratio = args.big_ratio;
    patch.exclude_radius_km = args.exclude_radius_km;
    if args.retry_mode {
        patch = patch.retry_mode(true);
    }
    let settings = AppSettings::default()
        .merged(&patch)
        .context("invalid roulette settings")?;

    Ok(SessionConfig::default()
        .with_start(start)
        .with_settings(settings))
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for key in ALL_SCENARIOS {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push((*key).to_string());
            }
        }
    }
    scenarios
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    journey_tester: JourneyTester,
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Journey Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(journey_tester);
    let mut results: Vec<logic::ScenarioResult> = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(
    args: &Args,
    results: &[logic::ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Skymate Journey Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results, Utc::now())?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No journey scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ScenarioResult;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            spins: 5,
            report: "json".to_string(),
            verbose: false,
            output: None,
            start: "HND".to_string(),
            big_ratio: None,
            exclude_radius_km: None,
            retry_mode: false,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "skymate-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke Journey".to_string(),
            seed: 1337,
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("smoke,all");
        assert_eq!(expanded.len(), ALL_SCENARIOS.len());
        assert_eq!(expanded[0], "smoke");
        assert!(expanded.contains(&"settings-lock".to_string()));
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("dead-end,smoke");
        assert_eq!(expanded, vec!["dead-end".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn session_config_reflects_flags() {
        let args = Args {
            start: "oka".to_string(),
            big_ratio: Some(0.25),
            exclude_radius_km: Some(100.0),
            retry_mode: true,
            ..base_args()
        };
        let config = build_session_config(&args).unwrap();
        assert_eq!(config.start, "OKA");
        assert!((config.settings.big_airport_ratio - 0.25).abs() < f64::EPSILON);
        assert!((config.settings.exclude_radius_km - 100.0).abs() < f64::EPSILON);
        assert!(config.settings.retry_mode);
    }

    #[test]
    fn session_config_rejects_bad_flags() {
        let args = Args {
            start: "ZZZ".to_string(),
            ..base_args()
        };
        assert!(build_session_config(&args).is_err());
        let args = Args {
            big_ratio: Some(1.2),
            ..base_args()
        };
        assert!(build_session_config(&args).is_err());
    }

    #[test]
    fn runs_known_and_skips_unknown_scenarios() {
        let args = base_args();
        let tester = JourneyTester::new(build_session_config(&args).unwrap(), args.spins, false);
        let results = run_logic_scenarios(
            &args,
            &["smoke".to_string(), "bogus".to_string()],
            &[1, 2],
            tester,
        );
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_path("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("reset-every-state"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = temp_path("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        assert!(std::fs::read_to_string(&temp).unwrap().contains("[]"));

        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        assert!(std::fs::read_to_string(temp).unwrap().contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown() {
        let temp = temp_path("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        assert!(
            std::fs::read_to_string(&temp)
                .unwrap()
                .contains("No scenarios executed")
        );

        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("# Skymate Journey Test Results"));
        assert!(content.contains("## Failures"));
    }

    #[test]
    fn write_reports_console() {
        let temp = temp_path("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Journey Test Results Summary"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
