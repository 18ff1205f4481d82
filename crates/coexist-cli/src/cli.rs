use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Coexist Developers",
    version,
    about = "coexist - Gibbs-ensemble vapor-liquid coexistence campaigns: job setup, simulation launch, replicate reduction and critical/boiling point estimation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Project root holding the `workspace/` and `analysis/` directories.
    #[arg(short = 'C', long = "project", global = true, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Configuration file in TOML format.
    /// Defaults to `coexist.toml` in the project root when present.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S critical.beta=0.32
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create job directories for every state point of a study definition.
    Init(InitArgs),
    /// Show how far every job and study has progressed.
    Status,
    /// Launch the simulation engine for an equilibration or production stage.
    Run(RunArgs),
    /// Reduce, aggregate and fit the simulation output.
    Analyze(AnalyzeArgs),
    /// Collect every study's estimates into one CSV file.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Study definition with `[parameters]` and `[sweep]` tables.
    #[arg(long, required = true, value_name = "PATH")]
    pub study: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Equilibration,
    Production,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Simulation stage to launch.
    #[arg(value_enum)]
    pub stage: RunStage,

    /// Restrict the launch to these job ids. Can be used multiple times.
    #[arg(long = "job", value_name = "ID")]
    pub jobs: Vec<String>,

    /// Print the command lines instead of running them.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeStage {
    Reduce,
    Aggregate,
    Points,
    Summarize,
    All,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisOverrides {
    /// First block-average step included in the averages.
    #[arg(long, value_name = "STEP")]
    pub step_start: Option<u64>,

    /// Last block-average step included in the averages.
    #[arg(long, value_name = "STEP")]
    pub step_finish: Option<u64>,

    /// Species whose mole fractions are reported. Can be used multiple times.
    /// Detected from the block-average columns when omitted.
    #[arg(long = "species", value_name = "NAME")]
    pub species: Vec<String>,

    /// Critical exponent of the density scaling law.
    #[arg(long, value_name = "FLOAT")]
    pub beta: Option<f64>,

    /// Lowest reduced temperature accepted in the critical fit window.
    #[arg(long, value_name = "FLOAT")]
    pub min_reduced_temperature: Option<f64>,

    /// Fail when a state point has fewer than two replicates.
    #[arg(long)]
    pub strict_replicates: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Pipeline stage to run.
    #[arg(value_enum)]
    pub stage: AnalyzeStage,

    #[command(flatten)]
    pub overrides: AnalysisOverrides,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Destination of the CSV report.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "coexist",
            "-C",
            "/data/project",
            "analyze",
            "points",
            "--beta",
            "0.32",
            "--species",
            "C2H6",
            "--species",
            "C3H8",
            "--strict-replicates",
        ])
        .unwrap();

        assert_eq!(cli.global.project_dir, PathBuf::from("/data/project"));
        let Commands::Analyze(args) = cli.command else {
            panic!("expected the analyze command");
        };
        assert_eq!(args.stage, AnalyzeStage::Points);
        assert_eq!(args.overrides.beta, Some(0.32));
        assert_eq!(args.overrides.species, vec!["C2H6", "C3H8"]);
        assert!(args.overrides.strict_replicates);
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "coexist",
            "run",
            "production",
            "--job",
            "a",
            "--dry-run",
            "-S",
            "simulation.ncpu=8",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.set_values, vec!["simulation.ncpu=8"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.stage, RunStage::Production);
        assert_eq!(args.jobs, vec!["a"]);
        assert!(args.dry_run);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["coexist", "-q", "-v", "status"]).is_err());
    }

    #[test]
    fn report_requires_an_output() {
        assert!(Cli::try_parse_from(["coexist", "report"]).is_err());
    }
}
