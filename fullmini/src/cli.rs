use crate::{
    dice::{RandomDice, ScriptedDice},
    engine::{self, Estimate, RoundTrace, TrialCount, TrialTrace},
    outcome::Outcome,
    parse::Rolls,
    stats,
    strategy::{Strategy, StrategyKind},
    DEFAULT_TRIALS,
};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tabular::{row, Table};
use trice::Instant;

///////////////////////////
// String parser helpers //
///////////////////////////

fn parse_req<T>(label: &'static str, s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    T::from_str(s).map_err(|err| format!("invalid {label}: {err}"))
}

fn parse_opt<T>(label: &'static str, opt_s: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    opt_s
        .map(T::from_str)
        .transpose()
        .map_err(|err| format!("invalid {label}: {err}"))
}

fn parse_trials(opt_s: Option<&str>) -> Result<TrialCount, String> {
    match parse_opt("trials", opt_s)? {
        Some(trials) => Ok(trials),
        None => TrialCount::new(DEFAULT_TRIALS),
    }
}

fn parse_jobs(opt_s: Option<&str>) -> Result<Option<usize>, String> {
    match parse_opt::<usize>("jobs", opt_s)? {
        Some(0) => Err("invalid jobs: the number of threads must be positive".to_string()),
        jobs => Ok(jobs),
    }
}

/// A fresh seed from the OS entropy source.
fn entropy_seed() -> Result<u64, String> {
    let mut buf = [0_u8; 8];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|err| format!("failed to read a seed from the OS: {err}"))?;
    Ok(u64::from_le_bytes(buf))
}

fn parse_seed(opt_s: Option<&str>) -> Result<u64, String> {
    match parse_opt("seed", opt_s)? {
        Some(seed) => Ok(seed),
        None => entropy_seed(),
    }
}

/// Run `f` on a dedicated rayon pool with `jobs` threads, or on the global
/// pool if `jobs` is unset.
fn with_jobs<T, F>(jobs: Option<usize>, f: F) -> Result<T, String>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|err| format!("failed to build thread pool: {err}"))?;
            Ok(pool.install(f))
        }
        None => Ok(f()),
    }
}

//////////////////////
// CLI Args Wrapper //
//////////////////////

pub struct Args(pico_args::Arguments);

impl Args {
    pub fn new(inner: pico_args::Arguments) -> Self {
        Self(inner)
    }

    fn subcommand(&mut self) -> Result<Option<String>, String> {
        self.0.subcommand().map_err(|err| err.to_string())
    }

    fn opt_value(&mut self, keys: impl Into<pico_args::Keys>) -> Result<Option<String>, String> {
        self.0
            .opt_value_from_fn(keys, |s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn flag(&mut self, keys: impl Into<pico_args::Keys>) -> bool {
        self.0.contains(keys)
    }

    fn free_value(&mut self) -> Result<String, String> {
        self.0
            .free_from_fn(|s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn opt_free_value(&mut self) -> Result<Option<String>, String> {
        self.0
            .opt_free_from_fn(|s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn free_values(&mut self) -> Result<Vec<String>, String> {
        let mut values = Vec::new();
        while let Some(value) = self.opt_free_value()? {
            values.push(value);
        }
        Ok(values)
    }

    fn expect_finished(self) -> Result<(), String> {
        let remaining = self.0.finish();
        if !remaining.is_empty() {
            Err(format!("unexpected arguments left: '{:?}'", remaining))
        } else {
            Ok(())
        }
    }

    fn maybe_help(&mut self, usage: &str) {
        if self.0.contains(["-h", "--help"]) {
            print!("{}", usage);
            std::process::exit(0);
        }
    }
}

/////////////
// Metrics //
/////////////

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Metrics(pub Vec<(String, String)>);

impl Metrics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((label.into(), value.into()));
        self
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new("{:>}  {:<}");

        for (label, value) in &self.0 {
            table.add_row(row!(label, value));
        }

        table
    }
}

////////////
// Report //
////////////

/// A command's report, either rendered as tables or serialized to JSON.
pub enum Report<T> {
    Table(T),
    Json(String),
}

impl<T: Serialize> Report<T> {
    fn new(report: T, json: bool) -> Result<Self, String> {
        if json {
            serde_json::to_string_pretty(&report)
                .map(Self::Json)
                .map_err(|err| format!("failed to serialize output: {err}"))
        } else {
            Ok(Self::Table(report))
        }
    }
}

impl<T: fmt::Display> fmt::Display for Report<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(report) => report.fmt(f),
            Self::Json(json) => f.write_str(json),
        }
    }
}

///////////////////
// Command trait //
///////////////////

pub trait Command: Sized {
    const USAGE: &'static str;

    type Output: fmt::Display;

    fn try_from_cli_args(args: Args) -> Result<Self, String>;
    fn run(self) -> Result<Self::Output, String>;
}

///////////////////////////
// ListStrategiesCommand //
///////////////////////////

#[derive(Clone, Debug)]
pub struct ListStrategiesCommand;

impl Command for ListStrategiesCommand {
    const USAGE: &'static str = "\
fullmini list-strategies - list all the retention strategies and their short names

USAGE:
    fullmini list-strategies
";

    type Output = Table;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        args.expect_finished()?;
        Ok(Self)
    }

    fn run(self) -> Result<Self::Output, String> {
        let mut table = Table::new("  {:<}  {:<}  {:<}  {:<}")
            .with_row(row!("name", "goal", "checks", "strategy"));

        for &kind in StrategyKind::all() {
            let checks = if kind.checks_every_round() {
                "every round"
            } else {
                "last round"
            };
            table.add_row(row!(kind.name(), kind.goal(), checks, kind.as_human_readable()));
        }

        Ok(table)
    }
}

/////////////////////
// EstimateCommand //
/////////////////////

#[derive(Clone, Debug)]
pub struct EstimateCommand {
    strategies: Vec<StrategyKind>,
    trials: TrialCount,
    seed: u64,
    jobs: Option<usize>,
    json: bool,
}

impl EstimateCommand {
    pub fn try_from_str_args(
        strategies: &[String],
        trials: Option<&str>,
        seed: Option<&str>,
        jobs: Option<&str>,
        json: bool,
    ) -> Result<Self, String> {
        let strategies = if strategies.is_empty() {
            StrategyKind::all().to_vec()
        } else {
            strategies
                .iter()
                .map(|s| parse_req("strategy", s))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            strategies,
            trials: parse_trials(trials)?,
            seed: parse_seed(seed)?,
            jobs: parse_jobs(jobs)?,
            json,
        })
    }
}

impl Command for EstimateCommand {
    const USAGE: &'static str = "\
fullmini estimate - estimate the success probability of each strategy

USAGE:
    fullmini estimate [option ...] [strategy ...]

EXAMPLES:
    fullmini estimate
    fullmini estimate -n 100000 -s 42 pairs triple

OPTIONS:
    · --trials / -n count (default: 1000000)
      The number of independent trials to run per strategy.

    · --seed / -s seed (default: random)
      Seed for the dice. The seed used is printed with the results, so a run
      can be reproduced exactly.

    · --jobs / -j threads (default: one per CPU)
      The number of threads to run trials on.

    · --json
      Print the results as JSON.
";

    type Output = Report<EstimateCommandOutput>;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let trials = args.opt_value(["-n", "--trials"])?;
        let seed = args.opt_value(["-s", "--seed"])?;
        let jobs = args.opt_value(["-j", "--jobs"])?;
        let json = args.flag("--json");
        let strategies = args.free_values()?;
        args.expect_finished()?;

        Self::try_from_str_args(
            &strategies,
            trials.as_deref(),
            seed.as_deref(),
            jobs.as_deref(),
            json,
        )
    }

    fn run(self) -> Result<Self::Output, String> {
        let start_time = Instant::now();

        let strategies = self.strategies;
        let (trials, seed) = (self.trials, self.seed);
        let estimates = with_jobs(self.jobs, || {
            strategies
                .iter()
                .map(|kind| engine::estimate_par(kind, trials, seed))
                .collect::<Vec<_>>()
        })?;

        let total_duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("trials", trials.to_string());
        metrics.push("seed", seed.to_string());
        metrics.push("threads", thread_count(self.jobs));
        metrics.push("total duration", format!("{:.2?}", total_duration));

        Report::new(
            EstimateCommandOutput {
                trials: trials.get(),
                seed,
                estimates,
                metrics,
            },
            self.json,
        )
    }
}

fn thread_count(jobs: Option<usize>) -> String {
    jobs.unwrap_or_else(rayon::current_num_threads).to_string()
}

fn estimates_table<'a>(estimates: impl Iterator<Item = &'a Estimate>) -> Table {
    let mut table = Table::new("{:<}  {:<}  {:>}  {:>}  {:>}").with_row(row!(
        "strategy", "goal", "estimate", "std err", "time"
    ));

    for est in estimates {
        table.add_row(row!(
            est.strategy,
            est.goal,
            format!("{:.4}", est.probability()),
            format!("{:.5}", est.std_error()),
            format!("{:.2?}", est.elapsed),
        ));
    }

    table
}

#[derive(Serialize)]
pub struct EstimateCommandOutput {
    trials: u64,
    seed: u64,
    estimates: Vec<Estimate>,
    #[serde(skip)]
    metrics: Metrics,
}

impl fmt::Display for EstimateCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = estimates_table(self.estimates.iter());
        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

////////////////////
// CompareCommand //
////////////////////

#[derive(Clone, Debug)]
pub struct CompareCommand {
    first: StrategyKind,
    second: StrategyKind,
    trials: TrialCount,
    seed: u64,
    jobs: Option<usize>,
    json: bool,
}

impl CompareCommand {
    pub fn try_from_str_args(
        first: &str,
        second: &str,
        trials: Option<&str>,
        seed: Option<&str>,
        jobs: Option<&str>,
        json: bool,
    ) -> Result<Self, String> {
        Ok(Self {
            first: parse_req("first strategy", first)?,
            second: parse_req("second strategy", second)?,
            trials: parse_trials(trials)?,
            seed: parse_seed(seed)?,
            jobs: parse_jobs(jobs)?,
            json,
        })
    }
}

/// How two estimates compare, at the 4 decimal places they're reported with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    LessLikely,
    MoreLikely,
    ApproximatelyEqual,
}

impl Comparison {
    pub fn from_estimates(first: &Estimate, second: &Estimate) -> Self {
        let p1 = format!("{:.4}", first.probability());
        let p2 = format!("{:.4}", second.probability());

        if p1 == p2 {
            Self::ApproximatelyEqual
        } else if first.probability() < second.probability() {
            Self::LessLikely
        } else {
            Self::MoreLikely
        }
    }
}

/// `"pairs (full)"`
fn describe(est: &Estimate) -> String {
    format!("{} ({})", est.strategy, est.goal)
}

impl Command for CompareCommand {
    const USAGE: &'static str = "\
fullmini compare - estimate two strategies and compare their chances

USAGE:
    fullmini compare [option ...] <strategy> <strategy>

EXAMPLES:
    fullmini compare simple-full simple-mini
    fullmini compare -n 200000 pairs triple

OPTIONS:
    · --trials / -n count (default: 1000000)
      The number of independent trials to run per strategy.

    · --seed / -s seed (default: random)
      Seed for the dice.

    · --jobs / -j threads (default: one per CPU)
      The number of threads to run trials on.

    · --json
      Print the results as JSON.
";

    type Output = Report<CompareCommandOutput>;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let trials = args.opt_value(["-n", "--trials"])?;
        let seed = args.opt_value(["-s", "--seed"])?;
        let jobs = args.opt_value(["-j", "--jobs"])?;
        let json = args.flag("--json");
        let first = args.free_value()?;
        let second = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(
            &first,
            &second,
            trials.as_deref(),
            seed.as_deref(),
            jobs.as_deref(),
            json,
        )
    }

    fn run(self) -> Result<Self::Output, String> {
        let start_time = Instant::now();

        let (first, second) = (self.first, self.second);
        let (trials, seed) = (self.trials, self.seed);
        // the second run starts its chunk seeds where the first run's end, so
        // the two samples never share a dice stream.
        let second_seed = seed.wrapping_add(trials.num_chunks());

        let (first_est, second_est) = with_jobs(self.jobs, || {
            (
                engine::estimate_par(&first, trials, seed),
                engine::estimate_par(&second, trials, second_seed),
            )
        })?;

        let comparison = Comparison::from_estimates(&first_est, &second_est);
        let pvalue = stats::two_proportion_pvalue(
            first_est.successes,
            first_est.trials,
            second_est.successes,
            second_est.trials,
        );

        let total_duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("trials", trials.to_string());
        metrics.push("seed", seed.to_string());
        metrics.push("threads", thread_count(self.jobs));
        metrics.push("total duration", format!("{:.2?}", total_duration));

        Report::new(
            CompareCommandOutput {
                seed,
                first: first_est,
                second: second_est,
                comparison,
                pvalue,
                metrics,
            },
            self.json,
        )
    }
}

#[derive(Serialize)]
pub struct CompareCommandOutput {
    seed: u64,
    first: Estimate,
    second: Estimate,
    comparison: Comparison,
    pvalue: f64,
    #[serde(skip)]
    metrics: Metrics,
}

impl CompareCommandOutput {
    fn verdict(&self) -> String {
        let (first, second) = (describe(&self.first), describe(&self.second));
        match self.comparison {
            Comparison::LessLikely => format!("{first} is less likely than {second}."),
            Comparison::MoreLikely => format!("{second} is less likely than {first}."),
            Comparison::ApproximatelyEqual => "The chances are approximately equal.".to_string(),
        }
    }
}

impl fmt::Display for CompareCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = estimates_table([&self.first, &self.second].into_iter());
        let mut verdict = Metrics::new();
        verdict.push("verdict", self.verdict());
        verdict.push("p-value", format!("{:.4}", self.pvalue));

        write!(
            f,
            "\n{}\n{}\n{}",
            table,
            verdict.to_table(),
            self.metrics.to_table()
        )
    }
}

//////////////////
// TraceCommand //
//////////////////

#[derive(Clone, Debug)]
pub struct TraceCommand {
    strategy: StrategyKind,
    rolls: Rolls,
    seed: u64,
    json: bool,
}

impl TraceCommand {
    pub fn try_from_str_args(
        strategy: &str,
        rolls: Option<&str>,
        seed: Option<&str>,
        json: bool,
    ) -> Result<Self, String> {
        Ok(Self {
            strategy: parse_req("strategy", strategy)?,
            rolls: parse_opt("rolls", rolls)?.unwrap_or_default(),
            seed: parse_seed(seed)?,
            json,
        })
    }
}

impl Command for TraceCommand {
    const USAGE: &'static str = "\
fullmini trace - play out a single trial round by round

USAGE:
    fullmini trace [option ...] <strategy> [rolls]

The dice come up as listed in `rolls`, in order. Once the list runs out, the
remaining dice are rolled at random.

EXAMPLES:
    fullmini trace pairs [2,5,2,5,6,5]
    fullmini trace -s 42 low

OPTIONS:
    · --seed / -s seed (default: random)
      Seed for the dice rolled after `rolls` runs out.

    · --json
      Print the trace as JSON.
";

    type Output = Report<TraceCommandOutput>;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let seed = args.opt_value(["-s", "--seed"])?;
        let json = args.flag("--json");
        let strategy = args.free_value()?;
        let rolls = args.opt_free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(&strategy, rolls.as_deref(), seed.as_deref(), json)
    }

    fn run(self) -> Result<Self::Output, String> {
        let scripted = self.rolls.len();
        let mut dice = ScriptedDice::new(
            self.rolls.into_faces(),
            RandomDice::seed_from_u64(self.seed),
        );

        let trace = engine::trace_trial(&self.strategy, &mut dice);

        let mut metrics = Metrics::new();
        metrics.push("scripted rolls used", format!("{} / {}", dice.consumed(), scripted));
        metrics.push("random rolls", dice.overdrawn().to_string());
        metrics.push("seed", self.seed.to_string());

        Report::new(
            TraceCommandOutput {
                strategy: self.strategy,
                goal: self.strategy.goal(),
                seed: self.seed,
                trace,
                metrics,
            },
            self.json,
        )
    }
}

#[derive(Serialize)]
pub struct TraceCommandOutput {
    strategy: StrategyKind,
    goal: Outcome,
    seed: u64,
    trace: TrialTrace,
    #[serde(skip)]
    metrics: Metrics,
}

fn fmt_check(check: Option<bool>) -> &'static str {
    match check {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

fn trace_row(round: &RoundTrace) -> tabular::Row {
    row!(
        round.round,
        round.kept,
        round.rolled,
        fmt_check(round.checked),
        round
            .kept_after
            .map(|dice| dice.to_string())
            .unwrap_or_else(|| "-".to_string()),
        fmt_check(round.rechecked),
    )
}

impl fmt::Display for TraceCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new("{:>}  {:<}  {:<}  {:<}  {:<}  {:<}").with_row(row!(
            "round",
            "kept",
            "rolled",
            self.goal,
            "keep",
            "re-check"
        ));
        for round in &self.trace.rounds {
            table.add_row(trace_row(round));
        }

        let mut verdict = Metrics::new();
        verdict.push("strategy", self.strategy.name());
        verdict.push("goal", self.goal.as_str());
        verdict.push("success", fmt_check(Some(self.trace.success)));

        write!(
            f,
            "\n{}\n{}\n{}",
            table,
            verdict.to_table(),
            self.metrics.to_table()
        )
    }
}

/////////////////
// BaseCommand //
/////////////////

#[derive(Debug)]
pub enum BaseCommand {
    ListStrategies(ListStrategiesCommand),
    Estimate(EstimateCommand),
    Compare(CompareCommand),
    Trace(TraceCommand),
}

impl Command for BaseCommand {
    const USAGE: &'static str = "\
fullmini - Monte Carlo estimates for getting a full or a mini in three rolls

USAGE:
    fullmini [option ...] <subcommand>

SUBCOMMANDS:
    · fullmini list-strategies - list all the retention strategies and their short names
    · fullmini estimate - estimate the success probability of each strategy
    · fullmini compare - estimate two strategies and compare their chances
    · fullmini trace - play out a single trial round by round

Set RUST_LOG=debug for timings and progress on stderr.
";

    type Output = String;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        let maybe_subcommand = args.subcommand()?;

        match maybe_subcommand.as_deref() {
            Some("list-strategies") => Ok(Self::ListStrategies(
                ListStrategiesCommand::try_from_cli_args(args)?,
            )),
            Some("estimate") => Ok(Self::Estimate(EstimateCommand::try_from_cli_args(args)?)),
            Some("compare") => Ok(Self::Compare(CompareCommand::try_from_cli_args(args)?)),
            Some("trace") => Ok(Self::Trace(TraceCommand::try_from_cli_args(args)?)),
            Some(command) => Err(format!("'{}' is not a recognized command", command)),
            None => {
                args.maybe_help(Self::USAGE);
                Err("no subcommand specified".to_string())
            }
        }
    }

    fn run(self) -> Result<String, String> {
        match self {
            Self::ListStrategies(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Estimate(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Compare(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Trace(cmd) => cmd.run().map(|out| out.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use claim::{assert_err, assert_ok, assert_some_eq};
    use std::{ffi::OsString, time::Duration};

    fn args(argv: &[&str]) -> Args {
        Args::new(pico_args::Arguments::from_vec(
            argv.iter().map(OsString::from).collect(),
        ))
    }

    fn estimate(strategy: &'static str, successes: u64, trials: u64) -> Estimate {
        Estimate {
            strategy,
            goal: Outcome::Full,
            trials,
            successes,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_parse_base_command() {
        assert!(matches!(
            BaseCommand::try_from_cli_args(args(&["list-strategies"])),
            Ok(BaseCommand::ListStrategies(_)),
        ));
        assert_err!(BaseCommand::try_from_cli_args(args(&["yolo"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&["list-strategies", "extra"])));
    }

    #[test]
    fn test_parse_estimate_command() {
        let cmd = EstimateCommand::try_from_cli_args(args(&[
            "-n", "1_000", "--seed", "42", "--json", "pairs", "low",
        ]))
        .unwrap();
        assert_eq!(
            vec![StrategyKind::MultiPair, StrategyKind::LowValue],
            cmd.strategies
        );
        assert_eq!(1_000, cmd.trials.get());
        assert_eq!(42, cmd.seed);
        assert_eq!(None, cmd.jobs);
        assert!(cmd.json);

        // defaults
        let cmd = EstimateCommand::try_from_cli_args(args(&[])).unwrap();
        assert_eq!(StrategyKind::all().to_vec(), cmd.strategies);
        assert_eq!(DEFAULT_TRIALS, cmd.trials.get());
        assert!(!cmd.json);

        assert_err!(EstimateCommand::try_from_cli_args(args(&["-n", "0"])));
        assert_err!(EstimateCommand::try_from_cli_args(args(&["-n", "ten"])));
        assert_err!(EstimateCommand::try_from_cli_args(args(&["-j", "0"])));
        assert_err!(EstimateCommand::try_from_cli_args(args(&["-s", "-1"])));
        assert_err!(EstimateCommand::try_from_cli_args(args(&["yolo"])));
    }

    #[test]
    fn test_parse_compare_command() {
        let cmd =
            CompareCommand::try_from_cli_args(args(&["-j", "2", "simple-full", "simple-mini"]))
                .unwrap();
        assert_eq!(StrategyKind::SimpleFull, cmd.first);
        assert_eq!(StrategyKind::SimpleMini, cmd.second);
        assert_some_eq!(cmd.jobs, 2);

        assert_err!(CompareCommand::try_from_cli_args(args(&["pairs"])));
        assert_err!(CompareCommand::try_from_cli_args(args(&["pairs", "low", "triple"])));
    }

    #[test]
    fn test_parse_trace_command() {
        let cmd =
            TraceCommand::try_from_cli_args(args(&["-s", "7", "pairs", "[2,5,2,5,6,5]"])).unwrap();
        assert_eq!(StrategyKind::MultiPair, cmd.strategy);
        assert_eq!(Rolls::from_iter([2, 5, 2, 5, 6, 5]), cmd.rolls);
        assert_eq!(7, cmd.seed);

        let cmd = TraceCommand::try_from_cli_args(args(&["low"])).unwrap();
        assert!(cmd.rolls.is_empty());

        assert_err!(TraceCommand::try_from_cli_args(args(&["pairs", "[0, 9]"])));
        assert_err!(TraceCommand::try_from_cli_args(args(&[])));
    }

    #[test]
    fn test_comparison() {
        let a = estimate("a", 3_000, 10_000);
        let b = estimate("b", 5_000, 10_000);
        assert_eq!(Comparison::LessLikely, Comparison::from_estimates(&a, &b));
        assert_eq!(Comparison::MoreLikely, Comparison::from_estimates(&b, &a));

        // 0.30001 and 0.30004 both print as 0.3000
        let c = estimate("c", 30_001, 100_000);
        let d = estimate("d", 30_004, 100_000);
        assert_eq!(Comparison::ApproximatelyEqual, Comparison::from_estimates(&c, &d));
    }

    #[test]
    fn test_compare_verdict() {
        let out = CompareCommandOutput {
            seed: 0,
            first: estimate("simple-full", 3_000, 10_000),
            second: estimate("simple-mini", 5_000, 10_000),
            comparison: Comparison::LessLikely,
            pvalue: 0.0,
            metrics: Metrics::new(),
        };
        assert_eq!(
            "simple-full (full) is less likely than simple-mini (full).",
            out.verdict()
        );
    }

    #[test]
    fn test_run_trace_command() {
        let cmd =
            TraceCommand::try_from_str_args("simple-full", Some("[6, 3, 6, 3, 6]"), Some("1"), false)
                .unwrap();
        let out = match cmd.run().unwrap() {
            Report::Table(out) => out,
            Report::Json(_) => panic!("expected table output"),
        };
        assert!(out.trace.success);
        assert_eq!(1, out.trace.rounds.len());
        assert_eq!(
            ("scripted rolls used".to_string(), "5 / 5".to_string()),
            out.metrics.0[0]
        );
    }

    #[test]
    fn test_run_estimate_command_json() {
        let strategies = ["triple".to_string()];
        let cmd =
            EstimateCommand::try_from_str_args(&strategies, Some("1000"), Some("3"), Some("1"), true)
                .unwrap();
        let json = match assert_ok!(cmd.run()) {
            Report::Json(json) => json,
            Report::Table(_) => panic!("expected json output"),
        };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(1000, value["trials"]);
        assert_eq!(3, value["seed"]);
        assert_eq!("triple", value["estimates"][0]["strategy"]);
        assert_eq!("full", value["estimates"][0]["goal"]);
    }
}
