//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docbundle_core::expander;
use docbundle_core::merger;
use docbundle_core::output::OutputMode;
use docbundle_core::progress::ProgressReporter;
use docbundle_shared::{
    AppConfig, ExpandConfig, ExpandReport, MergeConfig, MergeReport, SkipReason, SkippedEntry,
    init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docbundle: aggregate markdown documentation into single-file artifacts.
#[derive(Parser, Debug)]
#[command(
    name = "docbundle",
    version,
    about = "Expand llms.txt into llms-full.txt and merge manual pages into a single page.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Project root; relative paths in the config resolve against it.
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Config file (defaults to <root>/docbundle.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Expand the index into one file with every linked page inlined.
    Expand {
        /// Index file (overrides `expand.index`).
        #[arg(long)]
        index: Option<PathBuf>,

        /// Output file (overrides `expand.output`).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Fail if the output on disk is out of date instead of writing it.
        #[arg(long)]
        check: bool,

        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Merge each language's manual pages into a single page.
    Merge {
        /// Language code to merge (repeatable). Defaults to all configured.
        #[arg(long = "lang")]
        languages: Vec<String>,

        /// Fail if an output on disk is out of date instead of writing it.
        #[arg(long)]
        check: bool,

        /// Print the run reports as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run `expand` and then `merge` for every language.
    All {
        /// Fail if any output on disk is out of date instead of writing it.
        #[arg(long)]
        check: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docbundle=info",
        1 => "docbundle=debug",
        _ => "docbundle=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let Cli {
        root,
        config,
        command,
        ..
    } = cli;

    match command {
        Command::Expand {
            index,
            output,
            check,
            json,
        } => {
            let app = load_app_config(&root, config.as_deref())?;
            cmd_expand(&app, &root, index, output, output_mode(check), json)
        }
        Command::Merge {
            languages,
            check,
            json,
        } => {
            let app = load_app_config(&root, config.as_deref())?;
            cmd_merge(&app, &root, &languages, output_mode(check), json)
        }
        Command::All { check } => {
            let app = load_app_config(&root, config.as_deref())?;
            cmd_all(&app, &root, output_mode(check))
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&root),
            ConfigAction::Show => cmd_config_show(&root, config.as_deref()),
        },
    }
}

fn load_app_config(root: &Path, config: Option<&Path>) -> Result<AppConfig> {
    let app = match config {
        Some(path) => load_config_from(path)?,
        None => load_config(root)?,
    };
    Ok(app)
}

fn output_mode(check: bool) -> OutputMode {
    if check {
        OutputMode::Check
    } else {
        OutputMode::Write
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_expand(
    app: &AppConfig,
    root: &Path,
    index: Option<PathBuf>,
    output: Option<PathBuf>,
    mode: OutputMode,
    json: bool,
) -> Result<()> {
    let mut config = ExpandConfig::resolve(app, root)?;
    if let Some(index) = index {
        config.index = root.join(index);
    }
    if let Some(output) = output {
        config.output = root.join(output);
    }

    info!(
        index = %config.index.display(),
        output = %config.output.display(),
        check = mode == OutputMode::Check,
        "expanding index"
    );

    let reporter = CliProgress::new(json);
    let report = expander::expand(&config, mode, &reporter)?;
    drop(reporter);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_expand_summary(&report, mode);
    }
    Ok(())
}

fn cmd_merge(
    app: &AppConfig,
    root: &Path,
    languages: &[String],
    mode: OutputMode,
    json: bool,
) -> Result<()> {
    let codes: Vec<String> = if languages.is_empty() {
        app.merge.languages.iter().map(|l| l.code.clone()).collect()
    } else {
        languages.to_vec()
    };

    let mut reports: Vec<MergeReport> = Vec::new();
    let mut failed: Vec<String> = Vec::new();

    for code in &codes {
        info!(language = %code, check = mode == OutputMode::Check, "merging manual");

        let reporter = CliProgress::new(json);
        let result = MergeConfig::resolve(app, root, code)
            .and_then(|config| merger::merge(&config, mode, &reporter));
        drop(reporter);

        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(language = %code, error = %e, "merge failed");
                failed.push(code.clone());
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_merge_summary(report, mode);
        }
    }

    if !failed.is_empty() {
        return Err(eyre!("merge failed for: {}", failed.join(", ")));
    }
    Ok(())
}

fn cmd_all(app: &AppConfig, root: &Path, mode: OutputMode) -> Result<()> {
    let mut failed: Vec<&str> = Vec::new();

    if let Err(e) = cmd_expand(app, root, None, None, mode, false) {
        error!(error = %e, "expand failed");
        failed.push("expand");
    }
    if let Err(e) = cmd_merge(app, root, &[], mode, false) {
        error!(error = %e, "merge failed");
        failed.push("merge");
    }

    if !failed.is_empty() {
        return Err(eyre!("failed steps: {}", failed.join(", ")));
    }
    Ok(())
}

fn cmd_config_init(root: &Path) -> Result<()> {
    let path = init_config(root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(root: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_app_config(root, config)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

fn print_expand_summary(report: &ExpandReport, mode: OutputMode) {
    println!();
    match mode {
        OutputMode::Write => println!("  Expanded index written!"),
        OutputMode::Check => println!("  Expanded index is up to date."),
    }
    println!("  Path:       {}", report.output_path.display());
    println!("  Characters: {}", report.chars_written);
    println!("  Sections:   {}", report.sections);
    println!("  Pages:      {}/{}", report.included, report.links);
    print_skipped(&report.skipped);
    println!();
}

fn print_merge_summary(report: &MergeReport, mode: OutputMode) {
    println!();
    match mode {
        OutputMode::Write => println!("  Single-page manual written! [{}]", report.language),
        OutputMode::Check => println!("  Single-page manual is up to date. [{}]", report.language),
    }
    println!("  Path:          {}", report.output_path.display());
    println!("  Order:         {}", report.order_source);
    println!("  Sections:      {}", report.sections);
    println!("  Supplementary: {}", report.supplementary);
    println!("  Size:          {} bytes", report.size_bytes);
    print_skipped(&report.skipped);
    println!();
}

fn print_skipped(skipped: &[SkippedEntry]) {
    if skipped.is_empty() {
        return;
    }
    println!("  Skipped:       {}", skipped.len());
    for entry in skipped {
        println!("    - {}: {}", entry.name, entry.reason);
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(hidden: bool) -> Self {
        if hidden {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn start(&self, total: usize) {
        self.spinner.set_message(format!("Processing {total} entries"));
    }

    fn included(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Added [{current}/{total}] {name}"));
    }

    fn skipped(&self, name: &str, _reason: &SkipReason) {
        self.spinner.set_message(format!("Skipped {name}"));
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_need_no_flags() {
        let cli = Cli::try_parse_from(["docbundle", "expand"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(matches!(
            cli.command,
            Command::Expand {
                index: None,
                output: None,
                check: false,
                json: false
            }
        ));
    }

    #[test]
    fn merge_accepts_repeated_languages() {
        let cli =
            Cli::try_parse_from(["docbundle", "merge", "--lang", "en", "--lang", "ja", "--check"])
                .unwrap();
        match cli.command {
            Command::Merge {
                languages, check, ..
            } => {
                assert_eq!(languages, vec!["en", "ja"]);
                assert!(check);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docbundle",
            "all",
            "--root",
            "site",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("site"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    fn project() -> (tempfile::TempDir, AppConfig) {
        let tmp = tempfile::TempDir::new().unwrap();
        (tmp, AppConfig::default())
    }

    fn write_file(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn expand_without_index_fails() {
        let (tmp, app) = project();
        let result = cmd_expand(&app, tmp.path(), None, None, OutputMode::Write, true);
        assert!(result.is_err());
        assert!(!tmp.path().join("llms-full.txt").exists());
    }

    #[test]
    fn expand_with_skipped_entries_succeeds() {
        let (tmp, app) = project();
        write_file(
            &tmp.path().join("llms.txt"),
            "# Docs\n\n## Getting Started\n\n- [Missing](/manuals/1.0/en/missing.md)\n",
        );

        cmd_expand(&app, tmp.path(), None, None, OutputMode::Write, true).unwrap();
        let out = std::fs::read_to_string(tmp.path().join("llms-full.txt")).unwrap();
        assert!(out.contains("- [Missing](#missing): "));
    }

    #[test]
    fn merge_without_source_dir_fails() {
        let (tmp, app) = project();
        let result = cmd_merge(&app, tmp.path(), &["en".to_string()], OutputMode::Write, true);
        assert!(result.is_err());
    }

    #[test]
    fn merge_with_missing_pages_succeeds() {
        let (tmp, mut app) = project();
        app.merge.order = docbundle_shared::OrderStrategy::Literal;
        app.merge.pages = vec!["Overview.md".into(), "Missing.md".into()];
        write_file(&tmp.path().join("manuals/1.0/en/Overview.md"), "Overview body");

        cmd_merge(&app, tmp.path(), &["en".to_string()], OutputMode::Write, true).unwrap();
        let out = std::fs::read_to_string(tmp.path().join("manuals/1.0/en/1page.md")).unwrap();
        assert!(out.contains("Overview body"));
    }

    #[test]
    fn failing_language_does_not_stop_the_others() {
        let (tmp, app) = project();
        write_file(&tmp.path().join("manuals/1.0/ja/Scopes.md"), "スコープ");

        let result = cmd_merge(&app, tmp.path(), &[], OutputMode::Write, true);
        assert!(result.is_err());
        assert!(tmp.path().join("manuals/1.0/ja/1page.md").exists());
    }

    #[test]
    fn check_mode_fails_on_stale_output() {
        let (tmp, app) = project();
        write_file(&tmp.path().join("llms.txt"), "# Docs\n");
        assert!(cmd_expand(&app, tmp.path(), None, None, OutputMode::Check, true).is_err());

        cmd_expand(&app, tmp.path(), None, None, OutputMode::Write, true).unwrap();
        cmd_expand(&app, tmp.path(), None, None, OutputMode::Check, true).unwrap();
    }

    #[test]
    fn check_mode_flag() {
        assert_eq!(output_mode(true), OutputMode::Check);
        assert_eq!(output_mode(false), OutputMode::Write);
    }
}
