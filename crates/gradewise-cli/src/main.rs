//! gradewise CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gradewise",
    version,
    about = "Answer grading and OCR answer segmentation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one candidate answer against a reference answer
    Grade {
        /// Answer type: numeric, algebra, short_answer, mcq
        #[arg(long = "type")]
        answer_type: String,

        /// Reference answer
        #[arg(long)]
        correct: String,

        /// Candidate answer
        #[arg(long)]
        candidate: String,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Split recognized text into one answer per question
    Segment {
        /// Question set TOML file
        #[arg(long)]
        questions: PathBuf,

        /// Recognized text file
        #[arg(long)]
        text: PathBuf,

        /// Assign one non-blank line per question instead of reading markers
        #[arg(long)]
        by_lines: bool,
    },

    /// Segment (or read) and grade a whole submission
    Mark {
        /// Question set TOML file
        #[arg(long)]
        questions: PathBuf,

        /// Recognized text file to segment
        #[arg(long, conflicts_with = "answers", required_unless_present = "answers")]
        text: Option<PathBuf>,

        /// Typed answers file, one answer per line
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: table, json, all
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two marking reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Score change that counts as a regression or improvement
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Summarize saved marking reports across submissions
    Summary {
        /// Report JSON file or directory of reports
        #[arg(long)]
        reports: PathBuf,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Validate question set TOML files
    Validate {
        /// Path to question set file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// Create starter config and example question set
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradewise=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            answer_type,
            correct,
            candidate,
            json,
            config,
        } => commands::grade::execute(answer_type, correct, candidate, json, config),
        Commands::Segment {
            questions,
            text,
            by_lines,
        } => commands::segment::execute(questions, text, by_lines),
        Commands::Mark {
            questions,
            text,
            answers,
            output,
            format,
            config,
        } => commands::mark::execute(questions, text, answers, output, format, config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Summary { reports, format } => commands::summary::execute(reports, format),
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
