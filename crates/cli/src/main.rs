mod config;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use speech_eval_core::dataset::domain::dataset::{Dataset, PairColumns};
use speech_eval_core::dataset::infrastructure::tsv_dataset_reader::TsvDatasetReader;
use speech_eval_core::evaluation::infrastructure::threaded_pair_executor::ThreadedPairExecutor;
use speech_eval_core::evaluation::transcription_evaluator::TranscriptionEvaluator;
use speech_eval_core::intent::infrastructure::luis_intent_scorer::LuisIntentScorer;
use speech_eval_core::intent::infrastructure::tsv_scoring_reader::TsvScoringReader;
use speech_eval_core::pipeline::evaluate_transcriptions_use_case::EvaluateTranscriptionsUseCase;
use speech_eval_core::pipeline::pipeline_logger::LogPipelineLogger;
use speech_eval_core::pipeline::score_intents_use_case::{
    IntentScoring, ScoreIntentsError, ScoreIntentsUseCase,
};
use speech_eval_core::report::text_report::{print_report, VERBOSITY_ALIGNED};
use speech_eval_core::report::tsv_writer::{TsvMetricsWriter, TsvScoringWriter};
use speech_eval_core::shared::constants::{
    DEFAULT_MIN_COUNT, DEFAULT_RECOGNIZED_COLUMN, DEFAULT_REFERENCE_COLUMN, DEFAULT_VERBOSITY,
};

use crate::config::AppConfig;

/// Word error rate evaluation and intent scoring for speech datasets.
#[derive(Parser)]
#[command(name = "speech-eval")]
struct Cli {
    /// Tab-separated dataset with a header row.
    input: PathBuf,

    /// Headerless `audio<TAB>rec` file merged into the dataset on `audio`.
    #[arg(long)]
    transcriptions: Option<PathBuf>,

    /// Column holding the reference text.
    #[arg(long, default_value = DEFAULT_REFERENCE_COLUMN)]
    reference_column: String,

    /// Column holding the recognized text.
    #[arg(long, default_value = DEFAULT_RECOGNIZED_COLUMN)]
    recognized_column: String,

    /// Column holding utterance labels (default: row index).
    #[arg(long)]
    label_column: Option<String>,

    /// Cell delimiter of the input files.
    #[arg(long, default_value = "\t")]
    delimiter: char,

    /// Report detail: 0 aggregate, 1 per pair, 2 aligned text.
    #[arg(long, default_value_t = DEFAULT_VERBOSITY)]
    verbosity: u8,

    /// Only list errors seen at least this many times.
    #[arg(long, default_value_t = DEFAULT_MIN_COUNT)]
    min_count: usize,

    /// Write per-pair metrics as TSV.
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    /// Write the whole evaluation as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Worker threads for pair alignment.
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Skip the transcription evaluation.
    #[arg(long)]
    no_evaluate: bool,

    /// Score the reference text against the `intent` column.
    #[arg(long)]
    score_intents: bool,

    /// Minimum intent score (0.0-1.0); overrides the config file.
    #[arg(long)]
    threshold: Option<f64>,

    /// Write intent scoring results as TSV.
    #[arg(long)]
    scoring_out: Option<PathBuf>,

    /// Rebuild the intent reports from a scoring TSV instead of calling LUIS.
    #[arg(long, conflicts_with = "score_intents")]
    scoring_in: Option<PathBuf>,

    /// JSON config file with service settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let reader = TsvDatasetReader::with_delimiter(cli.delimiter as u8);
    let mut dataset = reader.read(&cli.input)?;
    log::info!(
        "Loaded {} rows from {}",
        dataset.len(),
        cli.input.display()
    );

    if let Some(path) = &cli.transcriptions {
        let transcriptions = reader.read_transcriptions(path)?;
        let matched = dataset.merge_transcriptions(&transcriptions)?;
        log::info!(
            "Merged {} transcriptions into {matched}/{} rows",
            transcriptions.len(),
            dataset.len()
        );
    }

    if !cli.no_evaluate {
        run_evaluation(&cli, &dataset)?;
    }
    if cli.score_intents {
        run_scoring(&cli, &dataset)?;
    }
    if let Some(path) = &cli.scoring_in {
        report_scoring_file(path)?;
    }
    Ok(())
}

fn run_evaluation(cli: &Cli, dataset: &Dataset) -> Result<(), Box<dyn std::error::Error>> {
    let evaluator = if cli.threads > 1 {
        TranscriptionEvaluator::new(Box::new(ThreadedPairExecutor::new(cli.threads)))
    } else {
        TranscriptionEvaluator::default()
    };
    let columns = PairColumns {
        reference: cli.reference_column.clone(),
        recognized: cli.recognized_column.clone(),
        label: cli.label_column.clone(),
    };

    let evaluation = EvaluateTranscriptionsUseCase::new(evaluator, columns).run(dataset)?;

    let mut out = io::stdout().lock();
    print_report(&mut out, &evaluation, cli.verbosity, cli.min_count)?;
    out.flush()?;

    if let Some(path) = &cli.metrics_out {
        TsvMetricsWriter::write_to_path(path, &evaluation)?;
        log::info!("Wrote per-pair metrics to {}", path.display());
    }
    if let Some(path) = &cli.json {
        fs::write(path, serde_json::to_string_pretty(&evaluation)?)?;
        log::info!("Wrote evaluation JSON to {}", path.display());
    }
    Ok(())
}

fn run_scoring(cli: &Cli, dataset: &Dataset) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(cli.config.as_deref())?;
    if !config.luis.is_complete() {
        return Err(
            "Intent scoring needs luis.app_id, luis.key and luis.endpoint in the config file"
                .into(),
        );
    }
    let threshold = cli.threshold.unwrap_or(config.threshold);
    check_threshold(threshold)?;

    let scorer = LuisIntentScorer::new(config.luis)?;
    let use_case = ScoreIntentsUseCase::new(
        Box::new(scorer),
        threshold,
        Duration::from_millis(config.request_interval_ms),
    )
    .with_text_column(cli.reference_column.as_str());

    let mut logger = LogPipelineLogger::default();
    let scoring = use_case.run(dataset, &mut logger)?;

    print_scoring(&scoring, &format!("threshold {threshold}"))?;

    if let Some(path) = &cli.scoring_out {
        TsvScoringWriter::write_to_path(path, &scoring.rows)?;
        log::info!("Wrote intent scoring to {}", path.display());
    }
    Ok(())
}

fn report_scoring_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rows = TsvScoringReader::default().read(path)?;
    let attempted = rows.len();
    let scoring = IntentScoring::from_rows(rows);
    let scored = scoring.scored().count();
    if scored == 0 {
        return Err(ScoreIntentsError::NothingScored { attempted }.into());
    }
    log::info!("Loaded {scored}/{attempted} scored utterances from {}", path.display());
    print_scoring(&scoring, "thresholded")
}

fn print_scoring(
    scoring: &IntentScoring,
    thresholded: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    writeln!(out)?;
    writeln!(out, "Intent classification:")?;
    write!(out, "{}", scoring.report_raw)?;
    writeln!(out)?;
    writeln!(out, "Intent classification ({thresholded}):")?;
    write!(out, "{}", scoring.report_thresholded)?;
    writeln!(out)?;
    writeln!(out, "Confusion matrix:")?;
    write!(out, "{}", scoring.confusion)?;
    out.flush()?;
    Ok(())
}

fn check_threshold(threshold: f64) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("Threshold must be between 0.0 and 1.0, got {threshold}").into());
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if let Some(path) = &cli.transcriptions {
        if !path.exists() {
            return Err(format!("Transcription file not found: {}", path.display()).into());
        }
    }
    if let Some(path) = &cli.scoring_in {
        if !path.exists() {
            return Err(format!("Scoring file not found: {}", path.display()).into());
        }
    }
    if cli.no_evaluate && !cli.score_intents && cli.scoring_in.is_none() {
        return Err(
            "Nothing to do: --no-evaluate requires --score-intents or --scoring-in".into(),
        );
    }
    if cli.no_evaluate && (cli.metrics_out.is_some() || cli.json.is_some()) {
        return Err("--metrics-out and --json cannot be used with --no-evaluate".into());
    }
    if cli.scoring_out.is_some() && !cli.score_intents {
        return Err("--scoring-out requires --score-intents".into());
    }
    if !cli.delimiter.is_ascii() || cli.delimiter == '\n' || cli.delimiter == '\r' {
        return Err(format!("Delimiter must be a single ASCII character, got {:?}", cli.delimiter).into());
    }
    if cli.verbosity > VERBOSITY_ALIGNED {
        return Err(format!(
            "Verbosity must be between 0 and {VERBOSITY_ALIGNED}, got {}",
            cli.verbosity
        )
        .into());
    }
    if cli.threads == 0 {
        return Err("Threads must be at least 1".into());
    }
    if let Some(threshold) = cli.threshold {
        check_threshold(threshold)?;
    }
    Ok(())
}
