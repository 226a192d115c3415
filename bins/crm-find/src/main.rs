//! crm-find: fuzzy search over CRM records from the command line.
//!
//! Records are read from a JSON array. Human-readable output goes to stdout,
//! diagnostics and logs to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crm_cli::output::{colored_score, format_count, format_duration, report_error, score_bar, Status};
use crm_core::config::{Config, SearchConfig};
use crm_core::error::exit_codes;
use crm_core::validation::sanitize_input;
use crm_core::{Error, ErrorCode};
use crm_search::{
    rank_by_name, validate_threshold, Contractor, EntityKind, Fieldful, RequestDigest, Scorer,
    SearchError, SearchErrorCode, SiteObject,
};
use crm_telemetry::{metrics, TelemetryConfig, Timer};
use owo_colors::OwoColorize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "crm-find")]
#[command(about = "Fuzzy search over CRM objects, contractors and requests")]
#[command(version)]
struct Cli {
    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a query against a single text
    Score {
        /// Search query
        query: String,
        /// Text to score against
        text: String,
        /// Minimum score (defaults to search.default_threshold)
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Show every sub-score
        #[arg(long)]
        explain: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search records across their text fields
    Search {
        /// Search query
        query: String,
        /// JSON file holding an array of records
        #[arg(short, long)]
        input: PathBuf,
        /// Record kind: object, contractor or request
        #[arg(short, long, required_unless_present = "fields")]
        kind: Option<EntityKind>,
        /// Comma-separated fields to search instead of the kind's defaults
        #[arg(short, long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Minimum score (defaults to the kind's configured threshold)
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank records by name similarity
    Rank {
        /// Search query
        query: String,
        /// JSON file holding an array of records with a `name` field
        #[arg(short, long)]
        input: PathBuf,
        /// Minimum similarity (defaults to search.name_cutoff)
        #[arg(long)]
        cutoff: Option<f64>,
        /// Maximum number of results (defaults to search.name_limit)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            std::process::exit(e.exit_code());
        }
    };

    let logging = &config.schema.logging;
    crm_telemetry::init_with_config(TelemetryConfig {
        log_level: if cli.verbose { "debug".to_string() } else { logging.level.clone() },
        json: logging.json,
        show_target: logging.show_target,
    })?;

    tracing::debug!(config = config.path.as_deref().unwrap_or("defaults"), "configuration loaded");

    let search = &config.schema.search;
    let result = match cli.command {
        Commands::Score { query, text, threshold, explain, json } => {
            run_score(search, &query, &text, threshold, explain, json)
        }
        Commands::Search { query, input, kind, fields, threshold, limit, json } => {
            let request = SearchRequest { input: &input, kind, fields, threshold, limit, json };
            run_search(search, &query, request)
        }
        Commands::Rank { query, input, cutoff, limit, json } => {
            run_rank(search, &query, &input, cutoff, limit, json)
        }
    };

    if cli.verbose {
        tracing::debug!(metrics = %metrics().export_json(), "run finished");
    }

    let code = result.unwrap_or_else(|e| {
        report_error(&e);
        e.exit_code()
    });

    std::process::exit(code);
}

/// Checks a query and strips control characters.
///
/// HTML is left unescaped: the scorer compares literal text, and escaping
/// would stop `O'Brien` from matching itself.
fn clean_query(search: &SearchConfig, query: &str) -> crm_core::Result<String> {
    sanitize_input(query, Some(search.max_query_length), true)
}

/// Cleans the query; `None` means it is too short to search for.
fn prepare_query(search: &SearchConfig, query: &str) -> crm_core::Result<Option<String>> {
    let cleaned = clean_query(search, query)?;
    if cleaned.chars().count() < search.min_query_length {
        tracing::debug!(
            length = cleaned.chars().count(),
            min = search.min_query_length,
            "query too short, skipping search"
        );
        return Ok(None);
    }
    Ok(Some(cleaned))
}

fn search_error(err: SearchError) -> Error {
    let code = match err.code() {
        SearchErrorCode::InvalidThreshold => ErrorCode::InvalidThreshold,
        SearchErrorCode::UnknownEntity => ErrorCode::UnknownEntity,
    };
    Error::new(code, err.to_string())
        .with_context(format!("search error {}", err.code() as u32))
        .with_source(err)
}

fn checked_threshold(threshold: f64) -> crm_core::Result<f64> {
    validate_threshold(threshold)
        .map_err(|e| search_error(e).with_suggestion("Use a value between 0.0 and 1.0"))
}

fn load_records<T: DeserializeOwned>(path: &Path) -> crm_core::Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path)
        } else {
            Error::from(e)
        }
    })?;

    let records: Vec<T> =
        serde_json::from_str(&content).map_err(|e| Error::invalid_records(path, &e).with_source(e))?;

    tracing::debug!(path = %path.display(), records = records.len(), "records loaded");
    Ok(records)
}

fn run_score(
    search: &SearchConfig,
    query: &str,
    text: &str,
    threshold: Option<f64>,
    explain: bool,
    json: bool,
) -> crm_core::Result<i32> {
    let threshold = checked_threshold(threshold.unwrap_or(search.default_threshold))?;
    let query = clean_query(search, query)?;
    let scorer = Scorer::default().with_force_ascii(search.force_ascii);

    crm_telemetry::timed_span!("crm_find.score");
    metrics().increment("scores");
    let score = scorer.score(&query, text, threshold);
    let explanation = if explain { scorer.explain(&query, text) } else { None };

    if json {
        let output = serde_json::json!({
            "query": query,
            "text": text,
            "threshold": threshold,
            "score": score,
            "explanation": explanation,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(exit_codes::SUCCESS);
    }

    println!("{} {}", colored_score(score), score_bar(score, 20));

    if let Some(explanation) = explanation {
        if explanation.contained {
            Status::info("query is contained in the text");
        } else {
            let b = &explanation.breakdown;
            Status::header("Sub-scores");
            for (name, value) in [
                ("ratio", b.ratio),
                ("partial", b.partial),
                ("token_sort", b.token_sort),
                ("token_set", b.token_set),
                ("soundex", b.phonetic),
                ("metaphone", b.metaphone),
                ("levenshtein", b.levenshtein),
                ("sequence", b.sequence),
            ] {
                println!("  {:<12} {:>6.3} {}", name, value, score_bar(value, 20).dimmed());
            }
            println!("  {:<12} {:>6.3}", "prefix", b.prefix_bonus);
            println!("  {:<12} {:>6.3}", "words", b.word_bonus);
            println!("  {:<12} {:>6.3}", "combined".bold(), explanation.combined);
        }
    }

    Ok(exit_codes::SUCCESS)
}

struct SearchRequest<'a> {
    input: &'a Path,
    kind: Option<EntityKind>,
    fields: Option<Vec<String>>,
    threshold: Option<f64>,
    limit: Option<usize>,
    json: bool,
}

fn kind_threshold(search: &SearchConfig, kind: Option<EntityKind>) -> f64 {
    match kind {
        Some(EntityKind::Object) => search.object_threshold,
        Some(EntityKind::Contractor) => search.contractor_threshold,
        Some(EntityKind::Request) => search.request_threshold,
        None => search.default_threshold,
    }
}

fn run_search(search: &SearchConfig, query: &str, request: SearchRequest<'_>) -> crm_core::Result<i32> {
    let threshold =
        checked_threshold(request.threshold.unwrap_or_else(|| kind_threshold(search, request.kind)))?;

    let Some(query) = prepare_query(search, query)? else {
        return print_matches::<Value>(&[], request.json);
    };

    let scorer = Scorer::default().with_force_ascii(search.force_ascii);

    // Custom field lists search arbitrary JSON records
    if let Some(fields) = &request.fields {
        let records: Vec<Value> = load_records(request.input)?;
        return search_records(&scorer, &query, &records, fields, threshold, &request);
    }

    match request.kind {
        Some(kind @ EntityKind::Object) => {
            let records: Vec<SiteObject> = load_records(request.input)?;
            search_records(&scorer, &query, &records, kind.search_fields(), threshold, &request)
        }
        Some(kind @ EntityKind::Contractor) => {
            let records: Vec<Contractor> = load_records(request.input)?;
            search_records(&scorer, &query, &records, kind.search_fields(), threshold, &request)
        }
        Some(kind @ EntityKind::Request) => {
            let records: Vec<RequestDigest> = load_records(request.input)?;
            search_records(&scorer, &query, &records, kind.search_fields(), threshold, &request)
        }
        None => Err(Error::validation("Either --kind or --fields is required")),
    }
}

/// One printed search hit.
#[derive(Serialize)]
struct Match<'a, T> {
    score: f64,
    field: &'a str,
    value: String,
    record: &'a T,
}

fn search_records<T, F>(
    scorer: &Scorer,
    query: &str,
    records: &[T],
    fields: &[F],
    threshold: f64,
    request: &SearchRequest<'_>,
) -> crm_core::Result<i32>
where
    T: Fieldful + Serialize + Sync,
    F: AsRef<str> + Sync,
{
    metrics().increment("searches");
    let timer = Timer::start("crm_find.search");
    let mut results = scorer.search(query, records, fields, threshold);
    let elapsed = timer.stop();

    if let Some(limit) = request.limit {
        results.truncate(limit);
    }

    let matches: Vec<Match<'_, T>> = results
        .iter()
        .map(|r| Match {
            score: r.score,
            field: r.field,
            value: r.item.get_field(r.field).map(|v| v.into_owned()).unwrap_or_default(),
            record: r.item,
        })
        .collect();

    tracing::info!(
        query,
        records = records.len(),
        matches = matches.len(),
        elapsed = %format_duration(elapsed),
        "search finished"
    );

    print_matches(&matches, request.json)
}

fn print_matches<T: Serialize + Fieldful>(matches: &[Match<'_, T>], json: bool) -> crm_core::Result<i32> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
    } else if matches.is_empty() {
        Status::warning("No matches found");
    } else {
        for (rank, m) in matches.iter().enumerate() {
            let id = m.record.get_field("id").map(|id| format!("#{} ", id)).unwrap_or_default();
            println!(
                "{:>3}. {} {} {}{} {}",
                rank + 1,
                colored_score(m.score),
                score_bar(m.score, 10),
                id.dimmed(),
                m.value,
                format!("({})", m.field).dimmed()
            );
        }
        Status::success(&format_count(matches.len(), "match", "matches"));
    }

    Ok(if matches.is_empty() { exit_codes::NO_MATCHES } else { exit_codes::SUCCESS })
}

fn run_rank(
    search: &SearchConfig,
    query: &str,
    input: &Path,
    cutoff: Option<f64>,
    limit: Option<usize>,
    json: bool,
) -> crm_core::Result<i32> {
    let cutoff = checked_threshold(cutoff.unwrap_or(search.name_cutoff))?;
    let limit = limit.unwrap_or(search.name_limit);

    let ranked_output: Vec<Value> = match prepare_query(search, query)? {
        Some(query) => {
            crm_telemetry::timed_span!("crm_find.rank");
            let records: Vec<Value> = load_records(input)?;
            metrics().increment("ranks");
            rank_by_name(&query, &records, cutoff, limit)
                .into_iter()
                .map(|m| {
                    serde_json::json!({
                        "similarity": m.similarity,
                        "record": m.item,
                    })
                })
                .collect()
        }
        None => Vec::new(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked_output)?);
    } else if ranked_output.is_empty() {
        Status::warning("No matching names");
    } else {
        for entry in &ranked_output {
            let similarity = entry["similarity"].as_f64().unwrap_or_default();
            let name = entry["record"].get_field("name").unwrap_or_default();
            println!("{} {}", colored_score(similarity), name);
        }
        Status::success(&format_count(ranked_output.len(), "name", "names"));
    }

    Ok(if ranked_output.is_empty() { exit_codes::NO_MATCHES } else { exit_codes::SUCCESS })
}
