use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::json;
use tracing::{info, info_span};

use linkage_batch::{BatchJobRegistry, BatchMatchConfig, JobStatus};
use linkage_cli::input::{
    load_batch_config, load_matching_config, load_record, load_records, write_json,
};
use linkage_match::{
    FallbackSearch, SearchOptions, find_duplicates, find_matches_with, find_matches_with_fallback,
};
use linkage_model::{AlgorithmType, MatchingConfig};

use crate::cli::{BatchArgs, DuplicatesArgs, MatchingArgs, SearchArgs};
use crate::summary::{print_batch_summary, print_duplicate_groups, print_search};

fn matching_config(args: &MatchingArgs) -> Result<MatchingConfig> {
    let config = load_matching_config(args.config.as_deref(), args.extended)?;
    Ok(match args.algorithm {
        Some(algorithm) => config.with_algorithm(algorithm.into()),
        None => config,
    })
}

pub fn run_search(args: &SearchArgs) -> Result<()> {
    let config = matching_config(&args.matching)?;
    let source = load_record(&args.source)?;
    let pool = load_records(&args.pool)?;
    let span = info_span!("search", source_id = %source.id, pool = pool.len());
    let _guard = span.enter();

    let options = SearchOptions {
        min_score: args.min_score,
        limit: args.limit,
    };

    let search = if args.no_fallback {
        FallbackSearch {
            primary_algorithm: config.algorithm_type(),
            primary: find_matches_with(&source, &pool, &config, &options),
            fallback: None,
        }
    } else {
        find_matches_with_fallback(&source, &pool, &config, &options)
    };

    if args.json {
        let value = json!({
            "algorithm": search.primary_algorithm,
            "candidates": search.primary.candidates(),
            "emptyPool": search.primary.is_empty_pool(),
            "fallbackCandidates": search.fallback.as_ref().map(|outcome| outcome.candidates()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_search(&search);
    }
    Ok(())
}

/// Run a batch job and print its summary. Returns the final status.
pub fn run_batch(args: &BatchArgs) -> Result<JobStatus> {
    let matching = matching_config(&args.matching)?;
    let mut batch = load_batch_config(args.batch_config.as_deref())?;
    apply_overrides(&mut batch, args);
    let sources = load_records(&args.sources)?;
    let targets = load_records(&args.targets)?;
    let total = sources.len();

    let registry = BatchJobRegistry::new();
    let job_id = registry
        .create_batch_match_job(sources, targets, batch)
        .context("create batch job")?;

    let progress = ProgressBar::new(total as u64);
    if args.no_progress {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        progress.set_style(
            ProgressStyle::with_template(
                "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})",
            )?
            .progress_chars("=> "),
        );
        progress.set_message("Matching");
    }

    let started = Instant::now();
    let algorithm = matching.algorithm_type();
    let job = registry.run_batch_match_job(
        &job_id,
        &matching,
        algorithm,
        |counts| progress.set_position(counts.processed_records as u64),
        |job| progress.finish_with_message(job.status.to_string()),
    )?;
    info!(
        job_id = %job.id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch command finished"
    );

    if let Some(path) = &args.output {
        write_json(path, &job)?;
    }
    let summary = registry.generate_batch_summary(&job_id)?;
    print_batch_summary(&summary);
    Ok(job.status)
}

fn apply_overrides(batch: &mut BatchMatchConfig, args: &BatchArgs) {
    if let Some(strategy) = args.strategy {
        batch.auto_match_strategy = strategy.into();
    }
    if let Some(batch_size) = args.batch_size {
        batch.batch_size = batch_size;
    }
}

pub fn run_duplicates(args: &DuplicatesArgs) -> Result<()> {
    let config = matching_config(&args.matching)?;
    let pool = load_records(&args.pool)?;
    let groups = find_duplicates(&pool, &config, args.threshold);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        print_duplicate_groups(&groups);
    }
    Ok(())
}

pub fn run_presets() -> Result<()> {
    let value = json!({
        "standard": MatchingConfig::default(),
        "extended": MatchingConfig::extended(),
        "probabilistic": MatchingConfig::default().with_algorithm(AlgorithmType::Probabilistic),
        "batch": BatchMatchConfig::default(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
