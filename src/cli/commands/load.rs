//! Load command - bind URLs to display slots and report what they show

use crate::cache::{CacheStats, MemoryCache};
use crate::cli::args::{LoadArgs, OutputFormat};
use crate::config::Config;
use crate::dispatch::ui_queue;
use crate::error::LogoResult;
use crate::loader::{ImageLoader, LoadOutcome, LoaderStats};
use crate::target::ImageSlot;
use crate::ui::{self, LoadProgress, Status, UiContext};
use serde::Serialize;
use std::sync::Arc;

/// Final state of one display slot after a round
#[derive(Debug, Serialize)]
struct SlotReport {
    slot: String,
    url: String,
    outcome: &'static str,
    showing: &'static str,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RoundReport {
    round: u32,
    slots: Vec<SlotReport>,
}

#[derive(Debug, Serialize)]
struct LoadReport {
    rounds: Vec<RoundReport>,
    loader: LoaderStats,
    cache: CacheStats,
}

/// Execute the load command
pub async fn execute(args: LoadArgs, config: &Config) -> LogoResult<()> {
    let ctx = match args.format {
        OutputFormat::Json => UiContext::non_interactive(),
        OutputFormat::Table => UiContext::detect(),
    };

    let cache = Arc::new(MemoryCache::new());
    let (dispatcher, mut queue) = ui_queue();
    let loader = ImageLoader::from_config(config, cache.clone(), Arc::new(dispatcher))?;

    let slots: Vec<Arc<ImageSlot>> = (1..=args.urls.len())
        .map(|i| Arc::new(ImageSlot::new(format!("slot-{}", i))))
        .collect();

    let mut rounds = Vec::with_capacity(args.repeat as usize);
    for round in 1..=args.repeat {
        let progress = LoadProgress::new(&ctx, &format!("Round {}", round), slots.len());

        let handles: Vec<_> = slots
            .iter()
            .zip(&args.urls)
            .map(|(slot, url)| match args.placeholder.as_deref() {
                Some(name) => loader.load_image_with_placeholder(slot, url, name),
                None => loader.load_image(slot, url),
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let url = handle.url().to_string();
            outcomes.push(handle.wait().await);
            progress.finished(&url);
        }
        progress.finish();

        // Every fetch task has handed its result to the queue by now
        queue.run_pending();

        let reports = slots
            .iter()
            .zip(&args.urls)
            .zip(outcomes)
            .map(|((slot, url), outcome)| slot_report(slot, url, outcome))
            .collect();
        rounds.push(RoundReport {
            round,
            slots: reports,
        });
    }

    let report = LoadReport {
        rounds,
        loader: loader.stats(),
        cache: cache.stats(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&ctx, &report),
    }

    Ok(())
}

fn slot_report(slot: &ImageSlot, url: &str, outcome: LoadOutcome) -> SlotReport {
    let current = slot.current();
    let showing = match &current {
        Some(shown) if !shown.is_placeholder() => "image",
        _ => "placeholder",
    };
    let (width, height) = current
        .as_ref()
        .map_or((0, 0), |s| (s.image().width(), s.image().height()));
    let (error_kind, error) = match &outcome {
        LoadOutcome::Failed(e) => (Some(e.kind()), Some(e.to_string())),
        _ => (None, None),
    };

    SlotReport {
        slot: slot.label().to_string(),
        url: url.to_string(),
        outcome: outcome.label(),
        showing,
        width,
        height,
        error_kind,
        error,
    }
}

fn print_table(ctx: &UiContext, report: &LoadReport) {
    ui::intro(ctx, "Logo loads");

    let multi_round = report.rounds.len() > 1;
    for round in &report.rounds {
        if multi_round {
            ui::key_value(ctx, "round", &round.round.to_string());
        }
        for slot in &round.slots {
            let line = format!(
                "{} {} {}x{} ({})",
                slot.slot, slot.url, slot.width, slot.height, slot.outcome
            );
            match (&slot.error, slot.showing) {
                (Some(error), _) => {
                    ui::step(ctx, Status::Error, &format!("{} placeholder: {}", line, error))
                }
                (None, "placeholder") => {
                    ui::step(ctx, Status::Warn, &format!("{} placeholder", line))
                }
                (None, _) => ui::step(ctx, Status::Ok, &line),
            }
        }
    }

    let stats = &report.loader;
    ui::key_value(ctx, "cache hits", &stats.cache_hits.to_string());
    ui::key_value(ctx, "cache misses", &stats.cache_misses.to_string());
    ui::key_value(ctx, "fetches", &stats.fetches.to_string());
    ui::key_value(ctx, "failures", &(stats.failures + stats.invalid_urls).to_string());
    ui::key_value(ctx, "cached images", &report.cache.entries.to_string());

    let last = report.rounds.last().map(|r| r.slots.as_slice()).unwrap_or(&[]);
    let placeholders = last.iter().filter(|s| s.showing == "placeholder").count();
    if placeholders == 0 {
        ui::outro(
            ctx,
            Status::Ok,
            &format!("All {} slots showing images", last.len()),
        );
    } else {
        ui::outro(
            ctx,
            Status::Warn,
            &format!(
                "{} of {} slots showing placeholder",
                placeholders,
                last.len()
            ),
        );
    }
}
