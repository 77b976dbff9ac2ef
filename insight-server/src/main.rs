use std::env;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use insight_pipeline::{
    load_comments_file, Insight, InsightPipeline, InsightQuery, PipelineOutcome, PipelineStats,
    UserProfileManager,
};

mod heuristics;
use heuristics::LexiconFeatureExtractor;

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestJson {
    generated_at: String,
    product_id: String,
    pipeline_ms: u128,
    insights: Vec<Insight>,
    stats: PipelineStats,
    summary: SummaryJson,
}

#[derive(Serialize)]
struct SummaryJson {
    total_insights: usize,
    comments_collected: usize,
    comments_filtered_out: usize,
    average_score: f64,
}

fn build_json(outcome: &PipelineOutcome, product_id: &str, pipeline_ms: u128) -> DigestJson {
    let total = outcome.insights.len();
    let average_score = if total == 0 {
        0.0
    } else {
        outcome.insights.iter().map(|i| i.score).sum::<f64>() / total as f64
    };

    DigestJson {
        generated_at: Utc::now().to_rfc3339(),
        product_id: product_id.to_string(),
        pipeline_ms,
        insights: outcome.insights.clone(),
        stats: outcome.stats.clone(),
        summary: SummaryJson {
            total_insights: total,
            comments_collected: outcome.stats.original_count,
            comments_filtered_out: outcome.stats.original_count - outcome.stats.processed_count,
            average_score,
        },
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{}...", cut)
}

fn print_human(outcome: &PipelineOutcome, product_id: &str, pipeline_ms: u128) {
    println!();
    println!("  ================================================================");
    println!("            COMMENT INSIGHTS — product {}", product_id);
    println!("  ================================================================");
    println!();

    let stats = &outcome.stats;
    println!(
        "  {} comments collected  ·  {} passed pre-filter  ·  {} ranked",
        stats.original_count, stats.filtered_count, stats.processed_count
    );
    println!();

    if outcome.insights.is_empty() {
        println!("  No insights extracted from this batch.");
    } else {
        for insight in &outcome.insights {
            println!(
                "  {}. [{:>7.2}] {} — {}",
                insight.rank,
                insight.score,
                insight.author,
                truncate_content(&insight.content, 48)
            );
            println!("       {}", insight.reason);
            println!(
                "       purchase {:.2} · viral {:.2}",
                insight.features.purchase, insight.features.viral
            );
            println!();
        }
    }

    println!("  Pipeline ran in {}ms", pipeline_ms);
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn usage() -> ! {
    eprintln!(
        "Usage: insight-server <comments.json> [--product ID] [--top N] [--multi-diversity] [--json]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --product          Product id used for profile learning (default: default)");
    eprintln!("  --top              Number of insights to return (default: 5)");
    eprintln!("  --multi-diversity  Use author x topic x sentiment diversity decay");
    eprintln!("  --json             Output as JSON instead of formatted text");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  insight-server fixtures/sample_comments.json");
    eprintln!("  insight-server fixtures/sample_comments.json --product shampoo-01 --top 3 --json");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let comments_path = &args[1];

    let mut product_id = "default".to_string();
    let mut top_k: usize = 5;
    let mut multi_diversity = false;
    let mut json_output = false;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--product" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --product requires a product id");
                    process::exit(1);
                }
                product_id = args[i + 1].clone();
                i += 2;
            }
            "--top" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --top requires a number");
                    process::exit(1);
                }
                top_k = args[i + 1].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --top requires a positive integer");
                    process::exit(1);
                });
                i += 2;
            }
            "--multi-diversity" => {
                multi_diversity = true;
                i += 1;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
            }
        }
    }

    let comments = match load_comments_file(comments_path) {
        Ok(comments) => comments,
        Err(e) => {
            eprintln!("Error loading comments: {}", e);
            process::exit(1);
        }
    };

    let profiles = Arc::new(UserProfileManager::new());
    let mut builder = InsightPipeline::builder(Arc::new(LexiconFeatureExtractor))
        .with_comments(comments)
        .with_profiles(Arc::clone(&profiles))
        .with_top_k(top_k);
    if multi_diversity {
        builder = builder.with_multi_diversity();
    }
    let pipeline = builder.build();

    let query = InsightQuery {
        top_k,
        ..InsightQuery::new("digest-001", product_id.clone())
    };

    let pipeline_start = Instant::now();
    // Any stage failure means "insight extraction unavailable for this
    // batch": fall back to an empty digest rather than crash.
    let outcome = match pipeline.run(&query).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("insight extraction unavailable: {}", e);
            PipelineOutcome {
                insights: Vec::new(),
                stats: PipelineStats::default(),
            }
        }
    };
    pipeline.flush_side_effects().await;
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    if json_output {
        let digest = build_json(&outcome, &product_id, pipeline_ms);
        match serde_json::to_string_pretty(&digest) {
            Ok(payload) => println!("{}", payload),
            Err(e) => {
                eprintln!("Error serializing digest: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_human(&outcome, &product_id, pipeline_ms);
    }
}
