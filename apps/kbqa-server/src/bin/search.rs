use clap::Parser;

use kbqa_core::config::Config;
use kbqa_server::chat::{ChatOutcome, NO_RELEVANT_INFO};
use kbqa_server::telemetry::init_tracing;
use kbqa_server::ServiceContext;

/// Query the knowledge base from the terminal using the server's config.
#[derive(Debug, Parser)]
#[command(name = "kbqa-search")]
struct Args {
    query: String,

    #[arg(long)]
    top_k: Option<usize>,

    /// Key for the hosted services; falls back to the configured one.
    #[arg(long, env = "KBQA_API_KEY")]
    api_key: Option<String>,

    /// Also generate an answer grounded in the retrieved chunks.
    #[arg(long)]
    answer: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = Config::load()?.settings()?;
    let ctx = ServiceContext::from_settings(&settings, &std::env::current_dir()?).await?;
    let top_k = args.top_k.unwrap_or(ctx.default_top_k);
    let api_key = args.api_key.as_deref();

    let results = ctx.search(&args.query, top_k, api_key).await?;
    println!("Found {} results for: \"{}\"", results.len(), args.query);
    for (i, r) in results.iter().enumerate() {
        println!("\n  {}. distance={:.4}  index={}", i + 1, r.distance, r.index);
        println!("     {}", r.chunk);
    }

    if args.answer {
        match ctx.chat(&args.query, top_k, api_key).await? {
            ChatOutcome::Answered { answer, chunks_used } => println!("\nAnswer ({chunks_used} chunks):\n{answer}"),
            ChatOutcome::NoGrounding => println!("\n{NO_RELEVANT_INFO}"),
        }
    }
    Ok(())
}
