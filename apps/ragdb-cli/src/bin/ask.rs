use std::env;

use ragdb_core::config::{expand_path, Config};
use ragdb_core::Chunker;
use ragdb_embed::default_provider;
use ragdb_index::{RetrievalIndex, DEFAULT_RESULT_LIMIT, DEFAULT_SIMILARITY_THRESHOLD};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <question> [--limit N] [--threshold T] [db_path] [table_name]",
            args[0]
        );
        eprintln!(
            "Example: {} 'how does compound interest work' --limit 5 ./data/lancedb snippets",
            args[0]
        );
        std::process::exit(1);
    }
    let question = &args[1];

    let config = Config::load()?;
    let mut limit: usize = config.get_or("query.limit", DEFAULT_RESULT_LIMIT);
    let mut threshold: f32 = config.get_or("query.threshold", DEFAULT_SIMILARITY_THRESHOLD);
    let mut db_path = expand_path(config.get_or("vector.db_path", "./data/lancedb".to_string()));
    let mut table_name = config.get_or("vector.table", "snippets".to_string());

    let mut positional = 0usize;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                i += 1;
                limit = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("Error: --limit requires a number");
                        std::process::exit(1);
                    });
            }
            "--threshold" => {
                i += 1;
                threshold = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("Error: --threshold requires a number");
                        std::process::exit(1);
                    });
            }
            other if !other.starts_with('-') => {
                if positional == 0 {
                    db_path = expand_path(other);
                } else {
                    table_name = other.to_string();
                }
                positional += 1;
            }
            _ => {}
        }
        i += 1;
    }

    println!("ragdb-ask");
    println!("=========");
    println!("Question:  {question}");
    println!("Database:  {}", db_path.display());
    println!("Table:     {table_name}");
    println!("Threshold: {threshold}  Limit: {limit}");

    let provider = default_provider()?;
    let index = RetrievalIndex::open(&db_path, &table_name, Chunker::default(), provider).await?;
    let snippets = index.query_with(question, threshold, limit).await?;

    if snippets.is_empty() {
        println!("\nNo relevant information found.");
        return Ok(());
    }
    println!("\nFound {} snippets:", snippets.len());
    for (i, snippet) in snippets.iter().enumerate() {
        println!("\n  {}. similarity={:.4}", i + 1, snippet.similarity);
        println!("     {}", snippet.content);
    }
    Ok(())
}
