use std::io::{BufWriter, Write as _};

use anyhow::{Context, anyhow};
use corpus_utils::{CorpusSnapshot, InMemoryCorpus, Node};
use indicatif::{ProgressBar, ProgressStyle};
use review_sampler::ReviewSampler;
use syntax_tagger::batch::{BatchSummary, Classified, classify_batch, positives};
use syntax_tagger::{ClassifierKind, Tagger, TaggerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let config = TaggerConfig::from_env().context("Invalid environment configuration")?;
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    let command = &args[1];

    match command.as_str() {
        "tag" => {
            let [_, _, snapshot, kind] = args.as_slice() else {
                eprintln!("Usage: syntax-tagger tag <snapshot.json> <classifier>");
                return Err(anyhow!("Wrong arguments for 'tag' command"));
            };
            let corpus = load_corpus(snapshot)?;
            let kind = parse_kind(kind)?;

            let results = run_batch(&corpus, kind, &config);

            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            for result in &results {
                let json = serde_json::to_string(result)?;
                writeln!(writer, "{json}")?;
            }
            writer.flush()?;
        }
        "summary" => {
            let [_, _, snapshot] = args.as_slice() else {
                eprintln!("Usage: syntax-tagger summary <snapshot.json>");
                return Err(anyhow!("Wrong arguments for 'summary' command"));
            };
            let corpus = load_corpus(snapshot)?;

            for kind in ClassifierKind::ALL {
                let results = run_batch(&corpus, kind, &config);
                println!("{kind}: {}", BatchSummary::from_results(&results));
            }
        }
        "explain" => {
            let [_, _, snapshot, kind, position] = args.as_slice() else {
                eprintln!("Usage: syntax-tagger explain <snapshot.json> <classifier> <word>");
                return Err(anyhow!("Wrong arguments for 'explain' command"));
            };
            let corpus = load_corpus(snapshot)?;
            let kind = parse_kind(kind)?;
            let position: u32 = position
                .parse()
                .context("Failed to parse word position as a number")?;

            let word = Node::word(position);
            let failures = Tagger::new(&corpus)
                .explain(kind, word)
                .with_context(|| format!("Cannot classify {word} as {kind}"))?;

            if failures.is_empty() {
                println!("{word} is a {kind}");
            } else {
                println!("{word} is not a {kind}:");
                for failure in failures {
                    println!("  {failure}");
                }
            }
        }
        "review" => {
            let [_, _, snapshot, kind] = args.as_slice() else {
                eprintln!("Usage: syntax-tagger review <snapshot.json> <classifier>");
                return Err(anyhow!("Wrong arguments for 'review' command"));
            };
            let corpus = load_corpus(snapshot)?;
            let kind = parse_kind(kind)?;

            let results = run_batch(&corpus, kind, &config);
            let (sample, stats) = ReviewSampler::new(config.review_sample)
                .sample_with_stats(positives(&results), |node| node.index);

            println!(
                "Sampled {} of {} {kind} positives for review:",
                stats.kept, stats.population
            );
            for node in sample {
                println!("  {node}");
            }
        }
        "schema" => {
            let schema = schemars::schema_for!(CorpusSnapshot);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        _ => {
            eprintln!("Error: Unknown command '{command}'");
            print_usage();
            return Err(anyhow!("Unknown command"));
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: syntax-tagger <command> [args...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tag <snapshot> <classifier>             Classify every word, one JSON line each");
    eprintln!("  summary <snapshot>                      Count results for every classifier");
    eprintln!("  explain <snapshot> <classifier> <word>  Show which rules a word fails");
    eprintln!("  review <snapshot> <classifier>          Sample positives for manual review");
    eprintln!("  schema                                  Print the JSON schema of a snapshot");
    eprintln!();
    eprintln!("Classifiers:");
    for kind in ClassifierKind::ALL {
        eprintln!("  {kind}");
    }
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SYNTAX_TAGGER_THREADS        Worker threads (default: one per core)");
    eprintln!("  SYNTAX_TAGGER_REVIEW_SAMPLE  Positives to sample for review (default: 40)");
    eprintln!("  SYNTAX_TAGGER_PROGRESS       Set to 0 to hide the progress bar");
    eprintln!("  RUST_LOG                     Log level, e.g. RUST_LOG=warn");
}

fn load_corpus(path: &str) -> anyhow::Result<InMemoryCorpus> {
    let corpus = InMemoryCorpus::load(path)
        .with_context(|| format!("Failed to load corpus snapshot: {path}"))?;
    log::info!("Loaded {} words from {path}", corpus.word_count());
    Ok(corpus)
}

fn parse_kind(name: &str) -> anyhow::Result<ClassifierKind> {
    name.parse()
        .map_err(|_| anyhow!("Unknown classifier '{name}'"))
}

fn run_batch(
    corpus: &InMemoryCorpus,
    kind: ClassifierKind,
    config: &TaggerConfig,
) -> Vec<Classified> {
    let words: Vec<Node> = corpus.words().collect();

    let progress = if config.progress {
        let pb = ProgressBar::new(words.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words ({per_sec}, {eta})",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let results = classify_batch(corpus, kind, &words, Some(&progress));
    progress.finish_and_clear();
    results
}
