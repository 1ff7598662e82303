use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use crate::cli::SimilarityArgs;
use crate::semantic::{SimilarityOracle, load_word_vectors};

#[derive(Debug, Serialize, PartialEq)]
struct PairSimilarity {
    first: String,
    second: String,
    similarity: Option<f64>,
    missing_word: Option<String>,
}

pub fn run(args: SimilarityArgs) -> Result<()> {
    let pairs = args
        .pairs
        .iter()
        .map(|raw| parse_pair(raw.as_str()))
        .collect::<Result<Vec<(String, String)>>>()?;

    let vectors = load_word_vectors(
        &args.vectors.vectors,
        args.vectors.vectors_format,
        args.vectors.vocab_limit,
    )?;

    let results = pairs
        .into_iter()
        .map(|(first, second)| score_pair(&vectors, first, second))
        .collect::<Vec<PairSimilarity>>();

    info!(pairs = results.len(), "similarity lookup completed");

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &results)
            .context("failed to serialize similarity json output")?;
        writeln!(output)?;
    } else {
        for result in &results {
            match (&result.similarity, &result.missing_word) {
                (Some(score), _) => {
                    writeln!(output, "{}\t{}\t{score:.6}", result.first, result.second)?
                }
                (None, Some(word)) => writeln!(
                    output,
                    "{}\t{}\tmissing: {word}",
                    result.first, result.second
                )?,
                (None, None) => writeln!(output, "{}\t{}\t-", result.first, result.second)?,
            }
        }
    }
    output.flush()?;

    Ok(())
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (first, second) = raw
        .split_once(',')
        .with_context(|| format!("word pair must look like `first,second`: {raw}"))?;
    let first = first.trim();
    let second = second.trim();
    if first.is_empty() || second.is_empty() {
        bail!("word pair has an empty side: {raw}");
    }
    Ok((first.to_string(), second.to_string()))
}

fn score_pair<O: SimilarityOracle>(oracle: &O, first: String, second: String) -> PairSimilarity {
    match oracle.similarity(&first, &second) {
        Ok(score) => PairSimilarity {
            first,
            second,
            similarity: Some(score),
            missing_word: None,
        },
        Err(miss) => PairSimilarity {
            first,
            second,
            similarity: None,
            missing_word: Some(miss.word),
        },
    }
}
