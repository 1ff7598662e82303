use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Instant;

use chrono::Utc;

use super::*;
use crate::cli::ConvertArgs;
use crate::model::{ConvertRunManifest, OutputDocument};
use crate::parse::ConlluParses;
use crate::semantic::load_word_vectors;
use crate::util::{
    now_utc_string, sha256_file, utc_compact_string, write_json_compact, write_json_pretty,
};

const PROGRESS_INTERVAL: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub(super) struct ConvertOptions {
    pub duplicate_roots: DuplicateRoots,
    pub root_miss: RootMissPolicy,
    pub pronouns: PronounRule,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let started = Instant::now();
    let run_id = format!("convert-{}", utc_compact_string(started_ts));

    info!(
        run_id = %run_id,
        input = %args.input.display(),
        output = %args.output.display(),
        "starting convert"
    );

    let vectors = load_word_vectors(
        &args.vectors.vectors,
        args.vectors.vectors_format,
        args.vectors.vocab_limit,
    )?;
    let parses = ConlluParses::load(&args.parses)?;

    let options = ConvertOptions {
        duplicate_roots: args.duplicate_roots,
        root_miss: args.root_miss,
        pronouns: args.pronouns,
    };

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open corpus: {}", args.input.display()))?;
    let (document, counts) = convert_corpus(BufReader::new(input), &parses, &vectors, options)
        .with_context(|| format!("failed to convert corpus: {}", args.input.display()))?;

    if args.pretty {
        write_json_pretty(&args.output, &document)?;
    } else {
        write_json_compact(&args.output, &document)?;
    }
    info!(
        path = %args.output.display(),
        entries = document.len(),
        "wrote similarity features"
    );

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = ConvertRunManifest {
            manifest_version: 1,
            run_id,
            started_at,
            completed_at: now_utc_string(),
            input_path: args.input.display().to_string(),
            input_sha256: sha256_file(&args.input)?,
            output_path: args.output.display().to_string(),
            parses_path: args.parses.display().to_string(),
            vectors_path: args.vectors.vectors.display().to_string(),
            vectors_format: args.vectors.vectors_format.as_str().to_string(),
            vocab_size: vectors.len(),
            duplicate_roots: options.duplicate_roots.as_str().to_string(),
            root_miss: options.root_miss.as_str().to_string(),
            pronouns: options.pronouns.as_str().to_string(),
            counts: counts.clone(),
            duration_ms: started.elapsed().as_millis(),
        };
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote run manifest");
    }

    info!(
        examples = counts.examples,
        scored = counts.scored,
        unscorable = counts.unscorable,
        root_pairs = counts.root_pairs,
        duration_ms = started.elapsed().as_millis() as u64,
        "convert completed"
    );

    Ok(())
}

pub(super) fn convert_corpus<R, P, O>(
    reader: R,
    parser: &P,
    oracle: &O,
    options: ConvertOptions,
) -> Result<(OutputDocument, ConvertCounts)>
where
    R: BufRead,
    P: DependencyParser,
    O: SimilarityOracle,
{
    let mut document = OutputDocument::new();
    let mut counts = ConvertCounts::default();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("failed to read line {line_number}"))?;

        let example = parse_example(&line)
            .with_context(|| format!("malformed example on line {line_number}"))?;
        let result = analyse_example(&example, parser, oracle, options)
            .with_context(|| format!("failed to analyse example on line {line_number}"))?;

        match &result {
            Some(analysis) => {
                counts.scored += 1;
                counts.root_pairs += analysis.relations.len();
                counts.children_scored += analysis
                    .relations
                    .iter()
                    .map(|relation| relation.children.len())
                    .sum::<usize>();
            }
            None => counts.unscorable += 1,
        }
        counts.examples += 1;
        document.push(result);

        if counts.examples % PROGRESS_INTERVAL == 0 {
            info!(
                examples = counts.examples,
                unscorable = counts.unscorable,
                "convert progress"
            );
        }
    }

    Ok((document, counts))
}

fn analyse_example<P, O>(
    example: &Example,
    parser: &P,
    oracle: &O,
    options: ConvertOptions,
) -> Result<Option<AnalysisResult>>
where
    P: DependencyParser,
    O: SimilarityOracle,
{
    let first = extract_sentence(
        parser,
        &example.sentence1,
        options.duplicate_roots,
        options.pronouns,
    )?;
    let second = extract_sentence(
        parser,
        &example.sentence2,
        options.duplicate_roots,
        options.pronouns,
    )?;
    if first.is_empty() || second.is_empty() {
        debug!("sentence without a root, no relations");
    }

    match score_root_maps(&first, &second, oracle, options.root_miss) {
        Ok(relations) => Ok(Some(AnalysisResult {
            label: example.label,
            relations,
        })),
        Err(miss) => {
            debug!(word = %miss.word, "example unscorable");
            Ok(None)
        }
    }
}
