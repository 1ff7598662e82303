use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "nli-rootsim",
    version,
    about = "Root and dependent similarity features for sentence-pair entailment corpora"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Convert(ConvertArgs),
    Similarity(SimilarityArgs),
}

#[derive(Args, Debug, Clone)]
pub struct VectorArgs {
    #[arg(long, default_value = "GoogleNews-vectors-negative300.bin")]
    pub vectors: PathBuf,

    #[arg(long, value_enum, default_value_t = VectorFormat::Binary)]
    pub vectors_format: VectorFormat,

    #[arg(long, default_value_t = 100_000)]
    pub vocab_limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(long, default_value = "multinli_1.0_train.jsonl")]
    pub input: PathBuf,

    #[arg(long, default_value = "root-children.json")]
    pub output: PathBuf,

    #[arg(long, default_value = "multinli_1.0_train.conllu")]
    pub parses: PathBuf,

    #[command(flatten)]
    pub vectors: VectorArgs,

    #[arg(long, value_enum, default_value_t = DuplicateRoots::Merge)]
    pub duplicate_roots: DuplicateRoots,

    #[arg(long, value_enum, default_value_t = RootMissPolicy::AbortExample)]
    pub root_miss: RootMissPolicy,

    #[arg(long, value_enum, default_value_t = PronounRule::Lemma)]
    pub pronouns: PronounRule,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SimilarityArgs {
    #[command(flatten)]
    pub vectors: VectorArgs,

    /// Word pair as `first,second`; repeat for several pairs.
    #[arg(long = "pair", required = true)]
    pub pairs: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum VectorFormat {
    Binary,
    Text,
}

impl VectorFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Text => "text",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DuplicateRoots {
    KeepFirst,
    KeepLast,
    Merge,
}

impl DuplicateRoots {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepFirst => "keep-first",
            Self::KeepLast => "keep-last",
            Self::Merge => "merge",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PronounRule {
    /// Lemma is `-PRON-`.
    Lemma,
    /// Lemma is `-PRON-` or UPOS is `PRON`.
    LemmaOrUpos,
}

impl PronounRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lemma => "lemma",
            Self::LemmaOrUpos => "lemma-or-upos",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RootMissPolicy {
    /// The whole example becomes `null`.
    AbortExample,
    /// Only the offending root pair is dropped.
    SkipPair,
}

impl RootMissPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AbortExample => "abort-example",
            Self::SkipPair => "skip-pair",
        }
    }
}
