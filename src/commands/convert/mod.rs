use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{DuplicateRoots, PronounRule, RootMissPolicy};
use crate::model::{AnalysisResult, ConvertCounts, Example, GoldLabel, RootMap, RootPairScore};
use crate::parse::{DependencyParser, ParsedSentence, PRONOUN_LEMMA, Token};
use crate::semantic::{LookupMiss, SimilarityOracle};

mod extract;
mod loader;
mod run;
mod score;

pub use run::run;

use extract::*;
use loader::*;
use score::*;
