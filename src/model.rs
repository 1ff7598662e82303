use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::cli::DuplicateRoots;

pub const OUTPUT_KEY_PREFIX: &str = "sentence_pair";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GoldLabel {
    Contradiction,
    Neutral,
    Entailment,
}

impl GoldLabel {
    pub fn from_gold_label(raw: &str) -> Self {
        match raw {
            "contradiction" => Self::Contradiction,
            "entailment" => Self::Entailment,
            _ => Self::Neutral,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Self::Contradiction => -1,
            Self::Neutral => 0,
            Self::Entailment => 1,
        }
    }
}

impl Serialize for GoldLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub sentence1: String,
    pub sentence2: String,
    pub label: GoldLabel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootMap {
    entries: Vec<(String, Vec<String>)>,
}

impl RootMap {
    pub fn new() -> Self {
        Self::default()
    }

    // A repeated lemma keeps the slot of its first occurrence.
    pub fn insert_root(&mut self, root: String, children: Vec<String>, policy: DuplicateRoots) {
        let Some(position) = self.entries.iter().position(|(key, _)| *key == root) else {
            self.entries.push((root, children));
            return;
        };

        let existing = &mut self.entries[position].1;
        match policy {
            DuplicateRoots::KeepFirst => {}
            DuplicateRoots::KeepLast => *existing = children,
            DuplicateRoots::Merge => existing.extend(children),
        }
    }

    #[cfg(test)]
    pub fn get(&self, root: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == root)
            .map(|(_, children)| children.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(root, children)| (root.as_str(), children.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootPairScore {
    pub root: f64,
    pub children: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub label: GoldLabel,
    pub relations: Vec<RootPairScore>,
}

// `None` marks an unscorable example and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDocument {
    entries: Vec<Option<AnalysisResult>>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: Option<AnalysisResult>) {
        self.entries.push(result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[Option<AnalysisResult>] {
        &self.entries
    }
}

pub fn output_key(index: usize) -> String {
    format!("{OUTPUT_KEY_PREFIX}{index}")
}

impl Serialize for OutputDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (index, entry) in self.entries.iter().enumerate() {
            map.serialize_entry(&output_key(index), entry)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertCounts {
    pub examples: usize,
    pub scored: usize,
    pub unscorable: usize,
    pub root_pairs: usize,
    pub children_scored: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub input_path: String,
    pub input_sha256: String,
    pub output_path: String,
    pub parses_path: String,
    pub vectors_path: String,
    pub vectors_format: String,
    pub vocab_size: usize,
    pub duplicate_roots: String,
    pub root_miss: String,
    pub pronouns: String,
    pub counts: ConvertCounts,
    pub duration_ms: u128,
}
