use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::{info, warn};

use crate::cli::PronounRule;

pub const PRONOUN_LEMMA: &str = "-PRON-";

const ROOT_DEPREL: &str = "root";
const PRONOUN_UPOS: &str = "PRON";

pub trait DependencyParser {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: usize,
    pub text: String,
    pub lemma: String,
    pub upos: String,
    pub head: usize,
    pub deprel: String,
}

impl Token {
    pub fn is_root(&self) -> bool {
        self.deprel.eq_ignore_ascii_case(ROOT_DEPREL)
    }

    pub fn is_pronoun(&self, rule: PronounRule) -> bool {
        match rule {
            PronounRule::Lemma => self.lemma == PRONOUN_LEMMA,
            PronounRule::LemmaOrUpos => self.lemma == PRONOUN_LEMMA || self.upos == PRONOUN_UPOS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSentence {
    pub tokens: Vec<Token>,
}

impl ParsedSentence {
    pub fn roots(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| token.is_root())
    }

    pub fn children<'a>(&'a self, token: &'a Token) -> impl Iterator<Item = &'a Token> {
        self.tokens
            .iter()
            .filter(move |candidate| candidate.head == token.id && candidate.id != token.id)
    }

    fn surface_text(&self) -> String {
        self.tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<&str>>()
            .join(" ")
    }
}

// Pre-parsed CoNLL-U, keyed by sentence text.
#[derive(Debug, Clone, Default)]
pub struct ConlluParses {
    sentences: HashMap<String, ParsedSentence>,
    duplicates: usize,
}

impl ConlluParses {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open parses: {}", path.display()))?;
        let parses = Self::read(BufReader::new(file))
            .with_context(|| format!("failed to load parses: {}", path.display()))?;

        if parses.is_empty() {
            warn!(path = %path.display(), "parse file has no sentences");
        }

        info!(
            path = %path.display(),
            sentences = parses.len(),
            duplicates_ignored = parses.duplicates,
            "loaded dependency parses"
        );
        Ok(parses)
    }

    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let text_pattern =
            Regex::new(r"^#\s*text\s*=\s?(.*)$").context("failed to compile text comment regex")?;

        let mut parses = Self::default();
        let mut text: Option<String> = None;
        let mut tokens = Vec::<Token>::new();

        for (line_index, line) in reader.lines().enumerate() {
            let line_number = line_index + 1;
            let line = line.with_context(|| format!("failed to read line {line_number}"))?;
            let line = line.trim_end_matches(['\r', '\n']);

            if line.trim().is_empty() {
                parses.finish_block(text.take(), std::mem::take(&mut tokens));
                continue;
            }

            if line.starts_with('#') {
                if let Some(captures) = text_pattern.captures(line) {
                    text = captures.get(1).map(|value| value.as_str().trim().to_string());
                }
                continue;
            }

            if let Some(token) = parse_token_line(line)
                .with_context(|| format!("malformed CoNLL-U token on line {line_number}"))?
            {
                tokens.push(token);
            }
        }
        parses.finish_block(text, tokens);

        Ok(parses)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    fn finish_block(&mut self, text: Option<String>, tokens: Vec<Token>) {
        if tokens.is_empty() {
            return;
        }

        let sentence = ParsedSentence { tokens };
        let key = text.unwrap_or_else(|| sentence.surface_text());
        if self.sentences.contains_key(&key) {
            self.duplicates += 1;
            return;
        }
        self.sentences.insert(key, sentence);
    }
}

impl DependencyParser for ConlluParses {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence> {
        self.sentences
            .get(sentence.trim())
            .cloned()
            .with_context(|| format!("no dependency parse for sentence: {sentence:?}"))
    }
}

// Multiword ranges (`3-4`) and empty nodes (`5.1`) yield `None`.
fn parse_token_line(line: &str) -> Result<Option<Token>> {
    let columns = line.split('\t').collect::<Vec<&str>>();
    if columns.len() != 10 {
        bail!("expected 10 tab-separated columns, found {}", columns.len());
    }

    let raw_id = columns[0];
    if raw_id.contains('-') || raw_id.contains('.') {
        return Ok(None);
    }

    let id = raw_id
        .parse::<usize>()
        .with_context(|| format!("invalid token id: {raw_id}"))?;
    let head = columns[6]
        .parse::<usize>()
        .with_context(|| format!("invalid head: {}", columns[6]))?;

    Ok(Some(Token {
        id,
        text: columns[1].to_string(),
        lemma: columns[2].to_string(),
        upos: columns[3].to_string(),
        head,
        deprel: columns[7].to_string(),
    }))
}
