use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::VectorFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("word not in vocabulary: '{word}'")]
pub struct LookupMiss {
    pub word: String,
}

pub trait SimilarityOracle {
    fn similarity(&self, first: &str, second: &str) -> Result<f64, LookupMiss>;
}

#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    dimensions: usize,
    index: HashMap<String, usize>,
    vectors: Vec<Vec<f32>>,
}

impl WordVectors {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            index: HashMap::new(),
            vectors: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn from_entries<I, W>(dimensions: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, Vec<f32>)>,
        W: Into<String>,
    {
        let mut vectors = Self::new(dimensions);
        for (word, vector) in entries {
            vectors.insert(word.into(), vector)?;
        }
        Ok(vectors)
    }

    pub fn insert(&mut self, word: String, mut vector: Vec<f32>) -> Result<bool> {
        if vector.len() != self.dimensions {
            bail!(
                "vector for '{word}' has {} dimensions, expected {}",
                vector.len(),
                self.dimensions
            );
        }

        if self.index.contains_key(&word) {
            return Ok(false);
        }

        normalize_vector(&mut vector);
        self.index.insert(word, self.vectors.len());
        self.vectors.push(vector);
        Ok(true)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    fn vector(&self, word: &str) -> Result<&[f32], LookupMiss> {
        self.index
            .get(word)
            .map(|position| self.vectors[*position].as_slice())
            .ok_or_else(|| LookupMiss {
                word: word.to_string(),
            })
    }
}

impl SimilarityOracle for WordVectors {
    fn similarity(&self, first: &str, second: &str) -> Result<f64, LookupMiss> {
        let left = self.vector(first)?;
        let right = self.vector(second)?;

        if first == second {
            return Ok(1.0);
        }

        Ok(cosine_similarity(left, right).clamp(-1.0, 1.0))
    }
}

pub fn load_word_vectors(path: &Path, format: VectorFormat, limit: usize) -> Result<WordVectors> {
    let file = File::open(path)
        .with_context(|| format!("failed to open word vectors: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let vectors = match format {
        VectorFormat::Binary => read_word2vec_binary(&mut reader, limit),
        VectorFormat::Text => read_word2vec_text(&mut reader, limit),
    }
    .with_context(|| format!("failed to load word vectors: {}", path.display()))?;

    if vectors.is_empty() {
        warn!(path = %path.display(), "word vector file has no entries");
    }

    info!(
        path = %path.display(),
        format = format.as_str(),
        vocab_size = vectors.len(),
        dimensions = vectors.dimensions(),
        "loaded word vectors"
    );

    Ok(vectors)
}

// Binary word2vec: `<count> <dim>` header line, then per word its bytes up to
// a space followed by `dim` little-endian f32 values.
pub fn read_word2vec_binary<R: BufRead>(reader: &mut R, limit: usize) -> Result<WordVectors> {
    let (count, dimensions) = read_header(reader)?;
    let mut vectors = WordVectors::new(dimensions);
    let wanted = count.min(limit);

    let mut word_bytes = Vec::<u8>::with_capacity(64);
    let mut raw = vec![0_u8; dimensions * 4];

    for position in 0..wanted {
        word_bytes.clear();
        reader
            .read_until(b' ', &mut word_bytes)
            .with_context(|| format!("failed to read word {position}"))?;
        if word_bytes.last() != Some(&b' ') {
            bail!("truncated vector file at word {position} of {count}");
        }
        word_bytes.pop();

        let start = word_bytes
            .iter()
            .position(|byte| !matches!(byte, b'\n' | b'\r'))
            .unwrap_or(word_bytes.len());
        let word = std::str::from_utf8(&word_bytes[start..])
            .with_context(|| format!("word {position} is not valid UTF-8"))?
            .to_string();

        reader
            .read_exact(&mut raw)
            .with_context(|| format!("truncated vector for '{word}'"))?;
        let vector = raw
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect::<Vec<f32>>();

        vectors.insert(word, vector)?;
    }

    Ok(vectors)
}

// Text word2vec: optional `<count> <dim>` header, then `word v1 .. vN` lines.
pub fn read_word2vec_text<R: BufRead>(reader: &mut R, limit: usize) -> Result<WordVectors> {
    let mut vectors: Option<WordVectors> = None;
    let mut declared_count: Option<usize> = None;
    let mut read_entries = 0usize;
    let mut seen_first_line = false;

    for (line_index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", line_index + 1))?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        if !seen_first_line {
            seen_first_line = true;
            if let Some((count, dimensions)) = parse_header(trimmed) {
                declared_count = Some(count);
                vectors = Some(WordVectors::new(dimensions));
                continue;
            }
        }

        if read_entries >= limit || declared_count.is_some_and(|count| read_entries >= count) {
            break;
        }

        let mut fields = trimmed.split(' ');
        let word = fields.next().unwrap_or_default().to_string();
        let values = fields
            .filter(|field| !field.is_empty())
            .map(|field| field.parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .with_context(|| format!("invalid vector value on line {}", line_index + 1))?;

        let target = vectors.get_or_insert_with(|| WordVectors::new(values.len()));
        target
            .insert(word, values)
            .with_context(|| format!("invalid vector on line {}", line_index + 1))?;
        read_entries += 1;
    }

    Ok(vectors.unwrap_or_default())
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize)> {
    let mut header = String::new();
    reader
        .read_line(&mut header)
        .context("failed to read vector header")?;
    parse_header(header.trim()).with_context(|| format!("invalid vector header: {header:?}"))
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut fields = line.split_whitespace();
    let count = fields.next()?.parse::<usize>().ok()?;
    let dimensions = fields.next()?.parse::<usize>().ok()?;
    if fields.next().is_some() || dimensions == 0 {
        return None;
    }
    Some((count, dimensions))
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    left.iter()
        .zip(right.iter())
        .map(|(left_value, right_value)| f64::from(*left_value) * f64::from(*right_value))
        .sum::<f64>()
}

fn normalize_vector(values: &mut [f32]) {
    let squared_norm = values
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>();

    if squared_norm <= 0.0 {
        return;
    }

    let norm = squared_norm.sqrt() as f32;
    if norm == 0.0 {
        return;
    }

    for value in values {
        *value /= norm;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn binary_fixture(entries: &[(&str, [f32; 2])], declared: usize) -> Vec<u8> {
        let mut data = format!("{declared} 2\n").into_bytes();
        for (word, vector) in entries {
            data.extend_from_slice(word.as_bytes());
            data.push(b' ');
            for value in vector {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.push(b'\n');
        }
        data
    }

    #[test]
    fn similarity_is_cosine_of_stored_vectors() {
        let vectors = WordVectors::from_entries(
            2,
            vec![("cat", vec![3.0, 0.0]), ("dog", vec![1.0, 1.0])],
        )
        .expect("fixture vectors");

        let score = vectors.similarity("cat", "dog").expect("both words known");
        assert!((score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert_eq!(vectors.similarity("dog", "dog"), Ok(1.0));
    }

    #[test]
    fn similarity_reports_the_missing_word() {
        let vectors =
            WordVectors::from_entries(2, vec![("cat", vec![1.0, 0.0])]).expect("fixture vectors");

        let miss = vectors.similarity("cat", "zebra").unwrap_err();
        assert_eq!(miss.word, "zebra");
        let miss = vectors.similarity("zebra", "zebra").unwrap_err();
        assert_eq!(miss.word, "zebra");
    }

    #[test]
    fn insert_keeps_first_occurrence_and_checks_dimensions() {
        let mut vectors = WordVectors::new(2);
        assert!(vectors.insert("cat".to_string(), vec![1.0, 0.0]).unwrap());
        assert!(!vectors.insert("cat".to_string(), vec![0.0, 1.0]).unwrap());
        assert!(vectors.insert("dog".to_string(), vec![1.0]).is_err());
        assert_eq!(vectors.len(), 1);
    }

    #[test]
    fn binary_reader_honours_vocab_limit() {
        let data = binary_fixture(
            &[
                ("cat", [1.0, 0.0]),
                ("dog", [0.0, 1.0]),
                ("eel", [1.0, 1.0]),
            ],
            3,
        );

        let vectors = read_word2vec_binary(&mut Cursor::new(&data), 2).expect("binary vectors");
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.dimensions(), 2);
        assert!(vectors.contains("cat"));
        assert!(vectors.contains("dog"));
        assert!(!vectors.contains("eel"));
        assert_eq!(vectors.similarity("cat", "dog"), Ok(0.0));
    }

    #[test]
    fn binary_reader_rejects_truncated_data() {
        let mut data = binary_fixture(&[("cat", [1.0, 0.0])], 2);
        data.extend_from_slice(b"dog ");
        data.extend_from_slice(&1.0_f32.to_le_bytes());

        assert!(read_word2vec_binary(&mut Cursor::new(&data), 10).is_err());
    }

    #[test]
    fn text_reader_accepts_optional_header() {
        let with_header = "2 3\ncat 1 0 0\ndog 0 1 0\n";
        let vectors =
            read_word2vec_text(&mut Cursor::new(with_header), 100).expect("text vectors");
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.dimensions(), 3);

        let without_header = "cat 1 0\ndog 0.5 0.5\neel 0 1\n";
        let vectors =
            read_word2vec_text(&mut Cursor::new(without_header), 2).expect("text vectors");
        assert_eq!(vectors.len(), 2);
        assert!(!vectors.contains("eel"));
    }

    #[test]
    fn text_reader_finds_header_after_blank_lines() {
        let padded = "\n\n2 2\ncat 1 0\ndog 0 1\n";
        let vectors = read_word2vec_text(&mut Cursor::new(padded), 10).expect("text vectors");
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.dimensions(), 2);
        assert!(!vectors.contains("2"));
    }

    #[test]
    fn text_reader_rejects_ragged_rows() {
        let ragged = "cat 1 0\ndog 1 0 0\n";
        assert!(read_word2vec_text(&mut Cursor::new(ragged), 10).is_err());
    }
}
