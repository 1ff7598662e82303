use serde::Deserialize;

use super::*;

#[derive(Debug, Deserialize)]
struct RawExample {
    gold_label: String,
    sentence1: String,
    sentence2: String,
}

pub(super) fn parse_example(line: &str) -> Result<Example> {
    let raw: RawExample =
        serde_json::from_str(line).context("example is not a valid corpus record")?;

    Ok(Example {
        label: GoldLabel::from_gold_label(&raw.gold_label),
        sentence1: raw.sentence1,
        sentence2: raw.sentence2,
    })
}
