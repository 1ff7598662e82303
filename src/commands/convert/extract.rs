use super::*;

const PUNCTUATION: [&str; 9] = [",", ".", "?", "!", ":", ";", "-", "(", ")"];

pub(super) fn extract_sentence<P: DependencyParser>(
    parser: &P,
    sentence: &str,
    duplicate_roots: DuplicateRoots,
    pronouns: PronounRule,
) -> Result<RootMap> {
    let parsed = parser.parse(sentence)?;
    Ok(extract_root_map(&parsed, duplicate_roots, pronouns))
}

pub(super) fn extract_root_map(
    parsed: &ParsedSentence,
    duplicate_roots: DuplicateRoots,
    pronouns: PronounRule,
) -> RootMap {
    let mut roots = RootMap::new();

    for root in parsed.roots() {
        let children = parsed
            .children(root)
            .filter(|child| !PUNCTUATION.contains(&child.text.as_str()))
            .map(|child| child_lemma(child, pronouns))
            .collect::<Vec<String>>();
        roots.insert_root(root.lemma.clone(), children, duplicate_roots);
    }

    roots
}

fn child_lemma(child: &Token, pronouns: PronounRule) -> String {
    if child.is_pronoun(pronouns) {
        canonical_pronoun(&child.text)
    } else {
        child.lemma.clone()
    }
}

pub(super) fn canonical_pronoun(surface: &str) -> String {
    format!("{PRONOUN_LEMMA}{}", surface.to_lowercase())
}

pub(super) fn is_canonical_pronoun(lemma: &str) -> bool {
    lemma.starts_with(PRONOUN_LEMMA)
}
