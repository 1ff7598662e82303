use super::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ChildMatch {
    Identical,
    Pronoun,
    Scored(f64),
    Miss,
}

// Under `AbortExample` the first root missing from the vocabulary fails the
// whole example.
pub(super) fn score_root_maps<O: SimilarityOracle>(
    first: &RootMap,
    second: &RootMap,
    oracle: &O,
    root_miss: RootMissPolicy,
) -> Result<Vec<RootPairScore>, LookupMiss> {
    let mut relations = Vec::with_capacity(first.len() * second.len());

    for (root1, children1) in first.iter() {
        for (root2, children2) in second.iter() {
            let root = match oracle.similarity(root1, root2) {
                Ok(score) => score,
                Err(miss) => match root_miss {
                    RootMissPolicy::AbortExample => return Err(miss),
                    RootMissPolicy::SkipPair => {
                        debug!(root1, root2, word = %miss.word, "root pair skipped");
                        continue;
                    }
                },
            };

            let children = children1
                .iter()
                .map(|child1| best_child_match(child1, children2, oracle))
                .collect::<Vec<f64>>();

            relations.push(RootPairScore { root, children });
        }
    }

    Ok(relations)
}

pub(super) fn best_child_match<O: SimilarityOracle>(
    child1: &str,
    candidates: &[String],
    oracle: &O,
) -> f64 {
    candidates
        .iter()
        .fold(0.0_f64, |best, child2| match compare_children(child1, child2, oracle) {
            ChildMatch::Identical => best.max(1.0),
            ChildMatch::Scored(score) => best.max(score),
            ChildMatch::Pronoun | ChildMatch::Miss => best,
        })
}

fn compare_children<O: SimilarityOracle>(child1: &str, child2: &str, oracle: &O) -> ChildMatch {
    if child1 == child2 {
        return ChildMatch::Identical;
    }

    if is_canonical_pronoun(child1) || is_canonical_pronoun(child2) {
        return ChildMatch::Pronoun;
    }

    match oracle.similarity(child1, child2) {
        Ok(score) => ChildMatch::Scored(score),
        Err(_) => ChildMatch::Miss,
    }
}
