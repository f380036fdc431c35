//! Candidate block discovery and folding.

use std::collections::HashMap;
use std::ops::Deref;

use scraper::{ElementRef, Html};

use super::rules::ExtractRules;
use super::text::block_text;

/// Card-shaped elements whose text carries at least one content signal,
/// in document order.
pub(super) fn find_candidates<'a>(document: &'a Html, rules: &ExtractRules) -> Vec<ElementRef<'a>> {
    document
        .select(&rules.card)
        .filter(|element| {
            let text = block_text(*element);
            match rules.matching_signal(&text) {
                Some(signal) => {
                    tracing::trace!(signal, tag = element.value().name(), "candidate block");
                    true
                }
                None => false,
            }
        })
        .collect()
}

/// Folds nested candidates so each logical result appears once.
///
/// Candidates form a forest under the "nearest candidate ancestor" relation.
/// Leaves are the innermost matches. Each leaf climbs to its parent while the
/// parent wraps nothing else, so `<li class="result"><article>..</article></li>`
/// yields the `li`. A candidate with two or more candidate children is a list
/// container and stops the climb; it is never emitted itself.
///
/// A block that already has a heading stops below any parent carrying a
/// heading of its own, so a single result is not swallowed by the page
/// wrapper around it. Headless fragments always fold into their parent.
pub(super) fn fold_candidates<'a>(
    candidates: &[ElementRef<'a>],
    rules: &ExtractRules,
) -> Vec<ElementRef<'a>> {
    let index: HashMap<_, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, element)| (element.deref().id(), i))
        .collect();

    let parent: Vec<Option<usize>> = candidates
        .iter()
        .map(|element| {
            element
                .deref()
                .ancestors()
                .find_map(|ancestor| index.get(&ancestor.id()).copied())
        })
        .collect();

    let mut child_count = vec![0usize; candidates.len()];
    for p in parent.iter().flatten() {
        child_count[*p] += 1;
    }

    let mut emitted = vec![false; candidates.len()];
    let mut folded = Vec::new();
    for leaf in (0..candidates.len()).filter(|&i| child_count[i] == 0) {
        let mut current = leaf;
        while let Some(p) = parent[current] {
            if child_count[p] != 1 {
                break;
            }
            if has_heading(candidates[current], rules)
                && has_heading_outside(candidates[p], candidates[current], rules)
            {
                break;
            }
            current = p;
        }
        if !emitted[current] {
            emitted[current] = true;
            folded.push(candidates[current]);
        }
    }
    folded
}

fn has_heading(block: ElementRef<'_>, rules: &ExtractRules) -> bool {
    block.select(&rules.name).next().is_some()
}

/// `true` if `outer` has a heading that does not sit inside `inner`.
fn has_heading_outside(outer: ElementRef<'_>, inner: ElementRef<'_>, rules: &ExtractRules) -> bool {
    let inner_id = inner.id();
    outer.select(&rules.name).any(|heading| {
        heading.id() != inner_id && !heading.ancestors().any(|node| node.id() == inner_id)
    })
}
