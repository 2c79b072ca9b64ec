use std::collections::HashMap;

use tracing::debug;

use crate::db::PersonRecord;
use crate::parser::RawCandidate;
use crate::settings::Site;
use crate::text::{normalize, split_name};

/// Collapse raw mentions from all pages into one record per person.
///
/// Pass 1 folds byte-identical mentions (same normalized name, profile URL and
/// role), keeping the last one seen. Pass 2 folds by normalized name alone and
/// keeps the richest candidate, the earliest one on ties. Output follows the
/// first appearance of each name.
pub fn resolve(candidates: Vec<RawCandidate>, site: &Site) -> Vec<PersonRecord> {
    let total = candidates.len();
    let exact = fold_last_wins(candidates, |c| {
        (normalize(&c.full_name), normalize(&c.profile_url), normalize(&c.role))
    });

    let mut slots: Vec<RawCandidate> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    for cand in exact {
        let key = normalize(&cand.full_name);
        match by_name.get(&key) {
            Some(&idx) => {
                if richness(&cand, site) > richness(&slots[idx], site) {
                    slots[idx] = cand;
                }
            }
            None => {
                by_name.insert(key, slots.len());
                slots.push(cand);
            }
        }
    }

    debug!(raw = total, resolved = slots.len(), "Resolved candidates");
    slots.into_iter().map(into_record).collect()
}

/// Group by key; the group sits where its key first appeared, holding the
/// last value seen for it.
fn fold_last_wins<K, F>(items: Vec<RawCandidate>, key: F) -> Vec<RawCandidate>
where
    K: std::hash::Hash + Eq,
    F: Fn(&RawCandidate) -> K,
{
    let mut slots: Vec<RawCandidate> = Vec::with_capacity(items.len());
    let mut index: HashMap<K, usize> = HashMap::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&idx) => slots[idx] = item,
            None => {
                index.insert(k, slots.len());
                slots.push(item);
            }
        }
    }
    slots
}

/// How much useful detail a candidate carries.
pub fn richness(c: &RawCandidate, site: &Site) -> u8 {
    let mut score = 0;
    if !c.profile_url.is_empty() {
        score += 1;
        if site.is_internal(&c.profile_url) {
            score += 1;
        }
    }
    if !c.note.is_empty() {
        score += 1;
    }
    if !c.role.is_empty() && !c.role.eq_ignore_ascii_case("member") {
        score += 1;
    }
    score
}

fn into_record(c: RawCandidate) -> PersonRecord {
    let (first_name, last_name) = split_name(&c.full_name);
    PersonRecord {
        full_name: c.full_name,
        first_name,
        last_name,
        role: c.role,
        note: c.note,
        profile_url: c.profile_url,
        source_page: c.source_page,
    }
}
