//! Newest-first ordering of registry version lists

use std::cmp::Ordering;
use semver::Version;

/// Order versions newest first.
///
/// The registry's own `latest` marker goes first when it is part of the list,
/// then valid semantic versions in descending precedence, then anything that
/// does not parse as semver in descending lexical order. Duplicates are dropped.
pub fn order_newest_first<I>(versions: I, latest: Option<&str>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed: Vec<(Option<Version>, String)> = versions
        .into_iter()
        .map(|raw| (Version::parse(&raw).ok(), raw))
        .collect();

    parsed.sort_by(|(a_ver, a_raw), (b_ver, b_raw)| match (a_ver, b_ver) {
        (Some(a), Some(b)) => b.cmp(a).then_with(|| b_raw.cmp(a_raw)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b_raw.cmp(a_raw),
    });

    let mut ordered: Vec<String> = Vec::with_capacity(parsed.len());
    for (_, raw) in parsed {
        if !ordered.contains(&raw) {
            ordered.push(raw);
        }
    }

    if let Some(latest) = latest {
        if let Some(index) = ordered.iter().position(|v| v == latest) {
            let tag = ordered.remove(index);
            ordered.insert(0, tag);
        }
    }

    ordered
}
