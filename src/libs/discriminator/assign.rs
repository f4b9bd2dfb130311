use crate::libs::distance::{DistanceClass, DistanceMatrix};
use crate::libs::error::GarError;
use itertools::Itertools;
use std::collections::HashSet;

/// How an EST relates to one of the loci it overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// The EST belongs to this locus alone
    Single,
    /// The EST fits this locus and at least one other equally well
    Multiple,
    /// The EST overlaps this locus but belongs elsewhere
    Incorrect,
}

/// Loci an EST can be assigned to, in the order of `loci`.
///
/// Every pair of loci is compared: distances to the EST within `twilight` of
/// each other make both loci possible, otherwise the farther one is excluded
/// and the nearer one possible. The assignees are the loci that are possible
/// and never excluded.
///
/// ```
/// # use gar::libs::discriminator::assign_evidence;
/// # use gar::libs::distance::{DistanceClass, DistanceMatrix};
/// let cls = DistanceClass::InformativeSites;
/// let mut mat = DistanceMatrix::new();
/// mat.insert("geneA", "est1", cls, 0.05).unwrap();
/// mat.insert("geneB", "est1", cls, 0.20).unwrap();
/// let loci = vec!["geneA".to_string(), "geneB".to_string()];
/// assert_eq!(assign_evidence("est1", &loci, &mat, cls, 0.02).unwrap(), vec!["geneA"]);
/// ```
pub fn assign_evidence(
    evidence: &str,
    loci: &[String],
    matrix: &DistanceMatrix,
    class: DistanceClass,
    twilight: f64,
) -> Result<Vec<String>, GarError> {
    let distance = |locus: &str| {
        matrix
            .get(locus, evidence, class)
            .ok_or_else(|| GarError::MissingDistance {
                a: locus.to_string(),
                b: evidence.to_string(),
                class: class.to_string(),
            })
    };

    let mut possible: HashSet<&str> = HashSet::new();
    let mut excluded: HashSet<&str> = HashSet::new();
    for (a, b) in loci.iter().tuple_combinations() {
        let d1 = distance(a.as_str())?;
        let d2 = distance(b.as_str())?;
        if (d1 - d2).abs() <= twilight {
            possible.insert(a);
            possible.insert(b);
        } else if d1 < d2 {
            possible.insert(a);
            excluded.insert(b);
        } else {
            possible.insert(b);
            excluded.insert(a);
        }
    }

    let assignees: Vec<String> = loci
        .iter()
        .filter(|l| possible.contains(l.as_str()) && !excluded.contains(l.as_str()))
        .cloned()
        .collect();

    if assignees.is_empty() {
        return Err(GarError::UnresolvedEvidence(evidence.to_string()));
    }
    Ok(assignees)
}

/// Match kind of every overlapping locus given the assignees
pub fn classify_matches(loci: &[String], assignees: &[String]) -> Vec<(String, MatchKind)> {
    loci.iter()
        .map(|locus| {
            let kind = if !assignees.contains(locus) {
                MatchKind::Incorrect
            } else if assignees.len() == 1 {
                MatchKind::Single
            } else {
                MatchKind::Multiple
            };
            (locus.clone(), kind)
        })
        .collect()
}
