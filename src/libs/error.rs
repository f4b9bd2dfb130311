use thiserror::Error;

/// Fatal conditions raised by the annotation core.
///
/// Data anomalies (zero-length alignments, missing splice-site sequence and the
/// like) are not errors; they are reported with `log::warn!` and the operation
/// continues with a default value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GarError {
    /// An alignment record violates its construction contract
    #[error("Invalid alignment record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// An evidence item violates its construction contract
    #[error("Invalid evidence {id}: {reason}")]
    InvalidEvidence { id: String, reason: String },

    /// A transcript or locus violates its construction contract
    #[error("Invalid gene model {id}: {reason}")]
    InvalidGeneModel { id: String, reason: String },

    /// Rows of one alignment have different lengths
    #[error("Aligned sequence {name} has length {found}, expected {expected}")]
    UnequalAlignmentLength {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A configuration value is out of its valid domain
    #[error("Invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    /// A distance for this pair and class was already stored
    #[error("Distance between {0} and {1} already stored in class {2}")]
    DuplicateDistance(String, String, String),

    /// Distances live in [0, 1]
    #[error("Distance {value} between {a} and {b} is outside [0, 1]")]
    DistanceOutOfRange { a: String, b: String, value: f64 },

    /// A sequence could not be retrieved from its source
    #[error("Sequence not found: {0}")]
    MissingSequence(String),

    /// Assignment needed a distance that was never computed
    #[error("No {class} distance between {a} and {b}")]
    MissingDistance { a: String, b: String, class: String },

    /// A shared evidence item ended up with no locus at all
    #[error("Evidence {0} could not be assigned to any locus")]
    UnresolvedEvidence(String),
}
