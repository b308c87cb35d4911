//! Crate error type.

use crate::effects::EffectId;

/// Convenience alias for crate results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by the surface, effect, and render layers.
///
/// Contract violations are reported at the violating call; recoverable
/// conditions such as texture size mismatches are handled internally and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A cell index fell outside the owning surface.
    #[error("cell index {index} out of bounds for surface of {len} cells")]
    OutOfBounds {
        /// The offending flat cell index.
        index: usize,
        /// Number of cells in the surface.
        len: usize,
    },
    /// A coordinate pair fell outside the surface grid.
    #[error("cell ({x}, {y}) out of range for {width}x{height} surface")]
    OutOfRange {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
        /// Surface width.
        width: u16,
        /// Surface height.
        height: u16,
    },
    /// A render step was handed a data object of the wrong kind.
    #[error("render step '{step}' requires {expected} data")]
    InvalidStepData {
        /// Name of the step that rejected the data.
        step: &'static str,
        /// Description of the expected data kind.
        expected: &'static str,
    },
    /// An effect id is not registered with the manager.
    #[error("unknown effect id {0:?}")]
    UnknownEffect(EffectId),
    /// Persisted data could not be decoded at all.
    #[error("persistence error: {0}")]
    Persist(#[from] serde_json::Error),
    /// Persisted data used an unsupported snapshot version.
    #[error("unsupported snapshot version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the data.
        found: u32,
        /// Highest version this build reads.
        supported: u32,
    },
    /// IO error while reading or writing persisted data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
