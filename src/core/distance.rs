use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Descriptor lengths differ: {left} vs {right}")]
pub struct LengthMismatch {
    pub left: usize,
    pub right: usize,
}

/// Euclidean distance between two descriptors of equal length.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32, LengthMismatch> {
    if a.len() != b.len() {
        return Err(LengthMismatch { left: a.len(), right: b.len() });
    }

    let sum: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    Ok(sum.sqrt())
}
