pub mod descriptor;
pub mod distance;
pub mod matcher;

pub use descriptor::{Descriptor, EnrolledRecord, validate_descriptor, validate_identity};
pub use distance::{euclidean_distance, LengthMismatch};
pub use matcher::{find_closest, MatchResult, MismatchPolicy};
