use crate::common::{AttendanceError, Result};
use crate::core::descriptor::{validate_descriptor, EnrolledRecord};
use crate::core::distance::{euclidean_distance, LengthMismatch};
use serde::{Deserialize, Serialize};

/// What to do with an enrolled descriptor whose length differs from the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Fail the whole query on the first mismatched record.
    #[default]
    Reject,
    /// Leave the record out of the scan and keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Match { identity: String, distance: f32 },
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match self {
            MatchResult::Match { identity, .. } => Some(identity),
            MatchResult::NoMatch => None,
        }
    }
}

/// Linear scan for the record closest to `query`.
///
/// The first record reaching the minimum distance wins ties. The winner is
/// only reported when its distance is `<= threshold`.
pub fn find_closest(
    query: &[f32],
    records: &[EnrolledRecord],
    threshold: f32,
    policy: MismatchPolicy,
) -> Result<MatchResult> {
    validate_descriptor(query)?;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(AttendanceError::InvalidInput(format!(
            "threshold must be a non-negative number, got {}", threshold
        )));
    }

    let mut best: Option<(&EnrolledRecord, f32)> = None;

    for record in records {
        let distance = match euclidean_distance(query, record.descriptor()) {
            Ok(distance) => distance,
            Err(LengthMismatch { left, right }) => match policy {
                MismatchPolicy::Reject => {
                    return Err(AttendanceError::DimensionMismatch {
                        identity: record.identity().to_string(),
                        expected: left,
                        actual: right,
                    });
                }
                MismatchPolicy::Skip => {
                    tracing::warn!(
                        "Skipping '{}': descriptor has {} values, query has {}",
                        record.identity(), right, left
                    );
                    continue;
                }
            },
        };

        // NaN would never compare below the current best and stall the scan
        if !distance.is_finite() {
            return Err(AttendanceError::InvalidInput(format!(
                "distance to '{}' is not a finite number", record.identity()
            )));
        }

        // Strict comparison keeps the earliest record on ties
        if best.map_or(true, |(_, smallest)| distance < smallest) {
            best = Some((record, distance));
        }
    }

    let result = match best {
        Some((record, distance)) if distance <= threshold => MatchResult::Match {
            identity: record.identity().to_string(),
            distance,
        },
        Some((record, distance)) => {
            tracing::debug!(
                "Closest record '{}' at {:.4} is outside threshold {:.4}",
                record.identity(), distance, threshold
            );
            MatchResult::NoMatch
        }
        None => MatchResult::NoMatch,
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, descriptor: &[f32]) -> EnrolledRecord {
        EnrolledRecord::new(name, descriptor.to_vec()).unwrap()
    }

    fn alice_and_bob() -> Vec<EnrolledRecord> {
        vec![
            record("alice", &[0.0, 0.0, 0.0]),
            record("bob", &[10.0, 10.0, 10.0]),
        ]
    }

    #[test]
    fn empty_records_never_match() {
        for threshold in [0.0, 0.5, 1000.0] {
            let result = find_closest(&[0.0, 0.0, 0.0], &[], threshold, MismatchPolicy::Reject).unwrap();
            assert_eq!(result, MatchResult::NoMatch);
        }
    }

    #[test]
    fn exact_descriptor_matches_at_zero_distance() {
        let result = find_closest(&[0.0, 0.0, 0.0], &alice_and_bob(), 0.5, MismatchPolicy::Reject).unwrap();
        assert_eq!(
            result,
            MatchResult::Match { identity: "alice".into(), distance: 0.0 }
        );

        // Zero threshold still admits an identical descriptor
        let result = find_closest(&[10.0, 10.0, 10.0], &alice_and_bob(), 0.0, MismatchPolicy::Reject).unwrap();
        assert_eq!(result.identity(), Some("bob"));
    }

    #[test]
    fn closest_outside_threshold_is_no_match() {
        let result = find_closest(&[0.0, 0.0, 1.0], &alice_and_bob(), 0.5, MismatchPolicy::Reject).unwrap();
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn threshold_is_inclusive() {
        let result = find_closest(&[0.0, 0.0, 1.0], &alice_and_bob(), 1.0, MismatchPolicy::Reject).unwrap();
        assert_eq!(
            result,
            MatchResult::Match { identity: "alice".into(), distance: 1.0 }
        );
    }

    #[test]
    fn picks_nearest_not_first_within_threshold() {
        let records = vec![
            record("far", &[0.4, 0.0]),
            record("near", &[0.1, 0.0]),
        ];
        let result = find_closest(&[0.0, 0.0], &records, 0.5, MismatchPolicy::Reject).unwrap();
        assert_eq!(result.identity(), Some("near"));
    }

    #[test]
    fn ties_go_to_first_inserted() {
        let records = vec![
            record("first", &[1.0, 0.0]),
            record("second", &[-1.0, 0.0]),
            record("third", &[0.0, 1.0]),
        ];
        let result = find_closest(&[0.0, 0.0], &records, 2.0, MismatchPolicy::Reject).unwrap();
        assert_eq!(result.identity(), Some("first"));
    }

    #[test]
    fn reject_policy_fails_on_length_mismatch() {
        let mut records = alice_and_bob();
        records.push(record("carol", &[0.0, 0.0]));

        let err = find_closest(&[0.0, 0.0, 0.0], &records, 0.5, MismatchPolicy::Reject).unwrap_err();
        match err {
            AttendanceError::DimensionMismatch { identity, expected, actual } => {
                assert_eq!(identity, "carol");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skip_policy_ignores_mismatched_records() {
        let records = vec![
            record("short", &[0.0, 0.0]),
            record("alice", &[0.0, 0.0, 0.1]),
        ];
        let result = find_closest(&[0.0, 0.0, 0.0], &records, 0.5, MismatchPolicy::Skip).unwrap();
        assert_eq!(result.identity(), Some("alice"));

        let only_short = vec![record("short", &[0.0, 0.0])];
        let result = find_closest(&[0.0, 0.0, 0.0], &only_short, 0.5, MismatchPolicy::Skip).unwrap();
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn malformed_record_cannot_hide_an_exact_match() {
        let records = vec![
            EnrolledRecord::unchecked("", vec![f32::NAN, 0.0]),
            record("alice", &[0.0, 0.0]),
        ];
        let err = find_closest(&[0.0, 0.0], &records, 0.5, MismatchPolicy::Reject).unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));
    }

    #[test]
    fn overflowing_distance_is_invalid_input() {
        let records = vec![record("huge", &[f32::MAX])];
        let err = find_closest(&[-f32::MAX], &records, 0.5, MismatchPolicy::Reject).unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));
    }

    #[test]
    fn invalid_query_or_threshold_is_rejected() {
        let records = alice_and_bob();
        assert!(matches!(
            find_closest(&[], &records, 0.5, MismatchPolicy::Reject),
            Err(AttendanceError::InvalidInput(_))
        ));
        assert!(matches!(
            find_closest(&[f32::NAN, 0.0, 0.0], &records, 0.5, MismatchPolicy::Reject),
            Err(AttendanceError::InvalidInput(_))
        ));
        assert!(matches!(
            find_closest(&[0.0, 0.0, 0.0], &records, -1.0, MismatchPolicy::Reject),
            Err(AttendanceError::InvalidInput(_))
        ));
    }
}
