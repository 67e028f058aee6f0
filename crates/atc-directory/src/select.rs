//! Closest-candidate selection

use tracing::debug;

use atc_core::{CandidateSet, GeoPosition, PositionProvider, StreamCandidate};

/// Pick the candidate closest to the listener, within `max_distance_nm`
///
/// Candidates without a known position are located through `positions`;
/// the result is cached on the candidate. Candidates whose origin cannot be
/// located are removed from the set so they are not looked up again.
///
/// The running minimum starts at `max_distance_nm`, so candidates at or
/// beyond that distance never win. On exact ties the first candidate in
/// origin order wins.
pub fn select_closest(
    candidates: &mut CandidateSet,
    listener: &GeoPosition,
    max_distance_nm: f64,
    positions: &dyn PositionProvider,
) -> Option<StreamCandidate> {
    let mut best: Option<&StreamCandidate> = None;
    let mut best_dist = max_distance_nm;
    let mut unknown = Vec::new();

    locate_all(candidates, positions, &mut unknown);
    for origin in &unknown {
        debug!("Could not locate {}, dropping its stream", origin);
        candidates.remove(origin);
    }

    for candidate in candidates.iter() {
        let Some(dist) = candidate.distance_nm(listener) else {
            continue;
        };
        if dist < best_dist {
            best_dist = dist;
            best = Some(candidate);
        }
    }

    if let Some(c) = best {
        debug!("Closest stream is {} at {:.1}nm", c.summary(), best_dist);
    }
    best.cloned()
}

/// Resolve missing positions, collecting origins that cannot be located
fn locate_all(
    candidates: &mut CandidateSet,
    positions: &dyn PositionProvider,
    unknown: &mut Vec<String>,
) {
    for candidate in candidates.iter_mut() {
        if candidate.position.is_some() {
            continue;
        }
        match positions.locate_origin(&candidate.origin) {
            Some(pos) if pos.is_valid() => candidate.position = Some(pos),
            _ => unknown.push(candidate.origin.clone()),
        }
    }
}

/// Is the candidate still within reach of the listener?
///
/// A candidate whose position is unknown is considered out of reach.
pub fn within_reach(
    candidate: &StreamCandidate,
    listener: &GeoPosition,
    max_distance_nm: f64,
) -> bool {
    candidate
        .distance_nm(listener)
        .is_some_and(|d| d < max_distance_nm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Places origins due north of (0, 0) at the given distances
    struct NorthOf(HashMap<String, f64>);

    impl NorthOf {
        fn new(entries: &[(&str, f64)]) -> Self {
            Self(entries.iter().map(|(o, d)| (o.to_string(), *d)).collect())
        }
    }

    impl PositionProvider for NorthOf {
        fn listener_position(&self) -> Option<GeoPosition> {
            Some(GeoPosition::at(0.0, 0.0))
        }

        fn locate_origin(&self, origin: &str) -> Option<GeoPosition> {
            self.0.get(origin).map(|nm| GeoPosition::at(nm / 60.0, 0.0))
        }
    }

    fn set(origins: &[&str]) -> CandidateSet {
        origins
            .iter()
            .map(|o| StreamCandidate::new(*o, format!("{o} Tower"), format!("http://x/{o}"), 1))
            .collect()
    }

    #[test]
    fn test_nearest_within_range_wins() {
        let positions = NorthOf::new(&[("AAAA", 12.0), ("BBBB", 5.0), ("CCCC", 40.0)]);
        let mut candidates = set(&["AAAA", "BBBB", "CCCC"]);
        let listener = GeoPosition::at(0.0, 0.0);

        let best = select_closest(&mut candidates, &listener, 30.0, &positions);
        assert_eq!(best.map(|c| c.origin), Some("BBBB".to_string()));

        candidates.remove("BBBB");
        let best = select_closest(&mut candidates, &listener, 30.0, &positions);
        assert_eq!(best.map(|c| c.origin), Some("AAAA".to_string()));

        candidates.remove("AAAA");
        assert!(select_closest(&mut candidates, &listener, 30.0, &positions).is_none());
    }

    #[test]
    fn test_unlocatable_candidates_removed() {
        let positions = NorthOf::new(&[("KSFO", 10.0)]);
        let mut candidates = set(&["KSFO", "ZZZZ"]);
        let best = select_closest(&mut candidates, &GeoPosition::at(0.0, 0.0), 300.0, &positions);

        assert_eq!(best.map(|c| c.origin), Some("KSFO".to_string()));
        assert_eq!(candidates.origins(), vec!["KSFO"]);
        assert!(candidates.get("KSFO").unwrap().position.is_some());
    }

    #[test]
    fn test_tie_goes_to_first_origin() {
        let positions = NorthOf::new(&[("KOAK", 7.0), ("KSFO", 7.0)]);
        let mut candidates = set(&["KSFO", "KOAK"]);
        let best = select_closest(&mut candidates, &GeoPosition::at(0.0, 0.0), 300.0, &positions);
        assert_eq!(best.map(|c| c.origin), Some("KOAK".to_string()));
    }

    #[test]
    fn test_within_reach() {
        let c = StreamCandidate::new("KSFO", "KSFO Tower", "http://x", 1)
            .with_position(GeoPosition::at(1.0, 0.0));
        let listener = GeoPosition::at(0.0, 0.0);
        assert!(within_reach(&c, &listener, 100.0));
        assert!(!within_reach(&c, &listener, 30.0));

        let unknown = StreamCandidate::new("ZZZZ", "ZZZZ Tower", "http://x", 1);
        assert!(!within_reach(&unknown, &listener, 100.0));
    }
}
