// [apps/scanner/src/ports.rs]
/*!
 * Port-checking order for one Candidate (spec §4.6): primary, then
 * additional, then the common-port set, then (for promising candidates
 * only, budget permitting) a bounded sample of two dynamic ranges.
 */

use rand::seq::SliceRandom;
use rand::thread_rng;

pub const COMMON_PORTS: [u16; 8] = [11434, 8000, 8001, 11435, 11436, 3000, 8080, 8888];

const DYNAMIC_RANGE_HIGH: std::ops::Range<u16> = 49152..49252;
const DYNAMIC_RANGE_LOW: std::ops::Range<u16> = 1024..1124;

/// All ports to try for one Candidate, already deduplicated and in
/// priority order. Dynamic ports are appended last and only up to
/// `dynamic_port_limit`, shuffled so repeated runs don't all sample the
/// same prefix of the range.
pub fn ports_to_try(primary: u16, additional: &[u16], promising: bool, include_dynamic: bool, dynamic_port_limit: usize) -> Vec<u16> {
    let mut ports = Vec::with_capacity(1 + additional.len() + COMMON_PORTS.len());
    let mut seen = std::collections::HashSet::new();

    let mut push = |p: u16, ports: &mut Vec<u16>| {
        if seen.insert(p) {
            ports.push(p);
        }
    };

    push(primary, &mut ports);
    for p in additional {
        push(*p, &mut ports);
    }
    for p in COMMON_PORTS {
        push(p, &mut ports);
    }

    if promising && include_dynamic {
        let mut dynamic: Vec<u16> = DYNAMIC_RANGE_HIGH.chain(DYNAMIC_RANGE_LOW).filter(|p| !seen.contains(p)).collect();
        dynamic.shuffle(&mut thread_rng());
        dynamic.truncate(dynamic_port_limit);
        for p in dynamic {
            push(p, &mut ports);
        }
    }

    ports
}

/// How many entries at the front of `ports_to_try`'s result are the fixed
/// set (primary, additional, common ports) rather than the dynamic-port
/// sample — lets a caller scope a wall-clock budget to dynamic exploration
/// only, instead of the whole port list.
pub fn fixed_port_count(primary: u16, additional: &[u16]) -> usize {
    ports_to_try(primary, additional, false, false, 0).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_primary_then_additional_then_common() {
        let ports = ports_to_try(9999, &[1234], false, false, 0);
        assert_eq!(ports[0], 9999);
        assert_eq!(ports[1], 1234);
        assert!(ports[2..].iter().all(|p| COMMON_PORTS.contains(p)));
    }

    #[test]
    fn skips_dynamic_sampling_when_not_promising() {
        let ports = ports_to_try(11434, &[], false, true, 100);
        assert_eq!(ports.len(), 1);
    }

    #[test]
    fn caps_dynamic_sampling_at_the_configured_limit() {
        let ports = ports_to_try(11434, &[], true, true, 5);
        assert_eq!(ports.len(), 1 + 5);
    }

    #[test]
    fn never_duplicates_a_port_already_in_the_fixed_set() {
        let ports = ports_to_try(11434, &[8080], true, true, 200);
        let unique: std::collections::HashSet<_> = ports.iter().collect();
        assert_eq!(unique.len(), ports.len());
    }

    #[test]
    fn fixed_port_count_excludes_the_dynamic_sample() {
        let additional = [1234];
        let fixed = fixed_port_count(11434, &additional);
        let with_dynamic = ports_to_try(11434, &additional, true, true, 50);
        assert_eq!(fixed, 1 + additional.len() + COMMON_PORTS.len());
        assert_eq!(&with_dynamic[..fixed], &ports_to_try(11434, &additional, false, false, 0)[..]);
    }
}
