use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{PeerStatus, Prefixes};

lazy_static! {
    static ref PEER_HEADER: Regex = Regex::new(r"^\s*(peer_\S+)").unwrap();
    static ref DESCRIPTION: Regex = Regex::new(r"^\s*Description:\s+(.*)$").unwrap();
    static ref ROUTES: Regex =
        Regex::new(r"^\s*Routes:\s+(\d+) imported, (\d+) exported, (\d+) preferred$").unwrap();
    static ref BGP_STATE: Regex = Regex::new(r"^\s*BGP state:\s+(\w+)$").unwrap();
    static ref NEIGHBOR_ADDRESS: Regex = Regex::new(r"^\s*Neighbor address:\s+(\S+)$").unwrap();
    static ref NEIGHBOR_AS: Regex = Regex::new(r"^\s*Neighbor AS:\s+(\d+)$").unwrap();
}

/// A single line of `show protocols all` output
#[derive(Debug, PartialEq)]
enum ProtocolLine<'a> {
    Blank,
    PeerHeader(&'a str),
    Description(&'a str),
    Routes(Prefixes),
    BgpState(&'a str),
    NeighborAddress(&'a str),
    NeighborAs(u32),
    Unrecognized,
}

impl<'a> ProtocolLine<'a> {
    fn classify(line: &'a str) -> Self {
        if line.trim().is_empty() {
            return ProtocolLine::Blank;
        }
        if let Some(caps) = PEER_HEADER.captures(line) {
            return ProtocolLine::PeerHeader(capture(&caps, 1));
        }
        if let Some(caps) = DESCRIPTION.captures(line) {
            return ProtocolLine::Description(capture(&caps, 1));
        }
        if let Some(caps) = ROUTES.captures(line) {
            let counts = (
                capture(&caps, 1).parse(),
                capture(&caps, 2).parse(),
                capture(&caps, 3).parse(),
            );
            return match counts {
                (Ok(imported), Ok(exported), Ok(preferred)) => ProtocolLine::Routes(Prefixes {
                    imported,
                    exported,
                    preferred,
                }),
                _ => ProtocolLine::Unrecognized,
            };
        }
        if let Some(caps) = BGP_STATE.captures(line) {
            return ProtocolLine::BgpState(capture(&caps, 1));
        }
        if let Some(caps) = NEIGHBOR_ADDRESS.captures(line) {
            return ProtocolLine::NeighborAddress(capture(&caps, 1));
        }
        if let Some(caps) = NEIGHBOR_AS.captures(line) {
            return match capture(&caps, 1).parse() {
                Ok(asn) => ProtocolLine::NeighborAs(asn),
                Err(_) => ProtocolLine::Unrecognized,
            };
        }
        ProtocolLine::Unrecognized
    }
}

fn capture<'a>(caps: &regex::Captures<'a>, i: usize) -> &'a str {
    caps.get(i).map_or("", |m| m.as_str())
}

/// Folds classified lines into peer records
#[derive(Default)]
struct ProtocolReducer {
    current: Option<PeerStatus>,
    peers: Vec<PeerStatus>,
}

impl ProtocolReducer {
    fn apply(&mut self, line: ProtocolLine) {
        match line {
            ProtocolLine::Blank => self.seal(),
            ProtocolLine::PeerHeader(name) => {
                self.seal();
                self.current = Some(PeerStatus::new(name));
            }
            line => {
                // Nothing to attach to before the first peer header
                let peer = match self.current.as_mut() {
                    Some(peer) => peer,
                    None => return,
                };
                match line {
                    ProtocolLine::Description(text) => peer.description = Some(text.to_string()),
                    ProtocolLine::Routes(prefixes) => peer.prefixes = prefixes,
                    ProtocolLine::BgpState(state) => peer.bgp_state = Some(state.to_string()),
                    ProtocolLine::NeighborAddress(addr) => peer.ip_address = Some(addr.to_string()),
                    ProtocolLine::NeighborAs(asn) => peer.as_number = Some(asn),
                    _ => (),
                }
            }
        }
    }

    fn seal(&mut self) {
        if let Some(peer) = self.current.take() {
            self.peers.push(peer);
        }
    }

    fn finish(mut self) -> Vec<PeerStatus> {
        self.seal();
        self.peers
    }
}

/// Parse `show protocols all` output into one record per `peer_*` protocol,
/// in the order BIRD printed them
pub fn parse_protocols(text: &str) -> Vec<PeerStatus> {
    let mut reducer = ProtocolReducer::default();
    for line in text.lines() {
        reducer.apply(ProtocolLine::classify(line));
    }
    reducer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_PROTOCOLS_ALL: &str = "name     proto    table    state  since       info
kernel1  Kernel   master   up     2017-10-01
  Preference:     10
  Routes:         0 imported, 12 exported, 0 preferred

peer_AS65001_1 BGP      master   up     2017-10-01  Established
  Description:    Transit A
  Preference:     100
  Input filter:   import_peer
  Output filter:  export_peer
  Routes:         3 imported, 1 exported, 1 preferred
  Route change stats:     received   rejected   filtered    ignored   accepted
    Import updates:              3          0          0          0          3
  BGP state:          Established
    Neighbor address: 192.0.2.1
    Neighbor AS:      65001
    Neighbor ID:      192.0.2.1
    Hold timer:       147/180

peer_AS65002_1 BGP      master   start  2017-10-01  Active        Socket: Connection refused
  Description:    Customer B
  BGP state:          Active
    Neighbor address: 198.51.100.7
    Neighbor AS:      65002

";

    #[test]
    fn test_classify_lines() {
        assert_eq!(ProtocolLine::classify(""), ProtocolLine::Blank);
        assert_eq!(ProtocolLine::classify("   "), ProtocolLine::Blank);
        assert_eq!(
            ProtocolLine::classify("peer_A   BGP   master   up"),
            ProtocolLine::PeerHeader("peer_A")
        );
        assert_eq!(
            ProtocolLine::classify("  Description:    Transit A"),
            ProtocolLine::Description("Transit A")
        );
        assert_eq!(
            ProtocolLine::classify("  Routes:  3 imported, 1 exported, 2 preferred"),
            ProtocolLine::Routes(Prefixes {
                imported: 3,
                exported: 1,
                preferred: 2
            })
        );
        assert_eq!(
            ProtocolLine::classify("  BGP state:          Established"),
            ProtocolLine::BgpState("Established")
        );
        assert_eq!(
            ProtocolLine::classify("    Neighbor address: 2001:db8::1"),
            ProtocolLine::NeighborAddress("2001:db8::1")
        );
        assert_eq!(
            ProtocolLine::classify("    Neighbor AS:      65001"),
            ProtocolLine::NeighborAs(65001)
        );
        assert_eq!(
            ProtocolLine::classify("  Preference:     100"),
            ProtocolLine::Unrecognized
        );
    }

    #[test]
    fn test_partial_routes_line_is_ignored() {
        // BIRD versions that add a "filtered" count don't match
        assert_eq!(
            ProtocolLine::classify("  Routes: 3 imported, 0 filtered, 1 exported, 1 preferred"),
            ProtocolLine::Unrecognized
        );
        assert_eq!(
            ProtocolLine::classify("  Routes: 3 imported, 1 exported"),
            ProtocolLine::Unrecognized
        );
    }

    #[test]
    fn test_neighbor_as_overflow_is_ignored() {
        assert_eq!(
            ProtocolLine::classify("    Neighbor AS:      99999999999"),
            ProtocolLine::Unrecognized
        );
    }

    #[test]
    fn test_single_peer() {
        let text = "peer_A\n  Description: test\n  Routes: 3 imported, 1 exported, 1 preferred\n\n";
        let peers = parse_protocols(text);
        assert_eq!(peers.len(), 1);
        let peer = &peers[0];
        assert_eq!(peer.session_name, "peer_A");
        assert_eq!(peer.description.as_deref(), Some("test"));
        assert_eq!(
            peer.prefixes,
            Prefixes {
                imported: 3,
                exported: 1,
                preferred: 1
            }
        );
        assert_eq!(peer.ip_address, None);
        assert_eq!(peer.as_number, None);
        assert_eq!(peer.bgp_state, None);
    }

    #[test]
    fn test_full_output() {
        let peers = parse_protocols(SHOW_PROTOCOLS_ALL);
        assert_eq!(peers.len(), 2);

        let first = &peers[0];
        assert_eq!(first.session_name, "peer_AS65001_1");
        assert_eq!(first.description.as_deref(), Some("Transit A"));
        assert_eq!(first.ip_address.as_deref(), Some("192.0.2.1"));
        assert_eq!(first.as_number, Some(65001));
        assert_eq!(first.bgp_state.as_deref(), Some("Established"));
        assert_eq!(first.prefixes.imported, 3);
        assert!(first.is_established());

        let second = &peers[1];
        assert_eq!(second.session_name, "peer_AS65002_1");
        assert_eq!(second.bgp_state.as_deref(), Some("Active"));
        assert_eq!(second.ip_address.as_deref(), Some("198.51.100.7"));
        assert_eq!(second.prefixes, Prefixes::default());
        assert!(!second.is_established());
    }

    #[test]
    fn test_lines_before_first_peer_are_ignored() {
        let text = "  Description: orphan\n  Neighbor AS: 1\n\npeer_B\n  Neighbor AS: 2\n";
        let peers = parse_protocols(text);
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].session_name, "peer_B");
        assert_eq!(peers[0].description, None);
        assert_eq!(peers[0].as_number, Some(2));
    }

    #[test]
    fn test_header_seals_previous_peer() {
        // No blank line between the two blocks, and none at the end
        let text = "peer_A\n  Neighbor AS: 1\npeer_B\n  Neighbor AS: 2";
        let peers = parse_protocols(text);
        let names: Vec<_> = peers.iter().map(|p| p.session_name.as_str()).collect();
        assert_eq!(names, vec!["peer_A", "peer_B"]);
        assert_eq!(peers[0].as_number, Some(1));
        assert_eq!(peers[1].as_number, Some(2));
    }

    #[test]
    fn test_non_peer_protocols_are_skipped() {
        let peers = parse_protocols("device1 Device master up\n  Preference: 240\n\n");
        assert!(peers.is_empty());
    }
}
