use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::models::Route;

lazy_static! {
    static ref PREFIX: Regex = Regex::new(r"^([a-f0-9.:/]+)?\s+").unwrap();
    // "<prefix> via <peer> on <iface> [<source> <date> <time>]" or
    // "<origin> [<source> <date> <time> from <peer>]"
    static ref SUMMARY: Regex = Regex::new(concat!(
        r"^(?:.*via\s+(?P<peer>\S+) on (?P<interface>\S+)|(?:\w+)?)?\s*",
        r"\[(?P<source>\S+) (?P<date>\S+) (?P<time>[^\]\s]+)(?: from (?P<peer2>\S+))?\]",
    ))
    .unwrap();
    // Next-hop lines printed without a bracketed summary (BIRD 2 layout)
    static ref VIA: Regex = Regex::new(r"via\s+(?P<peer>\S+) on (?P<interface>\S+)").unwrap();
}

/// Fields pulled out of a route's summary line
#[derive(Debug, Default, PartialEq)]
struct Summary<'a> {
    peer: Option<&'a str>,
    interface: Option<&'a str>,
    source: Option<&'a str>,
    date: Option<&'a str>,
    time: Option<&'a str>,
}

impl<'a> Summary<'a> {
    fn from_line(line: &'a str) -> Self {
        let group = |caps: &Captures<'a>, name: &str| caps.name(name).map(|m| m.as_str());
        if let Some(caps) = SUMMARY.captures(line) {
            Summary {
                // The `via` next hop wins over the bracket's `from` peer
                peer: group(&caps, "peer").or_else(|| group(&caps, "peer2")),
                interface: group(&caps, "interface"),
                source: group(&caps, "source"),
                date: group(&caps, "date"),
                time: group(&caps, "time"),
            }
        } else if let Some(caps) = VIA.captures(line) {
            Summary {
                peer: group(&caps, "peer"),
                interface: group(&caps, "interface"),
                ..Default::default()
            }
        } else {
            Summary::default()
        }
    }
}

/// A single (trimmed) line of `show route` output
#[derive(Debug, PartialEq)]
enum RouteLine<'a> {
    /// Starts a new route; the prefix is absent when it repeats the previous one
    Summary {
        prefix: Option<&'a str>,
        summary: Summary<'a>,
    },
    /// `BGP.<name>: <value>`
    Attribute {
        name: &'a str,
        value: Option<&'a str>,
    },
    /// `BGP.community: ...`, replaces the route's communities
    Communities(Vec<String>),
    /// `(asn,value) ...` on its own line, extends the route's communities
    Continuation(Vec<String>),
    Unrecognized,
}

impl<'a> RouteLine<'a> {
    fn classify(line: &'a str) -> Self {
        if line.contains("via") {
            let prefix = PREFIX
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
            return RouteLine::Summary {
                prefix,
                summary: Summary::from_line(line),
            };
        }
        if let Some(start) = line.find("BGP.") {
            let body = &line[start + 4..];
            let (name, value) = match body.split_once(": ") {
                Some((name, value)) => (name, Some(value)),
                None => (body.trim_end_matches(':'), None),
            };
            if name == "community" {
                return RouteLine::Communities(value.map(parse_communities).unwrap_or_default());
            }
            return RouteLine::Attribute { name, value };
        }
        if line.starts_with('(') {
            return RouteLine::Continuation(parse_communities(line));
        }
        RouteLine::Unrecognized
    }
}

/// "(65000,100) (65000,200)" -> ["65000:100", "65000:200"]
fn parse_communities(text: &str) -> Vec<String> {
    text.replace('(', "")
        .replace(')', "")
        .replace(',', ":")
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Folds classified lines into route records
///
/// BIRD prints no terminator after a route's attributes, so a route is only
/// complete once the next summary line (or the end of output) is reached.
#[derive(Default)]
struct RouteReducer {
    current_prefix: Option<String>,
    current: Option<Route>,
    routes: Vec<Route>,
}

impl RouteReducer {
    fn apply(&mut self, line: RouteLine) {
        match line {
            RouteLine::Summary { prefix, summary } => {
                if let Some(route) = self.current.take() {
                    self.routes.push(route);
                }
                if let Some(prefix) = prefix {
                    self.current_prefix = Some(prefix.to_string());
                }
                let mut route = Route::new(self.current_prefix.clone());
                route.peer = summary.peer.map(String::from);
                route.interface = summary.interface.map(String::from);
                route.source = summary.source.map(String::from);
                route.date = summary.date.map(String::from);
                route.time = summary.time.map(String::from);
                self.current = Some(route);
            }
            RouteLine::Attribute { name, value } => {
                if let Some(route) = self.current.as_mut() {
                    route
                        .attributes
                        .insert(name.to_string(), value.map(String::from));
                }
            }
            RouteLine::Communities(communities) => {
                if let Some(route) = self.current.as_mut() {
                    route.community = communities;
                }
            }
            RouteLine::Continuation(communities) => {
                if let Some(route) = self.current.as_mut() {
                    route.community.extend(communities);
                }
            }
            RouteLine::Unrecognized => (),
        }
    }

    fn finish(mut self) -> Vec<Route> {
        if let Some(route) = self.current.take() {
            if !self.routes.contains(&route) {
                self.routes.push(route);
            }
        }
        self.routes
    }
}

/// Parse `show route` output (with or without `all`) into route records,
/// in the order BIRD printed them
pub fn parse_routes(text: &str) -> Vec<Route> {
    let mut reducer = RouteReducer::default();
    for line in text.lines() {
        reducer.apply(RouteLine::classify(line.trim()));
    }
    reducer.finish()
}
