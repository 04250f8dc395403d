use itertools::Itertools;
use prettytable::{cell, row, Row};

use super::table::ToRow;
use crate::models::{PeerStatus, Route};

const EMPTY_VALUE: &str = "";

fn maybe_string<T>(item: Option<&T>) -> String
where
    T: ToString,
{
    item.map(std::string::ToString::to_string)
        .unwrap_or_else(|| String::from(EMPTY_VALUE))
}

pub struct PeerStatusRow(pub PeerStatus);

impl ToRow for PeerStatusRow {
    fn columns() -> Row {
        row![
            "Session",
            "Neighbor",
            "AS",
            "State",
            "Imported",
            "Exported",
            "Preferred",
            "Description"
        ]
    }

    fn to_row(&self) -> Row {
        let peer = &self.0;
        row![
            peer.session_name,
            maybe_string(peer.ip_address.as_ref()),
            maybe_string(peer.as_number.as_ref()),
            maybe_string(peer.bgp_state.as_ref()),
            peer.prefixes.imported,
            peer.prefixes.exported,
            peer.prefixes.preferred,
            maybe_string(peer.description.as_ref()),
        ]
    }
}

pub struct RouteRow(pub Route);

impl ToRow for RouteRow {
    fn columns() -> Row {
        row![
            "Prefix",
            "Peer",
            "Interface",
            "Source",
            "Since",
            "AS Path",
            "Communities"
        ]
    }

    fn to_row(&self) -> Row {
        let route = &self.0;
        let since = [route.date.as_deref(), route.time.as_deref()]
            .iter()
            .flatten()
            .join(" ");
        row![
            maybe_string(route.prefix.as_ref()),
            maybe_string(route.peer.as_ref()),
            maybe_string(route.interface.as_ref()),
            maybe_string(route.source.as_ref()),
            since,
            route.attribute("as_path").unwrap_or(EMPTY_VALUE),
            route.community.iter().join(" "),
        ]
    }
}
