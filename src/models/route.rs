use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One route entry from `show route`, with any `BGP.*` attributes that followed it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: Option<String>,
    pub peer: Option<String>,
    pub interface: Option<String>,
    pub source: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    // Attribute name (without the `BGP.` prefix) -> value, in the order seen
    pub attributes: IndexMap<String, Option<String>>,
    pub community: Vec<String>,
}

impl Route {
    pub fn new(prefix: Option<String>) -> Self {
        Route {
            prefix,
            ..Default::default()
        }
    }

    /// Value of a `BGP.<name>` attribute, if it was present and had a value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_deref())
    }
}

// Attributes are flattened as "BGP.<name>" keys next to the summary fields
impl Serialize for Route {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(7 + self.attributes.len()))?;
        map.serialize_entry("prefix", &self.prefix)?;
        map.serialize_entry("peer", &self.peer)?;
        map.serialize_entry("interface", &self.interface)?;
        map.serialize_entry("source", &self.source)?;
        map.serialize_entry("date", &self.date)?;
        map.serialize_entry("time", &self.time)?;
        for (name, value) in &self.attributes {
            map.serialize_entry(&format!("BGP.{}", name), value)?;
        }
        map.serialize_entry("community", &self.community)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_serialize() {
        let mut route = Route::new(Some("10.0.0.0/24".to_string()));
        route.peer = Some("192.0.2.1".to_string());
        route
            .attributes
            .insert("as_path".to_string(), Some("65000 65001".to_string()));
        route.attributes.insert("atomic_aggr".to_string(), None);
        route.community = vec!["65000:100".to_string()];

        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(value["prefix"], "10.0.0.0/24");
        assert_eq!(value["peer"], "192.0.2.1");
        assert!(value["interface"].is_null());
        assert_eq!(value["BGP.as_path"], "65000 65001");
        assert!(value["BGP.atomic_aggr"].is_null());
        assert_eq!(value["community"], serde_json::json!(["65000:100"]));
    }

    #[test]
    fn test_route_attribute() {
        let mut route = Route::new(None);
        route.attributes.insert("origin".to_string(), Some("IGP".to_string()));
        route.attributes.insert("atomic_aggr".to_string(), None);
        assert_eq!(route.attribute("origin"), Some("IGP"));
        assert_eq!(route.attribute("atomic_aggr"), None);
        assert_eq!(route.attribute("med"), None);
    }
}
