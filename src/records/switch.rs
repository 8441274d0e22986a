use std::fmt::{Display, Formatter};

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

/// Appliance kind attached to a switch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeviceType {
    Bulb,
    Fan,
    Tv,
    Fridge,
    Other(String),
}

impl From<&str> for DeviceType {
    fn from(device_type: &str) -> Self {
        match device_type {
            "bulb" => Self::Bulb,
            "fan" => Self::Fan,
            "tv" => Self::Tv,
            "fridge" => Self::Fridge,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bulb => f.write_str("bulb"),
            Self::Fan => f.write_str("fan"),
            Self::Tv => f.write_str("tv"),
            Self::Fridge => f.write_str("fridge"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Remote relay channel of the device.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Switch {
    pub id: String,
    pub name: String,
    pub device_type: DeviceType,
    pub is_on: bool,
    pub switch_number: Option<u32>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// Keys that live next to the switches but belong to the presence probe.
const PROBE_KEYS: [&str; 2] = ["Question", "Answer"];

impl Switch {
    /// Build a switch from an arbitrary node, filling in the defaults.
    fn from_node(id: String, default_name: String, node: &Value) -> Self {
        let name = non_empty_str(node.get("name")).map_or(default_name, str::to_owned);
        let device_type = non_empty_str(node.get("device_type")).unwrap_or("other").into();
        let switch_number = node
            .get("switch_number")
            .and_then(Value::as_u64)
            .and_then(|number| u32::try_from(number).ok());
        let updated_at = node
            .get("updated_at")
            .and_then(Value::as_str)
            .and_then(|timestamp| DateTime::parse_from_rfc3339(timestamp).ok());
        Self {
            id,
            name,
            device_type,
            is_on: node.get("is_on").is_some_and(is_truthy),
            switch_number,
            updated_at,
        }
    }

    /// Normalize the `switches` node, which is either an array or an object keyed by switch ID.
    ///
    /// Returns `None` when the node is absent or holds no switches at all.
    #[must_use]
    pub fn normalize_all(node: &Value) -> Option<Vec<Self>> {
        let switches: Vec<_> = match node {
            Value::Array(nodes) => nodes
                .iter()
                .enumerate()
                .map(|(index, node)| {
                    Self::from_node(index.to_string(), format!("Switch {}", index + 1), node)
                })
                .collect(),
            Value::Object(nodes) => Self::normalize_keyed(nodes),
            _ => Vec::new(),
        };
        if switches.is_empty() { None } else { Some(switches) }
    }

    fn normalize_keyed(nodes: &Map<String, Value>) -> Vec<Self> {
        nodes
            .iter()
            .filter(|(key, _)| !PROBE_KEYS.contains(&key.as_str()))
            .map(|(key, node)| Self::from_node(key.clone(), format!("Switch {key}"), node))
            .collect()
    }

    /// Four switches a freshly provisioned device starts with.
    pub fn defaults() -> Vec<Self> {
        [DeviceType::Bulb, DeviceType::Fan, DeviceType::Tv, DeviceType::Fridge]
            .into_iter()
            .zip(1_u32..)
            .map(|(device_type, number)| Self {
                id: (number - 1).to_string(),
                name: format!("Switch {number}"),
                device_type,
                is_on: false,
                switch_number: Some(number),
                updated_at: None,
            })
            .collect()
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|value| !value.is_empty())
}

/// Loose truthiness of a stored flag: `1`, `"yes"` and `true` all switch a relay on.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(value) => !value.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_array() {
        let switches = Switch::normalize_all(&json!([
            {"name": "Porch", "device_type": "bulb", "is_on": 1, "switch_number": 1},
            null,
            {"name": "", "device_type": 7, "is_on": "yes"},
        ]))
        .unwrap();
        assert_eq!(switches.len(), 3);

        assert_eq!(switches[0].id, "0");
        assert_eq!(switches[0].name, "Porch");
        assert_eq!(switches[0].device_type, DeviceType::Bulb);
        assert!(switches[0].is_on);
        assert_eq!(switches[0].switch_number, Some(1));

        assert_eq!(switches[1].name, "Switch 2");
        assert_eq!(switches[1].device_type, DeviceType::Other("other".to_owned()));
        assert!(!switches[1].is_on);

        assert_eq!(switches[2].name, "Switch 3");
        assert!(switches[2].is_on);
    }

    #[test]
    fn test_normalize_keyed_skips_probe() {
        let switches = Switch::normalize_all(&json!({
            "Question": "Hii",
            "Answer": "Am Here",
            "relay-a": {"is_on": false, "device_type": "fan", "updated_at": "2024-07-01T10:00:00+05:30"},
        }))
        .unwrap();
        assert_eq!(switches.len(), 1);
        assert_eq!(switches[0].id, "relay-a");
        assert_eq!(switches[0].name, "Switch relay-a");
        assert_eq!(switches[0].device_type, DeviceType::Fan);
        assert!(switches[0].updated_at.is_some());
    }

    #[test]
    fn test_normalize_missing() {
        assert_eq!(Switch::normalize_all(&Value::Null), None);
        assert_eq!(Switch::normalize_all(&json!({"Answer": "Am Here"})), None);
    }

    #[test]
    fn test_defaults() {
        let switches = Switch::defaults();
        assert_eq!(switches.len(), 4);
        assert_eq!(switches[3].id, "3");
        assert_eq!(switches[3].name, "Switch 4");
        assert_eq!(switches[3].device_type, DeviceType::Fridge);
    }
}
