//! Impact level of a decision option.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Impact of choosing an option.
///
/// Persisted data from older clients may carry impact strings this crate
/// does not know; those load as `Unknown`, keep their label when written
/// back and rank below `Low`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Impact {
    Low,
    #[default]
    Medium,
    High,
    Unknown(String),
}

impl Impact {
    /// Rank used by the recommendation tie-break.
    pub fn rank(&self) -> u8 {
        match self {
            Impact::High => 3,
            Impact::Medium => 2,
            Impact::Low => 1,
            Impact::Unknown(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
            Impact::Unknown(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Impact::Unknown(_))
    }

    fn from_label(label: String) -> Self {
        match label.as_str() {
            "low" => Impact::Low,
            "medium" => Impact::Medium,
            "high" => Impact::High,
            _ => Impact::Unknown(label),
        }
    }
}

impl Serialize for Impact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Impact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Impact::from_label(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_orders_high_over_medium_over_low_over_unknown() {
        assert!(Impact::High.rank() > Impact::Medium.rank());
        assert!(Impact::Medium.rank() > Impact::Low.rank());
        let unknown = Impact::Unknown("critical".to_string());
        assert!(Impact::Low.rank() > unknown.rank());
        assert_eq!(unknown.rank(), 0);
    }

    #[test]
    fn unrecognized_labels_deserialize_as_unknown() {
        let impact: Impact = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(impact, Impact::Unknown("critical".to_string()));
        assert!(!impact.is_known());
    }

    #[test]
    fn unrecognized_labels_are_written_back_unchanged() {
        let impact: Impact = serde_json::from_str("\"Critical!\"").unwrap();
        assert_eq!(serde_json::to_string(&impact).unwrap(), "\"Critical!\"");
    }

    #[test]
    fn known_labels_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Impact::High).unwrap(), "\"high\"");
        let impact: Impact = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(impact, Impact::Low);
    }
}
