use serde::{ Deserialize, Serialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Outbreak,
    Vaccination,
    Preventive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A public-health advisory shown on the dashboard. Read-only reference
/// data, never derived from the chat pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_wire_shape() {
        let alert = HealthAlert {
            id: "1".to_string(),
            kind: AlertKind::Outbreak,
            title: "Dengue Awareness".to_string(),
            description: "Rising cases reported.".to_string(),
            severity: Severity::High,
            date: "2024-05-20".to_string(),
        };
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"type\":\"outbreak\""));
        assert!(json.contains("\"severity\":\"high\""));

        let back: HealthAlert = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, AlertKind::Outbreak);
        assert_eq!(back.severity, Severity::High);
    }
}
