use crate::models::alert::{ AlertKind, HealthAlert, Severity };
use log::info;
use std::error::Error;
use std::fs;

/// Loads the dashboard alert feed from `path`. The feed is static mock
/// data; a missing file falls back to the built-in set, a malformed one
/// is an error.
pub fn load_alerts(path: &str) -> Result<Vec<HealthAlert>, Box<dyn Error + Send + Sync>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let alerts: Vec<HealthAlert> = serde_json
                ::from_str(&content)
                .map_err(|e| format!("Failed to parse alert feed '{}': {}", path, e))?;
            info!("Loaded {} health alerts from: {}", alerts.len(), path);
            Ok(alerts)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No alert feed at '{}', using built-in mock alerts", path);
            Ok(default_alerts())
        }
        Err(e) => Err(format!("Failed to read alert feed '{}': {}", path, e).into()),
    }
}

pub fn default_alerts() -> Vec<HealthAlert> {
    vec![
        HealthAlert {
            id: "1".to_string(),
            kind: AlertKind::Outbreak,
            title: "Dengue Awareness".to_string(),
            description: "Rising cases reported in urban sectors. Please ensure no stagnant water around homes.".to_string(),
            severity: Severity::High,
            date: "2024-05-20".to_string(),
        },
        HealthAlert {
            id: "2".to_string(),
            kind: AlertKind::Vaccination,
            title: "Polio Drive 2024".to_string(),
            description: "National Immunization Day scheduled for children under 5 years on June 15th.".to_string(),
            severity: Severity::Medium,
            date: "2024-06-15".to_string(),
        },
        HealthAlert {
            id: "3".to_string(),
            kind: AlertKind::Preventive,
            title: "Heatwave Warning".to_string(),
            description: "Stay hydrated and avoid direct sun exposure between 12 PM and 4 PM.".to_string(),
            severity: Severity::Medium,
            date: "2024-05-22".to_string(),
        }
    ]
}
