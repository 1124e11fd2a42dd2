use crate::entity::NotificationKind;
use crate::state::Snapshot;
use serde_json::json;

/// Render the system prompt describing the current factory state
///
/// Lists every machine (name, status, efficiency, issue) as JSON, the latest
/// production rate and the unread non-info notifications as active alerts.
pub fn build_system_context(snapshot: &Snapshot, user_message: &str) -> String {
    let machines: Vec<_> = snapshot
        .machines
        .iter()
        .map(|m| {
            json!({
                "name": m.name,
                "status": m.status,
                "efficiency": m.efficiency,
                "issue": m.issue_detected,
            })
        })
        .collect();
    let machines = serde_json::Value::Array(machines).to_string();

    let production_rate = snapshot
        .latest_production()
        .map(|s| format!("{:.1}", s.production_rate))
        .unwrap_or_else(|| "n/a".to_string());

    let alerts: Vec<&str> = snapshot
        .notifications
        .iter()
        .filter(|n| !n.read && n.kind != NotificationKind::Info)
        .map(|n| n.message.as_str())
        .collect();
    let alerts = if alerts.is_empty() {
        "None".to_string()
    } else {
        alerts.join(", ")
    };

    format!(
        "You are a Smart Factory AI Assistant.\n\
         Current System State:\n\
         - Machines: {machines}\n\
         - Latest Production Rate: {production_rate} units/hr\n\
         - Active Alerts: {alerts}\n\
         \n\
         User Question: {user_message}\n\
         \n\
         Answer concisely based on the real-time data provided above. If a machine has an \
         issue, recommend specific maintenance actions."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityStore;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot() -> Snapshot {
        EntityStore::seeded(&mut StdRng::seed_from_u64(1), Utc::now(), 12).snapshot()
    }

    #[test]
    fn test_context_lists_machines_and_alerts() {
        let snapshot = snapshot();
        let context = build_system_context(&snapshot, "What maintenance is needed?");

        for machine in &snapshot.machines {
            assert!(context.contains(&machine.name));
        }
        assert!(context.contains("\"status\":\"critical\""));
        assert!(context.contains("Hydraulic pressure below threshold"));
        // Unread error notification is an active alert; the read info one is not
        assert!(context.contains("- Active Alerts: Packaging Unit D4 requires immediate maintenance."));
        assert!(!context.contains("AI Model updated"));
        assert!(context.contains("User Question: What maintenance is needed?"));
    }

    #[test]
    fn test_context_production_rate_one_decimal() {
        let snapshot = snapshot();
        let rate = snapshot.latest_production().unwrap().production_rate;
        let context = build_system_context(&snapshot, "rate?");
        assert!(context.contains(&format!("Latest Production Rate: {:.1} units/hr", rate)));
    }

    #[test]
    fn test_context_without_alerts() {
        let mut snapshot = snapshot();
        snapshot.notifications.iter_mut().for_each(|n| n.read = true);
        snapshot.production_metrics.clear();

        let context = build_system_context(&snapshot, "hi");
        assert!(context.contains("- Active Alerts: None"));
        assert!(context.contains("Latest Production Rate: n/a units/hr"));
    }
}
