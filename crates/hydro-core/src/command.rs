use crate::settings::SettingKey;
use serde::{Deserialize, Serialize};

/// Operator intent forwarded by a host into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Start,
    Stop,
    EmergencyStop { reason: Option<String> },
    AcknowledgeAlert,
    UpdateSetting { key: SettingKey, value: f64 },
    TriggerGridFault,
    ToggleTrashRackClogging,
    ToggleCommsLoss,
    ResetFaults,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::EmergencyStop { .. } => "emergency_stop",
            Command::AcknowledgeAlert => "acknowledge_alert",
            Command::UpdateSetting { .. } => "update_setting",
            Command::TriggerGridFault => "trigger_grid_fault",
            Command::ToggleTrashRackClogging => "toggle_trash_rack_clogging",
            Command::ToggleCommsLoss => "toggle_comms_loss",
            Command::ResetFaults => "reset_faults",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_tagged() {
        let cmd: Command = serde_json::from_str(
            r#"{ "type": "update_setting", "key": "guideVanePosition", "value": 40.0 }"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::UpdateSetting {
                key: SettingKey::GuideVanePosition,
                value: 40.0
            }
        );

        let estop: Command = serde_json::from_str(r#"{ "type": "emergency_stop" }"#).unwrap();
        assert_eq!(estop, Command::EmergencyStop { reason: None });
    }
}
