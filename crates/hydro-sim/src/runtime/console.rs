use hydro_core::{Command, SettingError, SettingKey, SettingRanges, SettingRequest};
use thiserror::Error;

pub const HELP: &str = "\
commands:
    start                   run the start-up procedure
    stop                    run the normal shutdown procedure
    estop [reason...]       emergency stop
    ack                     acknowledge an active alert
    set <key> <value>       change a setpoint (waterHead, intakeGatePosition,
                            guideVanePosition, targetVoltage, targetFrequency)
    grid-fault              simulate a major grid fault
    clog                    toggle trash rack clogging
    comms                   toggle SCADA communication loss
    reset-faults            clear every fault scenario
    status                  print status, clock and fault flags
    metrics                 print the operator view of the unit
    snapshot                print the full session snapshot as JSON
    logs [n]                print the newest n operator log lines
    help                    print this text
    quit                    dispose the session and exit";

const DEFAULT_LOG_LINES: usize = 10;

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Command(Command),
    Status,
    Metrics,
    Snapshot,
    Logs(usize),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConsoleError {
    #[error("unknown command '{0}' (type 'help')")]
    UnknownCommand(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error(transparent)]
    Setting(#[from] SettingError),
}

/// Parses one console line. Blank lines yield `Ok(None)`.
///
/// `set` values are checked against `ranges` before a command is built.
pub fn parse_line(
    line: &str,
    ranges: &SettingRanges,
) -> Result<Option<ConsoleInput>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "start" => ConsoleInput::Command(Command::Start),
        "stop" => ConsoleInput::Command(Command::Stop),
        "estop" | "e-stop" | "emergency-stop" => {
            let reason = words.collect::<Vec<_>>().join(" ");
            ConsoleInput::Command(Command::EmergencyStop {
                reason: (!reason.is_empty()).then_some(reason),
            })
        }
        "ack" | "acknowledge" => ConsoleInput::Command(Command::AcknowledgeAlert),
        "set" => {
            let key: SettingKey = words
                .next()
                .ok_or(ConsoleError::MissingArgument {
                    command: "set",
                    argument: "a setting key",
                })?
                .parse()?;
            let raw = words.next().ok_or(ConsoleError::MissingArgument {
                command: "set",
                argument: "a value",
            })?;
            let value: f64 = raw
                .parse()
                .map_err(|_| ConsoleError::InvalidNumber(raw.to_string()))?;
            let request = SettingRequest::new(key, value).check(ranges)?;
            ConsoleInput::Command(Command::UpdateSetting {
                key: request.key(),
                value: request.value(),
            })
        }
        "grid-fault" | "grid" => ConsoleInput::Command(Command::TriggerGridFault),
        "clog" => ConsoleInput::Command(Command::ToggleTrashRackClogging),
        "comms" => ConsoleInput::Command(Command::ToggleCommsLoss),
        "reset-faults" | "reset" => ConsoleInput::Command(Command::ResetFaults),
        "status" => ConsoleInput::Status,
        "metrics" => ConsoleInput::Metrics,
        "snapshot" => ConsoleInput::Snapshot,
        "logs" => {
            let count = match words.next() {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| ConsoleError::InvalidNumber(raw.to_string()))?,
                None => DEFAULT_LOG_LINES,
            };
            ConsoleInput::Logs(count)
        }
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" => ConsoleInput::Quit,
        _ => return Err(ConsoleError::UnknownCommand(verb.to_string())),
    };
    Ok(Some(input))
}
