//! Operator console commands

use rcs_panel_core::{ActivationTrigger, ConditionKind};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    /// Screen activation, delivered to the registry
    Activate(ActivationTrigger),
    Acknowledge,
    /// Acknowledge a single condition by id
    AcknowledgeOne(String),
    Silence,
    ToggleTrip,
    /// Set the simulated running reactor coolant pump count
    SetPumps(u32),
    /// Pin a simulated channel to a value
    SetValue(ConditionKind, f64),
    ClearLog,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unknown instrument '{0}'")]
    UnknownKind(String),
}

pub const HELP: &str = "\
commands:
  1-9            show screen by key
  a [id]         acknowledge all alarms, or one condition
  s              silence the audible cue
  t              toggle the simulated reactor trip
  p <n>          set running coolant pumps
  v <kind> <x>   pin a simulated channel, e.g. v power 112
  c              clear the alarm log
  h              this help
  q              quit";

impl FromStr for OperatorCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };

        if head.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self::Activate(ActivationTrigger::Key(head.to_string())));
        }

        let command = match head.to_ascii_lowercase().as_str() {
            "a" | "ack" => match words.next() {
                Some(id) => Self::AcknowledgeOne(id.to_string()),
                None => Self::Acknowledge,
            },
            "s" | "silence" => Self::Silence,
            "t" | "trip" => Self::ToggleTrip,
            "p" | "pumps" => {
                let count = words.next().ok_or(CommandError::MissingArgument {
                    command: "p",
                    expected: "a pump count",
                })?;
                Self::SetPumps(
                    count
                        .parse()
                        .map_err(|_| CommandError::InvalidNumber(count.to_string()))?,
                )
            }
            "v" | "value" => {
                let missing = CommandError::MissingArgument {
                    command: "v",
                    expected: "a kind and a value",
                };
                let (Some(kind), Some(value)) = (words.next(), words.next()) else {
                    return Err(missing);
                };
                let kind = kind
                    .parse()
                    .map_err(|_| CommandError::UnknownKind(kind.to_string()))?;
                let value = value
                    .parse()
                    .map_err(|_| CommandError::InvalidNumber(value.to_string()))?;
                Self::SetValue(kind, value)
            }
            "c" | "clear" => Self::ClearLog,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(head.to_string())),
        };
        Ok(command)
    }
}
