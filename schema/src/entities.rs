use std::fmt;

use crate::ScheduleError;

/// Landing priority. Emergencies sort before routine landings.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Emergency,
    #[default]
    Routine,
}

impl Priority {
    /// Numeric priority, lower is served first
    pub fn value(&self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Routine => 1,
        }
    }
}

/// What an aircraft is asking the tower for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Landing,
    Takeoff,
    EmergencyLanding,
    /// Drop any pending requests for the aircraft
    Withdraw,
}

impl<'a> TryFrom<&'a str> for RequestKind {
    type Error = ScheduleError;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        match s.trim() {
            "landing" => Ok(Self::Landing),
            "takeoff" => Ok(Self::Takeoff),
            "emergency landing" => Ok(Self::EmergencyLanding),
            "withdraw" => Ok(Self::Withdraw),
            other => Err(ScheduleError::InvalidRequestKind(other.to_string())),
        }
    }
}

/// Radio call sign of an aircraft, e.g. `GABCD`, `BAWBCDE` or `BAW 12X4`
#[derive(Default, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallSign(String);

impl CallSign {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CallSign {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for CallSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An `AircraftRequest` is a single landing, takeoff or withdrawal call made to the tower
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AircraftRequest {
    pub kind: RequestKind,
    /// Flight number, not necessarily unique within a run
    pub flight_number: u16,
    /// Call sign, not necessarily unique within a run
    pub call_sign: CallSign,
}

impl AircraftRequest {
    pub fn new(kind: RequestKind, flight_number: u16, call_sign: impl Into<CallSign>) -> Self {
        Self {
            kind,
            flight_number,
            call_sign: call_sign.into(),
        }
    }

    pub fn landing(flight_number: u16, call_sign: impl Into<CallSign>) -> Self {
        Self::new(RequestKind::Landing, flight_number, call_sign)
    }

    pub fn emergency_landing(flight_number: u16, call_sign: impl Into<CallSign>) -> Self {
        Self::new(RequestKind::EmergencyLanding, flight_number, call_sign)
    }

    pub fn takeoff(flight_number: u16, call_sign: impl Into<CallSign>) -> Self {
        Self::new(RequestKind::Takeoff, flight_number, call_sign)
    }

    pub fn withdraw(flight_number: u16, call_sign: impl Into<CallSign>) -> Self {
        Self::new(RequestKind::Withdraw, flight_number, call_sign)
    }

    /// Parses a request script: one `kind, flight_number, call_sign` per line.
    /// Blank lines and `#` comments are skipped.
    pub fn from_script(script: &str) -> Result<Vec<Self>, ScheduleError> {
        let mut requests = vec![];

        for (index, line) in script.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = |reason: String| ScheduleError::MalformedRequest {
                line: index + 1,
                reason,
            };

            let values = line.splitn(3, ", ").collect::<Vec<_>>();
            let [kind, flight_number, call_sign] = values[..] else {
                return Err(malformed(format!("expected 3 fields, found {}", values.len())));
            };

            let flight_number = flight_number
                .trim()
                .parse::<u16>()
                .map_err(|e| malformed(format!("flight number {flight_number:?}: {e}")))?;
            let call_sign = call_sign.trim();
            if call_sign.is_empty() {
                return Err(malformed("empty call sign".to_string()));
            }

            let kind = RequestKind::try_from(kind).map_err(|e| malformed(e.to_string()))?;

            requests.push(Self::new(kind, flight_number, call_sign));
        }

        Ok(requests)
    }

    /// Reads and parses a request script from disk
    pub fn from_script_path(path: impl AsRef<std::path::Path>) -> Result<Vec<Self>, ScheduleError> {
        let script = std::fs::read_to_string(path)?;
        Self::from_script(&script)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Land,
    Takeoff,
}

/// A clearance issued by the tower
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlAction {
    pub flight_number: u16,
    pub call_sign: CallSign,
    pub action: Action,
    /// Set only for landings which were queued with `Priority::Emergency`
    pub emergency: bool,
}

impl ControlAction {
    pub fn land(flight_number: u16, call_sign: CallSign, priority: Priority) -> Self {
        Self {
            flight_number,
            call_sign,
            action: Action::Land,
            emergency: priority == Priority::Emergency,
        }
    }

    pub fn takeoff(flight_number: u16, call_sign: CallSign) -> Self {
        Self {
            flight_number,
            call_sign,
            action: Action::Takeoff,
            emergency: false,
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::Land => "land",
            Action::Takeoff => "takeoff",
        };
        write!(
            f,
            "CONTROL: {} ({}) {}",
            self.flight_number, self.call_sign, action
        )?;
        if self.emergency {
            f.write_str(" (Emergency)")?;
        }
        Ok(())
    }
}

/// Observable tower activity, rendered one line per event by the sink
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TowerEvent {
    Accepted(AircraftRequest),
    Control(ControlAction),
}

impl fmt::Display for TowerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted(request) => {
                let wants = match request.kind {
                    RequestKind::Takeoff => "requests takeoff",
                    RequestKind::EmergencyLanding => "requests emergency landing",
                    RequestKind::Landing => "requests landing",
                    RequestKind::Withdraw => "withdraws its requests",
                };
                write!(
                    f,
                    "Flight {} ({}) {}",
                    request.flight_number, request.call_sign, wants
                )
            }
            Self::Control(action) => fmt::Display::fmt(action, f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sink_lines() {
        let cases = [
            (
                TowerEvent::Accepted(AircraftRequest::takeoff(202, "BBB1234")),
                "Flight 202 (BBB1234) requests takeoff",
            ),
            (
                TowerEvent::Accepted(AircraftRequest::emergency_landing(303, "CCCCC")),
                "Flight 303 (CCCCC) requests emergency landing",
            ),
            (
                TowerEvent::Accepted(AircraftRequest::landing(101, "AAA 12B4")),
                "Flight 101 (AAA 12B4) requests landing",
            ),
            (
                TowerEvent::Control(ControlAction::land(
                    303,
                    "CCCCC".into(),
                    Priority::Emergency,
                )),
                "CONTROL: 303 (CCCCC) land (Emergency)",
            ),
            (
                TowerEvent::Control(ControlAction::land(101, "AAAAA".into(), Priority::Routine)),
                "CONTROL: 101 (AAAAA) land",
            ),
            (
                TowerEvent::Control(ControlAction::takeoff(202, "BBB1234".into())),
                "CONTROL: 202 (BBB1234) takeoff",
            ),
        ];

        for (event, line) in cases {
            assert_eq!(event.to_string(), line);
        }
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::Emergency < Priority::Routine);
        assert_eq!(Priority::Emergency.value(), 0);
        assert_eq!(Priority::Routine.value(), 1);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = RequestKind::try_from("touch and go").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidRequestKind(kind) if kind == "touch and go"));
    }

    #[test]
    fn test_from_script() -> Result<(), ScheduleError> {
        let script = "\
# kind, flight, call sign
landing, 101, AAAAA

takeoff, 202, BBB1234
emergency landing, 303, CCC 12X4
withdraw, 202, BBB1234
";
        let requests = AircraftRequest::from_script(script)?;

        assert_eq!(
            requests,
            vec![
                AircraftRequest::landing(101, "AAAAA"),
                AircraftRequest::takeoff(202, "BBB1234"),
                AircraftRequest::emergency_landing(303, "CCC 12X4"),
                AircraftRequest::withdraw(202, "BBB1234"),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_from_script_errors() {
        let err = AircraftRequest::from_script("landing, 101, AAAAA\nhover, 7, ZZZZZ").unwrap_err();
        assert!(
            matches!(&err, ScheduleError::MalformedRequest { line: 2, reason } if reason.contains("hover")),
            "{err}"
        );

        let err = AircraftRequest::from_script("landing, 101").unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedRequest { line: 1, .. }));

        let err = AircraftRequest::from_script("\n\ntakeoff, abc, ZZZZZ").unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedRequest { line: 3, .. }));
    }
}
