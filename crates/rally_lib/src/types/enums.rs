use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of contestants a vote can pick.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Roach {
    Jesse,
    Brian,
    Greg,
    Dale,
}

impl Roach {
    pub fn as_str(&self) -> &'static str {
        match self {
            Roach::Jesse => "JESSE",
            Roach::Brian => "BRIAN",
            Roach::Greg => "GREG",
            Roach::Dale => "DALE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "JESSE" => Some(Roach::Jesse),
            "BRIAN" => Some(Roach::Brian),
            "GREG" => Some(Roach::Greg),
            "DALE" => Some(Roach::Dale),
            _ => None,
        }
    }
}

impl fmt::Display for Roach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RaceStatus {
    Open,
    Locked,
    Settled,
}

impl RaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceStatus::Open => "OPEN",
            RaceStatus::Locked => "LOCKED",
            RaceStatus::Settled => "SETTLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(RaceStatus::Open),
            "LOCKED" => Some(RaceStatus::Locked),
            "SETTLED" => Some(RaceStatus::Settled),
            _ => None,
        }
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
