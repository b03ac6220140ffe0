use super::ModalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role attribute written on the dialog chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromeRole {
    Dialog,
    AlertDialog,
}

impl ChromeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChromeRole::Dialog => "dialog",
            ChromeRole::AlertDialog => "alertdialog",
        }
    }
}

impl fmt::Display for ChromeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChromeRole {
    type Err = ModalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dialog" => Ok(ChromeRole::Dialog),
            "alertdialog" => Ok(ChromeRole::AlertDialog),
            other => Err(ModalError::InvalidRole(other.to_string())),
        }
    }
}
