//! Endpoint kinds supported by the search API.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SireneError;

/// The two search scopes of the Sirene API.
///
/// `Siret` targets establishments, `Siren` targets legal units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    #[default]
    Siret,
    Siren,
}

impl EndpointKind {
    /// Path segment appended to the base URL
    pub fn path(&self) -> &'static str {
        match self {
            EndpointKind::Siret => "siret",
            EndpointKind::Siren => "siren",
        }
    }

    /// JSON key holding the records in a search response
    pub fn resource_root(&self) -> &'static str {
        match self {
            EndpointKind::Siret => "etablissements",
            EndpointKind::Siren => "unitesLegales",
        }
    }
}

impl FromStr for EndpointKind {
    type Err = SireneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "siret" => Ok(EndpointKind::Siret),
            "siren" => Ok(EndpointKind::Siren),
            _ => Err(SireneError::InvalidEndpoint(s.to_string())),
        }
    }
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
