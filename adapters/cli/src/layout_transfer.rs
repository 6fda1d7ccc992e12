//! Single-line codes that carry a map seed and tower layout between sessions.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use seedpath_core::TowerKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "seedpath";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the seed and payload.
pub(crate) const SNAPSHOT_HEADER: &str = "seedpath:v1";
const FIELD_DELIMITER: char = ':';

/// Seed, canvas and towers of a map captured for transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutSnapshot {
    /// Seed the path is generated from.
    #[serde(skip)]
    pub(crate) seed: u32,
    /// Canvas width in world units.
    pub(crate) canvas_width: f32,
    /// Canvas height in world units.
    pub(crate) canvas_height: f32,
    /// Towers composing the layout.
    pub(crate) towers: Vec<LayoutTower>,
}

/// Tower captured within a layout snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutTower {
    /// Kind of tower.
    pub(crate) kind: TowerKind,
    /// Horizontal centre in world units.
    pub(crate) x: f32,
    /// Vertical centre in world units.
    pub(crate) y: f32,
}

impl LayoutSnapshot {
    /// Encodes the snapshot as `seedpath:v1:<seed>:<payload>`.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(self).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{encoded}", self.seed))
    }

    /// Decodes a snapshot from its transfer code.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let seed = parts.next().ok_or(LayoutTransferError::MissingSeed)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }
        if parts.next().is_some() {
            return Err(LayoutTransferError::TrailingFields);
        }

        let seed = seed
            .parse::<u32>()
            .map_err(|_| LayoutTransferError::InvalidSeed(seed.to_owned()))?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: Self =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self { seed, ..decoded })
    }
}

/// Errors that can occur while handling layout transfer codes.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout code was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("layout code is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("layout code is missing the version")]
    MissingVersion,
    /// The seed segment was missing.
    #[error("layout code is missing the seed")]
    MissingSeed,
    /// The payload segment was missing.
    #[error("layout code is missing the payload")]
    MissingPayload,
    /// More segments followed the payload.
    #[error("layout code has unexpected trailing fields")]
    TrailingFields,
    /// The prefix named another format.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version is not understood.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The seed is not an unsigned 32-bit integer.
    #[error("could not parse layout seed '{0}'")]
    InvalidSeed(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload is not a valid layout document.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}
