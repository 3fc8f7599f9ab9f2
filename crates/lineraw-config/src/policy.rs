use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Policy applied to the identifiers of numbered commands.
///
/// The wire protocol carries a non-negative integer with every `COMMAND`
/// token so that asynchronous results can be correlated with the command that
/// produced them. Sent identifiers are expected to increase, but the original
/// dispatch logic never checked this; the policy makes the choice explicit.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CommandIdPolicy {
    /// Reject identifiers that are not strictly greater than the last
    /// accepted identifier. Duplicate and decreasing identifiers are
    /// protocol violations; gaps are allowed.
    #[default]
    Strict,
    /// Accept any identifier, including duplicates.
    Lenient,
}

/// Errors encountered while parsing a [`CommandIdPolicy`] from text.
pub type CommandIdPolicyParseError = strum::ParseError;
