//! Core identifier and version types for the policy ledger.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// User identifier (owner of acknowledgments and notifications)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification row identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub uuid::Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Policy document category.
///
/// The closed set of documents the platform versions independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Terms,
    Privacy,
    CodeOfConduct,
    TrustSafety,
}

impl PolicyKind {
    /// All kinds, in display order.
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Terms,
        PolicyKind::Privacy,
        PolicyKind::CodeOfConduct,
        PolicyKind::TrustSafety,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Terms => "terms",
            PolicyKind::Privacy => "privacy",
            PolicyKind::CodeOfConduct => "code_of_conduct",
            PolicyKind::TrustSafety => "trust_safety",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terms" => Ok(PolicyKind::Terms),
            "privacy" => Ok(PolicyKind::Privacy),
            "code_of_conduct" => Ok(PolicyKind::CodeOfConduct),
            "trust_safety" => Ok(PolicyKind::TrustSafety),
            other => Err(format!("unknown policy kind: {other}")),
        }
    }
}

/// Policy document version, counted in tenths.
///
/// `PolicyVersion(11)` renders as `1.1`. Each publish bumps by exactly one
/// tenth. Integer tenths avoid float-equality hazards while keeping the
/// user-visible `major.minor` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyVersion(pub u32);

impl PolicyVersion {
    /// Version assigned by the first publish of a kind: `1.0`.
    pub const INITIAL: PolicyVersion = PolicyVersion(10);

    pub fn from_tenths(tenths: u32) -> Self {
        Self(tenths)
    }

    pub fn as_tenths(&self) -> u32 {
        self.0
    }

    /// The next version: one tenth above this one.
    pub fn bump(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl FromStr for PolicyVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("invalid version (want major.minor): {s}"))?;
        let major: u32 = major
            .parse()
            .map_err(|_| format!("invalid version major: {s}"))?;
        let minor: u32 = minor
            .parse()
            .map_err(|_| format!("invalid version minor: {s}"))?;
        if minor > 9 {
            return Err(format!("version minor must be a single digit: {s}"));
        }
        Ok(Self(major * 10 + minor))
    }
}

impl Serialize for PolicyVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PolicyVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
