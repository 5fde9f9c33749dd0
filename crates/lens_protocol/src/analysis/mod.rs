//! Permission analysis payloads.
//!
//! These are the per-body results of the `permissions` and `boundaries`
//! commands. Locations are character offsets into the analyzed document.

use std::fmt;

use bitflags::bitflags;
use lens_ir::CharRange;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// What a place may be used for at some point in the program.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Permissions: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        /// Ownership: the place may be moved out of or dropped.
        const DROP = 1 << 2;
    }
}

#[derive(Serialize, Deserialize)]
struct PermissionsWire {
    read: bool,
    write: bool,
    drop: bool,
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PermissionsWire {
            read: self.contains(Permissions::READ),
            write: self.contains(Permissions::WRITE),
            drop: self.contains(Permissions::DROP),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = PermissionsWire::deserialize(deserializer)?;
        let mut perms = Permissions::empty();
        perms.set(Permissions::READ, wire.read);
        perms.set(Permissions::WRITE, wire.write);
        perms.set(Permissions::DROP, wire.drop);
        Ok(perms)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("∅");
        }
        for (flag, letter) in [
            (Permissions::READ, "R"),
            (Permissions::WRITE, "W"),
            (Permissions::DROP, "D"),
        ] {
            if self.contains(flag) {
                f.write_str(letter)?;
            }
        }
        Ok(())
    }
}

/// What refined a place's permissions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Refiner {
    /// A borrow created at this range.
    Loan(CharRange),
    /// A move at this range.
    Move(CharRange),
}

/// The stretch of code over which a refinement holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementRegion {
    pub refiner_point: Refiner,
    pub refined_ranges: Vec<CharRange>,
    pub start: usize,
    pub end: usize,
}

/// Why one permission is missing at a boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MissingPermReason {
    /// The type never grants it (e.g. writing through `&T`).
    InsufficientType,
    /// A loan or move took it away.
    Refined(RefinementRegion),
}

/// Explanations for each missing permission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPermsInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<MissingPermReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<MissingPermReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop: Option<MissingPermReason>,
}

/// A point where a place is used and the permissions it needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsBoundary {
    /// Character offset of the use.
    pub location: usize,
    pub expected: Permissions,
    pub actual: Permissions,
    #[serde(default)]
    pub was_copied: bool,
    #[serde(default)]
    pub explanations: MissingPermsInfo,
}

impl PermissionsBoundary {
    /// Permissions required but not held.
    pub fn missing(&self) -> Permissions {
        self.expected - self.actual
    }

    pub fn is_violation(&self) -> bool {
        !self.missing().is_empty()
    }

    /// Zero-length range at the use site.
    pub fn range(&self) -> CharRange {
        CharRange::point(self.location)
    }
}

/// How a fact changed across one step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ValueStep<T> {
    /// Became true.
    High,
    /// Became false.
    Low,
    /// Unchanged, optionally carrying the current value.
    None {
        #[serde(default)]
        value: Option<T>,
    },
}

impl<T> ValueStep<T> {
    pub fn is_change(&self) -> bool {
        !matches!(self, ValueStep::None { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsDiff {
    pub read: ValueStep<bool>,
    pub write: ValueStep<bool>,
    pub drop: ValueStep<bool>,
}

/// Everything that changed about one place across one step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsDataDiff {
    pub is_live: ValueStep<bool>,
    /// Key of the move that emptied the place.
    pub path_moved: ValueStep<u32>,
    /// Keys of loans refining each permission.
    pub loan_read_refined: ValueStep<u32>,
    pub loan_write_refined: ValueStep<u32>,
    pub loan_drop_refined: ValueStep<u32>,
    pub permissions: PermissionsDiff,
}

impl PermissionsDataDiff {
    pub fn is_change(&self) -> bool {
        self.is_live.is_change()
            || self.path_moved.is_change()
            || self.loan_read_refined.is_change()
            || self.loan_write_refined.is_change()
            || self.loan_drop_refined.is_change()
            || self.permissions.read.is_change()
            || self.permissions.write.is_change()
            || self.permissions.drop.is_change()
    }
}

/// Permission changes at the end of one statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsStateStep {
    pub location: CharRange,
    /// `(place, diff)` pairs in display order.
    pub state: Vec<(String, PermissionsDataDiff)>,
}

/// Where a loan lives in the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRegion {
    pub key: u32,
    /// Range of the borrow expression.
    pub issued_at: CharRange,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub refined_ranges: Vec<CharRange>,
}

impl LoanRegion {
    /// Range from creation to last use.
    pub fn range(&self) -> CharRange {
        CharRange::new(self.start, self.end.max(self.start))
    }
}

/// Result of `permissions` for one function body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub body_range: CharRange,
    #[serde(default)]
    pub boundaries: Vec<PermissionsBoundary>,
    #[serde(default)]
    pub steps: Vec<PermissionsStateStep>,
    #[serde(default)]
    pub loans: Vec<LoanRegion>,
}

/// Result of `boundaries` for one function body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyBoundaries {
    pub body_range: CharRange,
    #[serde(default)]
    pub boundaries: Vec<PermissionsBoundary>,
}
