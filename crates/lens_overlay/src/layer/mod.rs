//! Layer identity and decoration payloads.

use std::fmt;

use lens_ir::CharRange;
use lens_protocol::{Permissions, PermissionsBoundary, PermissionsStateStep};

/// One annotation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    /// Loan regions from the permissions analysis.
    LoanFacts,
    /// Permission boundaries at use sites.
    Boundaries,
    /// Permission state after each statement.
    Steps,
    /// Interpreter step markers.
    InterpMarkers,
}

impl LayerId {
    pub const ALL: [LayerId; 4] = [
        LayerId::LoanFacts,
        LayerId::Boundaries,
        LayerId::Steps,
        LayerId::InterpMarkers,
    ];

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerId::LoanFacts => "loan-facts",
            LayerId::Boundaries => "boundaries",
            LayerId::Steps => "steps",
            LayerId::InterpMarkers => "interp-markers",
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a decoration shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Annotation {
    /// A live loan and the ranges whose permissions it refines.
    Loan {
        key: u32,
        issued_at: CharRange,
        refined: Vec<CharRange>,
    },
    /// Permissions expected and held at a use site.
    Boundary(PermissionsBoundary),
    /// Permission changes at the end of a statement.
    Step(PermissionsStateStep),
    /// Interpreter step `step` executes here.
    Marker { step: usize },
}

impl Annotation {
    /// Short label for text-mode rendering.
    pub fn label(&self) -> String {
        match self {
            Annotation::Loan { key, .. } => format!("loan L{key}"),
            Annotation::Boundary(b) => {
                let missing = b.missing();
                if missing == Permissions::empty() {
                    format!("{} ok", b.expected)
                } else {
                    format!("{} missing {missing}", b.expected)
                }
            }
            Annotation::Step(s) => format!("{} places", s.state.len()),
            Annotation::Marker { step } => format!("L{}", step + 1),
        }
    }
}

/// A range-tagged annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoration {
    pub range: CharRange,
    /// Index of the result unit that produced this decoration.
    pub unit: Option<usize>,
    pub annotation: Annotation,
}

impl Decoration {
    pub fn new(range: CharRange, unit: Option<usize>, annotation: Annotation) -> Self {
        Decoration {
            range,
            unit,
            annotation,
        }
    }
}
