//! Result units to decorations.
//!
//! Conversion is pure: it partitions units into decorations per layer and
//! failures, and leaves applying and reporting to the orchestrator.

use lens_overlay::{Annotation, Decoration, LayerId};
use lens_protocol::{AnalysisOutput, BackendError, BodyBoundaries, PermissionsBoundary, UnitResult};
use lens_trace::Trace;

use crate::PermissionsConfig;

/// Decorations for the layers one result fills, plus its failed units.
#[derive(Debug, Default)]
pub(crate) struct Converted {
    pub layers: Vec<(LayerId, Vec<Decoration>)>,
    pub failed: Vec<(usize, BackendError)>,
    pub applied: usize,
}

fn boundary(unit: usize, b: PermissionsBoundary) -> Decoration {
    Decoration::new(b.range(), Some(unit), Annotation::Boundary(b))
}

pub(crate) fn permissions(units: Vec<UnitResult<AnalysisOutput>>, config: PermissionsConfig) -> Converted {
    let mut loans = Vec::new();
    let mut boundaries = Vec::new();
    let mut steps = Vec::new();
    let mut converted = Converted::default();

    for (unit, result) in units.into_iter().enumerate() {
        let output = match result {
            Ok(output) => output,
            Err(error) => {
                converted.failed.push((unit, error));
                continue;
            }
        };
        converted.applied += 1;
        loans.extend(output.loans.into_iter().map(|loan| {
            Decoration::new(
                loan.range(),
                Some(unit),
                Annotation::Loan {
                    key: loan.key,
                    issued_at: loan.issued_at,
                    refined: loan.refined_ranges,
                },
            )
        }));
        if config.boundaries {
            boundaries.extend(output.boundaries.into_iter().map(|b| boundary(unit, b)));
        }
        if config.stepper {
            steps.extend(
                output
                    .steps
                    .into_iter()
                    .map(|s| Decoration::new(s.location, Some(unit), Annotation::Step(s))),
            );
        }
    }

    // Disabled layers are still replaced, with nothing.
    converted.layers.push((LayerId::LoanFacts, loans));
    converted.layers.push((LayerId::Boundaries, boundaries));
    converted.layers.push((LayerId::Steps, steps));
    converted
}

pub(crate) fn boundaries(units: Vec<UnitResult<BodyBoundaries>>) -> Converted {
    let mut decorations = Vec::new();
    let mut converted = Converted::default();
    for (unit, result) in units.into_iter().enumerate() {
        match result {
            Ok(body) => {
                converted.applied += 1;
                decorations.extend(body.boundaries.into_iter().map(|b| boundary(unit, b)));
            }
            Err(error) => converted.failed.push((unit, error)),
        }
    }
    converted.layers.push((LayerId::Boundaries, decorations));
    converted
}

/// One marker per renderable step, positions as returned by [`Trace::renderable`].
pub(crate) fn markers(trace: &Trace, renderable: &[usize]) -> Vec<Decoration> {
    renderable
        .iter()
        .filter_map(|&pos| {
            let step = trace.get(pos)?;
            Some(Decoration::new(step.range, None, Annotation::Marker { step: pos }))
        })
        .collect()
}

#[cfg(test)]
mod tests;
