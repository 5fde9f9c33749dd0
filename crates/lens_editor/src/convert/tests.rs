use super::*;
use lens_ir::CharRange;
use lens_protocol::{LoanRegion, MissingPermsInfo, Permissions, PermissionsStateStep};
use lens_trace::{build_trace, Frame, RawStep, RawTrace};
use pretty_assertions::assert_eq;

fn output(location: usize) -> AnalysisOutput {
    AnalysisOutput {
        body_range: CharRange::new(0, 70),
        boundaries: vec![PermissionsBoundary {
            location,
            expected: Permissions::READ,
            actual: Permissions::READ,
            was_copied: false,
            explanations: MissingPermsInfo::default(),
        }],
        steps: vec![PermissionsStateStep {
            location: CharRange::new(location, location + 1),
            state: vec![],
        }],
        loans: vec![LoanRegion {
            key: 0,
            issued_at: CharRange::new(40, 45),
            start: 40,
            end: 60,
            refined_ranges: vec![],
        }],
    }
}

fn layer(converted: &Converted, id: LayerId) -> Option<&Vec<Decoration>> {
    converted.layers.iter().find(|(l, _)| *l == id).map(|(_, d)| d)
}

#[test]
fn test_permissions_fill_all_layers() {
    let converted = permissions(vec![Ok(output(52))], PermissionsConfig::default());
    assert_eq!(converted.applied, 1);
    assert!(converted.failed.is_empty());
    assert_eq!(layer(&converted, LayerId::LoanFacts).map(Vec::len), Some(1));
    assert_eq!(layer(&converted, LayerId::Boundaries).map(Vec::len), Some(1));
    assert_eq!(layer(&converted, LayerId::Steps).map(Vec::len), Some(1));
}

#[test]
fn test_disabled_layers_are_replaced_empty() {
    let config = PermissionsConfig {
        boundaries: false,
        stepper: false,
        ..PermissionsConfig::default()
    };
    let converted = permissions(vec![Ok(output(52))], config);
    let ids: Vec<LayerId> = converted.layers.iter().map(|(l, _)| *l).collect();
    assert_eq!(ids, vec![LayerId::LoanFacts, LayerId::Boundaries, LayerId::Steps]);
    assert_eq!(layer(&converted, LayerId::LoanFacts).map(Vec::len), Some(1));
    assert_eq!(layer(&converted, LayerId::Boundaries).map(Vec::len), Some(0));
    assert_eq!(layer(&converted, LayerId::Steps).map(Vec::len), Some(0));
}

#[test]
fn test_failed_unit_keeps_its_index() {
    let converted = permissions(
        vec![
            Ok(output(10)),
            Err(BackendError::Analysis {
                msg: "no MIR".to_string(),
            }),
            Ok(output(30)),
        ],
        PermissionsConfig::default(),
    );
    assert_eq!(converted.applied, 2);
    assert_eq!(converted.failed.len(), 1);
    assert_eq!(converted.failed[0].0, 1);
    let units: Vec<Option<usize>> = layer(&converted, LayerId::Boundaries)
        .map(|d| d.iter().map(|d| d.unit).collect())
        .unwrap_or_default();
    assert_eq!(units, vec![Some(0), Some(2)]);
}

#[test]
fn test_boundaries_command_fills_only_boundaries() {
    let converted = boundaries(vec![Ok(BodyBoundaries {
        body_range: CharRange::new(0, 70),
        boundaries: output(5).boundaries,
    })]);
    assert_eq!(converted.layers.len(), 1);
    assert_eq!(converted.layers[0].0, LayerId::Boundaries);
    assert_eq!(converted.layers[0].1[0].range, CharRange::point(5));
}

#[test]
fn test_markers_follow_renderable_steps() {
    let step = |start: usize| RawStep {
        frames: vec![Frame {
            name: "main".to_string(),
            body_range: CharRange::new(0, 20),
            location: CharRange::new(start, start + 2),
            locals: vec![],
        }],
        heap: vec![],
    };
    let trace = build_trace(
        RawTrace {
            steps: vec![step(0), step(5), step(10)],
            ..RawTrace::default()
        },
        20,
    );
    let markers = markers(&trace, &[0, 2]);
    assert_eq!(
        markers,
        vec![
            Decoration::new(CharRange::new(0, 2), None, Annotation::Marker { step: 0 }),
            Decoration::new(CharRange::new(10, 12), None, Annotation::Marker { step: 2 }),
        ]
    );
}
