//! A widget that prints what it is told.

use lens_editor::EditorWidget;
use lens_ir::{CharRange, LineIndex};
use lens_overlay::{OverlayEffect, Transaction};

pub(crate) struct PrintWidget {
    lines: LineIndex,
}

impl PrintWidget {
    pub(crate) fn new(text: &str) -> Self {
        PrintWidget {
            lines: LineIndex::new(text),
        }
    }

    /// `line:col` of the start of `range`, one-based.
    fn position(&self, range: CharRange) -> String {
        let (line, col) = self.lines.line_col(range.char_start);
        format!("{}:{}", line + 1, col + 1)
    }
}

impl EditorWidget for PrintWidget {
    fn dispatch(&self, transaction: Transaction) {
        for effect in &transaction.effects {
            match effect {
                OverlayEffect::Replaced {
                    layer, decorations, ..
                } => {
                    println!("{layer} ({} at {})", decorations.len(), transaction.revision);
                    for decoration in decorations {
                        println!(
                            "  {:>6} {:<10} {}",
                            self.position(decoration.range),
                            decoration.range,
                            decoration.annotation.label()
                        );
                    }
                }
                OverlayEffect::Cleared { layer, .. } => println!("{layer} cleared"),
                OverlayEffect::Dropped { layer, edited, .. } => {
                    println!("{layer} dropped, {edited} was edited");
                }
            }
        }
    }

    fn set_step_index(&self, index: Option<usize>) {
        tracing::debug!(?index, "step cursor moved");
    }

    fn hide_range(&self, range: CharRange) {
        println!("hide {} {range}", self.position(range));
    }
}
