use plotters::style::RGBColor;

use crate::scene::{Anchor, Mark, Stroke};

const AXIS_COLOR: RGBColor = RGBColor(0, 0, 0);
const TICK_SIZE: f64 = 6.0;
const DEFAULT_TICK_PADDING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStyle {
    pub tick_padding: f64,
    /// Rotación de las etiquetas en grados (0 = horizontales).
    pub label_rotation: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            tick_padding: DEFAULT_TICK_PADDING,
            label_rotation: 0.0,
        }
    }
}

fn stroke() -> Stroke {
    Stroke {
        color: AXIS_COLOR,
        width: 1,
    }
}

/// Eje horizontal en `y`, cubriendo `range` en x. `ticks` = (x, etiqueta).
pub fn bottom(y: f64, range: (f64, f64), ticks: &[(f64, String)], style: AxisStyle) -> Vec<Mark> {
    let mut marks = Vec::with_capacity(1 + ticks.len() * 2);
    marks.push(Mark::Line {
        from: (range.0, y),
        to: (range.1, y),
        stroke: stroke(),
    });

    // rotadas: se anclan al final para que el texto cuelgue del tick
    let anchor = if style.label_rotation != 0.0 {
        Anchor::End
    } else {
        Anchor::Middle
    };
    for (x, label) in ticks {
        marks.push(Mark::Line {
            from: (*x, y),
            to: (*x, y + TICK_SIZE),
            stroke: stroke(),
        });
        marks.push(Mark::Text {
            at: (*x, y + TICK_SIZE + style.tick_padding),
            text: label.clone(),
            anchor,
            rotation: style.label_rotation,
        });
    }
    marks
}

/// Eje vertical en `x`, cubriendo `range` en y. `ticks` = (y, etiqueta).
pub fn left(x: f64, range: (f64, f64), ticks: &[(f64, String)], style: AxisStyle) -> Vec<Mark> {
    let mut marks = Vec::with_capacity(1 + ticks.len() * 2);
    marks.push(Mark::Line {
        from: (x, range.0),
        to: (x, range.1),
        stroke: stroke(),
    });
    for (y, label) in ticks {
        marks.push(Mark::Line {
            from: (x, *y),
            to: (x - TICK_SIZE, *y),
            stroke: stroke(),
        });
        marks.push(Mark::Text {
            at: (x - TICK_SIZE - style.tick_padding, *y),
            text: label.clone(),
            anchor: Anchor::End,
            rotation: style.label_rotation,
        });
    }
    marks
}
