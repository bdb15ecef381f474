//! Superficies de dibujo con sus marcas retenidas.
//!
//! Cada vista se dibuja sobre su propia `Surface`. El renderer las limpia
//! antes de redibujar, así que dibujar dos veces deja el mismo contenido.

use plotters::style::RGBColor;

use crate::shape::{PathCommand, Point};

/// Superficies direccionables, una por vista.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Line,
    Area,
    Bar,
    Pie,
    Scatter,
    Bubble,
}

impl SurfaceId {
    pub const ALL: [SurfaceId; 6] = [
        SurfaceId::Line,
        SurfaceId::Area,
        SurfaceId::Bar,
        SurfaceId::Pie,
        SurfaceId::Scatter,
        SurfaceId::Bubble,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SurfaceId::Line => "lineChart",
            SurfaceId::Area => "areaChart",
            SurfaceId::Bar => "barChart",
            SurfaceId::Pie => "pieChart",
            SurfaceId::Scatter => "scatterChart",
            SurfaceId::Bubble => "bubbleChart",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.svg", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: RGBColor,
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Primitiva retenida sobre una superficie (coordenadas en píxeles).
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Path {
        commands: Vec<PathCommand>,
        fill: Option<RGBColor>,
        stroke: Option<Stroke>,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: RGBColor,
        /// Tono alternativo mientras el puntero está encima.
        hover_fill: Option<RGBColor>,
        hovered: bool,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: RGBColor,
        opacity: f64,
        title: Option<String>,
    },
    Wedge {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        fill: RGBColor,
        title: Option<String>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Text {
        at: Point,
        text: String,
        anchor: Anchor,
        /// Grados, negativo = antihorario.
        rotation: f64,
    },
}

impl Mark {
    /// Relleno visible ahora mismo (considerando hover en barras).
    pub fn current_fill(&self) -> Option<RGBColor> {
        match self {
            Mark::Rect {
                fill,
                hover_fill,
                hovered,
                ..
            } => Some(if *hovered {
                hover_fill.unwrap_or(*fill)
            } else {
                *fill
            }),
            Mark::Path { fill, .. } => *fill,
            Mark::Circle { fill, .. } | Mark::Wedge { fill, .. } => Some(*fill),
            Mark::Line { .. } | Mark::Text { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    id: SurfaceId,
    width: u32,
    height: u32,
    marks: Vec<Mark>,
}

impl Surface {
    pub fn new(id: SurfaceId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            marks: Vec::new(),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    pub fn extend(&mut self, marks: impl IntoIterator<Item = Mark>) {
        self.marks.extend(marks);
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Índices de las barras (marcas `Rect`) en orden de dibujo.
    pub fn rect_indices(&self) -> Vec<usize> {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, m)| matches!(m, Mark::Rect { .. }))
            .map(|(i, _)| i)
            .collect()
    }

    /// El puntero entra en la marca `index`. Devuelve si cambió algo.
    pub fn pointer_enter(&mut self, index: usize) -> bool {
        self.set_hovered(index, true)
    }

    pub fn pointer_leave(&mut self, index: usize) -> bool {
        self.set_hovered(index, false)
    }

    fn set_hovered(&mut self, index: usize, value: bool) -> bool {
        match self.marks.get_mut(index) {
            Some(Mark::Rect {
                hover_fill: Some(_),
                hovered,
                ..
            }) if *hovered != value => {
                *hovered = value;
                true
            }
            _ => false,
        }
    }
}

/// Las seis superficies del dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Surfaces {
    surfaces: Vec<Surface>,
}

impl Default for Surfaces {
    fn default() -> Self {
        Self::new()
    }
}

impl Surfaces {
    pub fn new() -> Self {
        Self {
            surfaces: SurfaceId::ALL
                .iter()
                .map(|&id| Surface::new(id, 400, 300))
                .collect(),
        }
    }

    pub fn get(&self, id: SurfaceId) -> &Surface {
        // se crean las seis en `new`, en el orden de ALL
        &self.surfaces[id as usize]
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> &mut Surface {
        &mut self.surfaces[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    pub fn clear_all(&mut self) {
        for s in &mut self.surfaces {
            s.clear();
        }
    }

    pub fn all_empty(&self) -> bool {
        self.surfaces.iter().all(Surface::is_empty)
    }
}
