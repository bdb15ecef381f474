//! Renderer de las seis vistas coordinadas.
//!
//! Todas las vistas salen del mismo pipeline: cada una se describe con un
//! `ViewSpec` (superficie, geometría, ejes) y comparte las escalas que se
//! derivan una sola vez del dataset filtrado.

use common::{GroupedCount, Record};
use plotters::style::RGBColor;
use tracing::debug;

use crate::axis::{self, AxisStyle};
use crate::scale::{BandScale, LinearScale};
use crate::scene::{Mark, Stroke, Surface, SurfaceId, Surfaces};
use crate::shape::{self, Point};

/// Rango horizontal del área de dibujo.
pub const PLOT_X: (f64, f64) = (50.0, 350.0);
/// Rango vertical (de abajo hacia arriba).
pub const PLOT_Y: (f64, f64) = (250.0, 50.0);

const COUNT_TICKS: usize = 10;
const YEAR_TICK_PADDING: f64 = 10.0;
const YEAR_LABEL_ROTATION: f64 = -45.0;
const BAND_PADDING: f64 = 0.2;
const PIE_CENTER: Point = (200.0, 150.0);

pub const BLUE: RGBColor = RGBColor(0, 0, 255);
pub const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);

/// Paleta categórica de 10 colores; se asigna por índice de categoría.
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/* =========================
   Valores derivados compartidos
   ========================= */

/// Dominios compartidos por las vistas basadas en año.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub min_year: i32,
    pub max_year: i32,
    pub max_count: usize,
}

impl ChartSpec {
    /// `None` con dataset vacío: no hay dominio válido que construir.
    pub fn derive(filtered: &[Record], by_year: &GroupedCount<i32>) -> Option<Self> {
        let min_year = filtered.iter().map(|r| r.year).min()?;
        let max_year = filtered.iter().map(|r| r.year).max()?;
        let max_count = by_year.max_count()?;
        Some(Self {
            min_year,
            max_year,
            max_count,
        })
    }

    /// Un tick por cada año entero del rango, aunque no haya datos en él.
    pub fn year_ticks(&self) -> Vec<i32> {
        (self.min_year..=self.max_year).collect()
    }

    pub fn year_scale(&self) -> LinearScale {
        LinearScale::new((self.min_year as f64, self.max_year as f64), PLOT_X)
    }

    pub fn count_scale(&self) -> LinearScale {
        LinearScale::new((0.0, self.max_count as f64), PLOT_Y)
    }
}

/* =========================
   Especificación declarativa por vista
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Radius {
    Fixed(f64),
    /// radio = conteo × factor
    PerCount(f64),
}

impl Radius {
    fn for_count(self, count: usize) -> f64 {
        match self {
            Radius::Fixed(r) => r,
            Radius::PerCount(factor) => count as f64 * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Trazado suave (año, conteo).
    Trend { stroke: Stroke },
    /// Región desde la base de la escala de conteo hasta la misma curva.
    Area { fill: RGBColor },
    /// Un rectángulo por marca, con su propia escala de conteo.
    Bars {
        fill: RGBColor,
        hover_fill: RGBColor,
    },
    /// Una cuña por marca, color por índice de categoría.
    Pie { radius: f64 },
    /// Un punto por año.
    Points {
        radius: Radius,
        fill: RGBColor,
        opacity: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axes {
    None,
    /// Eje de años (ticks densos) + eje de conteo compartido.
    YearCount { rotate_labels: bool },
    /// Eje de bandas por marca + eje de conteo propio de las barras.
    MakeCount,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSpec {
    pub surface: SurfaceId,
    pub size: (u32, u32),
    pub geometry: Geometry,
    pub axes: Axes,
}

pub const STANDARD_VIEWS: [ViewSpec; 6] = [
    ViewSpec {
        surface: SurfaceId::Line,
        size: (700, 300),
        geometry: Geometry::Trend {
            stroke: Stroke {
                color: BLUE,
                width: 2,
            },
        },
        axes: Axes::YearCount {
            rotate_labels: true,
        },
    },
    ViewSpec {
        surface: SurfaceId::Area,
        size: (400, 300),
        geometry: Geometry::Area { fill: LIGHT_BLUE },
        axes: Axes::None,
    },
    ViewSpec {
        surface: SurfaceId::Bar,
        size: (400, 300),
        geometry: Geometry::Bars {
            fill: ORANGE,
            hover_fill: DARK_ORANGE,
        },
        axes: Axes::MakeCount,
    },
    ViewSpec {
        surface: SurfaceId::Pie,
        size: (400, 300),
        geometry: Geometry::Pie { radius: 100.0 },
        axes: Axes::None,
    },
    ViewSpec {
        surface: SurfaceId::Scatter,
        size: (400, 300),
        geometry: Geometry::Points {
            radius: Radius::Fixed(5.0),
            fill: RED,
            opacity: 1.0,
        },
        axes: Axes::YearCount {
            rotate_labels: false,
        },
    },
    ViewSpec {
        surface: SurfaceId::Bubble,
        size: (400, 300),
        geometry: Geometry::Points {
            radius: Radius::PerCount(2.0),
            fill: PURPLE,
            opacity: 0.6,
        },
        axes: Axes::YearCount {
            rotate_labels: false,
        },
    },
];

/* =========================
   Renderer
   ========================= */

/// Datos y escalas compartidos durante un render.
struct RenderContext<'a> {
    spec: ChartSpec,
    year_scale: LinearScale,
    count_scale: LinearScale,
    by_year: &'a GroupedCount<i32>,
    by_make: &'a GroupedCount<String>,
}

impl RenderContext<'_> {
    fn year_points(&self) -> Vec<Point> {
        self.by_year
            .iter()
            .map(|(year, count)| {
                (
                    self.year_scale.map(*year as f64),
                    self.count_scale.map(*count as f64),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ChartRenderer {
    views: Vec<ViewSpec>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(STANDARD_VIEWS.to_vec())
    }
}

impl ChartRenderer {
    pub fn new(views: Vec<ViewSpec>) -> Self {
        Self { views }
    }

    pub fn views(&self) -> &[ViewSpec] {
        &self.views
    }

    /// Redibuja todas las vistas. Limpia cada superficie antes de dibujar,
    /// así que el resultado sólo depende de los argumentos.
    ///
    /// Con dataset filtrado vacío deja las superficies en blanco y
    /// devuelve `None`.
    pub fn render(
        &self,
        surfaces: &mut Surfaces,
        filtered: &[Record],
        by_year: &GroupedCount<i32>,
        by_make: &GroupedCount<String>,
    ) -> Option<ChartSpec> {
        surfaces.clear_all();

        let Some(spec) = ChartSpec::derive(filtered, by_year) else {
            debug!("dataset filtrado vacío: superficies en blanco");
            return None;
        };

        let ctx = RenderContext {
            spec,
            year_scale: spec.year_scale(),
            count_scale: spec.count_scale(),
            by_year,
            by_make,
        };

        for view in &self.views {
            let surface = surfaces.get_mut(view.surface);
            surface.resize(view.size.0, view.size.1);
            draw_view(view, &ctx, surface);
        }

        debug!(
            "render: años {}..={} (máx {}), {} marcas",
            spec.min_year,
            spec.max_year,
            spec.max_count,
            by_make.len()
        );
        Some(spec)
    }
}

fn draw_view(view: &ViewSpec, ctx: &RenderContext<'_>, surface: &mut Surface) {
    let bar_scales = bar_scales(ctx.by_make);

    match view.axes {
        Axes::None => {}
        Axes::YearCount { rotate_labels } => {
            surface.extend(year_axis(ctx, rotate_labels));
            surface.extend(count_axis(&ctx.count_scale));
        }
        Axes::MakeCount => {
            if let Some((band, count)) = &bar_scales {
                surface.extend(make_axis(band));
                surface.extend(count_axis(count));
            }
        }
    }

    match view.geometry {
        Geometry::Trend { stroke } => surface.push(Mark::Path {
            commands: shape::monotone_x(&ctx.year_points()),
            fill: None,
            stroke: Some(stroke),
        }),
        Geometry::Area { fill } => surface.push(Mark::Path {
            commands: shape::area(&ctx.year_points(), ctx.count_scale.range().0),
            fill: Some(fill),
            stroke: None,
        }),
        Geometry::Bars { fill, hover_fill } => {
            let Some((band, count)) = bar_scales else {
                return;
            };
            let baseline = count.range().0;
            for (make, n) in ctx.by_make.iter() {
                let Some(x) = band.position(make) else {
                    continue;
                };
                let y = count.map(*n as f64);
                surface.push(Mark::Rect {
                    x,
                    y,
                    width: band.bandwidth(),
                    height: baseline - y,
                    fill,
                    hover_fill: Some(hover_fill),
                    hovered: false,
                });
            }
        }
        Geometry::Pie { radius } => {
            let values: Vec<f64> = ctx.by_make.iter().map(|(_, n)| *n as f64).collect();
            for (slice, (make, n)) in shape::pie_layout(&values).iter().zip(ctx.by_make.iter()) {
                surface.push(Mark::Wedge {
                    center: PIE_CENTER,
                    radius,
                    start_angle: slice.start_angle,
                    end_angle: slice.end_angle,
                    fill: CATEGORY10[slice.index % CATEGORY10.len()],
                    title: Some(format!("{make}: {n}")),
                });
            }
        }
        Geometry::Points {
            radius,
            fill,
            opacity,
        } => {
            for (year, count) in ctx.by_year.iter() {
                surface.push(Mark::Circle {
                    center: (
                        ctx.year_scale.map(*year as f64),
                        ctx.count_scale.map(*count as f64),
                    ),
                    radius: radius.for_count(*count),
                    fill,
                    opacity,
                    title: Some(format!("Year: {year}, Count: {count}")),
                });
            }
        }
    }
}

/// Escala de bandas por marca + escala de conteo propia (máximo por marca).
fn bar_scales(by_make: &GroupedCount<String>) -> Option<(BandScale<String>, LinearScale)> {
    let max = by_make.max_count()?;
    let band = BandScale::new(by_make.keys().cloned().collect(), PLOT_X, BAND_PADDING);
    let count = LinearScale::new((0.0, max as f64), PLOT_Y);
    Some((band, count))
}

fn year_axis(ctx: &RenderContext<'_>, rotate_labels: bool) -> Vec<Mark> {
    let ticks: Vec<(f64, String)> = ctx
        .spec
        .year_ticks()
        .into_iter()
        .map(|y| (ctx.year_scale.map(y as f64), y.to_string()))
        .collect();
    let style = AxisStyle {
        tick_padding: YEAR_TICK_PADDING,
        label_rotation: if rotate_labels {
            YEAR_LABEL_ROTATION
        } else {
            0.0
        },
    };
    axis::bottom(PLOT_Y.0, PLOT_X, &ticks, style)
}

fn count_axis(scale: &LinearScale) -> Vec<Mark> {
    let ticks: Vec<(f64, String)> = scale
        .labelled_ticks(COUNT_TICKS)
        .into_iter()
        .map(|(v, label)| (scale.map(v), label))
        .collect();
    axis::left(PLOT_X.0, PLOT_Y, &ticks, AxisStyle::default())
}

fn make_axis(band: &BandScale<String>) -> Vec<Mark> {
    let half = band.bandwidth() / 2.0;
    let ticks: Vec<(f64, String)> = band
        .domain()
        .iter()
        .filter_map(|make| band.position(make).map(|x| (x + half, make.clone())))
        .collect();
    axis::bottom(PLOT_Y.0, PLOT_X, &ticks, AxisStyle::default())
}
