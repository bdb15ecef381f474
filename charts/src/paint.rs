//! Pinta las superficies retenidas sobre el backend SVG de plotters.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::scene::{Anchor, Mark, Surface, Surfaces};
use crate::shape::{self, Point};

const CURVE_SEGMENTS: usize = 16;
const FONT_SIZE: f64 = 10.0;

#[derive(Debug, Error)]
pub enum PaintError {
    #[error("error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("error dibujando {surface}: {message}")]
    Backend { surface: &'static str, message: String },
}

fn px((x, y): Point) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

/// Devuelve el SVG de una superficie. Una superficie vacía da un SVG en blanco.
pub fn paint_svg(surface: &Surface) -> Result<String, PaintError> {
    let name = surface.id().name();
    let backend_err = |e: &dyn std::fmt::Display| PaintError::Backend {
        surface: name,
        message: e.to_string(),
    };

    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, surface.size()).into_drawing_area();
        root.fill(&WHITE).map_err(|e| backend_err(&e))?;
        for mark in surface.marks() {
            draw_mark(&root, mark).map_err(|e| backend_err(&e))?;
        }
        root.present().map_err(|e| backend_err(&e))?;
    }
    Ok(attach_titles(&buf, surface))
}

/// Agrega `<title>` (el tooltip del navegador) a los círculos y sectores.
///
/// plotters no sabe de títulos, así que se insertan sobre el SVG ya escrito,
/// emparejando cada `<circle`/`<polygon` con la marca que lo generó.
fn attach_titles(svg: &str, surface: &Surface) -> String {
    let mut circles = Vec::new();
    let mut polygons = Vec::new();
    for mark in surface.marks() {
        match mark {
            // opacidad 0: plotters no escribe el elemento
            Mark::Circle { opacity, title, .. } if *opacity > 0.0 => circles.push(title.as_deref()),
            Mark::Wedge { title, .. } => polygons.push(title.as_deref()),
            Mark::Path { fill: Some(_), .. } => polygons.push(None),
            _ => {}
        }
    }

    let svg = with_titles(svg, "<circle", "</circle>", &circles);
    with_titles(&svg, "<polygon", "</polygon>", &polygons)
}

fn with_titles(svg: &str, open: &str, close: &str, titles: &[Option<&str>]) -> String {
    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;
    for title in titles {
        let Some(start) = rest.find(open) else { break };
        let Some(end) = rest[start..].find("/>").map(|i| start + i) else {
            break;
        };
        match title {
            Some(title) => {
                out.push_str(&rest[..end]);
                out.push_str("><title>");
                out.push_str(&escape_xml(title));
                out.push_str("</title>");
                out.push_str(close);
            }
            None => out.push_str(&rest[..end + 2]),
        }
        rest = &rest[end + 2..];
    }
    out.push_str(rest);
    out
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn draw_mark<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    mark: &Mark,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    match mark {
        Mark::Path {
            commands,
            fill,
            stroke,
        } => {
            let points: Vec<(i32, i32)> = shape::flatten(commands, CURVE_SEGMENTS)
                .into_iter()
                .map(px)
                .collect();
            if let Some(fill) = fill {
                root.draw(&Polygon::new(points.clone(), fill.filled()))?;
            }
            if let Some(stroke) = stroke {
                root.draw(&PathElement::new(
                    points,
                    stroke.color.stroke_width(stroke.width),
                ))?;
            }
        }
        Mark::Rect {
            x,
            y,
            width,
            height,
            ..
        } => {
            let fill = mark.current_fill().unwrap_or(BLACK);
            root.draw(&Rectangle::new(
                [px((*x, *y)), px((x + width, y + height))],
                fill.filled(),
            ))?;
        }
        Mark::Circle {
            center,
            radius,
            fill,
            opacity,
            ..
        } => {
            root.draw(&Circle::new(
                px(*center),
                radius.round() as i32,
                fill.mix(*opacity).filled(),
            ))?;
        }
        Mark::Wedge {
            center,
            radius,
            start_angle,
            end_angle,
            fill,
            ..
        } => {
            let points: Vec<(i32, i32)> =
                shape::wedge_polygon(*center, *radius, *start_angle, *end_angle)
                    .into_iter()
                    .map(px)
                    .collect();
            root.draw(&Polygon::new(points, fill.filled()))?;
        }
        Mark::Line { from, to, stroke } => {
            root.draw(&PathElement::new(
                vec![px(*from), px(*to)],
                stroke.color.stroke_width(stroke.width),
            ))?;
        }
        Mark::Text {
            at, text, anchor, ..
        } => {
            // plotters sólo rota de a 90°: las etiquetas rotadas salen horizontales
            let h_pos = match anchor {
                Anchor::Start => HPos::Left,
                Anchor::Middle => HPos::Center,
                Anchor::End => HPos::Right,
            };
            let style = FontDesc::new(FontFamily::SansSerif, FONT_SIZE, FontStyle::Normal)
                .color(&BLACK)
                .pos(Pos::new(h_pos, VPos::Top));
            root.draw(&Text::new(text.clone(), px(*at), style))?;
        }
    }
    Ok(())
}

/// Escribe `<dir>/<superficie>.svg` para las seis superficies.
pub fn write_svgs(surfaces: &Surfaces, dir: &Path) -> Result<Vec<PathBuf>, PaintError> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for surface in surfaces.iter() {
        let path = dir.join(surface.id().file_name());
        fs::write(&path, paint_svg(surface)?)?;
        debug!("escrito {}", path.display());
        written.push(path);
    }

    info!("{} gráficos escritos en {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::ChartRenderer;
    use crate::scene::SurfaceId;
    use common::{count_by_make, count_by_year, Record};
    use std::path::PathBuf;

    fn temp_dir(sub: &str) -> PathBuf {
        let base = std::env::temp_dir().join("paint_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        base
    }

    fn rendered() -> Surfaces {
        let d = vec![
            Record::new(2015, "NISSAN"),
            Record::new(2015, "NISSAN"),
            Record::new(2018, "MITSUBISHI"),
        ];
        let mut surfaces = Surfaces::new();
        ChartRenderer::default().render(&mut surfaces, &d, &count_by_year(&d), &count_by_make(&d));
        surfaces
    }

    #[test]
    fn superficie_vacia_da_svg_en_blanco() {
        let surface = Surface::new(SurfaceId::Scatter, 400, 300);
        let svg = paint_svg(&surface).unwrap();
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn scatter_pinta_circulos_y_etiquetas() {
        let surfaces = rendered();
        let svg = paint_svg(surfaces.get(SurfaceId::Scatter)).unwrap();
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("2017"));
    }

    #[test]
    fn circulos_y_sectores_llevan_title() {
        let surfaces = rendered();

        let scatter = paint_svg(surfaces.get(SurfaceId::Scatter)).unwrap();
        assert!(scatter.contains("<title>Year: 2015, Count: 2</title></circle>"));
        assert!(scatter.contains("<title>Year: 2018, Count: 1</title></circle>"));
        assert_eq!(scatter.matches("<circle").count(), 2);

        let pie = paint_svg(surfaces.get(SurfaceId::Pie)).unwrap();
        assert!(pie.contains("<title>NISSAN: 2</title></polygon>"));
        assert!(pie.contains("<title>MITSUBISHI: 1</title></polygon>"));
    }

    #[test]
    fn title_se_escapa() {
        let mut surface = Surface::new(SurfaceId::Scatter, 100, 100);
        surface.push(Mark::Circle {
            center: (10.0, 10.0),
            radius: 3.0,
            fill: BLUE,
            opacity: 1.0,
            title: Some("A&B <x>".to_string()),
        });
        let svg = paint_svg(&surface).unwrap();
        assert!(svg.contains("<title>A&amp;B &lt;x&gt;</title>"));
    }

    #[test]
    fn line_usa_su_ancho() {
        let surfaces = rendered();
        let svg = paint_svg(surfaces.get(SurfaceId::Line)).unwrap();
        assert!(svg.contains("width=\"700\""));
    }

    #[test]
    fn write_svgs_escribe_seis_archivos() {
        let tmp = temp_dir("all");
        let written = write_svgs(&rendered(), &tmp).unwrap();
        assert_eq!(written.len(), 6);
        for id in SurfaceId::ALL {
            assert!(tmp.join(id.file_name()).exists());
        }
    }
}
