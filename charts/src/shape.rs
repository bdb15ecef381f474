//! Generadores de geometría: curva monótona en X, área y layout de torta.

use std::f64::consts::{PI, TAU};

pub type Point = (f64, f64);

/// Comando de trazado, equivalente a los de un `d` de SVG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

/* =========================
   Curva monótona en X
   ========================= */

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn slope(dy: f64, dx: f64) -> f64 {
    if dx != 0.0 {
        dy / dx
    } else {
        0.0
    }
}

/// Tangente en p1 (método de Steffen), acotada para no sobrepasar.
fn interior_tangent(p0: Point, p1: Point, p2: Point) -> f64 {
    let h0 = p1.0 - p0.0;
    let h1 = p2.0 - p1.0;
    let s0 = slope(p1.1 - p0.1, h0);
    let s1 = slope(p2.1 - p1.1, h1);
    let p = slope(s0 * h1 + s1 * h0, h0 + h1);
    let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

/// Tangente de un extremo a partir de la tangente vecina.
fn end_tangent(p0: Point, p1: Point, t: f64) -> f64 {
    let h = p1.0 - p0.0;
    if h != 0.0 {
        (3.0 * (p1.1 - p0.1) / h - t) / 2.0
    } else {
        t
    }
}

fn hermite(p0: Point, p1: Point, t0: f64, t1: f64) -> PathCommand {
    let dx = (p1.0 - p0.0) / 3.0;
    PathCommand::CubicTo {
        c1: (p0.0 + dx, p0.1 + dx * t0),
        c2: (p1.0 - dx, p1.1 - dx * t1),
        to: p1,
    }
}

/// Trazado suave que preserva la monotonía en y, en el orden de los puntos.
/// Puntos consecutivos coincidentes se ignoran.
pub fn monotone_x(points: &[Point]) -> Vec<PathCommand> {
    let mut pts: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }

    let mut out = Vec::with_capacity(pts.len() + 1);
    match pts.len() {
        0 => return out,
        1 => {
            out.push(PathCommand::MoveTo(pts[0]));
            return out;
        }
        2 => {
            out.push(PathCommand::MoveTo(pts[0]));
            out.push(PathCommand::LineTo(pts[1]));
            return out;
        }
        _ => {}
    }

    out.push(PathCommand::MoveTo(pts[0]));
    let tangents: Vec<f64> = (1..pts.len() - 1)
        .map(|i| interior_tangent(pts[i - 1], pts[i], pts[i + 1]))
        .collect();

    let n = pts.len();
    for i in 0..n - 1 {
        let t0 = if i == 0 {
            end_tangent(pts[0], pts[1], tangents[0])
        } else {
            tangents[i - 1]
        };
        let t1 = if i == n - 2 {
            end_tangent(pts[n - 2], pts[n - 1], tangents[n - 3])
        } else {
            tangents[i]
        };
        out.push(hermite(pts[i], pts[i + 1], t0, t1));
    }
    out
}

/// Región rellena entre la curva monótona y una línea base horizontal.
pub fn area(points: &[Point], baseline: f64) -> Vec<PathCommand> {
    let mut out = monotone_x(points);
    if out.is_empty() {
        return out;
    }
    for &(x, _) in points.iter().rev() {
        out.push(PathCommand::LineTo((x, baseline)));
    }
    out.push(PathCommand::Close);
    out
}

/// Aproxima el trazado con segmentos rectos (para backends sin Bézier).
pub fn flatten(commands: &[PathCommand], segments_per_curve: usize) -> Vec<Point> {
    let segments = segments_per_curve.max(1);
    let mut out: Vec<Point> = Vec::new();
    let mut current: Point = (0.0, 0.0);
    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => {
                out.push(p);
                current = p;
            }
            PathCommand::CubicTo { c1, c2, to } => {
                for s in 1..=segments {
                    let t = s as f64 / segments as f64;
                    let u = 1.0 - t;
                    let x = u * u * u * current.0
                        + 3.0 * u * u * t * c1.0
                        + 3.0 * u * t * t * c2.0
                        + t * t * t * to.0;
                    let y = u * u * u * current.1
                        + 3.0 * u * u * t * c1.1
                        + 3.0 * u * t * t * c2.1
                        + t * t * t * to.1;
                    out.push((x, y));
                }
                current = to;
            }
            PathCommand::Close => {}
        }
    }
    out
}

/* =========================
   Torta
   ========================= */

/// Porción de torta. `index` es la posición en la entrada (de ahí el color).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub index: usize,
    pub value: f64,
    /// Radianes, 0 = las 12 en punto, sentido horario.
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Reparte la vuelta completa proporcionalmente a `values`.
///
/// Los ángulos se asignan de mayor a menor valor (empates en orden de
/// entrada), pero el resultado conserva el orden de entrada.
pub fn pie_layout(values: &[f64]) -> Vec<PieSlice> {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { TAU / total } else { 0.0 };

    let mut order: Vec<usize> = (0..values.len()).collect();
    // sort_by es estable: los empates quedan en orden de entrada
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut slices = vec![
        PieSlice {
            index: 0,
            value: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
        };
        values.len()
    ];
    let mut angle = 0.0;
    for idx in order {
        let end = angle + values[idx] * k;
        slices[idx] = PieSlice {
            index: idx,
            value: values[idx],
            start_angle: angle,
            end_angle: end,
        };
        angle = end;
    }
    slices
}

/// Punto sobre la circunferencia para un ángulo medido desde las 12 en punto.
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    (center.0 + radius * angle.sin(), center.1 - radius * angle.cos())
}

/// Polígono de una cuña (centro + arco muestreado).
pub fn wedge_polygon(center: Point, radius: f64, start: f64, end: f64) -> Vec<Point> {
    let sweep = (end - start).max(0.0);
    // ~ un segmento cada 3 grados
    let steps = ((sweep / (PI / 60.0)).ceil() as usize).max(1);
    let mut out = Vec::with_capacity(steps + 2);
    if sweep < TAU - 1e-9 {
        out.push(center);
    }
    for s in 0..=steps {
        out.push(polar(center, radius, start + sweep * s as f64 / steps as f64));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn monotone_vacia_y_un_punto() {
        assert!(monotone_x(&[]).is_empty());
        assert_eq!(
            monotone_x(&[(200.0, 50.0)]),
            vec![PathCommand::MoveTo((200.0, 50.0))]
        );
    }

    #[test]
    fn monotone_dos_puntos_es_recta() {
        let cmds = monotone_x(&[(50.0, 50.0), (350.0, 150.0)]);
        assert_eq!(
            cmds,
            vec![
                PathCommand::MoveTo((50.0, 50.0)),
                PathCommand::LineTo((350.0, 150.0))
            ]
        );
    }

    #[test]
    fn monotone_pasa_por_todos_los_puntos() {
        let pts = [(50.0, 250.0), (150.0, 50.0), (250.0, 150.0), (350.0, 100.0)];
        let cmds = monotone_x(&pts);
        assert_eq!(cmds.len(), 4);
        let ends: Vec<Point> = cmds
            .iter()
            .filter_map(|c| match c {
                PathCommand::CubicTo { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(ends, pts[1..].to_vec());
    }

    #[test]
    fn monotone_no_sobrepasa_en_un_maximo_local() {
        // En el pico (150, 50) la tangente debe ser horizontal.
        let pts = [(50.0, 250.0), (150.0, 50.0), (250.0, 250.0)];
        let cmds = monotone_x(&pts);
        match cmds[1] {
            PathCommand::CubicTo { c2, to, .. } => {
                assert_eq!(to, (150.0, 50.0));
                assert!(approx(c2.1, 50.0));
            }
            ref other => panic!("se esperaba CubicTo, llegó {other:?}"),
        }
    }

    #[test]
    fn area_cierra_contra_la_base() {
        let cmds = area(&[(50.0, 50.0), (350.0, 150.0)], 250.0);
        assert_eq!(cmds.last(), Some(&PathCommand::Close));
        assert!(cmds.contains(&PathCommand::LineTo((350.0, 250.0))));
        assert!(cmds.contains(&PathCommand::LineTo((50.0, 250.0))));
    }

    #[test]
    fn flatten_termina_en_el_ultimo_punto() {
        let pts = [(50.0, 250.0), (150.0, 50.0), (250.0, 150.0)];
        let flat = flatten(&monotone_x(&pts), 8);
        assert_eq!(flat.first(), Some(&(50.0, 250.0)));
        let last = flat.last().unwrap();
        assert!(approx(last.0, 250.0) && approx(last.1, 150.0));
        assert_eq!(flat.len(), 1 + 2 * 8);
    }

    #[test]
    fn pie_ordena_angulos_por_valor_descendente() {
        let slices = pie_layout(&[1.0, 2.0]);
        // la entrada 1 (valor 2) arranca en 0
        assert_eq!(slices[1].index, 1);
        assert!(approx(slices[1].start_angle, 0.0));
        assert!(approx(slices[1].end_angle, TAU * 2.0 / 3.0));
        assert_eq!(slices[0].index, 0);
        assert!(approx(slices[0].start_angle, TAU * 2.0 / 3.0));
        assert!(approx(slices[0].end_angle, TAU));
    }

    #[test]
    fn pie_empates_en_orden_de_entrada() {
        let slices = pie_layout(&[1.0, 1.0, 1.0]);
        assert!(approx(slices[0].start_angle, 0.0));
        assert!(approx(slices[1].start_angle, TAU / 3.0));
        assert!(approx(slices[2].start_angle, TAU * 2.0 / 3.0));
    }

    #[test]
    fn pie_sin_valores() {
        assert!(pie_layout(&[]).is_empty());
        let zeros = pie_layout(&[0.0, 0.0]);
        assert!(zeros.iter().all(|s| s.start_angle == 0.0 && s.end_angle == 0.0));
    }

    #[test]
    fn polar_desde_las_doce() {
        let (x, y) = polar((200.0, 150.0), 100.0, 0.0);
        assert!(approx(x, 200.0) && approx(y, 50.0));
        let (x, y) = polar((200.0, 150.0), 100.0, PI / 2.0);
        assert!(approx(x, 300.0) && approx(y, 150.0));
    }

    #[test]
    fn cuna_completa_no_incluye_el_centro() {
        let full = wedge_polygon((0.0, 0.0), 10.0, 0.0, TAU);
        assert!(!full.contains(&(0.0, 0.0)));
        let half = wedge_polygon((0.0, 0.0), 10.0, 0.0, PI);
        assert_eq!(half[0], (0.0, 0.0));
    }
}
