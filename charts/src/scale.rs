//! Escalas valor → píxel compartidas por las vistas.

/// Escala lineal continua `domain → range`.
///
/// Con dominio degenerado (min == max) todo valor cae en el centro del
/// rango: un dataset de un solo año dibuja un punto en vez de dividir por 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span != 0.0 && span.is_finite() {
            (value - d0) / span
        } else {
            0.5
        };
        r0 + t * (r1 - r0)
    }

    /// Ticks "lindos" (1, 2, 5 × 10^k) dentro del dominio.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        nice_ticks(d0.min(d1), d0.max(d1), count).0
    }

    /// Ticks con su etiqueta ya formateada según el paso.
    pub fn labelled_ticks(&self, count: usize) -> Vec<(f64, String)> {
        let (d0, d1) = self.domain;
        let (ticks, step) = nice_ticks(d0.min(d1), d0.max(d1), count);
        ticks.into_iter().map(|t| (t, format_tick(t, step))).collect()
    }
}

/// Escala categórica en bandas, con el mismo padding interno y externo.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K> {
    domain: Vec<K>,
    range: (f64, f64),
    padding: f64,
}

impl<K: PartialEq> BandScale<K> {
    pub fn new(domain: Vec<K>, range: (f64, f64), padding: f64) -> Self {
        Self {
            domain,
            range,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }

    fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        (r1 - r0) / (n - self.padding + 2.0 * self.padding).max(1.0)
    }

    fn start(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let step = self.step();
        // alineación centrada
        r0 + (r1 - r0 - step * (n - self.padding)) * 0.5
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Borde izquierdo de la banda de `key`, o `None` si no está en el dominio.
    pub fn position(&self, key: &K) -> Option<f64> {
        let idx = self.domain.iter().position(|k| k == key)?;
        Some(self.start() + self.step() * idx as f64)
    }
}

/// Genera ticks en [min, max] con ~`max_ticks` pasos. Devuelve también el paso.
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> (Vec<f64>, f64) {
    let range = max - min;
    if range <= 0.0 || !range.is_finite() || max_ticks == 0 {
        return (vec![min], 1.0);
    }
    let raw_step = range / max_ticks as f64;
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };

    let first = (min / step).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    let ticks = (first..=last).map(|i| i as f64 * step).collect();
    (ticks, step)
}

/// Formatea un tick con tantos decimales como pida el paso (0.2 → "0.4", 1 → "3").
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{:.*}", decimals, value)
}
