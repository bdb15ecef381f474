//! Raíz de composición: consulta → TaskController → filtros → agregados →
//! gráficos. No tiene lógica propia más allá de cablear las piezas.

use charts::{write_svgs, ChartRenderer, ChartSpec, PaintError, Surfaces};
use common::export::export_csv_file;
use common::{
    count_by_make, count_by_year, filter, summarize, Choice, ExportError, JobId, JobStatus,
    QueryParameters, Record, Records, Selection, SelectionError, SelectionOptions, Summary,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

use crate::controller::{PollPolicy, TaskController, TaskSnapshot};
use crate::error::TaskError;
use crate::job_client::JobBackend;

/// Estado de la aplicación.
///
/// Un solo escritor por campo: `dataset` cambia sólo cuando el controller
/// publica un job completado; `selection` sólo desde los filtros.
/// `filtered` y `options` son derivados.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub params: Option<QueryParameters>,
    pub selection: Selection,
    pub dataset: Arc<Records>,
    pub filtered: Records,
    pub options: SelectionOptions,
}

/// Los observables salen todos del último snapshot sincronizado
/// (`refresh`, `wait_until_settled` o un comando), nunca del controller en
/// vivo: `loading`, `task_status` y la vista filtrada siempre concuerdan.
pub struct Dashboard<B: JobBackend> {
    controller: TaskController<B>,
    snapshot: TaskSnapshot,
    renderer: ChartRenderer,
    surfaces: Surfaces,
    state: AppState,
    chart_spec: Option<ChartSpec>,
}

impl<B: JobBackend> Dashboard<B> {
    pub fn new(backend: B, policy: PollPolicy) -> Self {
        Self {
            controller: TaskController::new(backend, policy),
            snapshot: TaskSnapshot::default(),
            renderer: ChartRenderer::default(),
            surfaces: Surfaces::new(),
            state: AppState::default(),
            chart_spec: None,
        }
    }

    /* ---------- comandos ---------- */

    pub async fn submit_query(&mut self, params: QueryParameters) -> Result<JobId, TaskError> {
        self.state.params = Some(params.clone());
        let submitted = self.controller.submit(params).await;
        self.refresh();
        submitted
    }

    /// Espera a que la consulta en curso termine y actualiza la vista.
    pub async fn wait_until_settled(&mut self) -> TaskSnapshot {
        let snapshot = self.controller.settled().await;
        self.sync_with(&snapshot);
        snapshot
    }

    /// Toma el último estado publicado por el controller. Devuelve true si
    /// llegó un dataset nuevo (y por lo tanto se redibujó).
    pub fn refresh(&mut self) -> bool {
        let snapshot = self.controller.snapshot();
        self.sync_with(&snapshot)
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if selection != self.state.selection {
            self.state.selection = selection;
            self.recompute();
        }
    }

    /// `value` es lo que entrega el selector: "All" o un año.
    pub fn set_year(&mut self, value: &str) -> Result<(), SelectionError> {
        let year: Choice<i32> = value.parse()?;
        self.set_selection(self.state.selection.clone().with_year(year));
        Ok(())
    }

    pub fn set_make(&mut self, value: &str) -> Result<(), SelectionError> {
        let make: Choice<String> = value.parse()?;
        self.set_selection(self.state.selection.clone().with_make(make));
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
        self.refresh();
    }

    /// Exporta la vista filtrada actual como CSV.
    pub fn export_current_view(&self, path: &Path) -> Result<(), ExportError> {
        export_csv_file(&self.state.filtered, path)?;
        info!(
            "exportados {} registros a {}",
            self.state.filtered.len(),
            path.display()
        );
        Ok(())
    }

    pub fn write_charts(&self, dir: &Path) -> Result<Vec<PathBuf>, PaintError> {
        write_svgs(&self.surfaces, dir)
    }

    /* ---------- observables ---------- */

    pub fn loading(&self) -> bool {
        self.snapshot.loading
    }

    pub fn task_status(&self) -> Option<JobStatus> {
        self.snapshot.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.snapshot.error.as_deref()
    }

    pub fn filtered_data(&self) -> &[Record] {
        &self.state.filtered
    }

    /// Años del dataset SIN filtrar.
    pub fn distinct_years(&self) -> &[i32] {
        &self.state.options.years
    }

    pub fn distinct_makes(&self) -> &[String] {
        &self.state.options.makes
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    /// Tarjetas de resumen sobre la vista filtrada.
    pub fn summary(&self) -> Summary {
        summarize(&self.state.filtered)
    }

    pub fn chart_spec(&self) -> Option<&ChartSpec> {
        self.chart_spec.as_ref()
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    /// Para el hover de las barras.
    pub fn surfaces_mut(&mut self) -> &mut Surfaces {
        &mut self.surfaces
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn controller(&self) -> &TaskController<B> {
        &self.controller
    }

    /* ---------- internos ---------- */

    fn sync_with(&mut self, snapshot: &TaskSnapshot) -> bool {
        self.snapshot = snapshot.clone();
        match &snapshot.dataset {
            Some(dataset) if !Arc::ptr_eq(dataset, &self.state.dataset) => {
                self.state.dataset = Arc::clone(dataset);
                self.state.options = filter::options(dataset);
                self.recompute();
                true
            }
            _ => false,
        }
    }

    fn recompute(&mut self) {
        self.state.filtered = filter::apply(&self.state.dataset, &self.state.selection);

        let by_year = count_by_year(&self.state.filtered);
        let by_make = count_by_make(&self.state.filtered);
        self.chart_spec = self.renderer.render(
            &mut self.surfaces,
            &self.state.filtered,
            &by_year,
            &by_make,
        );

        debug!(
            "vista recalculada: {} de {} registros",
            self.state.filtered.len(),
            self.state.dataset.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobClientError;
    use async_trait::async_trait;
    use charts::SurfaceId;
    use common::JobStatusResponse;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Cada job completa en su primera consulta con el siguiente dataset.
    #[derive(Default)]
    struct Immediate {
        datasets: Mutex<VecDeque<Records>>,
        next_id: AtomicU64,
    }

    impl Immediate {
        fn with(datasets: Vec<Records>) -> Self {
            Self {
                datasets: Mutex::new(datasets.into()),
                next_id: AtomicU64::new(1),
            }
        }
    }

    #[async_trait]
    impl JobBackend for Immediate {
        async fn create_job(&self, _params: &QueryParameters) -> Result<JobId, JobClientError> {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(JobId::new(format!("t{n}")))
        }

        async fn job_status(&self, _id: &JobId) -> Result<JobStatusResponse, JobClientError> {
            let data = self.datasets.lock().unwrap().pop_front().unwrap_or_default();
            Ok(JobStatusResponse {
                status: JobStatus::Completed,
                data: Some(data),
            })
        }
    }

    fn params() -> QueryParameters {
        QueryParameters::from_form(2014, 2022, "NISSAN,MITSUBISHI", "Mumbai", "SUBCOMPACT").unwrap()
    }

    fn sample() -> Records {
        vec![
            Record::new(2015, "NISSAN"),
            Record::new(2015, "NISSAN"),
            Record::new(2018, "MITSUBISHI"),
        ]
    }

    async fn loaded(datasets: Vec<Records>) -> Dashboard<Immediate> {
        let mut dash = Dashboard::new(Immediate::with(datasets), PollPolicy::default());
        dash.submit_query(params()).await.unwrap();
        dash.wait_until_settled().await;
        dash
    }

    #[tokio::test(start_paused = true)]
    async fn flujo_completo_con_el_ejemplo() {
        let dash = loaded(vec![sample()]).await;

        assert!(!dash.loading());
        assert_eq!(dash.task_status(), Some(JobStatus::Completed));
        assert_eq!(dash.filtered_data(), sample().as_slice());

        let by_year = count_by_year(dash.filtered_data());
        let by_make = count_by_make(dash.filtered_data());
        assert_eq!(by_year.entries(), &[(2015, 2), (2018, 1)]);
        assert_eq!(
            by_make.entries(),
            &[("NISSAN".to_string(), 2), ("MITSUBISHI".to_string(), 1)]
        );

        let spec = dash.chart_spec().unwrap();
        assert_eq!((spec.min_year, spec.max_year), (2015, 2018));
        assert_eq!(spec.year_ticks(), vec![2015, 2016, 2017, 2018]);
        assert!(SurfaceId::ALL
            .iter()
            .all(|id| !dash.surfaces().get(*id).is_empty()));

        assert_eq!(
            dash.summary(),
            Summary {
                total_records: 3,
                unique_makes: 2,
                unique_years: 2,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn filtrar_por_anio_no_achica_las_opciones() {
        let mut dash = loaded(vec![sample()]).await;

        dash.set_year("2015").unwrap();
        assert_eq!(dash.filtered_data().len(), 2);
        assert!(dash.filtered_data().iter().all(|r| r.make == "NISSAN"));
        assert_eq!(dash.distinct_years(), &[2015, 2018]);
        assert_eq!(dash.distinct_makes(), &["NISSAN", "MITSUBISHI"]);

        dash.set_year("All").unwrap();
        assert_eq!(dash.filtered_data().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn seleccion_sin_coincidencias_deja_superficies_en_blanco() {
        let mut dash = loaded(vec![sample()]).await;

        dash.set_year("2018").unwrap();
        dash.set_make("NISSAN").unwrap();
        assert!(dash.filtered_data().is_empty());
        assert!(dash.surfaces().all_empty());
        assert_eq!(dash.chart_spec(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn seleccion_invalida_no_cambia_nada() {
        let mut dash = loaded(vec![sample()]).await;

        assert!(dash.set_year("dos mil").is_err());
        assert_eq!(dash.selection(), &Selection::all());
        assert_eq!(dash.filtered_data().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn nueva_consulta_reemplaza_el_dataset() {
        let second = vec![Record::new(2020, "BMW")];
        let mut dash = loaded(vec![sample(), second.clone()]).await;

        dash.submit_query(params()).await.unwrap();
        // mientras carga se sigue viendo el dataset anterior
        assert!(dash.loading());
        assert!(!dash.refresh());
        assert_eq!(dash.filtered_data().len(), 3);

        dash.wait_until_settled().await;
        assert_eq!(dash.filtered_data(), second.as_slice());
        assert_eq!(dash.distinct_makes(), &["BMW"]);
        assert_eq!(dash.state().params, Some(params()));
    }

    #[tokio::test(start_paused = true)]
    async fn observables_no_cambian_hasta_refrescar() {
        let mut dash = Dashboard::new(Immediate::with(vec![sample()]), PollPolicy::default());
        dash.submit_query(params()).await.unwrap();

        // el controller ya completó, pero la vista no se sincronizó
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert!(!dash.controller().is_loading());
        assert!(dash.loading());
        assert_eq!(dash.task_status(), Some(JobStatus::Pending));
        assert!(dash.filtered_data().is_empty());
        assert!(dash.distinct_years().is_empty());

        assert!(dash.refresh());
        assert!(!dash.loading());
        assert_eq!(dash.task_status(), Some(JobStatus::Completed));
        assert_eq!(dash.filtered_data().len(), 3);
        assert_eq!(dash.distinct_years(), &[2015, 2018]);
        assert_eq!(dash.summary().total_records, 3);
        assert!(dash.chart_spec().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_sincroniza_loading() {
        let mut dash = Dashboard::new(Immediate::with(vec![sample()]), PollPolicy::default());
        dash.submit_query(params()).await.unwrap();
        assert!(dash.loading());

        dash.cancel();
        assert!(!dash.loading());
        assert!(dash.filtered_data().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dataset_vacio_es_valido() {
        let dash = loaded(vec![Vec::new()]).await;

        assert_eq!(dash.task_status(), Some(JobStatus::Completed));
        assert!(dash.filtered_data().is_empty());
        assert!(dash.surfaces().all_empty());
        assert_eq!(dash.summary(), Summary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn exporta_la_vista_filtrada() {
        let mut dash = loaded(vec![sample()]).await;
        dash.set_make("MITSUBISHI").unwrap();

        let dir = std::env::temp_dir().join("dashboard_tests").join("export");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join(common::export::DEFAULT_EXPORT_FILE);
        dash.export_current_view(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "year,make\n\"2018\",\"MITSUBISHI\"\n");
    }
}
