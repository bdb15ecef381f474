//! TaskController: envía la consulta, hace polling del job activo y publica
//! el dataset realizado (o el fallo) a quien esté observando.
//!
//! Hay a lo sumo un job activo. Cada respuesta de polling viaja etiquetada
//! con (job id, generación) y se descarta si el job ya fue reemplazado,
//! cancelado o llegó a un estado terminal.

use chrono::Utc;
use common::{Job, JobId, JobStatus, JobStatusResponse, QueryParameters, Records};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{JobClientError, TaskError};
use crate::job_client::JobBackend;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Fallos seguidos tolerados antes de abandonar. `None` = reintentar siempre.
    pub max_failures: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_failures: None,
        }
    }
}

/// Estado observable por la UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSnapshot {
    pub loading: bool,
    pub job_id: Option<JobId>,
    pub status: Option<JobStatus>,
    /// Último dataset realizado. Se conserva hasta que otro job complete.
    pub dataset: Option<Arc<Records>>,
    pub error: Option<String>,
}

struct ActiveJob {
    job: Job,
    generation: u64,
    cancel: CancellationToken,
    failures: u32,
    /// Se superó el tope de fallos: nada de lo que llegue después cuenta.
    abandoned: bool,
}

impl ActiveJob {
    fn is_finished(&self) -> bool {
        self.abandoned || self.job.status.is_terminal()
    }
}

#[derive(Default)]
struct Inner {
    /// Se incrementa en cada submit/cancel.
    generation: u64,
    active: Option<ActiveJob>,
}

struct Shared<B> {
    backend: B,
    policy: PollPolicy,
    inner: Mutex<Inner>,
    state: watch::Sender<TaskSnapshot>,
}

impl<B: JobBackend> Shared<B> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_poll(
        &self,
        job_id: &JobId,
        generation: u64,
        outcome: Result<JobStatusResponse, JobClientError>,
    ) {
        let mut inner = self.lock();
        let active = match inner.active.as_mut() {
            Some(a) if a.generation == generation && a.job.id == *job_id => a,
            _ => {
                debug!("descartando respuesta obsoleta del job {}", job_id);
                return;
            }
        };
        if active.is_finished() {
            debug!("job {} ya terminó, se ignora la respuesta", job_id);
            return;
        }

        let resp = match outcome {
            Ok(resp) => resp,
            Err(e) => {
                active.failures += 1;
                warn!(
                    "error consultando el job {} ({} seguidos): {}",
                    job_id, active.failures, e
                );
                if let Some(max) = self.policy.max_failures {
                    if active.failures >= max {
                        active.abandoned = true;
                        active.cancel.cancel();
                        let err = TaskError::PollGaveUp {
                            job_id: job_id.clone(),
                            failures: active.failures,
                        };
                        warn!("{}", err);
                        self.state.send_modify(|s| {
                            s.loading = false;
                            s.error = Some(err.to_string());
                        });
                    }
                }
                return;
            }
        };

        active.failures = 0;
        active.job.status = resp.status;
        match resp.status {
            JobStatus::Pending | JobStatus::Running => {
                self.state.send_if_modified(|s| {
                    let changed = s.status != Some(resp.status);
                    s.status = Some(resp.status);
                    changed
                });
            }
            JobStatus::Completed => {
                // completed sin `data` = dataset vacío válido
                let records = resp.data.unwrap_or_default();
                info!("job {} completado con {} registros", job_id, records.len());

                active.job.finished_at = Some(Utc::now());
                active.job.result = Some(records.clone());
                active.cancel.cancel();

                let dataset = Arc::new(records);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.status = Some(JobStatus::Completed);
                    s.dataset = Some(dataset);
                    s.error = None;
                });
            }
            JobStatus::Failed => {
                active.job.finished_at = Some(Utc::now());
                active.cancel.cancel();

                let err = TaskError::JobFailed {
                    job_id: job_id.clone(),
                };
                warn!("{}", err);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.status = Some(JobStatus::Failed);
                    s.error = Some(err.to_string());
                });
            }
        }
    }
}

/// Programa una consulta por intervalo hasta que se cancele el token.
/// Cada consulta corre en su propia tarea: una petición colgada sólo
/// afecta a su intervalo.
async fn poll_loop<B: JobBackend>(
    shared: Arc<Shared<B>>,
    job_id: JobId,
    generation: u64,
    cancel: CancellationToken,
) {
    let period = shared.policy.interval;
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let shared = Arc::clone(&shared);
                let job_id = job_id.clone();
                tokio::spawn(async move {
                    let outcome = shared.backend.job_status(&job_id).await;
                    shared.apply_poll(&job_id, generation, outcome);
                });
            }
        }
    }

    debug!("polling del job {} detenido", job_id);
}

pub struct TaskController<B: JobBackend> {
    shared: Arc<Shared<B>>,
}

impl<B: JobBackend> TaskController<B> {
    pub fn new(backend: B, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(TaskSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                policy,
                inner: Mutex::new(Inner::default()),
                state,
            }),
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.shared.policy
    }

    /// Crea un job nuevo y empieza a consultarlo.
    ///
    /// Si había un job en curso, deja de programar sus consultas antes de
    /// enviar la nueva. Un error de red al crear no deja job activo.
    pub async fn submit(&self, params: QueryParameters) -> Result<JobId, TaskError> {
        params.validate()?;

        let generation = {
            let mut inner = self.shared.lock();
            inner.generation += 1;
            if let Some(prev) = inner.active.take() {
                prev.cancel.cancel();
                if !prev.is_finished() {
                    info!("job {} reemplazado por una consulta nueva", prev.job.id);
                }
            }
            self.shared.state.send_modify(|s| {
                s.loading = true;
                s.job_id = None;
                s.status = None;
                s.error = None;
            });
            inner.generation
        };

        info!(
            "enviando consulta {}-{} marcas={:?} region={} size={}",
            params.start_year, params.end_year, params.models, params.region, params.size
        );
        let created = self.shared.backend.create_job(&params).await;

        let mut inner = self.shared.lock();
        if inner.generation != generation {
            if let Ok(id) = &created {
                debug!("job {} creado pero ya no es el activo", id);
            }
            return Err(TaskError::Superseded);
        }

        let job_id = match created {
            Ok(id) => id,
            Err(e) => {
                let err = TaskError::Submission(e);
                warn!("{}", err);
                self.shared.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
                return Err(err);
            }
        };

        let cancel = CancellationToken::new();
        inner.active = Some(ActiveJob {
            job: Job::pending(job_id.clone()),
            generation,
            cancel: cancel.clone(),
            failures: 0,
            abandoned: false,
        });
        self.shared.state.send_modify(|s| {
            s.job_id = Some(job_id.clone());
            s.status = Some(JobStatus::Pending);
        });
        drop(inner);

        info!(
            "job {} creado, consultando cada {:?}",
            job_id, self.shared.policy.interval
        );
        tokio::spawn(poll_loop(
            Arc::clone(&self.shared),
            job_id.clone(),
            generation,
            cancel,
        ));
        Ok(job_id)
    }

    /// Deja de programar consultas. Las que ya salieron terminan pero su
    /// resultado se ignora. Conserva el último estado conocido.
    pub fn cancel(&self) {
        let mut inner = self.shared.lock();
        inner.generation += 1;
        if let Some(active) = inner.active.take() {
            active.cancel.cancel();
            info!("polling del job {} cancelado", active.job.id);
        }
        self.shared
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    /// Id del job que todavía se está consultando.
    pub fn active_job_id(&self) -> Option<JobId> {
        self.shared
            .lock()
            .active
            .as_ref()
            .filter(|a| !a.is_finished())
            .map(|a| a.job.id.clone())
    }

    pub fn current_job(&self) -> Option<Job> {
        self.shared.lock().active.as_ref().map(|a| a.job.clone())
    }

    /// Espera a que `loading` vuelva a false (completed, failed, error o cancel).
    pub async fn settled(&self) -> TaskSnapshot {
        let mut rx = self.shared.state.subscribe();
        let snapshot = match rx.wait_for(|s| !s.loading).await {
            Ok(s) => (*s).clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }
}

impl<B: JobBackend> Drop for TaskController<B> {
    fn drop(&mut self) {
        if let Some(active) = self.shared.lock().active.as_ref() {
            active.cancel.cancel();
        }
    }
}
