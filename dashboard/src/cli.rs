use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use common::{JobId, QueryParameters};
use dashboard::{ClientConfig, Dashboard, HttpJobClient, JobBackend};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Cliente del dashboard de emisiones de vehículos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Campos del formulario de consulta.
#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long, default_value_t = 2014)]
    start_year: i32,

    #[arg(long, default_value_t = 2022)]
    end_year: i32,

    /// Marcas separadas por coma
    #[arg(long, default_value = "NISSAN,MITSUBISHI")]
    models: String,

    #[arg(long, default_value = "Mumbai")]
    region: String,

    #[arg(long, default_value = "SUBCOMPACT")]
    size: String,
}

impl QueryArgs {
    fn to_params(&self) -> Result<QueryParameters> {
        Ok(QueryParameters::from_form(
            self.start_year,
            self.end_year,
            &self.models,
            self.region.as_str(),
            self.size.as_str(),
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crea un job en el backend y muestra su id
    Submit {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Consulta una vez el estado de un job
    Status {
        #[arg(value_name = "TASK_ID")]
        id: String,
    },
    /// Envía la consulta, espera el dataset y dibuja los seis gráficos
    Fetch {
        #[command(flatten)]
        query: QueryArgs,

        /// Filtro de año ("All" o un año)
        #[arg(long, default_value = "All")]
        year: String,

        /// Filtro de marca ("All" o una marca)
        #[arg(long, default_value = "All")]
        make: String,

        /// Carpeta donde se escriben los SVG
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,

        /// Exporta además la vista filtrada a CSV
        #[arg(
            long,
            value_name = "ARCHIVO",
            num_args = 0..=1,
            default_missing_value = "filtered_data.csv"
        )]
        csv: Option<PathBuf>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    let backend = HttpJobClient::new(config.backend_url.as_str());

    match cli.command {
        Commands::Submit { query } => {
            let params = query.to_params()?;
            let id = backend
                .create_job(&params)
                .await
                .with_context(|| format!("no se pudo crear el job en {}", backend.base_url()))?;

            println!("Job creado:");
            println!("  task_id: {}", id);
        }

        Commands::Status { id } => {
            let resp = backend
                .job_status(&JobId::new(id.as_str()))
                .await
                .with_context(|| format!("no se pudo consultar el job {id}"))?;

            println!("Job:");
            println!("  id: {}", id);
            println!("  estado: {}", resp.status);
            if let Some(data) = &resp.data {
                println!("  registros: {}", data.len());
            }
        }

        Commands::Fetch {
            query,
            year,
            make,
            out_dir,
            csv,
        } => {
            let params = query.to_params()?;
            let mut dash = Dashboard::new(backend, config.poll);
            dash.set_year(&year)?;
            dash.set_make(&make)?;

            let id = dash.submit_query(params).await?;
            println!("Job {} creado, esperando resultados...", id);

            let snapshot = dash.wait_until_settled().await;
            if let Some(err) = snapshot.error {
                bail!(err);
            }

            let summary = dash.summary();
            println!("Resultados:");
            println!("  registros: {}", summary.total_records);
            println!("  marcas únicas: {}", summary.unique_makes);
            println!("  años únicos: {}", summary.unique_years);
            println!("  años disponibles: {:?}", dash.distinct_years());
            println!("  marcas disponibles: {:?}", dash.distinct_makes());

            let written = dash.write_charts(&out_dir)?;
            println!("Gráficos:");
            for path in written {
                println!("  {}", path.display());
            }

            if let Some(path) = csv {
                dash.export_current_view(&path)?;
                println!("CSV: {}", path.display());
            }
        }
    }

    Ok(())
}
