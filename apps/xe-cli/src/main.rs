use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xe_app::{
    AdvisoryInputs, AdvisoryReport, AppError, AppResult, DerivedState, SpectrumState,
    check_plan_phases, derive_state, inputs_from_plan, plan_service, write_attenuation_csv,
    write_calibration_csv, write_transmission_csv,
};
use xe_core::units::in_minutes;
use xe_model::{Binning, DetectorWidth, FilterPolicy, StudyPurpose, attenuation_series};
use xe_project::ScanPlan;

#[derive(Parser)]
#[command(name = "xe-cli")]
#[command(about = "XCT Explorer CLI - scan parameter advisor for X-ray CT", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plan file and its phases
    Validate {
        /// Path to the plan file (.yaml, .yml or .json)
        plan_path: PathBuf,
        /// Attenuation table to use instead of the plan's
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Write a default plan
    Init {
        /// Output plan path (.yaml, .yml or .json)
        plan_path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Derive scan parameters for a plan
    Advise {
        /// Path to the plan file
        plan_path: PathBuf,
        /// Attenuation table to use instead of the plan's
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the transmission table of a plan as CSV
    Transmission {
        /// Path to the plan file
        plan_path: PathBuf,
        /// Attenuation table to use instead of the plan's
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List or search the phases of an attenuation table
    Phases {
        /// Case-insensitive substring to filter by
        query: Option<String>,
        /// Attenuation table (defaults to the built-in reference table)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Export the attenuation curves of a plan's phases as CSV
    Attenuation {
        /// Path to the plan file
        plan_path: PathBuf,
        /// Attenuation table to use instead of the plan's
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the voxel size calibration points of a configuration as CSV
    Calibration {
        /// Binning: 1x, 2x or 3x
        #[arg(long, default_value = "1x")]
        binning: Binning,
        /// Detector width: 1920 or 2856
        #[arg(long, default_value = "1920")]
        detector: DetectorWidth,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Settings that replace the plan's values for one invocation.
#[derive(Args)]
struct Overrides {
    /// Filter policy: "No Filter", Fast or Ideal
    #[arg(long)]
    filter: Option<FilterPolicy>,
    /// Binning: 1x, 2x or 3x
    #[arg(long)]
    binning: Option<Binning>,
    /// Detector width: 1920 or 2856
    #[arg(long)]
    detector: Option<DetectorWidth>,
    /// Study purpose: Qualitative, Quantify or Classify
    #[arg(long)]
    purpose: Option<StudyPurpose>,
}

impl Overrides {
    fn apply(&self, inputs: &mut AdvisoryInputs) {
        if let Some(filter) = self.filter {
            inputs.filter = filter;
        }
        if let Some(binning) = self.binning {
            inputs.binning = binning;
        }
        if let Some(detector) = self.detector {
            inputs.detector = detector;
        }
        if let Some(purpose) = self.purpose {
            inputs.purpose = purpose;
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { plan_path, dataset } => cmd_validate(&plan_path, dataset.as_deref()),
        Commands::Init { plan_path, force } => cmd_init(&plan_path, force),
        Commands::Advise {
            plan_path,
            dataset,
            overrides,
            format,
            output,
        } => cmd_advise(
            &plan_path,
            dataset.as_deref(),
            &overrides,
            format,
            output.as_deref(),
        ),
        Commands::Transmission {
            plan_path,
            dataset,
            overrides,
            output,
        } => cmd_transmission(&plan_path, dataset.as_deref(), &overrides, output.as_deref()),
        Commands::Phases { query, dataset } => cmd_phases(query.as_deref(), dataset.as_deref()),
        Commands::Attenuation {
            plan_path,
            dataset,
            output,
        } => cmd_attenuation(&plan_path, dataset.as_deref(), output.as_deref()),
        Commands::Calibration {
            binning,
            detector,
            output,
        } => emit(output.as_deref(), |w| write_calibration_csv(w, binning, detector)),
    }
}

struct Session {
    plan: ScanPlan,
    dataset: xe_data::AttenuationDataset,
    source: plan_service::DatasetSource,
}

fn open_session(plan_path: &Path, dataset: Option<&Path>) -> AppResult<Session> {
    let plan = plan_service::load_plan(plan_path)?;
    let (dataset, source) = plan_service::resolve_dataset(&plan, Some(plan_path), dataset)?;
    check_plan_phases(&plan, &dataset)?;
    info!(plan = %plan.name, dataset = %source, "session opened");
    Ok(Session {
        plan,
        dataset,
        source,
    })
}

fn derive(session: &Session, overrides: &Overrides) -> AppResult<DerivedState> {
    let mut inputs = inputs_from_plan(&session.plan);
    overrides.apply(&mut inputs);
    derive_state(&session.dataset, &inputs)
}

/// Write to a file, or stdout when no path is given.
fn emit(output: Option<&Path>, write: impl FnOnce(&mut dyn Write) -> AppResult<()>) -> AppResult<()> {
    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path).map_err(|source| AppError::FileWrite {
                path: path.to_path_buf(),
                source,
            })?;
            write(&mut file)?;
            println!("✓ Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
        }
    }
    Ok(())
}

fn cmd_validate(plan_path: &Path, dataset: Option<&Path>) -> AppResult<()> {
    println!("Validating plan: {}", plan_path.display());
    let session = open_session(plan_path, dataset)?;
    inputs_from_plan(&session.plan).validate(&session.dataset)?;
    println!("✓ Plan is valid ({})", session.source);
    Ok(())
}

fn cmd_init(plan_path: &Path, force: bool) -> AppResult<()> {
    if plan_path.exists() && !force {
        return Err(AppError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists, use --force to overwrite", plan_path.display()),
        )));
    }
    plan_service::save_plan(plan_path, &ScanPlan::default())?;
    println!("✓ Wrote default plan to {}", plan_path.display());
    Ok(())
}

fn cmd_advise(
    plan_path: &Path,
    dataset: Option<&Path>,
    overrides: &Overrides,
    format: OutputFormat,
    output: Option<&Path>,
) -> AppResult<()> {
    let session = open_session(plan_path, dataset)?;
    let state = derive(&session, overrides)?;
    let report = AdvisoryReport::new(
        session.plan.name.clone(),
        session.source.to_string(),
        &state,
    );

    let text = match format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Yaml => report.to_yaml()?,
    };
    emit(output, |w| {
        writeln!(w, "{}", text.trim_end())?;
        Ok(())
    })
}

fn cmd_transmission(
    plan_path: &Path,
    dataset: Option<&Path>,
    overrides: &Overrides,
    output: Option<&Path>,
) -> AppResult<()> {
    let session = open_session(plan_path, dataset)?;
    let state = derive(&session, overrides)?;
    match &state.spectrum {
        SpectrumState::Estimated { transmission, .. } => {
            emit(output, |w| write_transmission_csv(w, transmission))
        }
        SpectrumState::Unavailable { reason } => Err(AppError::DegenerateFit(reason.clone())),
    }
}

fn cmd_phases(query: Option<&str>, dataset: Option<&Path>) -> AppResult<()> {
    let (dataset, source) =
        plan_service::resolve_dataset(&ScanPlan::default(), None, dataset)?;
    let names = match query {
        Some(q) => dataset.search(q),
        None => dataset.phase_names(),
    };

    if names.is_empty() {
        println!("No phases found in {}", source);
    } else {
        println!("Phases in {} (filter: {}):", source, dataset.filter_phase());
        for name in names {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn cmd_attenuation(plan_path: &Path, dataset: Option<&Path>, output: Option<&Path>) -> AppResult<()> {
    let session = open_session(plan_path, dataset)?;

    let mut phases: Vec<&str> = Vec::new();
    for p in &session.plan.phases {
        if !phases.contains(&p.phase.as_str()) {
            phases.push(&p.phase);
        }
    }
    let series = attenuation_series(&session.dataset, &phases)?;
    emit(output, |w| write_attenuation_csv(w, &series))
}

fn render_text(report: &AdvisoryReport) -> String {
    let state = &report.state;
    let inputs = &state.inputs;
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line(format!("Plan: {}", report.plan));
    line(format!("Dataset: {}", report.dataset));
    line(format!(
        "Sample: {} mm, {} study, binning {}, detector {} px",
        inputs.diameter_mm, inputs.purpose, inputs.binning, inputs.detector
    ));
    line(String::new());
    line(format!("  Voxel size:        {} µm", state.geometry.voxel_size_um));
    line(format!("  Data size:         {} Gb", state.geometry.data_size_gb));
    line(format!("  Minimum feature:   {} µm", state.minimum_feature_um));
    line(format!("  Porosity:          {} %", state.composition.porosity_percent));

    match &state.spectrum {
        SpectrumState::Estimated {
            transmission,
            timing,
            ..
        } => {
            line(format!(
                "  Filter ({}):  {:.2} mm",
                transmission.filter_policy, transmission.filter_thickness_mm
            ));
            line(format!(
                "  E at 10% / 1%:     {:.0} / {:.0} kV",
                transmission.energy_at_10_percent_kv, transmission.energy_at_1_percent_kv
            ));
            line(format!(
                "  Scan time:         {:.1} h ({:.0} min)",
                timing.scan_hours,
                in_minutes(timing.scan_duration())
            ));
            line(format!(
                "  Experiment time:   {:.1} h ({:.0} min, {} scans)",
                timing.experiment_hours,
                in_minutes(timing.experiment_duration()),
                inputs.scan_count
            ));
        }
        SpectrumState::Unavailable { .. } => {
            line("  Spectrum:          not available".to_string());
        }
    }

    if !report.warnings.is_empty() {
        line(String::new());
        for w in &report.warnings {
            line(format!("⚠ {}", w));
        }
    }
    out
}
