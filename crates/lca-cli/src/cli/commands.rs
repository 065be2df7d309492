use super::CliError;
use super::adapters::{DirectoryProjectStore, JsonCatalogProvider, JsonLinesPublisher, RESULTS_FILE};
use super::helpers::{load_config, read_material_names, render_run_summary, unix_timestamp_millis};
use lca_core::aggregation::normalize_classification_code;
use lca_core::catalog::ReferenceCatalog;
use lca_core::display::DisplayMode;
use lca_core::domain::ReferenceMaterial;
use lca_core::ports::MaterialCatalogProvider;
use lca_core::serialization::{format_fixed_f64, write_json_report};
use lca_core::workflow::{RunOptions, run_project};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct CalculateArgs {
    /// Directory holding one subdirectory per project
    #[arg(long)]
    project_root: PathBuf,

    /// Project identifier (subdirectory name)
    #[arg(long)]
    project: String,

    /// Reference material catalog (JSON array)
    #[arg(long)]
    catalog: PathBuf,

    /// Engine config path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Display mode: total or per-area-per-year
    #[arg(long, default_value = "total")]
    mode: DisplayMode,

    /// Energy reference area in m², overrides the stored project value
    #[arg(long)]
    ebf: Option<f64>,

    /// Elements per aggregation batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// JSON-lines file receiving one event per material instance
    #[arg(long)]
    events: Option<PathBuf>,

    /// Additional copy of the JSON result
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct MatchArgs {
    /// Reference material catalog (JSON array)
    #[arg(long)]
    catalog: PathBuf,

    /// JSON array of material names or {id, name} objects
    #[arg(long)]
    names: PathBuf,

    /// Engine config path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suggestions per name
    #[arg(long)]
    top_k: Option<usize>,

    /// Minimum similarity in [0, 1]
    #[arg(long)]
    min_score: Option<f64>,

    /// Write the best match per name as a mapping table
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct AmortizationArgs {
    /// Classification code, e.g. C04.08
    #[arg(value_name = "code")]
    code: String,

    /// Engine config path
    #[arg(long)]
    config: Option<PathBuf>,
}

pub(super) fn run_calculate_command(args: CalculateArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    let mut options = RunOptions::from_config(&config);
    options.mode = args.mode;
    options.ebf = args.ebf;
    if let Some(batch_size) = args.batch_size {
        if batch_size == 0 {
            return Err(CliError::Usage("--batch-size must be at least 1".to_string()));
        }
        options.batch_size = batch_size;
    }
    options.timestamp = unix_timestamp_millis()?;

    let catalog = JsonCatalogProvider::new(&args.catalog);
    let store = DirectoryProjectStore::new(&args.project_root);
    let publisher = JsonLinesPublisher::new(args.events.clone());

    let run = run_project(&args.project, &options, &catalog, &store, &publisher).map_err(CliError::Compute)?;
    if let Some(report) = &args.report {
        write_json_report(report, &run.result).map_err(CliError::Compute)?;
    }

    println!("{}", render_run_summary(&run));
    println!(
        "Results: {}",
        args.project_root.join(&args.project).join(RESULTS_FILE).display()
    );
    Ok(0)
}

pub(super) fn run_match_command(args: MatchArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    let mut matcher = config.matcher();
    if let Some(top_k) = args.top_k {
        matcher = matcher.with_top_k(top_k);
    }
    if let Some(min_score) = args.min_score {
        if !(0.0..=1.0).contains(&min_score) {
            return Err(CliError::Usage(format!("--min-score must lie in [0, 1], got {min_score}")));
        }
        matcher = matcher.with_min_score(min_score);
    }

    let catalog = ReferenceCatalog::new(
        JsonCatalogProvider::new(&args.catalog)
            .fetch_all()
            .map_err(CliError::Compute)?,
    );
    let instances = read_material_names(&args.names)?;

    for instance in &instances {
        let suggestions = matcher.rank_in_catalog(&instance.name, &catalog);
        if suggestions.is_empty() {
            println!("{}: no match", instance.name);
            continue;
        }
        println!("{}:", instance.name);
        for suggestion in suggestions {
            let density = catalog
                .get(&suggestion.reference_id)
                .map(ReferenceMaterial::density_label)
                .unwrap_or_default();
            println!(
                "  {} {} {} ({})",
                format_fixed_f64(suggestion.score, 6, 3),
                suggestion.reference_id,
                suggestion.display_name,
                density
            );
        }
    }

    if let Some(output) = &args.output {
        let mappings = matcher.suggest_mappings(&instances, &catalog);
        write_json_report(output, &mappings).map_err(CliError::Compute)?;
        println!("Mappings: {} of {} names -> {}", mappings.len(), instances.len(), output.display());
    }
    Ok(0)
}

pub(super) fn run_amortization_command(args: AmortizationArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    let table = config.amortization_table();
    let code = normalize_classification_code(Some(args.code.as_str()));
    let years = table.resolve_years(Some(code.as_str()), config.default_amortization_years);

    println!("Code: {code}");
    println!("Years: {years}");
    if table.has_data(&code) {
        let options: Vec<String> = table.options(&code).iter().map(u32::to_string).collect();
        println!("Options: {}", options.join(", "));
    } else {
        println!("Options: default ({})", config.default_amortization_years);
    }
    Ok(0)
}
