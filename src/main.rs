use clap::{Parser, Subcommand};
use iconforge::config::{self, IconForgeConfig};
use iconforge::imaging::{self, IconParams, IconSize, PostProcessed, RustBackend};
use iconforge::naming::{archive_filename, single_icon_filename};
use iconforge::source::IconSource;
use iconforge::{output, package, process, scan};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Shared flags for commands that process icons.
#[derive(clap::Args, Clone)]
struct ProcessArgs {
    /// Disable the processing cache and re-render every icon
    #[arg(long)]
    no_cache: bool,

    /// Icon edge in pixels (overrides icons.size)
    #[arg(long)]
    size: Option<u32>,
}

#[derive(clap::Args, Clone)]
struct PackageArgs {
    /// Archive path (default: iconforge_<theme>_<size>px.zip)
    #[arg(long)]
    archive: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct IconArgs {
    /// Image path or data URI
    source: String,

    /// Icon edge in pixels (overrides icons.size)
    #[arg(long)]
    size: Option<u32>,

    /// Write the PNG here instead of printing a data URI.
    /// An existing directory gets `<name>_<size>px.png` inside it.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "iconforge")]
#[command(about = "Turn app artwork into rounded, sharpened home screen icons")]
#[command(long_about = "\
Turn app artwork into rounded, sharpened home screen icons

Every source image is cropped to a centered square, resized, clipped to a
continuous-curvature rounded square and lightly sharpened. Sources that
cannot be decoded are passed through unchanged and reported.

Sources:

  artwork/                         # Directory: one icon per image
  ├── config.toml                  # Optional config
  ├── Instagram.png                # → icon \"Instagram\"
  └── Google Maps.jpg              # → icon \"Google Maps\"

  icons.json                       # Or a JSON list of named sources
  [{ \"name\": \"Maps\", \"source\": \"data:image/png;base64,...\" }]

Run 'iconforge gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Source directory or JSON source list
    #[arg(long, default_value = "artwork", global = true)]
    source: PathBuf,

    /// Directory for processed icons and the manifest
    #[arg(long, default_value = "processed", global = true)]
    output: PathBuf,

    /// Config file (default: config.toml next to the sources)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop, mask and sharpen every source icon
    Process(ProcessArgs),
    /// Zip processed icons with a manifest and setup guide
    Package(PackageArgs),
    /// Run the full pipeline: process → package
    Build {
        #[command(flatten)]
        process: ProcessArgs,
        #[command(flatten)]
        package: PackageArgs,
    },
    /// Post-process a single icon
    Icon(IconArgs),
    /// List sources and check they decode, without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Process(args) => {
            let config = load_config(&cli)?;
            let params = icon_params(&config, args.size)?;
            run_process(&cli.source, &cli.output, &config, &params, !args.no_cache)?;
        }
        Command::Package(args) => {
            let config = load_config(&cli)?;
            run_package(&cli.output, &config, args.archive.as_deref())?;
        }
        Command::Build {
            process: process_args,
            package: package_args,
        } => {
            let config = load_config(&cli)?;
            let params = icon_params(&config, process_args.size)?;

            println!("==> Stage 1: Processing {}", cli.source.display());
            run_process(&cli.source, &cli.output, &config, &params, !process_args.no_cache)?;

            println!("==> Stage 2: Packaging {}", cli.output.display());
            run_package(&cli.output, &config, package_args.archive.as_deref())?;

            println!("==> Build complete");
        }
        Command::Icon(args) => {
            let config = load_config(&cli)?;
            let params = icon_params(&config, args.size)?;
            let source = IconSource::parse(&args.source, Path::new("."));
            let result = imaging::post_process_icon(&RustBackend::new(), &source, &params);

            match &args.out {
                Some(out) => {
                    let out = if out.is_dir() {
                        out.join(single_icon_filename(&icon_name(&source), params.size))
                    } else {
                        out.clone()
                    };
                    let written = write_icon(&result, &out)?.then_some(out.as_path());
                    output::print_icon_result(&source.label(), params.size, &result, written);
                }
                None => {
                    output::print_icon_result(&source.label(), params.size, &result, None);
                    match &result.image {
                        IconSource::DataUri(uri) => println!("{uri}"),
                        other => println!("{other}"),
                    }
                }
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            load_config(&cli)?;
            let entries = scan::scan(&cli.source)?;
            let backend = RustBackend::new();
            let probes: Vec<Result<(u32, u32), String>> = entries
                .iter()
                .map(|entry| {
                    let bytes = entry.source.load().map_err(|e| e.to_string())?;
                    imaging::get_dimensions(&backend, &bytes).map_err(|e| e.to_string())
                })
                .collect();
            output::print_check_output(&entries, &probes);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--config` if given, otherwise `config.toml` beside the sources.
fn load_config(cli: &Cli) -> Result<IconForgeConfig, config::ConfigError> {
    match &cli.config {
        Some(file) if !file.is_file() => Err(config::ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", file.display()),
        ))),
        Some(file) => config::load_config_file(file),
        None if cli.source.is_dir() => config::load_config(&cli.source),
        None => config::load_config(cli.source.parent().unwrap_or(Path::new("."))),
    }
}

/// File stem for file sources, `icon` for anything else.
fn icon_name(source: &IconSource) -> String {
    match source {
        IconSource::File(path) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "icon".to_string()),
        _ => "icon".to_string(),
    }
}

/// Write the icon to `out`. A fallback to a source that cannot be read
/// (remote or missing) has no bytes to write and returns `false`.
fn write_icon(result: &PostProcessed, out: &Path) -> std::io::Result<bool> {
    match result.image.load() {
        Ok(bytes) => {
            std::fs::write(out, bytes)?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

fn icon_params(
    config: &IconForgeConfig,
    size_override: Option<u32>,
) -> Result<IconParams, config::ConfigError> {
    let mut icons = config.icons.clone();
    if let Some(size) = size_override {
        icons.size = size;
    }
    icons.params()
}

fn run_process(
    source: &Path,
    output_dir: &Path,
    config: &IconForgeConfig,
    params: &IconParams,
    use_cache: bool,
) -> Result<process::ProcessResult, Box<dyn Error>> {
    let entries = scan::scan(source)?;
    output::print_scan_output(&entries);
    init_thread_pool(&config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(&entries, output_dir, params, use_cache, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let result = result?;

    println!("Cache: {}", result.cache_stats);
    Ok(result)
}

fn run_package(
    output_dir: &Path,
    config: &IconForgeConfig,
    archive: Option<&Path>,
) -> Result<package::PackageSummary, Box<dyn Error>> {
    let manifest = process::read_manifest(output_dir)?;
    let archive = match archive {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(archive_filename(
            &config.package.theme,
            IconSize::new(manifest.size)?,
        )),
    };
    let summary = package::package(&manifest, output_dir, &archive, &config.package.theme)?;
    output::print_package_summary(&summary);
    Ok(summary)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
