use clap::{ArgAction, Parser, Subcommand};
use photo_stamp::config::{self, ConfigError, DEFAULT_CONFIG_FILE, ProcessingConfig, Settings};
use photo_stamp::imaging::{Anchor, BorderStyle, RustBackend};
use photo_stamp::output;
use photo_stamp::process::{self, BatchPaths};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photo-stamp")]
#[command(about = "Batch-resize photos to a print size and stamp a logo on them")]
#[command(long_about = "\
Batch-resize photos to a print size and stamp a logo on them

Every JPEG, PNG and BMP in the source folder is turned upright, fitted onto
a canvas of the configured physical size (letterboxed, never cropped),
stamped with the logo, optionally framed with a solid or dashed border, and
written under the same name into the destination folder. Other files are
skipped. The results can be laid out two per page on A4 landscape sheets.

Settings come from photo-stamp.toml in the working directory (or --config),
overridden by any flags given here.

Run 'photo-stamp gen-config' to generate a documented photo-stamp.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: photo-stamp.toml, if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show diagnostics on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every photo in the source folder
    Run(RunArgs),
    /// Validate settings and logo, and list what a run would do
    Check(SettingsArgs),
    /// Print a stock photo-stamp.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct RunArgs {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Print the batch report as JSON instead of progress and summary
    #[arg(long)]
    json: bool,
}

/// Flags that override values from the config file.
#[derive(clap::Args, Default)]
struct SettingsArgs {
    /// Folder of input photos
    #[arg(long)]
    source: Option<PathBuf>,

    /// Output folder, created if absent
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Logo image composited onto every photo
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Output width in centimetres
    #[arg(long)]
    width_cm: Option<f64>,

    /// Output height in centimetres
    #[arg(long)]
    height_cm: Option<f64>,

    /// Resolution: 300 for print, 72 for web
    #[arg(long)]
    dpi: Option<u32>,

    /// Logo anchor: bottom-right, bottom-left, top-right, top-left, center
    #[arg(long)]
    anchor: Option<Anchor>,

    /// Vertical logo offset in pixels, negative moves up
    #[arg(long, allow_hyphen_values = true)]
    vertical_offset: Option<i32>,

    /// Enable a border of this style: solid or dashed
    #[arg(long, conflicts_with = "no_border")]
    border: Option<BorderStyle>,

    /// Border thickness in pixels
    #[arg(long)]
    border_thickness: Option<i32>,

    /// Border color as #rrggbb
    #[arg(long)]
    border_color: Option<String>,

    /// Disable the border even if the config file enables it
    #[arg(long)]
    no_border: bool,

    /// Write the PDF sheet under this name (".pdf" appended if missing)
    #[arg(long, conflicts_with = "no_pdf")]
    pdf: Option<String>,

    /// Skip the PDF sheet
    #[arg(long)]
    no_pdf: bool,
}

impl SettingsArgs {
    /// The flags as a sparse settings table, merged over the config file.
    fn overlay(&self) -> toml::Value {
        let mut root = toml::Table::new();
        let mut set = |section: &str, key: &str, value: toml::Value| {
            if let toml::Value::Table(table) = root
                .entry(section)
                .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            {
                table.insert(key.to_string(), value);
            }
        };
        let path = |p: &Path| toml::Value::String(p.to_string_lossy().into_owned());

        if let Some(p) = &self.source {
            set("paths", "source", path(p));
        }
        if let Some(p) = &self.dest {
            set("paths", "destination", path(p));
        }
        if let Some(p) = &self.logo {
            set("paths", "logo", path(p));
        }
        if let Some(v) = self.width_cm {
            set("size", "width_cm", v.into());
        }
        if let Some(v) = self.height_cm {
            set("size", "height_cm", v.into());
        }
        if let Some(v) = self.dpi {
            set("size", "dpi", i64::from(v).into());
        }
        if let Some(anchor) = self.anchor {
            set("logo", "anchor", anchor.name().into());
        }
        if let Some(v) = self.vertical_offset {
            set("logo", "vertical_offset", i64::from(v).into());
        }
        if let Some(style) = self.border {
            set("border", "enabled", true.into());
            set("border", "style", style.name().into());
        }
        if self.no_border {
            set("border", "enabled", false.into());
        }
        if let Some(v) = self.border_thickness {
            set("border", "thickness", i64::from(v).into());
        }
        if let Some(v) = &self.border_color {
            set("border", "color", v.as_str().into());
        }
        if let Some(name) = &self.pdf {
            set("pdf", "enabled", true.into());
            set("pdf", "filename", name.as_str().into());
        }
        if self.no_pdf {
            set("pdf", "enabled", false.into());
        }
        toml::Value::Table(root)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            let settings = load_settings(cli.config.as_deref(), &args.settings)?;
            let config = ProcessingConfig::from_settings(&settings)?;
            let paths = BatchPaths::from_config(&settings.paths)?;

            let show_progress = !args.json;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if show_progress {
                        for line in output::format_process_event(&event) {
                            println!("{}", line);
                        }
                    }
                }
            });
            let result = process::process(&paths, &config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!();
                output::print_summary(&report);
            }
        }
        Command::Check(args) => {
            let settings = load_settings(cli.config.as_deref(), &args)?;
            let config = ProcessingConfig::from_settings(&settings)?;
            let paths = BatchPaths::from_config(&settings.paths)?;
            let logo = process::load_logo(&RustBackend::new(), &paths.logo)?;
            let files = process::list_source_files(&paths.source)?;
            output::print_check(&paths, &config, logo.dimensions(), &files);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Stock defaults, then the config file, then command-line flags.
///
/// An explicit `--config` must exist; the default file is optional.
fn load_settings(config_path: Option<&Path>, flags: &SettingsArgs) -> Result<Settings, ConfigError> {
    let file = match config_path {
        Some(path) => config::load_raw_config(path, true)?,
        None => config::load_raw_config(Path::new(DEFAULT_CONFIG_FILE), false)?,
    };
    config::resolve_settings(file.into_iter().chain([flags.overlay()]))
}

/// Diagnostics go to stderr so stdout stays clean for progress and `--json`.
/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn empty_flags_change_nothing() {
        let settings = config::resolve_settings([SettingsArgs::default().overlay()]).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn flags_override_file_values() {
        let file: toml::Value = toml::from_str(
            "[size]\ndpi = 300\nwidth_cm = 12.0\n[pdf]\nfilename = \"file.pdf\"\n",
        )
        .unwrap();
        let flags = SettingsArgs {
            dpi: Some(72),
            anchor: Some(Anchor::Center),
            border: Some(BorderStyle::Dashed),
            pdf: Some("cli".into()),
            source: Some("in".into()),
            ..Default::default()
        };

        let settings = config::resolve_settings([file, flags.overlay()]).unwrap();
        assert_eq!(settings.size.dpi, 72);
        assert_eq!(settings.size.width_cm, 12.0);
        assert_eq!(settings.logo.anchor, Anchor::Center);
        assert!(settings.border.enabled);
        assert_eq!(settings.border.style, BorderStyle::Dashed);
        assert_eq!(settings.pdf.filename, "cli");
        assert_eq!(settings.paths.source, Some(PathBuf::from("in")));
    }

    #[test]
    fn no_pdf_and_no_border_disable() {
        let file: toml::Value = toml::from_str("[border]\nenabled = true\n").unwrap();
        let flags = SettingsArgs {
            no_pdf: true,
            no_border: true,
            ..Default::default()
        };
        let settings = config::resolve_settings([file, flags.overlay()]).unwrap();
        assert!(!settings.pdf.enabled);
        assert!(!settings.border.enabled);
    }

    #[test]
    fn run_parses_negative_offset() {
        let cli = Cli::try_parse_from([
            "photo-stamp",
            "run",
            "--source",
            "in",
            "--vertical-offset",
            "-12",
            "--anchor",
            "top-left",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.settings.vertical_offset, Some(-12));
        assert_eq!(args.settings.anchor, Some(Anchor::TopLeft));
    }
}
