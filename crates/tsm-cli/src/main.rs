use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tsm_core::validate::{self, Severity};
use tsm_core::{DirSource, ExportControl, ExportOptions};

#[derive(Parser, Debug)]
#[command(
    name = "tsm-cli",
    about = "Validate and export Tiberian Sun unit mods",
    version
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the validation rules over a units file
    Validate(ValidateArgs),
    /// Validate, inject and package a mod as a zip
    Export(ExportArgs),
    /// Pack files into a MIX archive
    Pack(PackArgs),
    /// List the index of a MIX archive
    List(ListArgs),
    /// Print the MIX hash of one or more file names
    Hash(HashArgs),
    /// Parse an ini file and print it back normalized
    Normalize(NormalizeArgs),
}

#[derive(ClapArgs, Debug)]
struct ValidateArgs {
    /// Units JSON (array of units as saved by the editor)
    units: PathBuf,
    /// Print the issues as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct ExportArgs {
    /// Units JSON
    #[arg(long)]
    units: PathBuf,
    /// Base rules.ini
    #[arg(long)]
    rules: PathBuf,
    /// Base art.ini
    #[arg(long)]
    art: PathBuf,
    /// Directory the unit asset paths are relative to
    #[arg(long)]
    assets: PathBuf,
    /// Output .zip path
    #[arg(long)]
    out: PathBuf,
    /// Directory of static files to ship alongside the generated ones
    #[arg(long)]
    skeleton: Option<PathBuf>,
    /// Export options JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Subdirectory of --assets tried when an asset is missing
    #[arg(long)]
    fallback_namespace: Option<String>,
    #[arg(long)]
    cache_archive: Option<String>,
    #[arg(long)]
    expansion_archive: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct PackArgs {
    /// Files to pack, stored under their file names
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Output .mix path
    #[arg(long)]
    out: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    mix: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct HashArgs {
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(ClapArgs, Debug)]
struct NormalizeArgs {
    ini: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Cmd::Validate(a) => cmd_validate(a),
        Cmd::Export(a) => cmd_export(a),
        Cmd::Pack(a) => cmd_pack(a),
        Cmd::List(a) => cmd_list(a),
        Cmd::Hash(a) => cmd_hash(a),
        Cmd::Normalize(a) => cmd_normalize(a),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(code: i32, what: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("{what}: {e}");
    std::process::exit(code);
}

fn read_text(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(2, &format!("error reading {}", path.display()), e))
}

fn cmd_validate(args: ValidateArgs) {
    let units = tsm_core::json::load_units(&args.units).unwrap_or_else(|e| fail(2, "error", e));
    let issues = tsm_core::run_validation(&units);
    if args.json {
        match tsm_core::json::report_json(&issues) {
            Ok(s) => println!("{}", s),
            Err(e) => fail(2, "error", e),
        }
    } else {
        for i in &issues {
            let sev = match i.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "info",
            };
            let fix = i
                .suggestion
                .as_deref()
                .map(|s| format!(" (suggest: {s}{})", if i.auto_fix { ", auto" } else { "" }))
                .unwrap_or_default();
            println!("{}\t{}\t{}\t{}{}", i.unit_name, sev, i.rule_id, i.message, fix);
        }
        println!("{} unit(s), {} issue(s)", units.len(), issues.len());
    }
    if !validate::is_exportable(&issues) {
        std::process::exit(1);
    }
}

fn cmd_export(args: ExportArgs) {
    let mut options = match &args.config {
        Some(p) => ExportOptions::from_json_file(p).unwrap_or_else(|e| fail(2, "error in config", e)),
        None => ExportOptions::default(),
    };
    if args.fallback_namespace.is_some() {
        options.fallback_namespace = args.fallback_namespace;
    }
    if let Some(name) = args.cache_archive {
        options.cache_archive = name;
    }
    if let Some(name) = args.expansion_archive {
        options.expansion_archive = name;
    }

    let units = tsm_core::json::load_units(&args.units).unwrap_or_else(|e| fail(2, "error", e));
    let rules = read_text(&args.rules);
    let art = read_text(&args.art);
    let source = DirSource::new(&args.assets).with_fallback(options.fallback_namespace.clone());

    let artifacts = tsm_core::export_mod(
        &units,
        &rules,
        &art,
        &source,
        &options,
        ExportControl::default(),
    )
    .unwrap_or_else(|e| {
        if let tsm_core::Error::ValidationFailed { .. } = e {
            for i in tsm_core::run_validation(&units)
                .iter()
                .filter(|i| i.severity == Severity::Error)
            {
                eprintln!("{}\t{}\t{}", i.unit_name, i.rule_id, i.message);
            }
            fail(1, "export blocked", e)
        }
        fail(3, "export failed", e)
    });
    for i in &artifacts.issues {
        eprintln!("{}\t{:?}\t{}\t{}", i.unit_name, i.severity, i.rule_id, i.message);
    }
    tsm_core::write_package(&args.out, &artifacts, args.skeleton.as_deref())
        .unwrap_or_else(|e| fail(4, "error writing package", e));
    println!("{}", args.out.display());
}

fn cmd_pack(args: PackArgs) {
    let mut files = Vec::with_capacity(args.files.len());
    for p in &args.files {
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| fail(2, "error", format!("not a file: {}", p.display())));
        let data = std::fs::read(p)
            .unwrap_or_else(|e| fail(2, &format!("error reading {}", p.display()), e));
        files.push((name, data));
    }
    let bytes = tsm_core::build_archive(&files).unwrap_or_else(|e| fail(3, "error", e));
    std::fs::write(&args.out, bytes).unwrap_or_else(|e| fail(4, "error writing", e));
}

fn cmd_list(args: ListArgs) {
    let data = std::fs::read(&args.mix).unwrap_or_else(|e| fail(2, "error", e));
    let index = tsm_core::MixIndex::parse(&data).unwrap_or_else(|e| fail(3, "error", e));
    println!("{} entries, {} bytes of data", index.entries.len(), index.data_size);
    for e in &index.entries {
        println!("{:08x}\t{}\t{}", e.hash, e.offset, e.size);
    }
}

fn cmd_hash(args: HashArgs) {
    for name in &args.names {
        println!("{:08x}\t{}", tsm_core::mix_hash(name), name);
    }
}

fn cmd_normalize(args: NormalizeArgs) {
    let doc = tsm_core::parse_config(&read_text(&args.ini));
    print!("{}", tsm_core::stringify_config(&doc));
}
