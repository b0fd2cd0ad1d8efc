//! Discovery probe for an extension host layout.
//!
//! # Responsibility
//! - Read a host config and walk one extension namespace without building
//!   any extension.
//! - Print each discovered name with its class identity and source folder.

use clap::Parser;
use extkit_core::{
    init_logging_from_config, DirectoryModuleRegistry, ExtensionError, ExtensionHost,
    ExtensionSelection, HostConfig, ManagerKind, StaticClassLoader,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

const PROBE_KIND: ManagerKind = ManagerKind::new("cli_probe");

/// List the extensions a host would discover for one module/slug namespace.
#[derive(Parser, Debug)]
#[command(name = "extkit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON host config with addon roots, language, and logging.
    #[arg(short, long)]
    config: PathBuf,

    /// Owning host module, e.g. `streams_core`.
    #[arg(short, long)]
    module: String,

    /// Extension type slug, e.g. `field_types`.
    #[arg(short, long)]
    slug: String,

    /// Directory whose sub-folders count as enabled host modules.
    #[arg(long)]
    modules_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("extkit: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let config = HostConfig::from_file(&args.config).map_err(|err| err.to_string())?;
    if let Some(logging) = &config.logging {
        init_logging_from_config(logging)?;
    }

    let mut host = ExtensionHost::from_config(&config, StaticClassLoader::new());
    if let Some(dir) = &args.modules_dir {
        host = host.with_module_registry(DirectoryModuleRegistry::new(dir));
    }

    let mut manager = host.manager(PROBE_KIND);
    manager
        .init(&args.module, &args.slug, false)
        .map_err(describe)?;
    if let Some(core) = manager.core_path() {
        manager
            .register_folder_extensions(&core, ExtensionSelection::Discover, false)
            .map_err(describe)?;
    }
    manager.register_extensions(false).map_err(describe)?;
    manager.register_module_extensions(false).map_err(describe)?;

    let records = manager.records();
    info!(
        "event=cli_probe module=cli status=ok namespace={}/{} extensions={}",
        args.module,
        args.slug,
        records.len()
    );
    for record in &records {
        let source = record
            .source_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}", record.name, record.class_identity, source);
    }
    Ok(())
}

fn describe(err: ExtensionError) -> String {
    error!("event=cli_probe module=cli status=error error={}", err);
    err.to_string()
}
