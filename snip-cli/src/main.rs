// Command-line interface for snip
//
// This binary exports a snippet library, stored as a table in an SQLite database, to the snippet
// formats of many editors. All of the transformation work lives in the snip-babel crate; this
// crate only wires configuration, the store and the format registry together.
//
// Usage:
//  snip export [FORMAT...] [--all]   - Export the configured (or named) formats
//  snip list-formats                 - List available formats
//  snip categories                   - List the categories of the configured scope
//  snip render <FORMAT> <TRIGGER>    - Print one rendered snippet, nothing is written
//
// Configuration is layered: built-in defaults, ./snip.toml, --config <file>, then command-line
// overrides (--db, --output, --scope).
//
// Extra Parameters:
//
// Any configuration key can be overridden with --extra-<key> <value>. Short keys are accepted
// for the common settings (language, table, template, quotes); dotted keys are passed through.
// Example:
//  snip export atom --extra-language python --extra-formats.atom.directory atom-py

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use snip_babel::group::category_key;
use snip_babel::{
    export_all, render_record, EmitReport, ExportError, ExportJob, FormatRegistry, SnippetStore,
    SqliteStore,
};
use snip_config::{Loader, SnipConfig};
use std::collections::{BTreeSet, HashMap};

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("snip")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Export a snippet library to editor snippet formats")
        .long_about(
            "snip reads snippets from an SQLite table and writes them in the native format of\n\
            each supported editor.\n\n\
            Extra Parameters:\n  \
            Use --extra-<key> <value> to override any configuration key.\n  \
            Short keys: language, table, template, quotes.\n\n\
            Examples:\n  \
            snip list-formats                          # Show every format\n  \
            snip export --all --db pymol.db            # Export every format\n  \
            snip export atom vscode -o out             # Export two formats into ./out\n  \
            snip render textmate cartoon               # Preview one snippet",
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a snip.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .help("SQLite database holding the snippet table")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("scope")
                .long("scope")
                .value_name("SCOPE")
                .help("Scope the records are selected by (e.g. text.pml)")
                .global(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("DIR")
                .help("Root directory of the exported formats")
                .value_hint(ValueHint::DirPath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every file written")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand(
            Command::new("export")
                .about("Export snippets to one or more formats")
                .long_about(
                    "Export the snippets of the configured scope.\n\n\
                    Without format names, the formats listed in export.formats are used;\n\
                    when that list is empty (the default), every format is exported.\n\
                    Each format is written to <output>/<format name>.",
                )
                .arg(
                    Arg::new("formats")
                        .help("Formats to export")
                        .num_args(0..)
                        .index(1)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Export every available format")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("formats"),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available formats"))
        .subcommand(
            Command::new("categories").about("List the snippet categories of the configured scope"),
        )
        .subcommand(
            Command::new("render")
                .about("Print one snippet as a format would write it")
                .arg(
                    Arg::new("format")
                        .help("Format name")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("trigger")
                        .help("Trigger of the snippet")
                        .required(true)
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let matches = build_cli().get_matches_from(&cleaned_args);

    init_logging(matches.get_flag("verbose"), matches.get_flag("quiet"));

    let config = load_cli_config(&matches, &extra_params);
    let registry = FormatRegistry::default();

    match matches.subcommand() {
        Some(("export", sub_matches)) => {
            let requested: Vec<String> = sub_matches
                .get_many::<String>("formats")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let formats = select_formats(
                &registry,
                &config,
                &requested,
                sub_matches.get_flag("all"),
            );
            handle_export_command(&registry, &config, &formats);
        }
        Some(("list-formats", _)) => handle_list_formats_command(&registry),
        Some(("categories", _)) => handle_categories_command(&config),
        Some(("render", sub_matches)) => {
            let format = sub_matches
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or_default();
            let trigger = sub_matches
                .get_one::<String>("trigger")
                .map(String::as_str)
                .unwrap_or_default();
            handle_render_command(&registry, &config, format, trigger);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

/// Format names to export: the named ones, the configured list, or everything.
fn select_formats(
    registry: &FormatRegistry,
    config: &SnipConfig,
    requested: &[String],
    all: bool,
) -> Vec<String> {
    let names = if all {
        registry.list_formats()
    } else if !requested.is_empty() {
        requested.to_vec()
    } else if !config.export.formats.is_empty() {
        config.export.formats.clone()
    } else {
        registry.list_formats()
    };
    for name in &names {
        if let Err(e) = registry.get(name) {
            eprintln!("Error: {e}");
            eprintln!("Use `snip list-formats` to see the available formats");
            std::process::exit(1);
        }
    }
    names
}

fn open_store(config: &SnipConfig) -> SqliteStore {
    let opened = config
        .table()
        .and_then(|table| SqliteStore::open(&config.store.path, table));
    opened.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

/// Handle the export command
fn handle_export_command(registry: &FormatRegistry, config: &SnipConfig, formats: &[String]) {
    let store = open_store(config);

    let jobs: Result<Vec<ExportJob>, ExportError> = formats
        .iter()
        .map(|name| {
            Ok(ExportJob {
                descriptor: *registry.get(name)?,
                target: config.target_for(name)?,
            })
        })
        .collect();
    let jobs = jobs.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let outcomes = export_all(&store, &jobs).unwrap_or_else(|e| {
        eprintln!("Export aborted: {e}");
        std::process::exit(1);
    });

    let mut failed = false;
    for (name, outcome) in outcomes {
        match outcome {
            Ok(report) => println!("{}", summary_line(&report)),
            Err(e) => {
                eprintln!("{name}: {e}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

fn summary_line(report: &EmitReport) -> String {
    format!(
        "{}: {} snippets, {} files, {} skipped",
        report.format,
        report.emitted(),
        report.files.len(),
        report.skipped.len()
    )
}

/// Handle the list-formats command
fn handle_list_formats_command(registry: &FormatRegistry) {
    println!("Available formats:\n");
    for descriptor in registry.descriptors() {
        println!("  {:<22}{}", descriptor.name, descriptor.description);
    }
}

/// Handle the categories command
fn handle_categories_command(config: &SnipConfig) {
    let store = open_store(config);
    let categories = store
        .distinct_categories(&config.export.scope)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });
    let keys: BTreeSet<&str> = categories.iter().map(|c| category_key(c)).collect();
    for key in keys {
        println!("{key}");
    }
}

/// Handle the render command
fn handle_render_command(
    registry: &FormatRegistry,
    config: &SnipConfig,
    format: &str,
    trigger: &str,
) {
    let descriptor = registry.get(format).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let target = config.target_for(format).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let store = open_store(config);
    let records = store.fetch(&target.scope).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let Some(record) = records.iter().find(|r| r.trigger == trigger) else {
        eprintln!("Error: no snippet '{trigger}' in scope '{}'", target.scope);
        std::process::exit(1);
    };
    let rendered = render_record(descriptor, record, &target).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    print!("{rendered}");
}

fn load_cli_config(matches: &ArgMatches, extra_params: &HashMap<String, String>) -> SnipConfig {
    let loader = Loader::new().with_optional_file("snip.toml");
    let loader = match matches.get_one::<String>("config") {
        Some(path) => loader.with_file(path),
        None => loader,
    };

    let mut overrides: Vec<(String, String)> = Vec::new();
    for (flag, key) in [
        ("db", "store.path"),
        ("output", "export.output_root"),
        ("scope", "export.scope"),
    ] {
        if let Some(value) = matches.get_one::<String>(flag) {
            overrides.push((key.to_string(), value.clone()));
        }
    }
    for (key, value) in extra_params {
        overrides.push((config_key(key), value.clone()));
    }

    let built = overrides
        .into_iter()
        .try_fold(loader, |loader, (key, value)| loader.set_override(&key, value))
        .and_then(Loader::build);
    built.unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Map an `--extra-<key>` name to a configuration key.
fn config_key(key: &str) -> String {
    match key {
        "language" | "scope" | "output-root" | "output_root" => {
            format!("export.{}", key.replace('-', "_"))
        }
        "table" | "db" => format!("store.{}", if key == "db" { "path" } else { key }),
        "template" | "quotes" => format!("invocation.{key}"),
        other => other.to_string(),
    }
}
