//! OAS Codegen CLI
//!
//! Command-line interface for resolving OpenAPI schemas and generating
//! Kotlin Spring Boot sources.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oas_codegen::{
    load_document, CacheConfig, ExternalConfig, Generator, GeneratorConfig, MemoryConfig,
    MetricsConfig, Resolver,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oas-codegen")]
#[command(about = "Resolve OpenAPI schemas and generate Kotlin Spring Boot code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Kotlin models and controllers from an OpenAPI document
    Generate {
        /// OpenAPI document: JSON or YAML file
        spec: PathBuf,

        /// Output directory for generated sources
        #[arg(long, short, default_value = "./generated")]
        output: PathBuf,

        /// Base package for generated Kotlin code
        #[arg(long, short, default_value = "com.example.api")]
        package: String,

        /// Skip model generation
        #[arg(long)]
        no_models: bool,

        /// Skip controller generation
        #[arg(long)]
        no_controllers: bool,

        /// Omit Bean Validation annotations
        #[arg(long)]
        no_validation: bool,

        /// Omit Swagger/OpenAPI annotations
        #[arg(long)]
        no_swagger: bool,

        /// Process large schema registries in batches, trimming caches
        /// under memory pressure
        #[arg(long)]
        streaming: bool,

        /// Collect and print resolution metrics after generation
        #[arg(long)]
        metrics: bool,

        /// Disable resolution caching (every lookup recomputes)
        #[arg(long)]
        no_cache: bool,

        /// Refuse to fetch URL references over HTTP
        #[arg(long)]
        no_remote: bool,

        /// Show debug logging and list every generated file
        #[arg(long, short)]
        verbose: bool,
    },

    /// Resolve a single reference and print the resulting schema
    Resolve {
        /// OpenAPI document: JSON or YAML file
        spec: PathBuf,

        /// Reference to resolve (e.g. #/components/schemas/Pet)
        #[arg(long, short)]
        reference: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Refuse to fetch URL references over HTTP
        #[arg(long)]
        no_remote: bool,
    },

    /// Resolve every schema in the registry and list the results
    Schemas {
        /// OpenAPI document: JSON or YAML file
        spec: PathBuf,

        /// Print the resolved registry as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Refuse to fetch URL references over HTTP
        #[arg(long)]
        no_remote: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            spec,
            output,
            package,
            no_models,
            no_controllers,
            no_validation,
            no_swagger,
            streaming,
            metrics,
            no_cache,
            no_remote,
            verbose,
        } => run_generate(GenerateArgs {
            spec,
            output,
            package,
            no_models,
            no_controllers,
            no_validation,
            no_swagger,
            streaming,
            metrics,
            no_cache,
            no_remote,
            verbose,
        }),

        Commands::Resolve {
            spec,
            reference,
            output,
            pretty,
            no_remote,
        } => run_resolve(&spec, &reference, output, pretty, no_remote),

        Commands::Schemas {
            spec,
            json,
            no_remote,
        } => run_schemas(&spec, json, no_remote),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

struct GenerateArgs {
    spec: PathBuf,
    output: PathBuf,
    package: String,
    no_models: bool,
    no_controllers: bool,
    no_validation: bool,
    no_swagger: bool,
    streaming: bool,
    metrics: bool,
    no_cache: bool,
    no_remote: bool,
    verbose: bool,
}

fn run_generate(args: GenerateArgs) -> Result<(), u8> {
    init_tracing(args.verbose);

    let config = GeneratorConfig {
        output_dir: args.output,
        base_package: args.package,
        generate_models: !args.no_models,
        generate_controllers: !args.no_controllers,
        include_validation: !args.no_validation,
        include_swagger: !args.no_swagger,
    };

    let resolver = configure_resolver(ResolverFlags {
        no_cache: args.no_cache,
        no_remote: args.no_remote,
        streaming: args.streaming,
        metrics: args.metrics,
    });

    let mut generator = Generator::with_resolver(config, resolver);
    let summary = generator.generate(&args.spec).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if args.verbose {
        for file in &summary.files {
            println!("  {}", file.display());
        }
    }
    println!(
        "Generated {} files in {}",
        summary.files.len(),
        summary.output_dir.display()
    );

    if args.metrics {
        println!();
        print!("{}", generator.resolver().metrics_report());
    }

    Ok(())
}

fn run_resolve(
    spec: &Path,
    reference: &str,
    output: Option<PathBuf>,
    pretty: bool,
    no_remote: bool,
) -> Result<(), u8> {
    init_tracing(false);

    let document = load_document(spec).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut resolver = configure_resolver(ResolverFlags {
        no_remote,
        ..ResolverFlags::default()
    });

    let node = resolver
        .resolve_reference(&document, reference)
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;

    let resolved = node.to_value();
    let json_output = if pretty {
        serde_json::to_string_pretty(&resolved)
    } else {
        serde_json::to_string(&resolved)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_schemas(spec: &Path, json: bool, no_remote: bool) -> Result<(), u8> {
    init_tracing(false);

    let document = load_document(spec).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut resolver = configure_resolver(ResolverFlags {
        no_remote,
        ..ResolverFlags::default()
    });

    let schemas = resolver.all_schemas(&document).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if json {
        let mut registry = serde_json::Map::new();
        for (name, node) in &schemas {
            registry.insert(name.clone(), node.to_value());
        }
        let json_output =
            serde_json::to_string_pretty(&serde_json::Value::Object(registry)).map_err(|e| {
                eprintln!("Error serializing output: {}", e);
                2u8
            })?;
        println!("{}", json_output);
    } else {
        for (name, node) in &schemas {
            println!("{}: {}", name, node.type_name().unwrap_or("any"));
        }
        println!();
        println!("{} schemas resolved", schemas.len());
    }

    Ok(())
}

#[derive(Default)]
struct ResolverFlags {
    no_cache: bool,
    no_remote: bool,
    streaming: bool,
    metrics: bool,
}

fn configure_resolver(flags: ResolverFlags) -> Resolver {
    let mut resolver = Resolver::new();
    if flags.no_cache {
        resolver.configure_caching(CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        });
    }
    if flags.no_remote {
        resolver.configure_external(ExternalConfig {
            enable_remote: false,
            ..ExternalConfig::default()
        });
    }
    if flags.streaming {
        resolver.configure_memory_optimization(MemoryConfig {
            enabled: true,
            streaming_mode: true,
            ..MemoryConfig::default()
        });
    }
    if flags.metrics {
        resolver.configure_metrics(MetricsConfig { enabled: true });
    }
    resolver
}

/// Initialize stderr logging. `RUST_LOG` wins unless `--verbose` is set.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("oas_codegen=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oas_codegen=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
