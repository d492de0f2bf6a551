//! hookgen CLI entrypoint
//! Parses command-line arguments and dispatches to the hook generator.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hookgen::config::CodegenConfig;
use hookgen::generation::{GenerateFileResponse, GenerateRequest, HookGenerator, HookType, HttpMethod, SpecLoader};
use hookgen::infrastructure::openapi::{CompositeSpecLoader, dereference, extract_endpoints};
use hookgen::infrastructure::InferenceSynthesizer;

// External imports (alphabetized)
use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hookgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file with codegen conventions
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate model, api, queryKey and hook fragments for one endpoint
    Generate(GenerateArgs),
    /// Generate fragments for every operation of an OpenAPI document
    Openapi {
        /// Path, URL or inline JSON content of the OpenAPI document
        source: String,
        /// Only generate these operations (by feature name)
        #[arg(long = "operation")]
        operations: Vec<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// JSON or YAML file holding a complete request
    #[arg(long, conflicts_with_all = ["feature", "method", "url", "hook"])]
    request: Option<PathBuf>,

    /// Feature name, e.g. getUserList
    #[arg(long, required_unless_present = "request")]
    feature: Option<String>,

    /// HTTP method
    #[arg(long, required_unless_present = "request")]
    method: Option<HttpMethod>,

    /// URL template with {name} or ${name} placeholders
    #[arg(long, required_unless_present = "request")]
    url: Option<String>,

    /// query, mutation or infinite-query
    #[arg(long, required_unless_present = "request")]
    hook: Option<HookType>,

    /// Example response (JSON text, or @file)
    #[arg(long)]
    example_response: Option<String>,

    /// Example parameters (JSON text, or @file)
    #[arg(long)]
    params: Option<String>,

    /// JSON Schema of the response (JSON text, or @file)
    #[arg(long)]
    response_schema: Option<String>,

    /// JSON Schema of the parameters (JSON text, or @file)
    #[arg(long)]
    params_schema: Option<String>,

    /// Envelope type wrapping the response type
    #[arg(long)]
    wrapper: Option<String>,

    /// Reference model types without declaring them
    #[arg(long)]
    skip_models: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr so generated code on stdout stays clean
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = CodegenConfig::resolve(cli.config.as_deref())
        .await
        .context("Failed to load codegen config")?;
    let generator = HookGenerator::new(Arc::new(InferenceSynthesizer::new()), config);

    let output = match cli.command {
        Commands::Generate(args) => run_generate(&generator, args).await?,
        Commands::Openapi { source, operations } => {
            run_openapi(&generator, &source, &operations).await?
        }
    };

    print_output(&output, cli.format)
}

/// Generate fragments for a single request
async fn run_generate(
    generator: &HookGenerator,
    args: GenerateArgs,
) -> anyhow::Result<GenerateFileResponse> {
    let request = match &args.request {
        Some(path) => read_request(path).await?,
        None => GenerateRequest {
            feature_name: args.feature,
            method_type: args.method,
            api_url: args.url,
            hook_type: args.hook,
            example_response: read_value(args.example_response).await?,
            params: read_value(args.params).await?,
            response_schema: read_value(args.response_schema).await?,
            params_schema: read_value(args.params_schema).await?,
            wrapper_args: args.wrapper,
            skip_model_generation: args.skip_models,
        },
    };

    generator
        .generate(&request)
        .await
        .context("Failed to generate hook")
}

/// Generate fragments for the operations of an OpenAPI document
async fn run_openapi(
    generator: &HookGenerator,
    source: &str,
    operations: &[String],
) -> anyhow::Result<GenerateFileResponse> {
    info!(source = %source, "Loading OpenAPI document");
    let loader = CompositeSpecLoader::new().context("Failed to create spec loader")?;
    let document = loader
        .load(source)
        .await
        .context("Failed to load OpenAPI document")?;
    let spec = dereference(document).context("Failed to resolve OpenAPI document")?;

    let mut endpoints = extract_endpoints(&spec, generator.config());
    if !operations.is_empty() {
        if let Some(missing) = operations
            .iter()
            .find(|op| !endpoints.iter().any(|e| &e.feature_name == *op))
        {
            anyhow::bail!("Operation '{}' not found in {}", missing, source);
        }
        endpoints.retain(|e| operations.contains(&e.feature_name));
    }
    debug!(count = endpoints.len(), "Selected endpoints");

    generator
        .generate_batch(&endpoints)
        .await
        .context("Failed to generate hooks")
}

/// Reads a request file as YAML or JSON depending on its extension
async fn read_request(path: &Path) -> anyhow::Result<GenerateRequest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let request = if is_yaml {
        serde_yaml::from_str(&content).context("Failed to parse request YAML")?
    } else {
        serde_json::from_str(&content).context("Failed to parse request JSON")?
    };
    Ok(request)
}

/// Resolves `@file` arguments to the file content
async fn read_value(value: Option<String>) -> anyhow::Result<Option<String>> {
    match value {
        Some(value) => match value.strip_prefix('@') {
            Some(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path))?;
                Ok(Some(content))
            }
            None => Ok(Some(value)),
        },
        None => Ok(None),
    }
}

fn print_output(output: &GenerateFileResponse, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(output)?);
        }
        OutputFormat::Text => {
            for (kind, text) in output.fragments() {
                println!("// ---- {} ----\n{}\n", kind, text);
            }
        }
    }
    Ok(())
}
