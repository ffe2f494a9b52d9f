use clap::{Args, Parser, Subcommand};
use gponctl::{
    ConsoleConfig, ConsoleError, FormSession, JsonCatalog, Result,
    catalog::load_snapshot,
    input::{self, FormFields},
    logger,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gponctl")]
#[command(about = "Container configuration tooling for the GPON infrastructure console")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to gponctl.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot directory (overrides catalog.data_dir)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Image template catalog
    Template {
        #[command(subcommand)]
        template_command: TemplateCommands,
    },
    /// Container form operations
    Container {
        #[command(subcommand)]
        container_command: ContainerCommands,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List available image templates
    List,
    /// Show template details
    Show {
        /// Template id
        id: String,
    },
}

#[derive(Subcommand)]
enum ContainerCommands {
    /// Resolve the form and print env rows, port conflicts and connection preview
    Preview(NewContainerArgs),
    /// Validate the form and emit the submission payload
    Create(NewContainerArgs),
    /// Re-open a saved container and emit the updated payload
    Edit(EditContainerArgs),
}

#[derive(Args, Debug)]
struct NewContainerArgs {
    /// Template id
    #[arg(short, long)]
    template: String,
    /// Container display name
    #[arg(short, long, default_value = "")]
    name: String,
    #[command(flatten)]
    fields: FormFieldArgs,
    /// Seed port and volume rows from the template defaults
    #[arg(long)]
    defaults: bool,
}

#[derive(Args, Debug)]
struct EditContainerArgs {
    /// Saved container name
    container: String,
    /// Rename the container
    #[arg(long)]
    rename: Option<String>,
    #[command(flatten)]
    fields: FormFieldArgs,
}

#[derive(Args, Debug)]
struct FormFieldArgs {
    /// Environment value, KEY=VALUE (repeatable)
    #[arg(short, long = "env")]
    env: Vec<String>,
    /// Port mapping, PUBLIC:PRIVATE (repeatable)
    #[arg(short, long = "port")]
    port: Vec<String>,
    /// Volume mapping, NAME:CONTAINER_PATH (repeatable)
    #[arg(long = "volume")]
    volume: Vec<String>,
    /// Network name (omit for the default network)
    #[arg(long)]
    network: Option<String>,
    /// Container IP on the network
    #[arg(long)]
    ip: Option<String>,
    /// Write the payload to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl FormFieldArgs {
    fn to_fields(&self) -> FormFields {
        FormFields {
            env: self.env.clone(),
            ports: self.port.clone(),
            volumes: self.volume.clone(),
            network: self.network.clone(),
            ip: self.ip.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logger::init_with_filter(Some("gponctl=debug"));
    } else {
        logger::init_logger();
    }

    if let Err(err) = run(cli).await {
        eprintln!("❌ {}", err.notification());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(ConsoleConfig::default_path);
    let mut config = if config_path.exists() {
        ConsoleConfig::from_file(&config_path)?
    } else {
        logger::debug!(
            "{} not found, using defaults",
            config_path.display()
        );
        ConsoleConfig::default()
    };
    if let Some(data) = cli.data {
        config.catalog.data_dir = data;
    }

    let source = JsonCatalog::new(&config.catalog.data_dir);

    match cli.command {
        Commands::Template { template_command } => {
            let snapshot = load_snapshot(&source).await?;
            match template_command {
                TemplateCommands::List => {
                    println!(
                        "{:<12} {:<24} {:<36} {:<6} {:<4} {}",
                        "ID", "NAME", "IMAGE", "PORT", "ENV", "REQUIRED"
                    );
                    println!("{}", "=".repeat(96));
                    for template in snapshot.catalog.get_templates() {
                        println!(
                            "{:<12} {:<24} {:<36} {:<6} {:<4} {}",
                            template.id,
                            template.name,
                            template.image,
                            template
                                .default_port
                                .map(|p| p.to_string())
                                .unwrap_or_else(|| "-".to_string()),
                            template.env_definitions.len(),
                            template.required_keys().join(",")
                        );
                    }
                }
                TemplateCommands::Show { id } => {
                    let template = snapshot
                        .catalog
                        .get_template(&id)
                        .ok_or_else(|| ConsoleError::TemplateNotFound(id.clone()))?;
                    println!("Template: {} ({})", template.name, template.id);
                    println!("Image: {}", template.image);
                    if let Some(command) = &template.command {
                        println!("Command: {}", command);
                    }
                    if let Some(path) = &template.data_path {
                        println!("Data path: {}", path);
                    }
                    if let Some(port) = template.default_port {
                        println!("Default port: {}", port);
                    }
                    if let Some(check) = &template.healthcheck {
                        println!(
                            "Healthcheck: {} (interval {}s, timeout {}s, retries {})",
                            check.test.join(" "),
                            check.interval.unwrap_or_default(),
                            check.timeout.unwrap_or_default(),
                            check.retries.unwrap_or_default()
                        );
                    }
                    println!("\nEnvironment:");
                    if template.env_definitions.is_empty() {
                        println!("  {}", gponctl::env::NO_ENV_NOTICE);
                    }
                    for def in &template.env_definitions {
                        println!(
                            "  - {}{}",
                            def.key,
                            if def.is_required { " (required)" } else { "" }
                        );
                    }
                }
            }
        }
        Commands::Container { container_command } => match container_command {
            ContainerCommands::Preview(args) => {
                let mut session = FormSession::open_new(&source, &config).await?;
                fill_new(&mut session, &args)?;
                print_form(&session);
            }
            ContainerCommands::Create(args) => {
                let mut session = FormSession::open_new(&source, &config).await?;
                fill_new(&mut session, &args)?;
                submit(&mut session, args.fields.output.as_ref())?;
            }
            ContainerCommands::Edit(args) => {
                let mut session = FormSession::open_edit(&source, &config, &args.container).await?;
                if let Some(name) = &args.rename {
                    session.set_name(name)?;
                }
                input::apply_fields(&mut session, &args.fields.to_fields())?;
                submit(&mut session, args.fields.output.as_ref())?;
            }
        },
    }

    Ok(())
}

fn fill_new(session: &mut FormSession, args: &NewContainerArgs) -> Result<()> {
    input::fill_new(
        session,
        &args.template,
        &args.name,
        args.defaults,
        &args.fields.to_fields(),
    )
}

fn print_form(session: &FormSession) {
    let form = session.form();
    println!("Container: {}", form.name());
    if let Some(template) = session.selected_template() {
        println!("Template: {} ({})", template.name, template.image);
    }

    println!("\nEnvironment:");
    if let Some(notice) = session.env_notice() {
        println!("  {}", notice);
    }
    for row in form.env_rows() {
        let flags = match (row.is_global, row.is_required) {
            (true, _) => " [global]",
            (false, true) => " [required]",
            (false, false) => "",
        };
        println!("  {}={}{}", row.key, row.value, flags);
    }

    if !form.port_rows().is_empty() {
        println!("\nPorts:");
        for (row, conflict) in form.port_rows().iter().zip(session.port_conflicts()) {
            println!(
                "  {} -> {}{}",
                if row.public_port.is_empty() { "-" } else { row.public_port.as_str() },
                row.private_port,
                if conflict.conflict { "  ⚠ already in use" } else { "" }
            );
        }
    }

    let used: Vec<String> = session
        .snapshot()
        .used_ports
        .iter()
        .map(|port| port.to_string())
        .collect();
    if !used.is_empty() {
        println!("\nPorts in use: {}", used.join(", "));
    }

    match session.connection_preview() {
        Some(preview) => {
            println!("\n{} connection:", preview.label);
            println!("  public:  {}", preview.public_url);
            println!("  private: {}", preview.private_url);
        }
        None => println!("\nNo connection preview available"),
    }
}

fn submit(session: &mut FormSession, output: Option<&PathBuf>) -> Result<()> {
    let json = input::submit_json(session)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("✅ Payload written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
