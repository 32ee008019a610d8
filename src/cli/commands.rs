//! Command dispatch: wires CLI arguments to application services

use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{StepReport, TroubleshootService, WalkOutcome};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::Node;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::LinePrompter;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let container = build_container(cli)?;
    match command {
        Commands::Config { command } => cmd_config(&container, command),
        Commands::Check => cmd_check(&container),
        other => {
            let service = container.troubleshoot_service()?;
            match other {
                Commands::Trees => cmd_trees(&service),
                Commands::Show { tree } => cmd_show(&service, tree),
                Commands::Walk { tree } => cmd_walk(&service, tree),
                Commands::Ask { query } => print_report(&service.ask(&query.join(" "))?, cli.json),
                Commands::Step { tree, node, answer } => {
                    print_report(&service.step(tree, node, answer)?, cli.json)
                }
                Commands::Maintenance { key } => cmd_maintenance(&service, key.as_deref()),
                Commands::Config { .. } | Commands::Check | Commands::Completion { .. } => {
                    Ok(())
                }
            }
        }
    }
}

fn build_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };
    let mut settings = Settings::load(Some(&project_dir))?;
    if let Some(kb) = &cli.knowledge_base {
        settings.knowledge_base = kb.clone();
    }
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings, &project_dir))
}

#[instrument(skip(service))]
fn cmd_trees(service: &TroubleshootService) -> CliResult<()> {
    for name in service.list_trees() {
        output::info(name);
    }
    Ok(())
}

#[instrument(skip(service))]
fn cmd_show(service: &TroubleshootService, tree: &str) -> CliResult<()> {
    output::info(&service.render(tree)?);
    Ok(())
}

#[instrument(skip(service))]
fn cmd_walk(service: &TroubleshootService, tree: &str) -> CliResult<()> {
    let mut prompter = LinePrompter::stdio();
    match service.walk(tree, &mut prompter)? {
        WalkOutcome::Diagnosed { path, diagnosis } => {
            output::info("");
            output::diagnosis(&diagnosis);
            output::detail(&format!("path: {}", path.iter().join(" -> ")));
        }
        WalkOutcome::Cancelled { path } => {
            output::info("");
            output::warning(&format!(
                "walk cancelled at '{}'",
                path.last().map(String::as_str).unwrap_or_default()
            ));
        }
    }
    Ok(())
}

fn cmd_maintenance(service: &TroubleshootService, key: Option<&str>) -> CliResult<()> {
    match key {
        Some(key) => output::info(service.maintenance(key)?),
        None => {
            for key in service.maintenance_keys() {
                output::info(key);
            }
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_check(container: &ServiceContainer) -> CliResult<()> {
    let path = container.knowledge_base_path();
    let kb = container.knowledge_service().load(&path)?;

    output::success(&format!("{} is valid", path.display()));
    for (name, tree) in kb.registry.iter() {
        let diagnoses = tree.nodes().filter(|(_, node)| node.is_terminal()).count();
        output::detail(&format!(
            "{}: {} nodes, {} diagnoses, start '{}'",
            name,
            tree.len(),
            diagnoses,
            tree.start_node()
        ));
        for id in tree.unreachable_nodes() {
            output::warning(&format!("{name}: node '{id}' is unreachable"));
        }
        if let Some(Node::Diagnosis(_)) = tree.node(tree.start_node()) {
            output::warning(&format!("{name}: starts at a diagnosis"));
        }
    }
    output::detail(&format!("{} maintenance topics", kb.maintenance.len()));
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => print_config_path("global", &path),
                None => output::detail("global: (no config directory)"),
            }
            print_config_path("local", &local_config_path(&container.project_dir));
            output::detail(&format!(
                "knowledge base: {}",
                container.knowledge_base_path().display()
            ));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path: PathBuf = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no global config directory".into()))?
            } else {
                local_config_path(&container.project_dir)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
    }
}

fn print_config_path(label: &str, path: &Path) {
    let state = if path.exists() { "exists" } else { "not found" };
    output::detail(&format!("{label}: {} ({state})", path.display()));
}

fn print_report(report: &StepReport, json: bool) -> CliResult<()> {
    if json {
        let text = serde_json::to_string_pretty(report).map_err(|e| InfraError::Serialize {
            message: e.to_string(),
        })?;
        output::info(&text);
        return Ok(());
    }

    match (&report.question, &report.diagnosis) {
        (_, Some(diagnosis)) => output::diagnosis(diagnosis),
        (Some(question), None) => {
            output::header(&format!("[{}/{}] {}", report.topic, report.node_id, question));
            for (i, option) in report.options.iter().enumerate() {
                output::option(i + 1, option);
            }
        }
        (None, None) => {}
    }
    Ok(())
}
