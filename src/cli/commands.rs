//! Command dispatch: one function per subcommand

use std::io;
use std::path::Path;

use chrono::Local;
use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::hash::short_hash;
use crate::application::services::{EmployeeService, NewChart, SaveOutcome};
use crate::application::ApplicationError;
use crate::cli::args::{
    ChartCommands, Cli, Commands, ConfigCommands, DirectionArg, EditCommands, EmployeeCommands,
    HierarchyCommands, NodeFields, TemplateArg,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path};
use crate::domain::{
    DepartmentFilter, Direction, DomainError, ForestBuilder, LinkPreference, NodeGraph,
    NodePatch, TemplateKind, TreeArena,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Commands::Hierarchy { command } => hierarchy(command, container),
        Commands::Employees { command } => employees(command, container),
        Commands::Chart { command } => chart(command, &cli.user, container),
        Commands::Config { command } => config(command, cli.config_dir.as_deref(), container),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn domain(e: DomainError) -> CliError {
    CliError::Application(ApplicationError::from(e))
}

fn preference(by_group: bool) -> LinkPreference {
    if by_group {
        LinkPreference::Group
    } else {
        LinkPreference::Manager
    }
}

fn print_forest(trees: &[TreeArena]) {
    for tree in trees {
        output::info(&tree.to_termtree());
    }
}

// ============================================================
// hierarchy
// ============================================================

#[instrument(skip(container))]
fn hierarchy(command: &HierarchyCommands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        HierarchyCommands::Build { dept } => {
            let filter = DepartmentFilter::from_param(dept.as_deref());
            let nodes = container.hierarchy.get_hierarchy(&filter)?;
            let records = NodeGraph::from_nodes(nodes.to_vec())
                .map_err(domain)?
                .to_records();
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| ApplicationError::operation("serialize hierarchy", e))?;
            output::info(&json);
            Ok(())
        }
        HierarchyCommands::Tree { dept, by_group } => {
            let filter = DepartmentFilter::from_param(dept.as_deref());
            let trees = container.hierarchy.forest(&filter, preference(*by_group))?;
            let people: usize = trees.iter().map(TreeArena::person_count).sum();
            output::header(&format!(
                "{} ({} trees, {} people)",
                filter,
                trees.len(),
                people
            ));
            print_forest(&trees);
            Ok(())
        }
        HierarchyCommands::Warm => {
            let departments = container.hierarchy.departments()?;
            for (dept, count) in container.hierarchy.warm(&departments)? {
                output::detail(&format!("{:<30} {} nodes", dept, count));
            }
            Ok(())
        }
    }
}

// ============================================================
// employees
// ============================================================

#[instrument(skip(container))]
fn employees(command: &EmployeeCommands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        EmployeeCommands::Import { file } => {
            let content = container
                .fs
                .read_to_string(file)
                .map_err(|e| InfraError::io(format!("reading {}", file.display()), e))?;
            let records = EmployeeService::parse_rows(&content)?;
            debug!("parsed {} rows from {}", records.len(), file.display());
            let summary = container.employees.import(records)?;
            output::success(&format!(
                "imported {} employees ({} rows without id skipped)",
                summary.imported, summary.skipped
            ));
            Ok(())
        }
        EmployeeCommands::List { dept } => {
            let filter = DepartmentFilter::from_param(dept.as_deref());
            let records = container.employees.list(&filter)?;
            for record in &records {
                output::info(&format!(
                    "{:<10} {:<30} {:<20} {}",
                    record.employee_id, record.full_name, record.department, record.job_title
                ));
            }
            output::detail(&format!("{} employees", records.len()));
            Ok(())
        }
        EmployeeCommands::Departures { within } => {
            if *within < 0 {
                return Err(CliError::InvalidArgs(format!(
                    "--within must be >= 0, got {within}"
                )));
            }
            let today = Local::now().date_naive();
            let departures = container.employees.upcoming_departures(today, *within)?;
            output::header(&format!("Leaving within {} days", within));
            for d in &departures {
                output::info(&format!(
                    "{}  {:<10} {:<30} {}",
                    d.last_working_day.format("%d/%m/%Y"),
                    d.employee_id,
                    d.full_name,
                    d.department
                ));
            }
            Ok(())
        }
    }
}

// ============================================================
// chart
// ============================================================

#[instrument(skip(container))]
fn chart(command: &ChartCommands, user: &str, container: &ServiceContainer) -> CliResult<()> {
    let charts = &container.charts;
    match command {
        ChartCommands::List => {
            let summaries = charts.list_visible(user)?;
            for c in &summaries {
                output::info(&format!(
                    "{}  {:<30} [{}] owner={} nodes={} updated={}",
                    c.id,
                    c.name,
                    output::visibility(c.is_public),
                    c.owner,
                    c.node_count,
                    c.updated_at.format("%Y-%m-%d %H:%M")
                ));
            }
            output::detail(&format!("{} charts", summaries.len()));
            Ok(())
        }
        ChartCommands::Create {
            name,
            description,
            public,
            from_hierarchy,
            dept,
        } => {
            let nodes = if *from_hierarchy {
                charts.snapshot_from_hierarchy(&DepartmentFilter::from_param(dept.as_deref()))?
            } else {
                Vec::new()
            };
            let chart = charts.create(
                user,
                NewChart {
                    name: name.clone(),
                    description: description.clone(),
                    is_public: *public,
                    nodes,
                },
            )?;
            output::action("Created", &format!("{} ({})", chart.id, chart.name));
            Ok(())
        }
        ChartCommands::Show { id, by_group } => {
            let chart = charts.get(id, user)?;
            let graph = NodeGraph::from_records(chart.data.nodes).map_err(domain)?;
            let trees = ForestBuilder::new(preference(*by_group))
                .build(&graph)
                .map_err(domain)?;
            output::header(&format!("{} (owner {})", chart.name, chart.owner));
            if !chart.description.is_empty() {
                output::detail(&chart.description);
            }
            print_forest(&trees);
            for table in graph.tables() {
                let g = table.geometry;
                output::detail(&format!(
                    "table {} at ({}, {}) {}x{}: {}",
                    table.id,
                    g.x,
                    g.y,
                    g.w,
                    g.h,
                    table.content.headers.iter().join(" | ")
                ));
            }
            Ok(())
        }
        ChartCommands::Publish { id, private } => {
            let chart = charts.set_public(id, user, !*private)?;
            output::action(
                "Updated",
                &format!("{} is now {}", chart.id, output::visibility(chart.is_public)),
            );
            Ok(())
        }
        ChartCommands::Delete { id } => {
            charts.delete(id, user)?;
            output::action("Deleted", id);
            Ok(())
        }
        ChartCommands::Edit { id, op } => edit(id, op, user, container),
    }
}

#[instrument(skip(container))]
fn edit(id: &str, op: &EditCommands, user: &str, container: &ServiceContainer) -> CliResult<()> {
    let mut session = container.charts.open(id, user)?;

    match op {
        EditCommands::Add { kind, parent } => {
            let node = session.add_node(template(*kind), parent.as_deref())?;
            output::action("Added", &node.label());
        }
        EditCommands::Update { node, fields } => {
            let mut patch = patch_from(fields);
            if let Some(reference_id) = &fields.autofill_from {
                let reference = session
                    .graph()?
                    .get(reference_id)
                    .cloned()
                    .ok_or_else(|| domain(DomainError::NodeNotFound(reference_id.clone())))?;
                patch = patch.autofill_from(&reference);
            }
            session.update_node(node, &patch)?;
            let current = patch.id.as_deref().unwrap_or(node);
            output::action("Updated", current);
        }
        EditCommands::Remove { node } | EditCommands::RemoveTable { table: node } => {
            if !session.remove_node(node)? {
                output::warning(&format!("{} not found, nothing removed", node));
            }
        }
        EditCommands::Reparent { node, target } => {
            let outcome = session.reparent(node, target)?;
            output::action("Moved", &format!("{} -> {} ({:?})", node, target, outcome));
        }
        EditCommands::Move { node, direction } => {
            let direction = match direction {
                DirectionArg::Left => Direction::Left,
                DirectionArg::Right => Direction::Right,
            };
            if !session.move_sibling(node, direction)? {
                output::warning(&format!("{} is already at the edge", node));
            }
        }
        EditCommands::AddTable => {
            let table = session.add_table()?;
            output::action("Added", &table.id);
        }
        EditCommands::ResizeTable {
            table,
            width,
            height,
        } => session.resize_table(table, *width, *height)?,
        EditCommands::MoveTable { table, x, y } => session.move_table(table, *x, *y)?,
    }

    match session.save()? {
        SaveOutcome::Saved(receipt) => output::success(&format!(
            "saved {} ({} nodes, {} tables, {})",
            receipt.chart_id,
            receipt.node_count,
            receipt.table_count,
            short_hash(&receipt.fingerprint)
        )),
        SaveOutcome::Unchanged => output::detail("no changes"),
    }
    Ok(())
}

fn template(kind: TemplateArg) -> TemplateKind {
    match kind {
        TemplateArg::Department => TemplateKind::Department,
        TemplateArg::Employee => TemplateKind::Employee,
        TemplateArg::OpenHeadcount => TemplateKind::OpenHeadcount,
    }
}

fn patch_from(fields: &NodeFields) -> NodePatch {
    NodePatch {
        id: fields.id.clone(),
        display_name: fields.name.clone(),
        title: fields.title.clone(),
        image_ref: fields.image.clone(),
        department: fields.department.clone(),
        description: fields.description.clone(),
        ..NodePatch::default()
    }
}

// ============================================================
// config
// ============================================================

fn config(
    command: &ConfigCommands,
    config_dir: Option<&Path>,
    container: &ServiceContainer,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            let local = local_config_path(config_dir.unwrap_or_else(|| Path::new(".")));
            output::action("local", &local.display());
            output::action("data", &container.settings.data_dir.display());
            Ok(())
        }
    }
}
