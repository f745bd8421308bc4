//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

/// Org chart builder: hierarchies from HR records, plus editable chart snapshots
#[derive(Parser, Debug)]
#[command(name = "orgchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory searched for .orgchart.toml (default: cwd)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Acting user for chart ownership and visibility
    #[arg(short, long, global = true, env = "ORGCHART_USER", default_value = "admin")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the hierarchy from employee records
    Hierarchy {
        #[command(subcommand)]
        command: HierarchyCommands,
    },

    /// Maintain employee records
    Employees {
        #[command(subcommand)]
        command: EmployeeCommands,
    },

    /// Manage saved charts
    Chart {
        #[command(subcommand)]
        command: ChartCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum HierarchyCommands {
    /// Print the node list as JSON
    Build {
        /// Restrict to one department ("all" for everything)
        #[arg(long)]
        dept: Option<String>,
    },

    /// Show the hierarchy as text trees
    Tree {
        #[arg(long)]
        dept: Option<String>,
        /// Nest persons inside their department boxes
        #[arg(long)]
        by_group: bool,
    },

    /// Precompute the hierarchy of every department
    Warm,
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommands {
    /// Replace all employees with the rows of a JSON file
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// List employees
    List {
        #[arg(long)]
        dept: Option<String>,
    },

    /// Employees whose last working day is near
    Departures {
        /// Window in days from today
        #[arg(long, default_value_t = 30)]
        within: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChartCommands {
    /// List charts visible to the user
    List,

    /// Create a chart
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Visible to every user
        #[arg(long)]
        public: bool,
        /// Seed the chart with the current hierarchy
        #[arg(long)]
        from_hierarchy: bool,
        /// Department for --from-hierarchy
        #[arg(long, requires = "from_hierarchy")]
        dept: Option<String>,
    },

    /// Show a chart as text trees
    Show {
        id: String,
        #[arg(long)]
        by_group: bool,
    },

    /// Make a chart public (or private again)
    Publish {
        id: String,
        #[arg(long)]
        private: bool,
    },

    /// Delete a chart
    Delete { id: String },

    /// Apply one edit to a chart and save it
    Edit {
        id: String,
        #[command(subcommand)]
        op: EditCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum EditCommands {
    /// Add a node from a template
    Add {
        #[arg(value_enum)]
        kind: TemplateArg,
        /// Parent node id (root when omitted)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Change fields of a node (or its id)
    Update {
        node: String,
        #[command(flatten)]
        fields: NodeFields,
    },

    /// Remove a node or table
    Remove { node: String },

    /// Drop a node onto another node or department box
    Reparent { node: String, target: String },

    /// Move a node among its siblings
    Move {
        node: String,
        #[arg(value_enum)]
        direction: DirectionArg,
    },

    /// Add an annotation table
    AddTable,

    /// Set the size of a table
    ResizeTable { table: String, width: f64, height: f64 },

    /// Set the position of a table
    MoveTable {
        table: String,
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },

    /// Remove a table
    RemoveTable { table: String },
}

/// Node fields settable from the command line.
#[derive(Args, Debug, Default, Clone)]
pub struct NodeFields {
    /// New id; links to the node follow the rename
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    /// Image URL ("" clears it)
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Copy name, title, image and department from this existing node
    #[arg(long)]
    pub autofill_from: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TemplateArg {
    Department,
    Employee,
    OpenHeadcount,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DirectionArg {
    Left,
    Right,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
}
