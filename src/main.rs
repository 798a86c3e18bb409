use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use schema_designer::view::attribute_line;
use schema_designer::{
    Attribute, DesignError, Designer, DesignerConfig, Relationship, RelationshipType, Schema,
};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Design relational schemas stored as JSON and generate SQL from them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every change and file operation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty schema file
    New {
        file: PathBuf,
        /// Schema name (default: MySchema)
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print tables, attributes and relationships
    Show { file: PathBuf },

    /// Add an empty table
    AddTable {
        file: PathBuf,
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
    },

    /// Delete a table together with its relationships
    RemoveTable { file: PathBuf, name: String },

    /// Move a table on the canvas
    MoveTable {
        file: PathBuf,
        name: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Add an attribute to a table
    AddAttribute {
        file: PathBuf,
        table: String,
        name: String,
        /// Column type, e.g. INT or VARCHAR(255)
        data_type: String,
        /// Mark as primary key
        #[arg(long)]
        pk: bool,
        /// Disallow NULL values
        #[arg(long)]
        not_null: bool,
    },

    /// Remove an attribute from a table
    RemoveAttribute {
        file: PathBuf,
        table: String,
        name: String,
    },

    /// Relate two tables
    AddRelationship(RelationshipArgs),

    /// Delete a relationship
    RemoveRelationship(RelationshipArgs),

    /// Rename the schema
    Rename { file: PathBuf, name: String },

    /// Remove all tables and relationships
    Clear { file: PathBuf },

    /// Place tables in rows following their relationships
    Arrange { file: PathBuf },

    /// Generate SQL
    Sql {
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the canvas as SVG
    Svg {
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Highlight a table
        #[arg(long)]
        select: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RelationshipArgs {
    file: PathBuf,
    from: String,
    to: String,
    /// Relationship type: 1-1, 1-N or N-N
    #[arg(short = 't', long = "type", default_value_t = RelationshipType::OneToMany)]
    kind: RelationshipType,
    /// Referenced column on the source table
    #[arg(long, default_value = "")]
    from_key: String,
    /// Foreign key column on the target table
    #[arg(long, default_value = "")]
    to_key: String,
}

impl RelationshipArgs {
    fn relationship(&self) -> Relationship {
        Relationship::new(&self.from, &self.to, self.kind).with_keys(&self.from_key, &self.to_key)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::New { file, name, force } => {
            if file.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", file.display());
            }
            let mut designer = Designer::new(DesignerConfig::default());
            if let Some(name) = name {
                designer.rename_schema(&name)?;
            }
            designer.save(&file)?;
        }
        Command::Show { file } => print!("{}", summary(open(&file)?.schema())),
        Command::AddTable { file, name, x, y } => edit(&file, |d| {
            let (default_x, default_y) = d.config().default_position;
            d.create_table_at(&name, x.unwrap_or(default_x), y.unwrap_or(default_y))
        })?,
        Command::RemoveTable { file, name } => {
            let dropped = edit(&file, |d| d.delete_table(&name))?;
            if dropped > 0 {
                eprintln!("Removed {} with {} relationship(s)", name, dropped);
            }
        }
        Command::MoveTable { file, name, x, y } => edit(&file, |d| d.move_table(&name, x, y))?,
        Command::AddAttribute {
            file,
            table,
            name,
            data_type,
            pk,
            not_null,
        } => {
            let mut attr = Attribute::new(name, data_type).nullable(!not_null);
            if pk {
                attr = attr.primary_key();
            }
            edit(&file, |d| d.add_attribute(&table, attr))?
        }
        Command::RemoveAttribute { file, table, name } => {
            edit(&file, |d| d.remove_attribute(&table, &name))?
        }
        Command::AddRelationship(args) => {
            edit(&args.file, |d| d.add_relationship(args.relationship()))?
        }
        Command::RemoveRelationship(args) => {
            edit(&args.file, |d| d.remove_relationship(&args.relationship()))?
        }
        Command::Rename { file, name } => edit(&file, |d| d.rename_schema(&name))?,
        Command::Clear { file } => edit(&file, |d| {
            d.clear();
            Ok(())
        })?,
        Command::Arrange { file } => edit(&file, |d| {
            d.arrange();
            Ok(())
        })?,
        Command::Sql { file, output } => {
            let designer = open(&file)?;
            match output {
                Some(path) => designer.export_sql(&path)?,
                None => println!("{}", designer.sql()),
            }
        }
        Command::Svg {
            file,
            output,
            select,
        } => {
            let designer = open(&file)?;
            if let Some(name) = &select {
                if !designer.schema().contains_table(name) {
                    return Err(DesignError::UnknownTable(name.clone()).into());
                }
            }
            let svg = designer.render_svg(select.as_deref());
            match output {
                Some(path) => fs::write(&path, svg)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", svg),
            }
        }
    }
    Ok(())
}

fn open(path: &Path) -> Result<Designer> {
    let mut designer = Designer::new(DesignerConfig::default());
    designer.open(path)?;
    Ok(designer)
}

/// Load, apply one change, and save only if the change was accepted.
fn edit<T, F>(path: &Path, change: F) -> Result<T>
where
    F: FnOnce(&mut Designer) -> Result<T, DesignError>,
{
    let mut designer = open(path)?;
    let value = change(&mut designer)?;
    designer.save(path)?;
    Ok(value)
}

fn summary(schema: &Schema) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "Schema: {} ({} tables, {} relationships)",
        schema.name(),
        schema.table_count(),
        schema.relationships().len()
    )
    .unwrap();

    for table in schema.tables() {
        writeln!(out, "\n{} ({}, {})", table.name(), table.x(), table.y()).unwrap();
        for attr in table.attributes() {
            let not_null = if attr.is_nullable { "" } else { " NOT NULL" };
            writeln!(out, "  {}{}", attribute_line(attr), not_null).unwrap();
        }
    }

    if !schema.relationships().is_empty() {
        writeln!(out, "\nRelationships:").unwrap();
        for rel in schema.relationships() {
            write!(out, "  {} ({}) -> {}", rel.from_table, rel.relationship_type, rel.to_table).unwrap();
            if rel.has_keys() {
                write!(out, " [{} -> {}]", rel.from_key, rel.to_key).unwrap();
            }
            writeln!(out).unwrap();
        }
    }

    out
}
