use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tabgroups::config::OutputFormat;
use tabgroups::core::{
    Direction, GroupStore, Hierarchy, SelectionItem, SortKey, SortOrder, bookmarks, commands, resolve_selection,
    session,
};
use tabgroups::fs::FsWorkspace;
use tabgroups::host::Workspace;
use tabgroups::{Config, parse_item, persist, run};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Md,
    Plain,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Md => OutputFormat::Markdown,
            CliOutputFormat::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSortKey {
    Name,
    Path,
    Extension,
    Modified,
}

impl From<CliSortKey> for SortKey {
    fn from(k: CliSortKey) -> Self {
        match k {
            CliSortKey::Name => SortKey::Name,
            CliSortKey::Path => SortKey::Path,
            CliSortKey::Extension => SortKey::Extension,
            CliSortKey::Modified => SortKey::Modified,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDirection {
    Up,
    Down,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Virtual file groups, bookmarks and context packing", long_about = None)]
struct Args {
    /// Config file (defaults to ./tabgroups.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Group document path
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Workspace root
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List groups with their hierarchy paths
    List,
    /// Create, rename, remove and arrange groups
    #[command(subcommand)]
    Group(GroupCommand),
    /// Add or remove files of a group
    #[command(subcommand)]
    File(FileCommand),
    /// Manage bookmarks
    #[command(subcommand)]
    Bookmark(BookmarkCommand),
    /// Rebuild the built-in per-extension groups
    ExtGroups {
        /// Files to classify (defaults to every file in regular groups)
        files: Vec<String>,
    },
    /// Print the files of a selection
    Paths {
        items: Vec<String>,
        /// Absolute paths instead of workspace-relative ones
        #[arg(long, conflicts_with = "names")]
        absolute: bool,
        /// File names only
        #[arg(long)]
        names: bool,
    },
    /// Aggregate a selection into one context document
    Context {
        items: Vec<String>,
        /// File written when the context is too large for the clipboard
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<CliOutputFormat>,
    },
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    /// Add a root-level group
    Add { name: String },
    /// Add a sub-group under a parent
    Sub { parent: String, name: String },
    /// Remove groups; their children become roots
    Rm { ids: Vec<String> },
    Rename { id: String, name: String },
    /// Duplicate a group (built-in groups become regular snapshots)
    Dup { id: String },
    /// Move a group among its siblings
    Mv {
        id: String,
        #[arg(value_enum)]
        direction: CliDirection,
    },
    /// Set, toggle or clear the file order of a group
    Sort(SortArgs),
}

#[derive(ClapArgs, Debug)]
struct SortArgs {
    id: String,
    #[arg(value_enum)]
    key: Option<CliSortKey>,
    /// Descending order
    #[arg(long)]
    desc: bool,
    /// Flip the current order
    #[arg(long, conflicts_with_all = ["key", "clear"])]
    toggle: bool,
    /// Back to insertion order
    #[arg(long, conflicts_with = "key")]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum FileCommand {
    Add { group: String, files: Vec<String> },
    Rm { group: String, files: Vec<String> },
}

#[derive(Subcommand, Debug)]
enum BookmarkCommand {
    /// Bookmark a 1-based line of a file
    Add {
        file: String,
        line: usize,
        /// Target group (defaults to the only regular group holding the file)
        #[arg(short, long)]
        group: Option<String>,
        /// Label (defaults to a snippet of the line)
        #[arg(short, long)]
        label: Option<String>,
        #[arg(long, default_value_t = 0)]
        character: usize,
        #[arg(short, long)]
        description: Option<String>,
    },
    Rm { group: String, file: String, id: String },
    Label { group: String, file: String, id: String, label: String },
    /// Set the description; an empty text clears it
    Desc { group: String, file: String, id: String, text: String },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load from file or default
    let mut config = match &args.config {
        Some(path) => Config::load_from(path).with_context(|| format!("Failed to load config {:?}", path))?,
        None => Config::load_from_file().unwrap_or_default(),
    };

    // 2. Override with CLI args
    if let Some(s) = args.store {
        config.store = s;
    }
    if let Some(r) = args.root {
        config.root = r;
    }
    if args.verbose {
        config.verbose = true;
    }
    if let Command::Context { output, format, .. } = &args.command {
        if let Some(o) = output {
            config.output = o.clone();
        }
        if let Some(f) = format {
            config.output_format = (*f).into();
        }
    }
    config.validate()?;
    init_logging(config.verbose);

    let store_path = config.root.join(&config.store);
    let mut store = persist::load(&store_path).with_context(|| format!("Failed to load {:?}", store_path))?;
    let workspace = FsWorkspace::new(&config.root);

    let changed = match args.command {
        Command::List => {
            list(&store);
            false
        }
        Command::Group(cmd) => group_command(&mut store, cmd)?,
        Command::File(cmd) => file_command(&mut store, cmd)?,
        Command::Bookmark(cmd) => bookmark_command(&mut store, &workspace, cmd)?,
        Command::ExtGroups { files } => {
            let files = if files.is_empty() {
                regular_files(&store)
            } else {
                files
            };
            let count = commands::refresh_extension_groups(&mut store, &files);
            println!("{} extension groups", count);
            true
        }
        Command::Paths {
            items,
            absolute,
            names,
        } => {
            let items = parse_items(&store, &items)?;
            let text = if names {
                session::copy_names(&store, &items, &workspace)
            } else if absolute {
                session::copy_absolute_paths(&store, &items, &workspace)
            } else {
                session::copy_relative_paths(&store, &items, &workspace)
            };
            match text {
                Some(text) => println!("{}", text),
                None => eprintln!("No files found in selection."),
            }
            false
        }
        Command::Context { items, .. } => {
            let items = parse_items(&store, &items)?;
            run(&config, &store, &items)?;
            false
        }
    };

    if changed {
        persist::save(&store_path, &store).with_context(|| format!("Failed to save {:?}", store_path))?;
    }
    Ok(())
}

fn parse_items(store: &GroupStore, specs: &[String]) -> Result<Vec<SelectionItem>> {
    let explicit = specs
        .iter()
        .map(|s| parse_item(store, s))
        .collect::<Result<Vec<_>>>()?;
    Ok(resolve_selection(&explicit, None, Vec::new).items)
}

fn regular_files(store: &GroupStore) -> Vec<String> {
    store
        .iter()
        .filter(|g| !g.built_in)
        .flat_map(|g| g.files.iter().cloned())
        .collect()
}

fn list(store: &GroupStore) {
    let hierarchy = Hierarchy::new(store);
    for group in store.iter() {
        let path = hierarchy.group_path(&group.id).unwrap_or_else(|| group.name.clone());
        let marker = if group.built_in { " (built-in)" } else { "" };
        println!("{}  {}{}  [{} files]", group.id, path, marker, group.files.len());
        for (file, marks) in &group.bookmarks {
            for mark in marks {
                println!("    {}:{}  {}  ({})", file, mark.line + 1, mark.label, mark.id);
            }
        }
    }
}

fn group_command(store: &mut GroupStore, cmd: GroupCommand) -> Result<bool> {
    match cmd {
        GroupCommand::Add { name } => {
            println!("{}", commands::add_group(store, &name)?);
        }
        GroupCommand::Sub { parent, name } => match commands::add_sub_group(store, &parent, &name)? {
            Some(id) => println!("{}", id),
            None => bail!("Unknown group '{}'", parent),
        },
        GroupCommand::Rm { ids } => {
            let removed = commands::remove_groups(store, &ids);
            println!("Removed {} groups", removed);
            return Ok(removed > 0);
        }
        GroupCommand::Rename { id, name } => {
            if !commands::rename_group(store, &id, &name)? {
                bail!("Unknown group '{}'", id);
            }
        }
        GroupCommand::Dup { id } => {
            let built_in = store.find(&id).is_some_and(|g| g.built_in);
            let copy = if built_in {
                commands::duplicate_built_in(store, &id)
            } else {
                commands::duplicate_group(store, &id)
            };
            match copy {
                Some(id) => println!("{}", id),
                None => bail!("Unknown group '{}'", id),
            }
        }
        GroupCommand::Mv { id, direction } => {
            let direction = match direction {
                CliDirection::Up => Direction::Up,
                CliDirection::Down => Direction::Down,
            };
            return Ok(commands::move_group(store, &id, direction));
        }
        GroupCommand::Sort(sort) => {
            let done = if sort.clear {
                commands::clear_sort(store, &sort.id)
            } else if sort.toggle {
                commands::toggle_sort_order(store, &sort.id)
            } else {
                let order = if sort.desc { SortOrder::Desc } else { SortOrder::Asc };
                let key = sort.key.map(SortKey::from).unwrap_or(SortKey::Name);
                commands::set_sort(store, &sort.id, key, order)
            };
            if !done {
                bail!("Unknown group '{}'", sort.id);
            }
        }
    }
    Ok(true)
}

fn file_command(store: &mut GroupStore, cmd: FileCommand) -> Result<bool> {
    let (verb, count) = match cmd {
        FileCommand::Add { group, files } => ("Added", commands::add_files(store, &group, files)?),
        FileCommand::Rm { group, files } => ("Removed", commands::remove_files(store, &group, &files)?),
    };
    println!("{} {} files", verb, count);
    Ok(count > 0)
}

fn bookmark_command<W: Workspace>(store: &mut GroupStore, workspace: &W, cmd: BookmarkCommand) -> Result<bool> {
    match cmd {
        BookmarkCommand::Add {
            file,
            line,
            group,
            label,
            character,
            description,
        } => {
            let line = line.saturating_sub(1);
            let group_id = match group {
                Some(id) => id,
                None => bookmarks::pick_target_group(store, &file)
                    .map(|g| g.id.clone())
                    .with_context(|| format!("{} is in no single regular group; pass --group", file))?,
            };
            let label = match label {
                Some(label) => label,
                None => {
                    let text = workspace.read_text(&file)?;
                    let line_text = text.split('\n').nth(line).unwrap_or_default();
                    bookmarks::smart_label(line, line_text)
                }
            };
            let bookmark = bookmarks::create(line, &label, character, description.as_deref())?;
            match commands::add_bookmark(store, &group_id, &file, bookmark)? {
                Some(id) => println!("{}", id),
                None => bail!("Unknown group '{}'", group_id),
            }
            Ok(true)
        }
        BookmarkCommand::Rm { group, file, id } => {
            let removed = store
                .find_mut(&group)
                .is_some_and(|g| bookmarks::remove(g, &file, &id));
            if !removed {
                eprintln!("No bookmark '{}' in {}", id, file);
            }
            Ok(removed)
        }
        BookmarkCommand::Label { group, file, id, label } => {
            let Some(target) = store.find_mut(&group) else {
                bail!("Unknown group '{}'", group);
            };
            Ok(bookmarks::update_label(target, &file, &id, &label)?)
        }
        BookmarkCommand::Desc { group, file, id, text } => {
            let Some(target) = store.find_mut(&group) else {
                bail!("Unknown group '{}'", group);
            };
            Ok(bookmarks::update_description(target, &file, &id, &text)?)
        }
    }
}
