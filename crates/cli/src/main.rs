// tablesort CLI - headless sortable-table operations

mod exit_codes;
mod load;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use tablesort_config::{ConfigError, LocalePreset, LocaleSettings, OutputFormat, Settings};
use tablesort_engine::{BoundValue, Key, KeyNormalizer, LocaleRules, SortDirection, TableController};

use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use load::RawTable;

#[derive(Parser)]
#[command(name = "tablesort")]
#[command(about = "Sort, filter and band tabular data the way a sortable HTML table does")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/tablesort/settings.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV/TSV table, filter, sort and print the visible rows
    #[command(after_help = "\
Examples:
  tablesort view books.tsv --sort Année
  tablesort view books.csv --sort 2 --desc --format html
  tablesort view books.tsv --filter Titre=rouge --range Année=1800..1850
  cat books.csv | tablesort view - --nosort Note --format json")]
    View {
        /// Input file (`-` for stdin)
        input: PathBuf,

        /// Field delimiter: one ASCII character, or `tab` / `\t`
        /// (default: tab for .tsv/.tab files, comma otherwise)
        #[arg(long, short = 'd', value_parser = parse_delimiter)]
        delimiter: Option<u8>,

        /// Input has no header row; columns are numbered from 1
        #[arg(long)]
        no_header: bool,

        /// Exclude a column from indexing. Repeatable.
        #[arg(long, value_name = "COL")]
        nosort: Vec<String>,

        /// Sort by column (1-based number or header label)
        #[arg(long, short = 's', value_name = "COL")]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Keep rows whose key contains TEXT
        #[arg(long, short = 'f', value_name = "COL=TEXT")]
        filter: Option<String>,

        /// Keep rows whose key lies in [MIN, MAX]; either side may be empty
        #[arg(long, short = 'r', value_name = "COL=MIN..MAX")]
        range: Option<String>,

        /// Output format (default from settings, else tsv)
        #[arg(long, value_parser = parse_format)]
        format: Option<OutputFormat>,
    },

    /// Print the normalized sort key of each argument
    Key {
        /// Values to normalize
        #[arg(required = true)]
        values: Vec<String>,
    },
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!("expected a single ASCII character, got '{}'", s)),
            }
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  tablesort-engine ", env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_settings(cli.config.as_deref()).and_then(|settings| match cli.command {
        Commands::View {
            input,
            delimiter,
            no_header,
            nosort,
            sort,
            desc,
            filter,
            range,
            format,
        } => {
            let opts = ViewOptions { delimiter, no_header, nosort, sort, desc, filter, range, format };
            cmd_view(&settings, &input, opts)
        }
        Commands::Key { values } => cmd_key(&settings, &values),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // A logger can only fail to install if one is already set
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::InvalidArticle(_) => Some("write articles with their trailing space, e.g. \"le \"".to_string()),
            ConfigError::Parse(_) => Some("settings use TOML: [locale], [input], [output]".to_string()),
            _ => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Settings
// ============================================================================

/// An explicit `--config` must exist; the default location may be absent.
fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) if !path.exists() => Err(CliError {
            code: EXIT_CONFIG,
            message: format!("settings file not found: {}", path.display()),
            hint: None,
        }),
        Some(path) => Settings::load_from(path).map_err(CliError::config),
        None => Settings::load().map_err(CliError::config),
    }
}

fn locale_rules(settings: &LocaleSettings) -> LocaleRules {
    let rules = match settings.preset {
        LocalePreset::French => LocaleRules::french(),
        LocalePreset::Plain => LocaleRules::plain(),
    };
    let rules = match settings.article_list() {
        Some(articles) => rules.with_articles(articles),
        None => rules,
    };
    rules.with_folds(settings.fold_pairs())
}

// ============================================================================
// view
// ============================================================================

struct ViewOptions {
    delimiter: Option<u8>,
    no_header: bool,
    nosort: Vec<String>,
    sort: Option<String>,
    desc: bool,
    filter: Option<String>,
    range: Option<String>,
    format: Option<OutputFormat>,
}

/// Split `COL=VALUE` at the first `=`
fn split_assignment<'a>(arg: &'a str, flag: &str) -> Result<(&'a str, &'a str), CliError> {
    arg.split_once('=').ok_or_else(|| {
        CliError::args(format!("--{} expects COL=VALUE, got '{}'", flag, arg))
    })
}

/// Split `MIN..MAX`; an empty side is unbounded
fn split_bounds(bounds: &str) -> Result<(Option<BoundValue>, Option<BoundValue>), CliError> {
    let (min, max) = bounds.split_once("..").ok_or_else(|| {
        CliError::args(format!("--range expects MIN..MAX, got '{}'", bounds))
            .with_hint("use 1800..1850, 1800.. or ..1850")
    })?;
    let bound = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| BoundValue::from(s))
    };
    Ok((bound(min), bound(max)))
}

fn cmd_view(settings: &Settings, input: &Path, opts: ViewOptions) -> Result<(), CliError> {
    let delimiter = opts
        .delimiter
        .or_else(|| settings.input.delimiter_byte())
        .unwrap_or_else(|| load::delimiter_for(input));

    let content = load::read_input(input)?;
    let raw = RawTable::parse(&content, delimiter, !opts.no_header)?;

    // Resolve every column reference before the table is consumed
    let unsortable = opts
        .nosort
        .iter()
        .map(|r| raw.resolve_column(r))
        .collect::<Result<Vec<_>, _>>()?;
    let sort_col = opts.sort.as_deref().map(|r| raw.resolve_column(r)).transpose()?;
    let filter = match opts.filter.as_deref() {
        Some(arg) => {
            let (col, needle) = split_assignment(arg, "filter")?;
            Some((raw.resolve_column(col)?, needle.to_string()))
        }
        None => None,
    };
    let range = match opts.range.as_deref() {
        Some(arg) => {
            let (col, bounds) = split_assignment(arg, "range")?;
            let (min, max) = split_bounds(bounds)?;
            Some((raw.resolve_column(col)?, min, max))
        }
        None => None,
    };

    let normalizer = KeyNormalizer::new(locale_rules(&settings.locale));
    let mut table = TableController::new(normalizer);
    let mut marked = Vec::new();
    let indexed = table.build(raw.into_source(&unsortable), &mut |col: usize| marked.push(col));
    if !indexed {
        return Err(CliError::parse("table needs a header row and at least one data row")
            .with_hint("pass --no-header if the first row holds data"));
    }
    log::info!("sortable columns: {:?}", marked);

    if let Some((col, needle)) = &filter {
        warn_if_unsortable(&table, *col, "filter");
        table.filter_substring(*col, Some(needle.as_str()));
    }
    if let Some((col, min, max)) = range {
        warn_if_unsortable(&table, col, "range");
        table.filter_range(col, min, max);
    }
    if let Some(col) = sort_col {
        warn_if_unsortable(&table, col, "sort");
        table.sort(col, SortDirection::from_descending(opts.desc));
    }
    table.paint();

    let format = opts.format.unwrap_or(settings.output.format);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    render::render(&table, format, &mut handle).map_err(|e| CliError::io(e.to_string()))?;
    handle.flush().map_err(|e| CliError::io(e.to_string()))
}

fn warn_if_unsortable(table: &TableController, col: usize, op: &str) {
    if !table.is_sortable(col) {
        let label = table.columns().get(col).map_or("", |c| c.label.as_str());
        log::warn!("{} ignored: column '{}' is not indexed", op, label);
    }
}

// ============================================================================
// key
// ============================================================================

fn describe_key(key: &Key) -> String {
    match key {
        Key::Number(_) => format!("number\t{}", key),
        Key::Text(_) if key.is_empty() => "empty\t".to_string(),
        Key::Text(_) => format!("text\t{}", key),
    }
}

fn cmd_key(settings: &Settings, values: &[String]) -> Result<(), CliError> {
    let normalizer = KeyNormalizer::new(locale_rules(&settings.locale));
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for value in values {
        let key = normalizer.normalize(value);
        writeln!(handle, "{}", describe_key(&key)).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("Titre=le rouge", "filter").unwrap(), ("Titre", "le rouge"));
        assert_eq!(split_assignment("2=a=b", "filter").unwrap(), ("2", "a=b"));
        assert_eq!(split_assignment("Titre", "filter").unwrap_err().code, EXIT_USAGE);
    }

    #[test]
    fn test_split_bounds() {
        let (min, max) = split_bounds("1800..1850").unwrap();
        assert_eq!(min, Some(BoundValue::from("1800")));
        assert_eq!(max, Some(BoundValue::from("1850")));

        let (min, max) = split_bounds("1,5..").unwrap();
        assert_eq!(min, Some(BoundValue::from("1,5")));
        assert_eq!(max, None);

        let (min, max) = split_bounds("-10..-1").unwrap();
        assert_eq!(min, Some(BoundValue::from("-10")));
        assert_eq!(max, Some(BoundValue::from("-1")));

        assert!(split_bounds("1800").is_err());
    }

    #[test]
    fn test_locale_rules_from_settings() {
        let settings = Settings::from_toml(
            "[locale]\npreset = \"plain\"\narticles = [\"the \"]\n[locale.folds]\n\"ø\" = \"o\"\n",
        )
        .unwrap();
        let n = KeyNormalizer::new(locale_rules(&settings.locale));
        assert_eq!(n.normalize("The Søren"), Key::Text("soren".to_string()));
        // Plain preset keeps French accents
        assert_eq!(n.normalize("é"), Key::Text("é".to_string()));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\t"), Ok(b'\t'));
        assert!(parse_delimiter("::").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn test_describe_key() {
        assert_eq!(describe_key(&Key::number(1234.5)), "number\t1234.5");
        assert_eq!(describe_key(&Key::Text("nana".to_string())), "text\tnana");
        assert_eq!(describe_key(&Key::empty()), "empty\t");
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = load_settings(Some(Path::new("/nonexistent/tablesort.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_CONFIG);
    }
}
