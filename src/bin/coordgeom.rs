//! coordgeom command-line tool.
//!
//! Usage:
//!   coordgeom create  --type <TYPE> --layer <NAME> [OPTIONS]   Create a layer from coordinates
//!   coordgeom create  --type <TYPE> --append <NAME> [OPTIONS]  Add features to a layer
//!   coordgeom preview --type <TYPE> [OPTIONS]                  Show what would be created
//!   coordgeom layers  [--store <DIR>] [--type <TYPE>]          List layers
//!   coordgeom fields  --store <DIR> <LAYER>                    List the fields of a layer

use std::{
    env,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
    str::FromStr,
};

use anyhow::{bail, Context};
use tracing::{debug, error, info, warn};

use coordgeom::config::{settings_path, LoadedSettings, Settings};
use coordgeom::crs::Crs;
use coordgeom::datatypes::GeometryType;
use coordgeom::error::CoordGeomError;
use coordgeom::geometry::BuildOptions;
use coordgeom::io::coords::{IdColumn, ParseOptions, Separator};
use coordgeom::io::file::{preview_file, ImportOptions};
use coordgeom::io::geojson::write_layer;
use coordgeom::layer::{DirectoryStore, LayerManager, LayerStore, MemoryStore};
use coordgeom::logging;
use coordgeom::schema::{default_fields, FieldDef, Schema};
use coordgeom::workflow::{create, preview_limited, Input, Outcome, Request, Target};

const USAGE: &str = "\
Usage: coordgeom <COMMAND> [OPTIONS]

Commands:
  create   Create features from coordinates
  preview  Show the coordinates that would be used
  layers   List layers
  fields   List the fields of a layer

Options:
  --type <TYPE>            Point, LineString, Polygon or their Multi variants
  --layer <NAME>           Create a new layer with this name
  --append <NAME>          Add features to an existing layer
  --crs <AUTH:CODE>        CRS of a new layer (default from settings, EPSG:4326)
  --store <DIR>            Directory of GeoJSON layers (default: in memory, printed to stdout)
  --file <PATH>            Read coordinates from a .txt, .csv, .dat or .xyz file
  --text <COORDS>          Read coordinates from this text
  --separator <SEP>        auto, space, comma, tab or semicolon (default: auto)
  --id, --no-id            Whether lines start with an ID (default: detected)
  --no-auto-close          Reject polygon rings whose last point differs from the first
  --field <SPEC>           Add a field: name[:type][=default]; may be repeated
  --default-fields         Add the default fields of the geometry type
  --copy-fields <NAME>     Add the fields of an existing layer
  -h, --help               Print this help message

Without --file or --text, coordinates are read from stdin.";

fn read_stdin() -> Result<String, io::Error> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Create,
    Preview,
    Layers,
    Fields,
}

#[derive(Debug, Default)]
struct Options {
    geometry_type: Option<GeometryType>,
    layer: Option<String>,
    append: Option<String>,
    crs: Option<Crs>,
    store: Option<PathBuf>,
    file: Option<PathBuf>,
    text: Option<String>,
    separator: Option<Separator>,
    id_column: IdColumn,
    auto_close: Option<bool>,
    fields: Vec<FieldDef>,
    default_fields: bool,
    copy_fields: Option<String>,
    positional: Vec<String>,
}

#[derive(Debug)]
enum Action {
    Run(Command, Options),
    Help,
}

/// The value following `flag`.
fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_value<T>(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<T, String>
where
    T: FromStr<Err = CoordGeomError>,
{
    value(args, flag)?
        .parse()
        .map_err(|e: CoordGeomError| format!("{flag}: {e}"))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Action, String> {
    let mut args = args.into_iter();
    let command = match args.next().as_deref() {
        Some("create") => Command::Create,
        Some("preview") => Command::Preview,
        Some("layers") => Command::Layers,
        Some("fields") => Command::Fields,
        Some("-h" | "--help") => return Ok(Action::Help),
        Some(other) => return Err(format!("unknown command '{other}'\n\n{USAGE}")),
        None => return Err(USAGE.into()),
    };

    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Action::Help),
            "--type" => {
                options.geometry_type = Some(parse_value::<GeometryType>(&mut args, &arg)?)
            }
            "--layer" => options.layer = Some(value(&mut args, &arg)?),
            "--append" => options.append = Some(value(&mut args, &arg)?),
            "--crs" => options.crs = Some(parse_value::<Crs>(&mut args, &arg)?),
            "--store" => options.store = Some(value(&mut args, &arg)?.into()),
            "--file" => options.file = Some(value(&mut args, &arg)?.into()),
            "--text" => options.text = Some(value(&mut args, &arg)?),
            "--separator" => {
                options.separator = match value(&mut args, &arg)?.as_str() {
                    "auto" => None,
                    name => Some(name.parse::<Separator>().map_err(|e| e.to_string())?),
                }
            }
            "--id" => options.id_column = IdColumn::Present,
            "--no-id" => options.id_column = IdColumn::Absent,
            "--no-auto-close" => options.auto_close = Some(false),
            "--field" => {
                let spec = value(&mut args, &arg)?;
                options
                    .fields
                    .push(FieldDef::parse_spec(&spec).map_err(|e| e.to_string())?);
            }
            "--default-fields" => options.default_fields = true,
            "--copy-fields" => options.copy_fields = Some(value(&mut args, &arg)?),
            flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
            _ => options.positional.push(arg),
        }
    }
    Ok(Action::Run(command, options))
}

/// Coordinates from `--file`, `--text` or stdin.
fn input(
    file: Option<PathBuf>,
    text: Option<String>,
    options: ParseOptions,
) -> anyhow::Result<Input> {
    match (file, text) {
        (Some(_), Some(_)) => bail!("--file and --text cannot be combined"),
        (Some(path), None) => Ok(Input::File(path)),
        (None, Some(text)) => Ok(Input::Text { text, options }),
        (None, None) => {
            let text = read_stdin().context("error reading stdin")?;
            Ok(Input::Text { text, options })
        }
    }
}

fn report(outcome: &Outcome) {
    info!(layer = %outcome.layer, features = outcome.features_created, "create finished");
    eprintln!("{outcome}");
    if !outcome.rejected.is_empty() {
        eprintln!("Skipped {} invalid line(s)", outcome.rejected.len());
    }
    if let Some(extent) = outcome.extent {
        eprintln!(
            "Layer extent: ({}, {}) - ({}, {})",
            extent.min().x,
            extent.min().y,
            extent.max().x,
            extent.max().y
        );
    }
}

fn run_create(options: Options, settings: &Settings) -> anyhow::Result<()> {
    let geometry_type = options.geometry_type.context("--type is required")?;
    let target = match (options.layer, options.append) {
        (Some(name), None) => Target::NewLayer {
            name,
            crs: options.crs.unwrap_or_else(|| settings.default_crs.clone()),
        },
        (None, Some(name)) => Target::Existing(name),
        (Some(_), Some(_)) => bail!("--layer and --append cannot be combined"),
        (None, None) => return Err(CoordGeomError::MissingLayerName.into()),
    };

    let mut schema = Schema::try_from_fields(options.fields)?;
    if options.default_fields {
        schema.merge(&Schema::from(default_fields(geometry_type)));
    }

    let input = input(
        options.file,
        options.text,
        ParseOptions::new(options.separator, options.id_column),
    )?;
    let auto_close = options.auto_close.unwrap_or(settings.auto_close_polygons);
    let mut request = Request::new(input, geometry_type, target)
        .with_fields(schema.into())
        .with_build_options(BuildOptions::new(auto_close))
        .with_import_options(ImportOptions::new(settings.max_file_size));
    if let Some(source) = options.copy_fields {
        request = request.copy_fields_from(source);
    }

    match options.store {
        Some(root) => {
            let mut manager = LayerManager::new(DirectoryStore::open(&root)?);
            let outcome = create(&request, &mut manager)?;
            report(&outcome);
        }
        None => {
            let mut manager = LayerManager::new(MemoryStore::new());
            let outcome = create(&request, &mut manager)?;
            report(&outcome);
            let layer = manager.layer(&outcome.layer)?;
            let mut stdout = io::stdout().lock();
            write_layer(&layer, &mut stdout)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn run_preview(options: Options, settings: &Settings) -> anyhow::Result<()> {
    let geometry_type = options.geometry_type.context("--type is required")?;
    if let Some(path) = &options.file {
        let head = preview_file(path, settings.preview_lines)
            .with_context(|| format!("error reading {}", path.display()))?;
        println!("File preview:\n{head}\n");
    }

    let input = input(
        options.file,
        options.text,
        ParseOptions::new(options.separator, options.id_column),
    )?;
    let target = Target::Existing(options.append.or(options.layer).unwrap_or_default());
    let request = Request::new(input, geometry_type, target)
        .with_import_options(ImportOptions::new(settings.max_file_size));
    let summary = preview_limited(&request, settings.preview_lines)?;
    println!("{summary}");
    if !summary.rejected.is_empty() {
        println!("{} invalid line(s) will be skipped", summary.rejected.len());
    }
    Ok(())
}

fn list_layers<S: LayerStore>(manager: &LayerManager<S>, options: &Options) -> anyhow::Result<()> {
    let family = options.geometry_type.map(|geometry_type| geometry_type.family());
    let layers = manager.list_layers(family)?;
    if layers.is_empty() {
        eprintln!("No layers found");
    }
    for layer in layers {
        println!(
            "{}\t{}\t{} features",
            layer.name, layer.geometry_type, layer.feature_count
        );
    }
    Ok(())
}

fn run_layers(options: Options) -> anyhow::Result<()> {
    match &options.store {
        Some(root) => list_layers(&LayerManager::new(DirectoryStore::open(root)?), &options),
        None => list_layers(&LayerManager::new(MemoryStore::new()), &options),
    }
}

fn run_fields(options: Options) -> anyhow::Result<()> {
    let root = options.store.context("--store is required")?;
    let [name] = options.positional.as_slice() else {
        bail!("expected exactly one layer name");
    };
    let manager = LayerManager::new(DirectoryStore::open(&root)?);
    for field in manager.fields_info(name)?.iter() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            field.name, field.field_type, field.length, field.precision, field.default
        );
    }
    Ok(())
}

fn run(command: Command, options: Options, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Create => run_create(options, settings),
        Command::Preview => run_preview(options, settings),
        Command::Layers => run_layers(options),
        Command::Fields => run_fields(options),
    }
}

fn main() -> ExitCode {
    let (command, options) = match parse_args(env::args().skip(1)) {
        Ok(Action::Run(command, options)) => (command, options),
        Ok(Action::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let LoadedSettings {
        settings,
        reset_reason,
    } = Settings::load();
    let _guard = logging::init(settings.log_to_file);
    match reset_reason {
        Some(reason) => warn!("{reason}; using defaults"),
        None => debug!(path = ?settings_path(), ?settings, "settings loaded"),
    }

    match run(command, options, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use coordgeom::schema::FieldType;

    fn parse(args: &[&str]) -> Result<Action, String> {
        parse_args(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parse_create() {
        let Ok(Action::Run(command, options)) = parse(&[
            "create",
            "--type",
            "polygon",
            "--layer",
            "parcel",
            "--crs",
            "EPSG:2056",
            "--separator",
            "tab",
            "--no-id",
            "--field",
            "area:Double=0",
            "--no-auto-close",
        ]) else {
            panic!("expected a command");
        };
        assert_eq!(command, Command::Create);
        assert_eq!(options.geometry_type, Some(GeometryType::Polygon));
        assert_eq!(options.layer.as_deref(), Some("parcel"));
        assert_eq!(options.crs.unwrap().code(), "2056");
        assert_eq!(options.separator, Some(Separator::Tab));
        assert_eq!(options.id_column, IdColumn::Absent);
        assert_eq!(options.auto_close, Some(false));
        assert_eq!(options.fields[0].field_type, FieldType::Double);
    }

    #[test]
    fn parse_fields_positional() {
        let Ok(Action::Run(Command::Fields, options)) =
            parse(&["fields", "--store", "layers", "roads"])
        else {
            panic!("expected the fields command");
        };
        assert_eq!(options.store, Some(PathBuf::from("layers")));
        assert_eq!(options.positional, ["roads"]);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(parse(&["--help"]), Ok(Action::Help)));
        assert!(matches!(parse(&["create", "-h"]), Ok(Action::Help)));
        assert!(parse(&[]).is_err());
        assert!(parse(&["draw"]).is_err());
        assert!(parse(&["create", "--type"]).is_err());
        assert!(parse(&["create", "--type", "circle"]).is_err());
        assert!(parse(&["create", "--colour", "red"]).is_err());
        assert!(parse(&["create", "--field", "1st"]).is_err());
    }

    #[test]
    fn create_requires_a_target() {
        let Ok(Action::Run(_, options)) = parse(&["create", "--type", "point", "--text", "1 2"])
        else {
            panic!("expected a command");
        };
        let err = run_create(options, &Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoordGeomError>(),
            Some(CoordGeomError::MissingLayerName)
        ));
    }
}
