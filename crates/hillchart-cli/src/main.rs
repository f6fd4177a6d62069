use hillchart::render::raster::{RasterError, RasterOptions};
use hillchart::render::{HeadlessError, HeadlessRenderer, export_file_name};
use hillchart::{ChartState, MemoryLocation, Store, TokenFormat, codec};
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use url::Url;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Decode(hillchart::DecodeError),
    Url(url::ParseError),
    Location(hillchart::Error),
    Render(HeadlessError),
    Raster(RasterError),
    InvalidState(String),
    MissingFragment(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Decode(err) => write!(f, "cannot read chart token: {err}"),
            CliError::Url(err) => write!(f, "invalid URL: {err}"),
            CliError::Location(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::InvalidState(msg) => write!(f, "invalid chart state: {msg}"),
            CliError::MissingFragment(url) => write!(f, "URL has no chart token: {url}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<hillchart::DecodeError> for CliError {
    fn from(value: hillchart::DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<url::ParseError> for CliError {
    fn from(value: url::ParseError) -> Self {
        Self::Url(value)
    }
}

impl From<hillchart::Error> for CliError {
    fn from(value: hillchart::Error) -> Self {
        Self::Location(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Decode,
    Encode,
    Layout,
    Render,
    Url,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    with_meta: bool,
    lenient: bool,
    legacy: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    width: f64,
    height: f64,
    diagram_id: Option<String>,
    base: Option<String>,
    out: Option<String>,
}

/// Where a chart read from the command line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputSource {
    Token(TokenFormat),
    Json,
    /// `--lenient` replaced an unreadable token with the default chart.
    Fallback,
}

impl InputSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Token(TokenFormat::Current) => "current",
            Self::Token(TokenFormat::Legacy) => "legacy",
            Self::Json => "json",
            Self::Fallback => "default",
        }
    }
}

#[derive(Debug)]
struct Input {
    state: ChartState,
    source: InputSource,
}

#[derive(Serialize)]
struct DecodeOut<'a> {
    format: &'static str,
    state: &'a ChartState,
}

fn usage() -> &'static str {
    "hillchart-cli\n\
\n\
USAGE:\n\
  hillchart-cli [decode] [--pretty] [--meta] [--lenient] [<token|url|path>|-]\n\
  hillchart-cli encode [--legacy] [<path>|-]\n\
  hillchart-cli layout [--pretty] [--width <w>] [--height <h>] [<token|url|path>|-]\n\
  hillchart-cli render [--format svg|png] [--scale <n>] [--background <color>] [--width <w>] [--height <h>] [--id <svg-id>] [--out <path>] [<token|url|path>|-]\n\
  hillchart-cli url --base <url> [<token|url|path>|-]\n\
\n\
NOTES:\n\
  - If the input is omitted or '-', it is read from stdin. An argument naming an existing file is read from that file.\n\
  - Inputs may be a chart token, a share URL (the token is taken from its fragment) or chart JSON.\n\
  - decode prints chart JSON; --meta also reports the input's format (current, legacy, json or default).\n\
  - encode reads chart JSON and prints a token (--legacy writes the old, uncompressed format).\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to <chart-title>.png in the current directory (2x scale, dark background).\n\
  - Set HILLCHART_LOG (or RUST_LOG) to e.g. 'debug' for diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let raster = RasterOptions::default();
    let mut args = Args {
        command: Command::Decode,
        render_format: RenderFormat::Svg,
        render_scale: raster.scale,
        background: raster.background,
        width: hillchart::curve::DEFAULT_WIDTH,
        height: hillchart::curve::DEFAULT_HEIGHT,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "decode" => args.command = Command::Decode,
            "encode" => args.command = Command::Encode,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "url" => args.command = Command::Url,
            "--pretty" => args.pretty = true,
            "--meta" => args.with_meta = true,
            "--lenient" => args.lenient = true,
            "--legacy" => args.legacy = true,
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?.trim();
                args.background = match bg {
                    "" | "none" => None,
                    bg => Some(bg.to_string()),
                };
            }
            "--width" => {
                args.width = next_value(&mut it)?
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--height" => {
                args.height = next_value(&mut it)?
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--id" => args.diagram_id = Some(next_value(&mut it)?.clone()),
            "--base" => args.base = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            input => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(input.to_string());
            }
        }
    }

    if args.command == Command::Url && args.base.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

/// Stdin for `None`/`-`, the file's contents for an existing path, the argument itself otherwise.
fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(arg) if std::path::Path::new(arg).is_file() => Ok(std::fs::read_to_string(arg)?),
        Some(literal) => Ok(literal.to_string()),
    }
}

fn state_from_json(text: &str) -> Result<ChartState, CliError> {
    let state: ChartState = serde_json::from_str(text)?;
    if let Some(id) = state.duplicate_scope_id() {
        return Err(CliError::InvalidState(format!("duplicate scope id {id:?}")));
    }
    if let Some(scope) = state
        .scopes
        .iter()
        .find(|s| !(0.0..=1.0).contains(&s.position))
    {
        return Err(CliError::InvalidState(format!(
            "scope {:?} has position {} outside [0, 1]",
            scope.id, scope.position
        )));
    }
    Ok(state)
}

/// Extracts the token from a share URL; anything that does not look like a URL is the token.
fn token_from(text: &str) -> Result<String, CliError> {
    let text = text.trim();
    if !text.contains("://") {
        return Ok(text.to_string());
    }
    let url = Url::parse(text)?;
    match url.fragment().filter(|f| !f.is_empty()) {
        Some(fragment) => Ok(fragment.to_string()),
        None => Err(CliError::MissingFragment(text.to_string())),
    }
}

fn decode_input(text: &str, lenient: bool) -> Result<Input, CliError> {
    if text.trim_start().starts_with('{') {
        return Ok(Input {
            state: state_from_json(text)?,
            source: InputSource::Json,
        });
    }
    let token = token_from(text)?;
    match codec::decode_with_format(&token) {
        Ok(decoded) => Ok(Input {
            state: decoded.state,
            source: InputSource::Token(decoded.format),
        }),
        Err(err) if lenient => {
            tracing::warn!(error = %err, "falling back to the default chart");
            Ok(Input {
                state: ChartState::default(),
                source: InputSource::Fallback,
            })
        }
        Err(err) => Err(err.into()),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        use std::io::Write;
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let renderer = {
        let mut renderer = HeadlessRenderer::new()
            .with_width(args.width)
            .with_height(args.height);
        renderer.svg.diagram_id = args.diagram_id.clone();
        renderer
    };

    match args.command {
        Command::Encode => {
            let state = state_from_json(&text)?;
            let token = if args.legacy {
                codec::encode_legacy(&state)
            } else {
                codec::encode(&state)
            };
            println!("{token}");
            Ok(())
        }
        Command::Decode => {
            let decoded = decode_input(&text, args.lenient)?;
            if args.with_meta {
                let out = DecodeOut {
                    format: decoded.source.as_str(),
                    state: &decoded.state,
                };
                write_json(&out, args.pretty)
            } else {
                write_json(&decoded.state, args.pretty)
            }
        }
        Command::Layout => {
            let decoded = decode_input(&text, args.lenient)?;
            let layout = renderer.layout(&decoded.state)?;
            write_json(&layout, args.pretty)
        }
        Command::Render => {
            let decoded = decode_input(&text, args.lenient)?;
            match args.render_format {
                RenderFormat::Svg => {
                    let svg = renderer.render_svg(&decoded.state)?;
                    write_text(&svg, args.out.as_deref())
                }
                RenderFormat::Png => {
                    let raster = RasterOptions {
                        scale: args.render_scale,
                        background: args.background.clone(),
                    };
                    let bytes = renderer.render_png(&decoded.state, &raster)?;
                    let out = args
                        .out
                        .clone()
                        .unwrap_or_else(|| export_file_name(&decoded.state.title));
                    tracing::debug!(out = %out, "writing PNG");
                    write_bytes(&bytes, &out)
                }
            }
        }
        Command::Url => {
            let decoded = decode_input(&text, args.lenient)?;
            let base = args.base.as_deref().ok_or(CliError::Usage(usage()))?;
            let mut location = MemoryLocation::parse(base)?;
            location.navigate(Some(codec::encode(&decoded.state).as_str()));
            let mut store = Store::new(location);
            println!("{}", store.shareable_url());
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("HILLCHART_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
