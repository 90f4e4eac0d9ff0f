use std::env;
use std::fs;
use std::path::PathBuf;

use tessellation::TessellationConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    let report = match cmd.as_str() {
        "locate" => cmd_locate(args)?,
        "overlap" => cmd_overlap(args)?,
        "tessellate" => cmd_tessellate(args)?,
        _ => return Err(usage()),
    };
    let payload = serde_json::to_string_pretty(&report).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn cmd_locate(args: Vec<String>) -> Result<serde_json::Value, String> {
    // globe-tess locate <quad|healpix> <level> <lon> <lat>
    if args.len() != 4 {
        return Err(usage());
    }
    let level = args[1]
        .parse::<u32>()
        .map_err(|_| "level must be an integer".to_string())?;
    let lon = parse_degrees(&args[2], "lon")?;
    let lat = parse_degrees(&args[3], "lat")?;
    tools::locate(&args[0], level, lon, lat)
}

fn cmd_overlap(args: Vec<String>) -> Result<serde_json::Value, String> {
    // globe-tess overlap <input.geojson> [--scheme quad|healpix]
    if args.is_empty() {
        return Err(usage());
    }
    let input = PathBuf::from(&args[0]);
    let mut scheme = "quad".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--scheme" => {
                scheme = flag_value(&args, &mut i, "--scheme")?;
            }
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    let text = fs::read_to_string(&input).map_err(|e| format!("read {input:?}: {e}"))?;
    tools::overlap(&text, &scheme)
}

fn cmd_tessellate(args: Vec<String>) -> Result<serde_json::Value, String> {
    // globe-tess tessellate <input.geojson> [--crs NAME] [--crs-config FILE] [--config FILE]
    if args.is_empty() {
        return Err(usage());
    }
    let input = PathBuf::from(&args[0]);
    let mut crs = "Equatorial".to_string();
    let mut crs_config: Option<String> = None;
    let mut config = TessellationConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--crs" => {
                crs = flag_value(&args, &mut i, "--crs")?;
            }
            "--crs-config" => {
                let path = flag_value(&args, &mut i, "--crs-config")?;
                crs_config =
                    Some(fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?);
            }
            "--config" => {
                let path = flag_value(&args, &mut i, "--config")?;
                let text = fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?;
                config = TessellationConfig::from_json_str(&text).map_err(|e| e.to_string())?;
            }
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    let text = fs::read_to_string(&input).map_err(|e| format!("read {input:?}: {e}"))?;
    tools::tessellate(&text, &crs, crs_config.as_deref(), config)
}

fn flag_value(args: &[String], i: &mut usize, name: &str) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{name} requires a value"))
}

fn parse_degrees(s: &str, what: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{what} must be a number"))
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "globe-tess".to_string());
    format!(
        "Usage:\n  {exe} locate <quad|healpix> <level> <lon> <lat>\n  {exe} overlap <input.geojson> [--scheme quad|healpix]\n  {exe} tessellate <input.geojson> [--crs NAME] [--crs-config FILE] [--config FILE]\n\nNotes:\n- Output is JSON on stdout; set RUST_LOG for diagnostics on stderr.\n- `--crs-config` registers a CRS from a JSON definition before `--crs` is resolved.\n"
    )
}
