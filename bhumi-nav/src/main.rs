//! bhumi: build floor grids from point clouds and plan routes on them.
//!
//! ```text
//! bhumi build --input scan.ply --output maps/office --resolution 0.05
//! bhumi route --map maps/office/grid.yaml --from @lobby --to 4.2,1.5
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use bhumi_nav::core::{GridCoord, WorldPoint};
use bhumi_nav::io::{load_map, load_point_cloud, save_map, save_report};
use bhumi_nav::navigation::Waypoint;
use bhumi_nav::{
    CancelToken, LocationRegistry, MapBuilder, NavConfig, Navigator, RouteQuery,
};

#[derive(Parser)]
#[command(name = "bhumi")]
#[command(about = "Occupancy grids from 3D scans, and A* routes on them")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration (default: configs/config.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Abort after this many seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build grid.png + grid.yaml + report from a point cloud
    Build {
        /// Input cloud (.ply, .xyz, .txt, .pts)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Cell size in meters
        #[arg(long)]
        resolution: Option<f64>,

        /// Lowest kept height above the floor (meters)
        #[arg(long)]
        z_min: Option<f64>,

        /// Highest kept height above the floor (meters)
        #[arg(long)]
        z_max: Option<f64>,

        /// Obstacle inflation radius (meters)
        #[arg(long)]
        inflate: Option<f64>,

        /// RANSAC seed for reproducible builds
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Plan a route on a saved map
    Route {
        /// Map metadata file (grid.yaml)
        #[arg(short, long)]
        map: PathBuf,

        /// Start: "x,y" or "@location-id"
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        /// Goal: "x,y" or "@location-id"
        #[arg(long, allow_hyphen_values = true)]
        to: String,

        /// Named locations (JSON)
        #[arg(short, long)]
        locations: Option<PathBuf>,

        /// Read "x,y" endpoints as grid "col,row"
        #[arg(long)]
        cells: bool,

        /// 4-connected search
        #[arg(long)]
        no_diagonal: bool,

        /// Douglas-Peucker tolerance for the simplified path (meters)
        #[arg(long)]
        simplify: Option<f64>,

        /// Snap blocked endpoints to free cells within this many cells
        #[arg(long)]
        snap: Option<u32>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => NavConfig::load(path)?,
        None => NavConfig::load_default()?,
    };
    let cancel = match args.timeout {
        Some(secs) => CancelToken::with_deadline(Duration::try_from_secs_f64(secs)?),
        None => CancelToken::new(),
    };

    match args.command {
        Commands::Build {
            input,
            output,
            resolution,
            z_min,
            z_max,
            inflate,
            seed,
        } => {
            let mut config = config;
            if let Some(resolution) = resolution {
                config.raster.resolution = resolution;
            }
            if let Some(z_min) = z_min {
                config.slice.z_min = z_min;
            }
            if let Some(z_max) = z_max {
                config.slice.z_max = z_max;
            }
            if let Some(inflate) = inflate {
                config.raster.inflation_radius = inflate;
            }
            if seed.is_some() {
                config.floor.seed = seed;
            }
            build(&config, &input, &output, &cancel)
        }
        Commands::Route {
            map,
            from,
            to,
            locations,
            cells,
            no_diagonal,
            simplify,
            snap,
        } => {
            let mut nav_config = config.to_navigation_config();
            if no_diagonal {
                nav_config.astar.allow_diagonal = false;
            }
            if let Some(epsilon) = simplify {
                nav_config.simplify_epsilon = epsilon;
            }
            if let Some(snap) = snap {
                nav_config.snap_radius_cells = snap;
            }

            let grid = Arc::new(load_map(&map)?);
            let registry = match locations {
                Some(path) => LocationRegistry::load(&path)?,
                None => LocationRegistry::new(),
            };
            let navigator = Navigator::new(grid, registry, nav_config)?;
            let query = RouteQuery::new(
                parse_waypoint(&from, cells)?,
                parse_waypoint(&to, cells)?,
            );
            let response = navigator.route(&query, &cancel)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

fn build(
    config: &NavConfig,
    input: &Path,
    output: &Path,
    cancel: &CancelToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let cloud = load_point_cloud(input)?;
    let builder = MapBuilder::new(config.to_build_config())?;
    let build = builder.build(&cloud, cancel)?;

    for warning in build.warnings() {
        log::warn!("[Build] {}", warning);
    }

    let yaml_path = save_map(&build.grid, output, &config.to_map_file_settings())?;
    let report_path = output.join(&config.persistence.report_file);
    save_report(&build.diagnostics, &report_path)?;
    log::info!(
        "Map written to {} (report: {})",
        yaml_path.display(),
        report_path.display()
    );

    println!("{}", serde_json::to_string_pretty(&build.diagnostics)?);
    Ok(())
}

/// "@id" names a registry entry; otherwise "a,b" is a world point, or a
/// grid cell when `cells` is set.
fn parse_waypoint(text: &str, cells: bool) -> Result<Waypoint, String> {
    if let Some(id) = text.strip_prefix('@') {
        return Ok(Waypoint::Named(id.to_string()));
    }
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\" or \"@id\", got \"{}\"", text))?;
    let (a, b) = (a.trim(), b.trim());
    if cells {
        let col = a.parse().map_err(|_| format!("invalid column \"{}\"", a))?;
        let row = b.parse().map_err(|_| format!("invalid row \"{}\"", b))?;
        Ok(Waypoint::Cell(GridCoord::new(col, row)))
    } else {
        let x = a.parse().map_err(|_| format!("invalid x \"{}\"", a))?;
        let y = b.parse().map_err(|_| format!("invalid y \"{}\"", b))?;
        let point = WorldPoint::new(x, y);
        if !point.is_finite() {
            return Err(format!("coordinates must be finite, got \"{}\"", text));
        }
        Ok(Waypoint::World(point))
    }
}
