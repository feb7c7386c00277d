use std::path::PathBuf;

/// Hexagon feature enrichment and electrification planning CLI
#[derive(clap::Parser, Debug)]
#[command(name = "spider", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Add raster and vector features as columns of a cell table
    Enrich(EnrichArgs),

    /// Score every cell with a profit model or the weighted objective
    Model(ModelArgs),

    /// Lower grid distances around a newly drawn line
    ExtendGrid(ExtendGridArgs),
}

#[derive(clap::Args, Debug)]
pub struct EnrichArgs {
    /// Cells as a GeoJSON FeatureCollection of polygons
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub cells: PathBuf,

    /// JSON list of feature descriptors
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub features: PathBuf,

    /// Raster whose grid is used for distance features
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub raster_like: PathBuf,

    /// Output GeoJSON, written even when a feature fails
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Also write the attribute table as CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub csv: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Cells as GeoJSON
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub cells: PathBuf,

    /// Model name: test, households or grid_distance
    #[arg(short, long, requires = "pars", required_unless_present = "objective")]
    pub model: Option<String>,

    /// Model parameters as JSON ({"interest_rate": .., "num_years": ..})
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub pars: Option<PathBuf>,

    /// Objective weights as JSON ({"grid": .., "road": .., "pop": ..}) instead of a model
    #[arg(long, conflicts_with = "model", value_hint = clap::ValueHint::FilePath)]
    pub objective: Option<PathBuf>,

    /// Keep only cells matching "var op val"; repeat to combine
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Output file (.geojson or .csv)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ExtendGridArgs {
    /// Cells as GeoJSON
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub cells: PathBuf,

    /// New grid line(s) as GeoJSON or Shapefile
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub line: PathBuf,

    /// Distance added per ring of neighbours
    #[arg(long, default_value_t = 10.0)]
    pub step: f64,

    /// Column holding the grid distance
    #[arg(long, default_value = "grid_dist")]
    pub column: String,

    /// Output file (.geojson or .csv)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,
}
