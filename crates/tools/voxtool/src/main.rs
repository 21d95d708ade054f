use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vox::import::Importer;
use vox::{build_mesh, parse_vox, serialize_vox, MeshMode, MeshOptions, PaletteTexture, VoxDocument};

mod config;
mod obj;
mod sink;

use sink::DirectorySink;

#[derive(Parser)]
#[command(name = "voxtool")]
#[command(about = "Inspect, mesh and import MagicaVoxel .vox files", long_about = None)]
struct Cli {
    /// Debug logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, models, used colours and materials
    Info {
        file: PathBuf,
    },

    /// Export a model as Wavefront OBJ
    Mesh {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Mode::Optimized)]
        mode: Mode,

        /// Model index; all models are merged when omitted
        #[arg(long)]
        model: Option<usize>,

        /// Output file, defaults to the input with an .obj extension
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Size of one voxel
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
    },

    /// Write the palette texture as PNG
    Palette {
        file: PathBuf,

        #[arg(short, long)]
        out: PathBuf,
    },

    /// Run a full import into a directory
    Import {
        file: PathBuf,

        /// TOML import options
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        out_dir: PathBuf,

        /// Asset name, defaults to the input file stem
        #[arg(long)]
        name: Option<String>,

        /// Override the configured mesh mode
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Import each model separately
        #[arg(long)]
        separate: bool,
    },

    /// Parse a file and write it back out
    Resave {
        input: PathBuf,
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Naive,
    Optimized,
}

impl From<Mode> for MeshMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Naive => MeshMode::Naive,
            Mode::Optimized => MeshMode::Optimized,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { file } => info_command(&file),
        Commands::Mesh {
            file,
            mode,
            model,
            out,
            scale,
        } => mesh_command(&file, mode.into(), model, out, scale),
        Commands::Palette { file, out } => palette_command(&file, &out),
        Commands::Import {
            file,
            config,
            out_dir,
            name,
            mode,
            separate,
        } => import_command(&file, config.as_deref(), &out_dir, name, mode, separate),
        Commands::Resave { input, output } => resave_command(&input, &output),
    }
}

fn load(path: &Path) -> Result<VoxDocument> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_vox(&data).with_context(|| format!("parsing {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string()
}

fn info_command(path: &Path) -> Result<()> {
    let doc = load(path)?;

    println!("{}", path.display());
    println!("  version: {}", doc.version);
    println!("  models: {}", doc.model_count());
    for (i, (model, extent)) in doc.models().enumerate() {
        println!(
            "    [{}] {}x{}x{}, {} voxels, colours {:?}",
            i,
            extent.x,
            extent.y,
            extent.z,
            model.len(),
            model.unique_colors()
        );
    }
    let biggest = doc.biggest_extent();
    println!("  biggest extent: {}x{}x{}", biggest.x, biggest.y, biggest.z);
    println!("  used colours: {:?}", doc.unique_colors());

    for (index, material) in doc.materials().iter().enumerate().skip(1) {
        if !material.is_default() {
            println!("  material {}: {:?}", index, material);
        }
    }
    Ok(())
}

fn mesh_command(
    path: &Path,
    mode: MeshMode,
    model_index: Option<usize>,
    out: Option<PathBuf>,
    scale: f32,
) -> Result<()> {
    anyhow::ensure!(scale.is_finite() && scale > 0.0, "scale must be positive");
    let doc = load(path)?;

    let options = MeshOptions {
        cell_size: scale,
        ..Default::default()
    };

    let mesh = match model_index {
        Some(index) => {
            let (model, extent) = doc.model(index).with_context(|| {
                format!("model {} out of range ({} models)", index, doc.model_count())
            })?;
            build_mesh(model, extent, mode, &options)
        }
        None => build_mesh(&doc.merged_model(), doc.biggest_extent(), mode, &options),
    }
    .with_context(|| format!("meshing {}", path.display()))?;

    let out = out.unwrap_or_else(|| path.with_extension("obj"));
    let mut writer = BufWriter::new(
        File::create(&out).with_context(|| format!("creating {}", out.display()))?,
    );
    obj::write_obj(&mesh, &file_stem(path), obj::material_name, &mut writer)?;

    info!(
        "Wrote {} ({} quads, {} vertices)",
        out.display(),
        mesh.quad_count(),
        mesh.vertex_count()
    );
    Ok(())
}

fn palette_command(path: &Path, out: &Path) -> Result<()> {
    let doc = load(path)?;
    PaletteTexture::from_palette(&doc.palette)
        .to_image()
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    info!("Wrote {}", out.display());
    Ok(())
}

fn import_command(
    path: &Path,
    config_path: Option<&Path>,
    out_dir: &Path,
    name: Option<String>,
    mode: Option<Mode>,
    separate: bool,
) -> Result<()> {
    let mut options = config::load_import_options(config_path)?;
    if let Some(mode) = mode {
        options.mesh_mode = mode.into();
    }
    options.separate_models |= separate;

    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let importer = Importer::new(name.unwrap_or_else(|| file_stem(path)), options);

    let mut sink = DirectorySink::create(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let report = importer
        .import_bytes(&data, &mut sink)
        .with_context(|| format!("importing {}", path.display()))?;
    let written = sink.finish()?;

    info!(
        "Imported {}: {} static meshes, {} voxel assets, {} materials, {} instances, {} files",
        path.display(),
        report.static_meshes,
        report.voxels,
        report.materials,
        report.material_instances,
        written.len()
    );
    if !report.warnings.is_empty() {
        warn!("{} import warnings", report.warnings.len());
    }
    Ok(())
}

fn resave_command(input: &Path, output: &Path) -> Result<()> {
    let doc = load(input)?;
    let bytes = serialize_vox(&doc).with_context(|| format!("serializing {}", input.display()))?;
    fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
    info!("Wrote {} ({} models)", output.display(), doc.model_count());
    Ok(())
}
