use hex_membrane::initial_condition::{Layout, MassLayout};
use hex_membrane::membrane::MassMarker;
use hex_membrane::statistics::MembraneStatistics;
use hex_membrane::{Membrane, MembraneParameters, Simulation, Vec3, Vertex};

use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use tracing::info;

#[derive(StructOpt, Debug)]
#[structopt(name = "hex_membrane")]
struct Opt {
    /// JSON settings file: membrane parameters plus the masses to place.
    #[structopt(short, long)]
    input_file: Option<std::path::PathBuf>,
    /// Directory to write one MessagePack frame per tick into.
    #[structopt(short, long)]
    output_dir: Option<std::path::PathBuf>,
    #[structopt(short, long, default_value = "600")]
    frames: usize,
    /// Overrides the grid size from the settings file.
    #[structopt(short, long)]
    grid_size: Option<usize>,
}

/// Everything needed to set up a run.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    params: MembraneParameters,
    /// Points on the flat membrane to drop masses on.
    masses: Vec<Vec3>,
    layout: Option<Layout>,
}

/// One frame of output, as handed to the renderer.
#[derive(Serialize)]
struct Frame<'a> {
    vertices: Vec<Vertex>,
    markers: &'a [Option<MassMarker>],
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::from_args();

    use eyre::WrapErr;

    let mut settings: Settings = match &opt.input_file {
        Some(input_file) => std::fs::read(input_file)
            .wrap_err_with(|| format!("Failed to read JSON settings file: {:?}", input_file))
            .and_then(|json| {
                serde_json::from_slice(&json).wrap_err("Serde failed to deserialize JSON.")
            })?,
        None => Settings::default(),
    };

    if let Some(grid_size) = opt.grid_size {
        settings.params.grid_size = grid_size;
    }
    settings.params.validate()?;

    let mut membrane = Membrane::new(settings.params);
    for &point in &settings.masses {
        membrane.add_mass(point);
    }
    if let Some(layout) = &settings.layout {
        layout.add_masses(&mut membrane);
    }

    if let Some(path) = &opt.output_dir {
        std::fs::create_dir_all(path)
            .wrap_err_with(|| format!("Failed to create output directory: {:?}", path))?;
    }

    for frame in 0..opt.frames {
        let vertices = membrane.simulate_frame();

        if let Some(path) = &opt.output_dir {
            let mut path = path.clone();
            path.push(format!("{:03}.dat", frame));
            let mut writer = std::fs::File::create(&path)
                .wrap_err_with(|| format!("Failed to create frame file: {:?}", path))?;
            rmp_serde::encode::write(
                &mut writer,
                &Frame {
                    vertices,
                    markers: membrane.markers(),
                },
            )?;
        }

        info!(
            frame,
            max_depth = membrane.max_depth(),
            mean_strain = membrane.mean_strain(),
            kinetic_energy = membrane.kinetic_energy(),
            spring_energy = membrane.spring_energy(),
            "Finished frame"
        );
    }

    Ok(())
}
