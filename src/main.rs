use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use heightlab::config::NoiseParams;
use heightlab::render;
use heightlab::session::EditorSession;
use heightlab::Timing;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let seed: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    let width: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(512);
    let height: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(512);
    let out_dir: PathBuf = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    if let Err(err) = run(seed, width, height, &out_dir) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(seed: u64, width: usize, height: usize, out_dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out_dir)?;

    let mut timings: Vec<Timing> = Vec::new();
    let params = NoiseParams::default();

    info!(seed, width, height, "generating terrain");

    let mut session = EditorSession::new(seed);
    session.create_map(width, height);

    let t = Instant::now();
    session.generate(&params)?;
    timings.push(Timing {
        name: "generate",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let map = session.map().expect("map was just created");
    let (w, h) = (map.width(), map.height());

    let t = Instant::now();
    let gray = render::render_grayscale(map);
    let shaded = render::render_shaded(map);
    timings.push(Timing {
        name: "render",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let save_png = |name: &str, rgba: &[u8]| -> Result<(), image::ImageError> {
        let path = out_dir.join(name);
        image::save_buffer(&path, rgba, w as u32, h as u32, image::ColorType::Rgba8)?;
        info!("saved {}", path.display());
        Ok(())
    };
    save_png("heightmap.png", &gray)?;
    save_png("shaded.png", &shaded)?;

    let t = Instant::now();
    let obj = session.export_obj()?;
    let stl = session.export_stl()?;
    timings.push(Timing {
        name: "mesh_export",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    std::fs::write(out_dir.join("terrain.obj"), obj)?;
    info!("saved {}", out_dir.join("terrain.obj").display());
    std::fs::write(out_dir.join("terrain.stl"), stl)?;
    info!("saved {}", out_dir.join("terrain.stl").display());

    for t in &timings {
        info!("{:12} {:8.1} ms", t.name, t.ms);
    }

    Ok(())
}
