use argh::FromArgs;
use serde::Deserialize;
use std::path::PathBuf;

use rallie_homography::{
    find_homography, project_point, reprojection_errors, EstimationMethod, RansacParams,
};

#[derive(FromArgs)]
/// Estimate an image-to-court homography from a JSON file and project query points
struct Args {
    /// path to the JSON file with `source`, `destination` and optional `queries`
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// use RANSAC instead of the least-squares DLT
    #[argh(switch)]
    ransac: bool,

    /// RANSAC inlier threshold in destination units
    #[argh(option, default = "3.0")]
    threshold: f64,

    /// RANSAC random seed
    #[argh(option)]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct Correspondences {
    source: Vec<[f64; 2]>,
    destination: Vec<[f64; 2]>,
    #[serde(default)]
    queries: Vec<[f64; 2]>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let file = std::fs::File::open(&args.input)?;
    let data: Correspondences = serde_json::from_reader(std::io::BufReader::new(file))?;
    log::info!(
        "loaded {} correspondences and {} queries from {}",
        data.source.len(),
        data.queries.len(),
        args.input.display()
    );

    let method = if args.ransac {
        EstimationMethod::Ransac(RansacParams {
            threshold: args.threshold,
            random_seed: args.seed,
            ..Default::default()
        })
    } else {
        EstimationMethod::Dlt
    };

    let h = find_homography(&data.source, &data.destination, &method)?;
    println!("homography (row-major): {:?}", h.to_row_major());

    let errors = reprojection_errors(&data.source, &data.destination, &h)?;
    let rms = (errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64).sqrt();
    println!("reprojection rms: {rms:.4}");

    for q in data.queries.iter() {
        match project_point(q, &h) {
            Ok(p) => println!("{q:?} -> {p:?}"),
            Err(err) => println!("{q:?} -> {err}"),
        }
    }

    Ok(())
}
