//! Synthetic magnitudes for a batch of spectra
//!
//! Loads one filter set from a JSON filter file, reads every input spectrum
//! with the chosen format adapter and writes a magnitude table as CSV.
//!
//! ```text
//! spec2mag --filters filters.json --set JPLUS --region 1 \
//!     --format starlight obj1.txt,obj1.out obj2.txt
//! ```

use std::path::PathBuf;

use clap::Parser;
use synphot::{ConfigOverrides, FilterStore, JsonFilterStore, Photometer};
use synphot_io::{run_batch, SourceFormat, SourceInput};

#[derive(Parser, Debug)]
#[command(
    name = "spec2mag",
    about = "Computes AB synthetic magnitudes of spectra through a filter set",
    long_about = None
)]
struct Args {
    /// JSON filter file (`set -> region -> filter -> {wl, transm}`)
    #[arg(long)]
    filters: PathBuf,

    /// Filter set identifier
    #[arg(long)]
    set: Option<String>,

    /// Detector region within the set
    #[arg(long, default_value = "1")]
    region: String,

    /// Spectrum file format
    #[arg(long, value_enum, default_value_t = SourceFormat::Starlight)]
    format: SourceFormat,

    /// Photometry config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum fraction of bad samples inside a filter window
    #[arg(long)]
    tolerance: Option<f64>,

    /// Resample filter curves to a uniform wavelength grid
    #[arg(long)]
    resample: bool,

    /// Uniform grid step in Ångstrom (with --resample)
    #[arg(long)]
    delta_lambda: Option<f64>,

    /// Process filters one at a time instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Output CSV file (stdout if not given)
    #[arg(long)]
    output: Option<PathBuf>,

    /// List the filter sets and regions in the filter file and exit
    #[arg(long)]
    list_sets: bool,

    /// Input spectra as PATH or PATH,MODEL_PATH
    inputs: Vec<SourceInput>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bad_pixel_tolerance: self.tolerance,
            delta_lambda: self.delta_lambda,
            resample_filters: self.resample,
            sequential: self.sequential,
        }
    }
}

fn list_sets(store: &dyn FilterStore) -> Result<(), Box<dyn std::error::Error>> {
    for set_id in store.set_ids() {
        let regions = store.regions(&set_id)?;
        println!("{set_id}: {}", regions.join(", "));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let store = JsonFilterStore::open(&args.filters)?;

    if args.list_sets {
        return list_sets(&store);
    }

    let set_id = args
        .set
        .as_deref()
        .ok_or("--set is required unless --list-sets is given")?;
    if args.inputs.is_empty() {
        return Err("no input spectra given".into());
    }

    let config = args.overrides().resolve(args.config.as_deref())?;
    let photometer = Photometer::new(config)?;
    log::info!("Photometry config: {:?}", photometer.config());

    let filter_set = photometer.prepare(&store.load_set(set_id, &args.region)?)?;
    log::info!(
        "Loaded {} filters from {}/{}: {}",
        filter_set.len(),
        filter_set.set_id(),
        filter_set.region(),
        filter_set.filter_ids().join(", ")
    );

    let adapter = args.format.adapter();
    let table = run_batch(&photometer, &filter_set, adapter.as_ref(), &args.inputs);

    match &args.output {
        Some(path) => {
            table.save_csv(path)?;
            log::info!("Wrote {} rows to {}", table.rows().len(), path.display());
        }
        None => table.write_csv(std::io::stdout().lock())?,
    }

    Ok(())
}
