use env_logger::Env;
use log::error;
use pcstat::filter::{Chain, MaxSize, RegularOnly};
use pcstat::output::{self, Format};
use pcstat::Prober;
use std::io;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "pcstat")]
struct Options {
    /// Print records as a JSON array
    #[structopt(long, conflicts_with = "terse")]
    json: bool,

    /// Print comma-separated values
    #[structopt(long)]
    terse: bool,

    /// Omit the header line
    #[structopt(long)]
    nohdr: bool,

    /// Print only the basename of each file
    #[structopt(long)]
    bname: bool,

    /// Skip anything that is not a regular file or block device
    #[structopt(long)]
    regular_only: bool,

    /// Skip files larger than this many bytes
    #[structopt(long)]
    max_size: Option<u64>,

    /// Target files
    #[structopt(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let opt = Options::from_args();

    let mut filter = Chain::new();
    if opt.regular_only {
        filter.push(RegularOnly);
    }
    if let Some(limit) = opt.max_size {
        filter.push(MaxSize(limit));
    }

    let prober = Prober::new();
    let mut failed = false;
    let mut stats = Vec::with_capacity(opt.files.len());
    for file in &opt.files {
        match prober.probe(file, &filter) {
            Ok(mut pcs) => {
                if opt.bname {
                    if let Some(name) = file.file_name() {
                        pcs.name = name.into();
                    }
                }
                stats.push(pcs);
            }
            Err(err) => {
                error!("{}", err);
                failed = true;
            }
        }
    }

    let format = if opt.json {
        Format::Json
    } else if opt.terse {
        Format::Terse
    } else {
        Format::Table
    };
    if let Err(err) = output::write(&mut io::stdout().lock(), format, &stats, !opt.nohdr) {
        error!("failed to write output: {}", err);
        process::exit(1);
    }

    if failed {
        process::exit(1);
    }
}
