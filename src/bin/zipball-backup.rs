extern crate chrono;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate shellexpand;
extern crate structopt;
extern crate zipball_backup;

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use chrono::Local;
use env_logger::{Builder, Target};
use failure::{Error, ResultExt};
use log::LevelFilter;
use structopt::StructOpt;
use zipball_backup::{Config, Driver, ExportFailure, ReqwestClient};

fn main() {
    let args = Args::from_iter(env::args().map(single_dash_username));

    if args.example_config {
        generate_example();
        return;
    }

    if let Err(e) = run(&args) {
        if let Some(export_failure) = e.downcast_ref::<ExportFailure>() {
            let mut stderr = io::stderr();
            export_failure.display(&mut stderr).ok();
        } else {
            eprintln!("Error: {}", e);

            for cause in e.iter_causes() {
                eprintln!("\tCaused By: {}", cause);
            }

            process::exit(1);
        }
    }
}

/// Accept `-username` as well as `--username`/`-u`, otherwise clap would
/// read it as `-u sername`.
fn single_dash_username(arg: String) -> String {
    if arg == "-username" || arg.starts_with("-username=") {
        format!("-{}", arg)
    } else {
        arg
    }
}

fn generate_example() {
    let example = Config::example();

    println!("{}", example.as_toml());
}

fn run(args: &Args) -> Result<(), Error> {
    initialize_logging(args)?;
    let cfg = args.config()?;

    if log_enabled!(log::Level::Debug) {
        for line in format!("{:#?}", cfg).lines() {
            debug!("{}", line);
        }
    }

    let username = match args.username {
        Some(ref name) => name,
        None => return Err(failure::err_msg("No username provided, see --help")),
    };
    debug!("Got username {}", username);

    let client = ReqwestClient::new(&cfg.github)?;
    let driver = Driver::new(cfg, client);

    driver.run(username)?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
struct Args {
    #[structopt(
        short = "u",
        long = "username",
        required_unless = "example-config",
        help = "The GitHub user whose public repositories will be exported."
    )]
    username: Option<String>,
    #[structopt(short = "c", long = "config", help = "The configuration file to use.")]
    config_file: Option<String>,
    #[structopt(
        short = "o",
        long = "output-dir",
        parse(from_os_str),
        help = "Where to create the timestamped output directory."
    )]
    output_dir: Option<PathBuf>,
    #[structopt(
        short = "v",
        long = "verbose",
        parse(from_occurrences),
        help = "Verbose output (repeat for more verbosity)"
    )]
    verbosity: u64,
    #[structopt(
        long = "example-config",
        help = "Generate an example config and immediately exit."
    )]
    example_config: bool,
}

impl Args {
    pub fn config(&self) -> Result<Config, Error> {
        let mut cfg = match self.config_file {
            Some(ref config_file) => {
                let config_file =
                    shellexpand::full(config_file).context("Unable to expand wildcards")?;

                Config::from_file(&*config_file).context("Couldn't load the config")?
            }
            None => Config::default(),
        };

        if let Some(ref dir) = self.output_dir {
            cfg.general.dest_dir = dir.clone();
        }

        Ok(cfg)
    }
}

fn initialize_logging(args: &Args) -> Result<(), Error> {
    let mut builder = Builder::new();

    let level = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    builder
        .filter(Some("zipball_backup"), level)
        .target(Target::Stdout);

    if let Ok(filter) = env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    }

    builder.format(|out, record| {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        let location = match record.line() {
            Some(line) => format!("{}#{}", record.target(), line),
            None => record.target().to_string(),
        };

        writeln!(out, "{} [{:5}] ({}): {}", now, record.level(), location, record.args())
    });

    builder.try_init()?;

    Ok(())
}
