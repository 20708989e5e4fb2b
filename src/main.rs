//! Interactive point-picking viewer binary.

use std::path::Path;

use pointpick::{options::Options, Viewer};

/// Options path from the first positional argument, plus an optional
/// `--seed N` override.
struct Args {
    options: Option<String>,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        options: None,
        seed: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--seed" {
            let value = iter.next().ok_or("--seed needs a value")?;
            args.seed = Some(
                value
                    .parse()
                    .map_err(|e| format!("invalid seed {value:?}: {e}"))?,
            );
        } else if args.options.is_none() {
            args.options = Some(arg);
        } else {
            return Err(format!("unexpected argument {arg:?}"));
        }
    }
    Ok(args)
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!("Usage: pointpick [options.toml] [--seed N]");
            std::process::exit(1);
        }
    };

    let mut options = match args.options.as_deref() {
        Some(path) => match Options::load(Path::new(path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };
    if args.seed.is_some() {
        options.dataset.seed = args.seed;
    }

    if let Err(e) = Viewer::builder().with_options(options).build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
