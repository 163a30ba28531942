use std::{env::args, path::PathBuf};

use mediareader::{
    Reader, SymphoniaParserFactory,
    common::{
        banner::{BuildInfo, print_version},
        logger,
        types::AnyResult,
    },
    configs::Config,
};
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "mediareader.toml";

struct Args {
    config: PathBuf,
    input: PathBuf,
}

fn usage() -> String {
    "usage: mediareader [--config <path>] [--version] <media-file>".to_string()
}

/// `None` means the process is done (`--version` printed).
fn parse_args() -> AnyResult<Option<Args>> {
    let mut config = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut input = None;

    let mut it = args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                print_version(&BuildInfo::default());
                return Ok(None);
            }
            "--config" | "-c" => {
                let path = it.next().ok_or_else(usage)?;
                config = PathBuf::from(path);
            }
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option {arg}\n{}", usage()).into());
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => return Err(usage().into()),
        }
    }

    let input = input.ok_or_else(usage)?;
    Ok(Some(Args { config, input }))
}

fn main() -> AnyResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let config = Config::load_or_default(&args.config)?;
    logger::init(&config);
    info!("{}", BuildInfo::default().version_line());

    let reader = Reader::with_config(
        config.reader.clone(),
        SymphoniaParserFactory::new(config.parser.clone()),
    );
    reader.open_file(&args.input)?;

    println!(
        "{}: {} bytes, {} stream(s)",
        args.input.display(),
        reader.source_size()?,
        reader.stream_count()?
    );
    for index in 0..reader.stream_count()? {
        let stream = reader.stream(index)?;
        println!(
            "  #{:<3} {:<9} {:<12} {}",
            stream.number()?,
            stream.kind()?,
            stream.codec()?.unwrap_or_else(|| "-".to_string()),
            stream.language()?.unwrap_or_else(|| "und".to_string()),
        );
    }

    reader.close()?;
    Ok(())
}
