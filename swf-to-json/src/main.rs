use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};
use flash_swf::read::Reader;
use flash_swf::types::Movie;

fn main() -> ExitCode {
    env_logger::init();

    let matched = Command::new("SWF -> json converter")
        .version("1.0")
        .author("CUB3D <callumthom11@gmail.com>")
        .arg(Arg::new("INPUT").help("The uncompressed swf file to convert").required(true))
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("Keep tags that fail to decode as raw bytes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Indent the json output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let Some(file_name) = matched.get_one::<String>("INPUT") else {
        return ExitCode::FAILURE;
    };
    let reader = Reader {
        lenient: matched.get_flag("lenient"),
    };

    let movie = match read_file(Path::new(file_name), reader) {
        Ok(movie) => movie,
        Err(e) => {
            eprintln!("Couldn't read swf file: {e}");
            return ExitCode::FAILURE;
        }
    };

    let json = if matched.get_flag("pretty") {
        serde_json::to_string_pretty(&movie)
    } else {
        serde_json::to_string(&movie)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Unable to encode swf as json: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read_file(path: &Path, reader: Reader) -> Result<Movie, Box<dyn std::error::Error>> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;
    log::info!("read {} bytes from {}", data.len(), path.display());
    Ok(reader.parse(&data)?)
}
