//! `confmig` binary

use std::process::ExitCode;

use confmig_cli::{command, dispatch, init_logging, Streams};

fn main() -> ExitCode {
    let matches = command().get_matches();
    init_logging(matches.get_flag("json-logs"));

    let (mut stdin, mut stdout, mut stderr) = (std::io::stdin(), std::io::stdout(), std::io::stderr());
    let streams = Streams {
        stdin: &mut stdin,
        stdout: &mut stdout,
        stderr: &mut stderr,
    };

    match dispatch(&matches, streams) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
