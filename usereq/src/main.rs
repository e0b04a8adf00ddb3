//! `req`: requirements workflows and source analysis for LLM coding agents.

use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use usereq::cli::{Cli, run};
use usereq::error::find_req_error;
use usereq::{exit_codes, logging};

fn main() {
    if std::env::args_os().len() <= 1 {
        let mut help = Cli::command();
        // Nothing else to report if stdout is gone.
        let _ = help.print_help();
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                exit_codes::INVALID_ARGS
            } else {
                exit_codes::OK
            };
            std::process::exit(code);
        }
    };
    logging::init(cli.debug);

    let mut out = io::stdout().lock();
    let mut errw = io::stderr().lock();
    let code = match run(&cli, &mut out, &mut errw) {
        Ok(code) => code,
        Err(err) => match find_req_error(&err) {
            Some(req) => {
                let _ = writeln!(errw, "{}", req.message);
                req.code
            }
            None => {
                let _ = writeln!(errw, "Unexpected error: {err:#}");
                exit_codes::FAILURE
            }
        },
    };
    let _ = out.flush();
    let _ = errw.flush();
    std::process::exit(code);
}
