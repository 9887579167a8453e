//! ckubeadm - easily bootstrap a secure Kubernetes cluster

#![forbid(unsafe_code)]

use std::process;

use ckubeadm::cli::{
    build_root,
    error::{format_error, get_exit_code},
    setup::init_tracing,
    Sink,
};

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Warning: {e}");
    }

    let root = build_root(Sink::stdout(), Sink::stderr());
    if let Err(err) = root.execute(std::env::args_os()) {
        if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
            let _ = clap_err.print();
            process::exit(clap_err.exit_code());
        }
        eprintln!("Error: {}", format_error(&err));
        process::exit(get_exit_code(&err));
    }
}
