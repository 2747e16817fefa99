//! main - starts a combined SGW/PGW control plane with local collaborators

use anyhow::{Result, ensure};
use async_std::channel::Sender;
use async_std::prelude::*;
use clap::Parser;
use signal_hook::consts::signal::*;
use signal_hook_async_std::Signals;
use slog::{Drain, Logger, info, o};
use spgw::{Config, LocalServices, Spgw};
use std::net::{IpAddr, Ipv4Addr};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file.  Fields missing from the file take their defaults.
    #[arg(long)]
    config: Option<String>,

    /// Local S11 control plane address.  Goes into the SGW S11 F-TEID.
    #[arg(long)]
    s11_ip: Option<IpAddr>,

    /// Local S1-U address.  Goes into the SGW S1-U F-TEID.  Defaults to the
    /// eth0 address.
    #[arg(long)]
    s1u_ip: Option<IpAddr>,

    /// UE subnet.  This is the network address of an IPv4 subnet in dotted
    /// decimal notation; its prefix length comes from the config file.
    #[arg(long)]
    ue_subnet: Option<Ipv4Addr>,
}

#[async_std::main]
async fn main() -> Result<()> {
    exit_on_panic();
    let logger = init_logging();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(filename) => spgw::load_config_file(filename, &logger)?,
        None => Config::default(),
    };
    if let Some(ip) = args.s11_ip {
        config.s11_ip = ip;
    }
    config.s1u_ip = match args.s1u_ip {
        Some(ip) => ip,
        None => local_ip_address::local_ip()?,
    };
    if let Some(subnet) = args.ue_subnet {
        config.ue_subnet = subnet;
    }
    check_local_ip(&config.s11_ip)?;
    check_local_ip(&config.s1u_ip)?;
    check_ue_subnet(&config.ue_subnet)?;
    info!(
        &logger,
        "S11 on {}, S1-U on {}, UEs on {}/{}",
        config.s11_ip,
        config.s1u_ip,
        config.ue_subnet,
        config.ue_subnet_prefix_len
    );

    let services = LocalServices::new(config)?;
    let spgw = Spgw::start(services, logger.new(o!("spgw" => 1)));

    wait_for_signal().await?;
    spgw.graceful_shutdown().await;

    Ok(())
}

fn init_logging() -> Logger {
    // Use info level logging by default
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info") }
    }
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

fn check_ue_subnet(ue_subnet: &Ipv4Addr) -> Result<()> {
    ensure!(
        !ue_subnet.is_unspecified() && ue_subnet.octets()[3] == 0,
        "UE subnet must be a network address with final byte 0"
    );
    Ok(())
}

fn check_local_ip(ip: &IpAddr) -> Result<()> {
    ensure!(
        !ip.is_unspecified(),
        "Unspecific IP address not allowed for a local address - this must be an address that peers can send to"
    );
    Ok(())
}

async fn wait_for_signal() -> Result<i32> {
    let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();
    let (sig_sender, sig_receiver) = async_std::channel::unbounded();
    let signals_task = async_std::task::spawn(handle_signals(signals, sig_sender));
    let signal = sig_receiver.recv().await;
    handle.close();
    signals_task.await;
    Ok(signal?)
}

async fn handle_signals(signals: Signals, sig_sender: Sender<i32>) {
    let mut signals = signals.fuse();
    while let Some(signal) = signals.next().await {
        match signal {
            SIGHUP => {
                // Ignored.
            }
            SIGTERM | SIGINT | SIGQUIT => {
                let _ = sig_sender.send(signal).await;
            }
            _ => unreachable!(),
        }
    }
}
