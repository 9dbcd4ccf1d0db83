use color_eyre::{eyre::eyre, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wiipad::{DriverConfig, HardwareBus, PadHandle, Port};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = DriverConfig::load(&DriverConfig::default_path())
        .map_err(|e| eyre!("failed to load config: {}", e))?;
    info!("starting wiipad driver with config: {:?}", config);

    let bus = HardwareBus::open(&config).map_err(|e| eyre!("failed to open bus: {}", e))?;
    let mut pads =
        PadHandle::spawn(Box::new(bus), config).map_err(|e| eyre!("failed to start pads: {}", e))?;
    let mut state_rx = pads.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }

            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *state_rx.borrow_and_update();
                for port in [Port::Zero, Port::One] {
                    info!("pad {}: {:?}", port.index(), snapshot.port_state(port).buttons);
                }
            }
        }
    }

    pads.shutdown()
        .await
        .map_err(|e| eyre!("shutdown failed: {}", e))?;
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
