//! Standalone runnable front-end: opens a transport, runs the protocol
//! engine, and drives a synthetic 60Hz input report off an in-memory
//! touch-state buffer. Useful for manual testing against a real cabinet
//! or another copy of this binary pointed at a TCP loopback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

use slider_proto::{open_transport, LedFrame, Mode, Protocol, SliderEvents};

const ELECTRODE_COUNT: usize = 32;
const REPORT_HZ: u64 = 60;

#[derive(Parser, Debug)]
#[command(name = "slider-emu", about = "SEGA touch-slider protocol emulator")]
struct Cli {
    /// Connection URI: tcp://host[:port], serial:/dev/ttyUSB0, or rfcomm://addr
    #[arg(long)]
    uri: String,

    /// Cabinet profile to emulate.
    #[arg(long, default_value = "diva")]
    mode: Mode,

    /// Tracing filter, e.g. "debug" or "slider_proto=trace".
    #[arg(long, default_value = "info")]
    log_level: String,
}

struct DemoEvents {
    report_enabled: Arc<AtomicBool>,
}

impl SliderEvents for DemoEvents {
    fn connection_made(&mut self) {
        tracing::info!("connected");
    }

    fn connection_lost(&mut self, reason: Option<String>) {
        tracing::info!(?reason, "disconnected");
    }

    fn led(&mut self, frame: LedFrame) {
        tracing::debug!(
            brightness = frame.brightness_ratio(),
            pixels = frame.pixels().count(),
            "led report"
        );
    }

    fn report_state_change(&mut self, enabled: bool) {
        tracing::info!(enabled, "input reporting toggled");
        self.report_enabled.store(enabled, Ordering::Relaxed);
    }

    fn report_oneshot(&mut self) {
        tracing::debug!("one-shot report requested");
    }

    fn reset(&mut self) {
        tracing::info!("reset requested");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_log::LogTracer::init()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .init();

    let transport = open_transport(&cli.uri).await?;
    let (mut reader, mut writer) = tokio::io::split(transport);

    let report_enabled = Arc::new(AtomicBool::new(false));
    let touch_state = Arc::new(Mutex::new([0u8; ELECTRODE_COUNT]));

    let mut protocol = Protocol::new(
        cli.mode,
        DemoEvents {
            report_enabled: report_enabled.clone(),
        },
    );
    protocol.connection_made();

    let mut ticker = tokio::time::interval(Duration::from_millis(1000 / REPORT_HZ));
    let mut buf = [0u8; 4096];

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if report_enabled.load(Ordering::Relaxed) {
                    let state = touch_state.lock().await;
                    let out = protocol.send_input_report(&*state);
                    if !out.is_empty() {
                        writer.write_all(&out).await?;
                    }
                }
            }
            read = reader.read(&mut buf) => {
                match read {
                    Ok(0) => {
                        protocol.connection_lost(None);
                        break;
                    }
                    Ok(n) => {
                        let out = protocol.data_received(&buf[..n]);
                        if !out.is_empty() {
                            writer.write_all(&out).await?;
                        }
                    }
                    Err(e) => {
                        protocol.connection_lost(Some(e.to_string()));
                        return Err(e.into());
                    }
                }
            }
        }
    }

    Ok(())
}
