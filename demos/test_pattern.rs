//! Test Pattern - drives a virtual sign through a full session.
//!
//! This example demonstrates:
//! - Building a controller with the builder pattern
//! - Running the built-in test sequence on every sign
//! - Drawing a checkerboard, upright and on a flipped panel
//!
//! The port is an in-memory stand-in, so the frames that would go out on the
//! serial line are printed as hex instead. Set `RUST_LOG=debug` to see the
//! controller's own logging.
//!
//! ```text
//! cargo run --example test_pattern
//! ```

use std::time::Duration;

use hanover_flipdot::transport::{MemoryPort, Reply};
use hanover_flipdot::{HanoverController, PixelGrid};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "test_pattern=info,hanover_flipdot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // One sign answers, the other stays silent.
    let port = MemoryPort::new().with_reply(Reply::Data(vec![0x06]));
    let handle = port.handle();

    let mut controller = HanoverController::<MemoryPort>::builder()
        .sign("front", 1, 28, 16, false)
        .sign("rear", 2, 28, 16, true)
        .response_timeout(Duration::from_millis(200))
        .build(port)?;

    let outcome = controller.start_test_signs().await?;
    tracing::info!("Start test: {:?}", outcome);
    print_frame("start", &handle.written());
    handle.clear_written();

    let outcome = controller.stop_test_signs().await?;
    tracing::info!("Stop test: {:?}", outcome);
    print_frame("stop", &handle.written());
    handle.clear_written();

    for name in ["front", "rear"] {
        let sign = *controller.sign(name)?;
        let pattern = PixelGrid::from_fn(sign.width(), sign.height(), |x, y| (x + y) % 2 == 0);

        let outcome = controller.draw(name, &pattern).await?;
        tracing::info!("Drew {}: {:?}", name, outcome);
        print_frame(name, &handle.written());
        handle.clear_written();
    }

    Ok(())
}

fn print_frame(label: &str, frame: &[u8]) {
    println!("{:>6}: {}", label, hex::encode_upper(frame));
}
