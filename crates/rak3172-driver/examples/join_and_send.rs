//! Join a LoRaWAN network and send one uplink through a RAK3172 reachable
//! over a serial-to-TCP bridge.
//!
//! Usage: `join_and_send <host:port>`

use std::time::Duration;

use rak3172_driver::{Band, DeviceClass, LinkCheckMode, Rak3172, TcpTransport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7000".to_string());

    let transport = TcpTransport::connect(&addr)?;
    let radio = Rak3172::new(transport);

    radio.on_receive(|frame| {
        println!(
            "downlink on port {}: {} (rssi {}, snr {})",
            frame.port,
            frame.payload_text(),
            frame.rssi,
            frame.snr
        );
    });
    radio.on_join(|joined| {
        println!("join result: {}", if joined { "accepted" } else { "failed" });
    });

    radio.init()?;
    println!("module firmware: {}", radio.version()?);

    radio.set_band(Band::Eu868)?;
    radio.set_otaa("00112233", "44556677", "0123456789abcdef")?;
    radio.set_data_rate(5)?;
    radio.set_device_class(DeviceClass::A)?;
    radio.set_link_check(LinkCheckMode::Once)?;

    let poller = radio.start_polling();

    radio.join()?;
    radio.wait_for_join(Duration::from_secs(70))?;

    let sent = radio.send("Hello", 1)?;
    println!("uplink queued, {} bytes", sent);

    // Give any immediate downlink a moment to arrive.
    std::thread::sleep(Duration::from_secs(10));
    for frame in radio.read() {
        println!("inbox: {:?}", frame);
    }

    poller.shutdown();
    Ok(())
}
