use std::env;
use std::sync::Arc;
use std::time::Duration;

use radio_thermostat::{Config, Event, Thermostat};

#[tokio::main]
async fn main() -> radio_thermostat::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let url = args.get(1).expect("usage: monitor <base_url> [--fan]");
    let mut config = Config::new(url.as_str());
    config.enable_fan_interface = args.iter().any(|a| a == "--fan");

    let tstat = Arc::new(
        Thermostat::builder(&config.base_url)
            .min_poll_interval(config.min_poll_interval())
            .fan_interface(config.enable_fan_interface)
            .on_event(|event| match event {
                Event::TargetTemperature { celsius } => println!("target -> {celsius:.1}\u{00b0}C"),
                Event::FanActive { active } => println!("fan -> {}", if *active { "on" } else { "off" }),
            })
            .build()?,
    );

    println!(
        "{} / serial {} / firmware {}",
        tstat.model().await,
        tstat.serial_number().await,
        tstat.firmware_revision().await
    );
    println!("services: {:?}", tstat.services().await);

    let _fan = tstat.spawn_fan_refresh();

    loop {
        match (
            tstat.current_temperature().await,
            tstat.target_heating_cooling_state().await,
            tstat.target_temperature().await,
        ) {
            (Ok(current), Ok(mode), Ok(target)) => println!(
                "{current:.1}\u{00b0}C | mode: {mode:?} | target: {target:.1}\u{00b0}C | state: {:?}",
                tstat.current_heating_cooling_state().await
            ),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => eprintln!("poll error: {e}"),
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}
