use radio_thermostat::{Temperature, celsius_to_fahrenheit, fahrenheit_to_celsius};

#[test]
fn from_celsius() {
    let t = Temperature::from_celsius(22.0);
    assert_eq!(t.celsius(), 22.0);
    assert!((t.fahrenheit() - 71.6).abs() < 0.01);
}

#[test]
fn from_fahrenheit() {
    let t = Temperature::from_fahrenheit(72.0);
    assert!((t.celsius() - 22.222).abs() < 0.01);
    assert!((t.fahrenheit() - 72.0).abs() < 0.01);
}

#[test]
fn freezing_and_boiling() {
    assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
    assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 1e-9);
    assert!((celsius_to_fahrenheit(-40.0) + 40.0).abs() < 1e-9);
}

#[test]
fn conversion_round_trips() {
    for x in [-40.0, -3.7, 0.0, 18.5, 21.0, 55.0, 72.4, 90.0, 1234.5] {
        assert!((celsius_to_fahrenheit(fahrenheit_to_celsius(x)) - x).abs() < 1e-9);
        assert!((fahrenheit_to_celsius(celsius_to_fahrenheit(x)) - x).abs() < 1e-9);
    }
}

#[test]
fn device_rounding_is_whole_fahrenheit() {
    let t = Temperature::from_fahrenheit(72.4);
    assert_eq!(t.to_device_fahrenheit(), 72);
    let t = Temperature::from_fahrenheit(72.6);
    assert_eq!(t.to_device_fahrenheit(), 73);
    // 21°C = 69.8°F
    assert_eq!(Temperature::from_celsius(21.0).to_device_fahrenheit(), 70);
}

#[test]
fn display() {
    let t = Temperature::from_celsius(22.5);
    assert_eq!(format!("{t}"), "22.5\u{00b0}C");
}
