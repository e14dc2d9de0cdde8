//! Property-based tests for ST7789V windowing.
//! Every valid window must reach the controller byte-exact; every invalid
//! one must be rejected before a single byte goes out.

#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]

use panel_drivers::{DeviceConfig, DriverError, St7789v};
use platform::mocks::MockBus;
use platform::{DataMode, NoPin};
use proptest::prelude::*;

const WIDTH: u16 = 240;
const HEIGHT: u16 = 135;

fn ready_panel() -> St7789v<MockBus> {
    let config = DeviceConfig::st7789v_hardware_spi(5, 16, None);
    let mut tft = St7789v::new(MockBus::new(), None::<NoPin>, config).unwrap();
    tft.init().unwrap();
    tft
}

/// Wire traffic produced after bring-up.
fn traffic_after_init(tft: St7789v<MockBus>) -> Vec<(DataMode, u8)> {
    let (bus, _) = tft.release();
    // 8 commands + 10 parameter bytes
    bus.wire().split_off(18)
}

/// `(start, end)` with `start <= end < max`.
fn span(max: u16) -> impl Strategy<Value = (u16, u16)> {
    (0..max).prop_flat_map(move |start| (Just(start), start..max))
}

fn window_bytes(x0: u16, y0: u16, x1: u16, y1: u16) -> Vec<(DataMode, u8)> {
    let mut expected = vec![(DataMode::Command, 0x2A)];
    for v in [x0, x1] {
        expected.extend(v.to_be_bytes().map(|b| (DataMode::Data, b)));
    }
    expected.push((DataMode::Command, 0x2B));
    for v in [y0, y1] {
        expected.extend(v.to_be_bytes().map(|b| (DataMode::Data, b)));
    }
    expected.push((DataMode::Command, 0x2C));
    expected
}

proptest! {
    #[test]
    fn valid_windows_are_byte_exact((x0, x1) in span(WIDTH), (y0, y1) in span(HEIGHT)) {
        let mut tft = ready_panel();
        tft.set_window(x0, y0, x1, y1).unwrap();
        prop_assert_eq!(traffic_after_init(tft), window_bytes(x0, y0, x1, y1));
    }

    #[test]
    fn invalid_windows_send_nothing(
        x0 in 0u16..400, y0 in 0u16..400, x1 in 0u16..400, y1 in 0u16..400,
    ) {
        prop_assume!(!(x0 <= x1 && x1 < WIDTH && y0 <= y1 && y1 < HEIGHT));
        let mut tft = ready_panel();
        prop_assert_eq!(tft.set_window(x0, y0, x1, y1), Err(DriverError::Range));
        prop_assert!(traffic_after_init(tft).is_empty());
    }

    #[test]
    fn put_pixel_sends_one_word(x in 0..WIDTH, y in 0..HEIGHT, color in any::<u16>()) {
        let mut tft = ready_panel();
        tft.put_pixel(x, y, color).unwrap();

        let mut expected = window_bytes(
            x,
            y,
            (x + 1).min(WIDTH - 1),
            (y + 1).min(HEIGHT - 1),
        );
        expected.extend(color.to_be_bytes().map(|b| (DataMode::Data, b)));
        prop_assert_eq!(traffic_after_init(tft), expected);
    }

    #[test]
    fn fill_rect_streams_width_times_height_words(
        (x0, x1) in span(WIDTH), (y0, y1) in span(HEIGHT), color in any::<u16>(),
    ) {
        let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);
        prop_assume!(u32::from(w) * u32::from(h) <= 4096);
        let mut tft = ready_panel();
        tft.fill_rect(x0, y0, w, h, color).unwrap();

        let traffic = traffic_after_init(tft);
        let (window, pixels) = traffic.split_at(11);
        prop_assert_eq!(window.to_vec(), window_bytes(x0, y0, x1, y1));
        prop_assert_eq!(pixels.len(), usize::from(w) * usize::from(h) * 2);
        let [high, low] = color.to_be_bytes();
        prop_assert!(pixels.chunks(2).all(|p| p == [(DataMode::Data, high), (DataMode::Data, low)]));
    }
}
