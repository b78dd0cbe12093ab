#![allow(dead_code)]

use std::io::Cursor;
use std::time::Duration;

use gleaner::config::Config;
use image::{ImageFormat, Rgb, RgbImage};

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Config pointed at a mock server, with no cooldown and short timeouts.
pub fn test_config(server_uri: &str, keywords: &[&str]) -> Config {
    Config::new(keywords.iter().copied())
        .with_search_url(format!("{server_uri}/search"))
        .with_cooldown(Duration::ZERO)
        .with_timeouts(Duration::from_secs(5), Duration::from_millis(500))
}
