/*
 *  main.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Demo renderer: synthetic signal in, meter frames out
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use embedded_graphics::pixelcolor::{BinaryColor, Gray4, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use env_logger::Env;
use log::{info, warn};
use tokio::sync::mpsc;

use levelmeter::config::{self, ColourDepth, Config};
use levelmeter::dbfs::db_to_gain;
use levelmeter::display::Snapshot;
use levelmeter::meter::{
    ChannelListener, ClassicStyle, Gray4Scheme, LevelMeter, LevelSource, MeterEvent, MeterFlags,
    MeterSource, MeterStyle, MonoScheme, SourceHandle,
};
use levelmeter::vframebuf::VarFrameBuf;

#[tokio::main] // Requires the `tokio` runtime with `macros` and `rt-multi-thread` features
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} v.{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let flags = cfg.meter_flags()?;
    match cfg.colour_depth() {
        ColourDepth::Mono => {
            let style = ClassicStyle::new(MonoScheme::with_overrides(cfg.colours()));
            run(&cfg, flags, style, BinaryColor::Off).await
        }
        ColourDepth::Gray4 => {
            let style = ClassicStyle::new(Gray4Scheme::with_overrides(cfg.colours()));
            run(&cfg, flags, style, Gray4::BLACK).await
        }
    }
}

async fn run<S>(cfg: &Config, flags: MeterFlags, style: S, blank: S::Color) -> anyhow::Result<()>
where
    S: MeterStyle,
    VarFrameBuf<S::Color>: Snapshot,
{
    let (w, h) = cfg.meter_size();
    let rate = cfg.refresh_rate_hz();
    let frames = cfg.frames();
    info!("meter {}x{} flags {} at {} Hz, {} channel(s)", w, h, flags, rate, cfg.channels());

    let source = MeterSource::shared(cfg.channels());
    let producer = tokio::spawn(produce(Arc::clone(&source)));

    let mut meter = LevelMeter::new(style, flags);
    meter.resized(Rectangle::new(Point::zero(), Size::new(w, h)));
    meter.set_meter_source(Some(SourceHandle::from(&source)));
    meter.set_refresh_rate_hz(rate);

    let (tx, mut rx) = mpsc::unbounded_channel();
    meter.add_listener(Rc::new(ChannelListener::new(tx)));

    let mut fb = VarFrameBuf::new(w, h, blank);

    if rate == 0 {
        warn!("refresh rate 0, meter is dormant: painting a single frame");
        meter.on_tick();
        meter.paint(&mut fb)?;
    } else {
        let nap = Duration::from_micros(250_000 / rate as u64).max(Duration::from_millis(1));
        let mut painted = 0u32;
        while painted < frames {
            if meter.poll(Instant::now()) {
                meter.paint(&mut fb)?;
                painted += 1;
                if painted == frames / 2 {
                    click_something(&mut meter);
                }
            }

            while let Ok(event) = rx.try_recv() {
                match event {
                    MeterEvent::ClipLightClicked(ch) => {
                        info!("clip light {} clicked, clearing", ch);
                        meter.clear_clip_indicator(Some(ch));
                    }
                    MeterEvent::MaxLevelClicked(ch) => {
                        info!("max level {} clicked, clearing", ch);
                        meter.clear_max_level_display(Some(ch));
                    }
                }
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("SIGINT received. Stopping after {} frame(s).", painted);
                    break;
                }
                _ = tokio::time::sleep(nap) => {}
            }
        }
        info!("rendered {} frame(s), {} background render(s)", painted, meter.background_renders());
    }

    producer.abort();

    if let Some(path) = cfg.output() {
        fb.save_snapshot(path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        info!("snapshot written to {}", path.display());
    }
    Ok(())
}

/// Click channel 0's clip light, or its max readout when the light is off.
fn click_something<S: MeterStyle>(meter: &mut LevelMeter<S>) {
    let target = meter
        .clip_indicator_bounds(0)
        .or_else(|| meter.max_number_bounds(0));
    match target {
        Some(rect) => {
            info!("simulating click at {:?}", rect.center());
            meter.on_pointer_down(rect.center());
        }
        None => info!("nothing clickable with these flags"),
    }
}

/// Slow swelling test tone per channel, sweeping -48..+1 dBFS so the top
/// of each swell clips.
async fn produce(source: Arc<MeterSource>) {
    let mut interval = tokio::time::interval(Duration::from_millis(10));
    let mut t = 0f32;
    loop {
        interval.tick().await;
        t += 0.01;
        for ch in 0..source.num_channels() {
            let phase = ch as f32 * 0.7;
            let env = 0.5 + 0.5 * (t * 1.3 + phase).sin();
            let db = -48.0 + 49.0 * env;
            source.set_levels(ch, db_to_gain(db), db_to_gain(db - 3.0));
            source.set_reduction_level(ch, 1.0 - 0.3 * env);
        }
    }
}
