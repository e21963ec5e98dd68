//! Styles command: list styles and their default tuning

use anyhow::Result;
use pyro_particles::{Style, TuningDefaults};
use serde::Serialize;

#[derive(Serialize)]
struct StyleInfo {
    name: &'static str,
    splits: bool,
    trails: bool,
    defaults: TuningDefaults,
}

pub fn run(json: bool) -> Result<()> {
    let styles: Vec<StyleInfo> = Style::ALL
        .iter()
        .map(|style| {
            let behavior = style.behavior();
            StyleInfo {
                name: style.name(),
                splits: behavior.splitter().is_some(),
                trails: behavior.has_trail_particles(),
                defaults: behavior.defaults(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&styles)?);
        return Ok(());
    }

    println!(
        "{:<14} {:>8} {:>6} {:>11} {:>7} {:>7}  extras",
        "style", "gravity", "drag", "lifespan", "spread", "force"
    );
    for info in &styles {
        let d = &info.defaults;
        let mut extras = Vec::new();
        if d.secondary_enabled {
            extras.push("secondary");
        }
        if info.trails {
            extras.push("trails");
        }
        if info.splits {
            extras.push("splits");
        }
        println!(
            "{:<14} {:>8.0} {:>6.2} {:>5.1}-{:<5.1} {:>7.0} {:>7.0}  {}",
            info.name,
            d.gravity,
            d.drag,
            d.lifespan_min,
            d.lifespan_max,
            d.spread_angle,
            d.force,
            extras.join(", ")
        );
    }
    Ok(())
}
