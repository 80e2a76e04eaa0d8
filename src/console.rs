//! Console reporting for a pipeline run (spec §6).
//!
//! Line formats mirror the original tool's plain `print()` output
//! (per-delivery depart/arrival line, per-vehicle totals, fleet totals);
//! colors and the startup banner are this crate's own addition, in the
//! house style used for solver/phase reporting.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::time::Duration;

pub fn print_banner() {
    let banner = r#"
  ____                 _   ____             _
 |  _ \  ___ _ __   ___| |_|  _ \ ___  _   _| |_ ___ _ __
 | | | |/ _ \ '_ \ / _ \ __| |_) / _ \| | | | __/ _ \ '__|
 | |_| |  __/ |_) | (_) | |_|  _ < (_) | |_| | ||  __/ |
 |____/ \___| .__/ \___/ \__|_| \_\___/ \__,_|\__\___|_|
            |_|
"#;
    println!("{}", banner.cyan().bold());
    println!(
        "  {} {}\n",
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black(),
        "Multi-vehicle delivery tour planner".bright_cyan()
    );
}

pub fn print_fleet_config(fleet_size: usize, delivery_count: usize, node_count: usize) {
    println!(
        "{} {} Problem: vehicles ({}), deliveries ({}), road nodes ({})",
        "INFO".bright_green(),
        "[Pipeline]".bright_cyan(),
        fleet_size.to_formatted_string(&Locale::en).bright_yellow(),
        delivery_count.to_formatted_string(&Locale::en).bright_yellow(),
        node_count.to_formatted_string(&Locale::en).bright_yellow(),
    );
}

/// "Vehicle V, delivery D depart HH:MM arrival HH:MM, time to deliver M
/// minutes" — one line per delivered stop.
pub fn print_delivery_line(
    vehicle_id: usize,
    delivery_number: usize,
    depart_hhmm: &str,
    arrival_hhmm: &str,
    service_minutes: i64,
) {
    println!(
        "Vehicle {}, delivery {} depart {} arrival {}, time to deliver {} minutes",
        (vehicle_id + 1).to_string().bright_cyan(),
        delivery_number,
        depart_hhmm.yellow(),
        arrival_hhmm.yellow(),
        service_minutes.to_string().bright_magenta(),
    );
}

pub fn print_no_path(from: usize, to: usize) {
    println!(
        "{} no path between stop {} and stop {}",
        "WARN".bright_red(),
        from,
        to,
    );
}

/// "Vehicle V total distance: X meters" / "Vehicle V total duration: Y
/// minutes" — printed once per vehicle after its schedule is reified.
pub fn print_vehicle_totals(vehicle_id: usize, total_distance_m: f64, total_duration_s: f64) {
    println!(
        "Vehicle {} total distance: {:.2} meters",
        vehicle_id + 1,
        total_distance_m
    );
    println!(
        "Vehicle {} total duration: {:.2} minutes",
        vehicle_id + 1,
        total_duration_s / 60.0
    );
}

/// "Total delivery distance for all vehicles: X meters" / "... duration ...
/// Y minutes" — printed once after the whole fleet is scheduled.
pub fn print_fleet_totals(total_distance_m: f64, total_duration_s: f64) {
    println!(
        "Total delivery distance for all vehicles: {:.2} meters",
        total_distance_m
    );
    println!(
        "Total delivery duration for all vehicles: {:.2} minutes",
        total_duration_s / 60.0
    );
}

pub fn print_pipeline_duration(duration: Duration) {
    println!(
        "{} {} pipeline finished in {}",
        "INFO".bright_green(),
        "[Pipeline]".bright_cyan(),
        format_duration(duration).yellow(),
    );
}

fn format_duration(d: Duration) -> String {
    let total_ms = d.as_millis();
    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let mins = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        format!("{mins}m {secs}s")
    }
}
