// crates/grove-cli/src/commands/schedule.rs
//
// `grove schedule`: print the scenario's emission schedule segment by segment.

use tabled::Tabled;

use grove_core::FarmError;
use grove_economics::{EmissionSchedule, Tokens};

use crate::config::{emission_points, ScenarioConfig};
use crate::output::print_section;

/// One constant-rate segment of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct SegmentRow {
    #[tabled(rename = "From")]
    pub from: String,
    #[tabled(rename = "Until")]
    pub until: String,
    #[tabled(rename = "Rate/s")]
    pub rate: String,
    #[tabled(rename = "Emitted")]
    pub emitted: String,
}

/// Segments of the configured schedule. The last segment is open-ended.
pub fn segments(config: &ScenarioConfig) -> Result<Vec<SegmentRow>, FarmError> {
    if config.emission.is_empty() {
        return Ok(Vec::new());
    }
    let schedule = EmissionSchedule::new(emission_points(&config.emission))?;
    let tokens = |units| {
        Tokens::from_units(units)
            .with_decimals(config.reward_decimals)
            .to_string()
    };

    let points = schedule.points();
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let (until, emitted) = match points.get(i + 1) {
                Some(next) => (
                    next.timestamp.to_string(),
                    tokens(schedule.total_emitted(point.timestamp, next.timestamp)?),
                ),
                None if point.rate == 0 => ("open".to_string(), tokens(0)),
                None => ("open".to_string(), "unbounded".to_string()),
            };
            Ok(SegmentRow {
                from: point.timestamp.to_string(),
                until,
                rate: tokens(point.rate),
                emitted,
            })
        })
        .collect()
}

pub fn run(config: &ScenarioConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rows = segments(config)?;
    if rows.is_empty() {
        println!("No emission schedule configured.");
        return Ok(());
    }
    print_section("Emission Schedule", &rows);
    Ok(())
}
