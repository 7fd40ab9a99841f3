//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use haptic_servo::{ProcessedSample, Sample};

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// Position, force and sequence of one processed sample.
pub fn format_position(processed: &ProcessedSample) -> String {
    let pose = processed.sample.pose;
    let force = processed.contact.force;
    format!(
        "[POS] x={:.2}, y={:.2}, z={:.2} mm | Force=[{:.2}, {:.2}, {:.2}] N | Sample={}",
        pose.x, pose.y, pose.z, force.fx, force.fy, force.fz, processed.sample.sequence
    )
}

/// Raw button mask followed by the state of the first `count` buttons.
pub fn format_buttons(sample: &Sample, count: u8) -> String {
    let states: Vec<String> = (1_u32..)
        .zip(0..count)
        .map(|(label, index)| {
            let state = if sample.button_pressed(index) {
                "Pressed"
            } else {
                "Released"
            };
            format!("{label}={state}")
        })
        .collect();
    format!("[BTN] raw=0x{:X} | {}", sample.buttons, states.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use haptic_servo::surface::evaluate;
    use haptic_servo::{ContactState, Pose3, SurfaceConfig};

    fn processed(pose: Pose3, sequence: u64) -> ProcessedSample {
        let sample = Sample {
            pose,
            sequence,
            ..Sample::default()
        };
        ProcessedSample {
            sample,
            contact: evaluate(&pose, &SurfaceConfig::default()),
            commanded: None,
        }
    }

    #[test]
    fn position_in_contact() {
        let line = format_position(&processed(Pose3::new(1.0, -2.5, 3.25), 42));
        insta::assert_snapshot!(line, @"[POS] x=1.00, y=-2.50, z=3.25 mm | Force=[0.00, 0.25, 0.00] N | Sample=42");
    }

    #[test]
    fn position_free_space() {
        let mut free = processed(Pose3::new(0.0, 12.0, -7.5), 7);
        free.contact = ContactState::free(12.0);
        insta::assert_snapshot!(format_position(&free), @"[POS] x=0.00, y=12.00, z=-7.50 mm | Force=[0.00, 0.00, 0.00] N | Sample=7");
    }

    #[test]
    fn buttons_two_tracked() {
        let sample = Sample {
            buttons: 0b01,
            ..Sample::default()
        };
        insta::assert_snapshot!(format_buttons(&sample, 2), @"[BTN] raw=0x1 | 1=Pressed, 2=Released");
    }

    #[test]
    fn buttons_raw_mask_includes_untracked() {
        let sample = Sample {
            buttons: 0b1110,
            ..Sample::default()
        };
        insta::assert_snapshot!(format_buttons(&sample, 3), @"[BTN] raw=0xE | 1=Released, 2=Pressed, 3=Pressed");
    }
}
