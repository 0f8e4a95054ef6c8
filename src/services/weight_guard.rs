/// Largest day-over-day weight change accepted without explicit confirmation.
pub const WEIGHT_CHANGE_THRESHOLD_LBS: f64 = 5.0;

/// Checks a new weigh-in against the previous day's. Returns the message to
/// show the user when the jump needs confirming.
pub fn check_weight_change(previous: Option<f64>, current: f64) -> Result<(), String> {
    let Some(previous) = previous else {
        return Ok(());
    };

    let difference = (current - previous).abs();
    if difference > WEIGHT_CHANGE_THRESHOLD_LBS {
        return Err(format!(
            "Weight change of {:.1} lbs exceeds {} lb threshold. Please confirm this is correct.",
            difference, WEIGHT_CHANGE_THRESHOLD_LBS
        ));
    }
    Ok(())
}
